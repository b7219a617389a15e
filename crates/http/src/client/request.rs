//! Rebuildable request descriptions
//!
//! A `reqwest::RequestBuilder` carrying a multipart body cannot be cloned, so
//! requests are kept as plain data and turned into a builder on every send.
//! That is what lets the client resubmit a request after a token refresh.

use super::error::ClientError;
use crate::types::Upload;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Serialize;

/// Request payload
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    /// Sent without a JSON content type; the transport sets the boundary header
    Multipart(MultipartForm),
}

/// One outbound API call
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: RequestBody,
    retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Empty,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Attach a JSON body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach a multipart body
    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// Opt out of the 401 refresh-and-retry. Used for the credential
    /// endpoints, whose 401 means "wrong password", not "stale token".
    pub fn without_refresh(mut self) -> Self {
        self.retried = true;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Whether this request has already used its one refresh-and-retry
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }
}

#[derive(Debug, Clone)]
enum FormValue {
    Text(String),
    File(Upload),
}

/// Owned multipart form that can be rendered more than once
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    fields: Vec<(String, FormValue)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), FormValue::Text(value.into())));
        self
    }

    pub fn file(mut self, name: impl Into<String>, upload: Upload) -> Self {
        self.fields.push((name.into(), FormValue::File(upload)));
        self
    }

    /// Append every upload under the same repeated field name
    pub fn files<'a>(mut self, name: &str, uploads: impl IntoIterator<Item = &'a Upload>) -> Self {
        for upload in uploads {
            self.fields
                .push((name.to_string(), FormValue::File(upload.clone())));
        }
        self
    }

    /// Field names in insertion order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Value of the first text field with this name
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|(field, value)| match value {
            FormValue::Text(text) if field == name => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn to_form(&self) -> Result<Form, ClientError> {
        let mut form = Form::new();
        for (name, value) in &self.fields {
            form = match value {
                FormValue::Text(text) => form.text(name.clone(), text.clone()),
                FormValue::File(upload) => {
                    let mut part =
                        Part::bytes(upload.bytes.to_vec()).file_name(upload.file_name.clone());
                    if let Some(mime) = &upload.mime_type {
                        part = part.mime_str(mime)?;
                    }
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}
