//! Upload payloads for the multipart endpoints

use crate::client::request::MultipartForm;
use bytes::Bytes;

/// A file attached to a multipart request
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Bytes,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Read a file from disk, guessing an image content type from its extension
    #[cfg(not(target_arch = "wasm32"))]
    pub async fn from_path(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |name| name.to_string_lossy().into_owned());
        let mime_type = path
            .extension()
            .and_then(|ext| image_mime_type(&ext.to_string_lossy()))
            .map(str::to_string);

        Ok(Self {
            file_name,
            mime_type,
            bytes: bytes.into(),
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn image_mime_type(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

/// A seller's request to train a new avatar
#[derive(Debug, Clone)]
pub struct NewTrainingRequest {
    pub avatar_name: String,
    pub negative_prompt: String,
    pub credit_per_generation: i64,
    pub national: String,
    pub gender: String,
    pub description: String,
    pub is_real_person: bool,
    /// Only sent for real people
    pub instagram_id: Option<String>,
    pub preview_image: Upload,
    pub front_photos: Vec<Upload>,
    pub side_photos: Vec<Upload>,
    pub fullbody_photos: Vec<Upload>,
    pub other_photos: Vec<Upload>,
}

impl NewTrainingRequest {
    pub fn to_form(&self) -> MultipartForm {
        let mut form = MultipartForm::new()
            .text("avatar_name", &self.avatar_name)
            .text("negative_prompt", &self.negative_prompt)
            .text("credit_per_generation", self.credit_per_generation.to_string())
            .text("national", &self.national)
            .text("gender", &self.gender)
            .text("description", &self.description)
            .text("is_real_person", self.is_real_person.to_string());

        if self.is_real_person {
            if let Some(instagram_id) = self.instagram_id.as_deref().filter(|id| !id.is_empty()) {
                form = form.text("instagram_id", instagram_id);
            }
        }

        form.file("preview_image", self.preview_image.clone())
            .files("front_photos", &self.front_photos)
            .files("side_photos", &self.side_photos)
            .files("fullbody_photos", &self.fullbody_photos)
            .files("other_photos", &self.other_photos)
    }
}

/// Partial avatar edit. Empty strings are treated as "unchanged".
#[derive(Debug, Clone, Default)]
pub struct AvatarUpdate {
    pub title: Option<String>,
    pub credit_per_generation: Option<i64>,
    pub description: Option<String>,
    pub preview_image: Option<Upload>,
}

impl AvatarUpdate {
    pub fn to_form(&self) -> MultipartForm {
        let mut form = MultipartForm::new();
        if let Some(title) = self.title.as_deref().filter(|title| !title.is_empty()) {
            form = form.text("title", title);
        }
        if let Some(credits) = self.credit_per_generation {
            form = form.text("credit_per_generation", credits.to_string());
        }
        if let Some(description) = self.description.as_deref().filter(|text| !text.is_empty()) {
            form = form.text("description", description);
        }
        if let Some(preview_image) = &self.preview_image {
            form = form.file("preview_image", preview_image.clone());
        }
        form
    }
}
