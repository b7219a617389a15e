//! Records exchanged with the marketplace API

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares an enum that serializes as a lowercase string and keeps values it
/// does not recognise instead of failing to decode.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $value:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $value,)+
                    Self::Other(value) => value,
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.as_str() {
                    $($value => Self::$variant,)+
                    _ => Self::Other(value),
                }
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Marketplace role of a user. Sellers are called influencers on the wire.
    pub enum Role {
        Buyer => "buyer",
        Influencer => "influencer",
    }
}

string_enum! {
    /// Interface language of a user
    pub enum Locale {
        En => "en",
        Ko => "ko",
        Ja => "ja",
    }
}

string_enum! {
    /// Review state of a seller's training request
    pub enum TrainingRequestStatus {
        Requested => "requested",
        ApprovedTraining => "approved_training",
        Rejected => "rejected",
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Buyer
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::En
    }
}

/// Server-issued identity record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub nickname: String,
    pub role: Role,
    pub locale: Locale,
    pub credit_balance: i64,
}

/// Registration payload. Role and locale fall back to buyer / en.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub locale: Locale,
}

impl RegisterRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            nickname: None,
            role: Role::default(),
            locale: Locale::default(),
        }
    }

    pub fn nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
}

fn bearer() -> String {
    "bearer".to_string()
}

/// An image generation charged to the buyer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generation {
    pub id: i64,
    pub avatar_id: Option<i64>,
    pub buyer_id: i64,
    pub credits_used: i64,
    pub prompt: String,
    pub request_id: Option<String>,
    pub image_url: Option<String>,
    pub seed: Option<String>,
    pub status: String,
    pub fail_reason: Option<String>,
    pub nsfw_flag: Option<bool>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRequest {
    pub id: i64,
    pub avatar_name: String,
    pub status: TrainingRequestStatus,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// An avatar owned by a seller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Avatar {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub nationality: Option<String>,
    pub gender: Option<String>,
    pub preview_image_url: Option<String>,
    pub credit_per_generation: Option<i64>,
    pub negative_prompt: Option<String>,
    pub status: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// The backend emits naive ISO-8601 datetimes in UTC; offsets are accepted too.
mod timestamp {
    use super::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|err| D::Error::custom(format!("invalid timestamp {raw:?}: {err}")))
    }
}
