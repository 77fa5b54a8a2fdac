//! User profile model and the signed-in user

use serde::{Deserialize, Serialize};

use crate::decode::{string_field, RawRecord, RemoteDecode, RemoteEncode};
use crate::util::normalize_text_option;

use super::Record;

pub(crate) const USER_ID: &str = "userID";
pub(crate) const DISPLAY_NAME: &str = "displayName";
pub(crate) const EMAIL: &str = "email";
pub(crate) const PHOTO_URL: &str = "photoURL";

/// Public profile document stored under `users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
}

impl Record for UserProfile {
    fn id(&self) -> &str {
        &self.user_id
    }

    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

impl RemoteDecode for UserProfile {
    fn decode(raw: &RawRecord) -> Self {
        Self {
            user_id: string_field(raw, USER_ID, "No user ID"),
            display_name: string_field(raw, DISPLAY_NAME, "No display name"),
            email: string_field(raw, EMAIL, "No email"),
            photo_url: string_field(raw, PHOTO_URL, "No photo URL"),
        }
    }
}

impl RemoteEncode for UserProfile {}

/// The authenticated user, as reported by the auth provider.
///
/// Passed explicitly into every call that depends on who is acting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

impl CurrentUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            email: None,
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = normalize_text_option(Some(display_name.into()));
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = normalize_text_option(Some(email.into()));
        self
    }
}
