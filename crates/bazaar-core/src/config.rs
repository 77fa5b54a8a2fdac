//! Client configuration.
//!
//! Values that tune how the client prepares uploads and how the in-memory
//! backend builds blob URLs. Collection paths are a wire contract and live
//! in [`crate::paths`].

use std::env;

use serde::{Deserialize, Serialize};

use crate::util::{is_blob_url, normalize_text_option};
use crate::{Error, Result};

const ENV_MAX_PHOTO_DIMENSION: &str = "BAZAAR_MAX_PHOTO_DIMENSION";
const ENV_PHOTO_JPEG_QUALITY: &str = "BAZAAR_PHOTO_JPEG_QUALITY";
const ENV_BLOB_BASE_URL: &str = "BAZAAR_BLOB_BASE_URL";

const DEFAULT_MAX_PHOTO_DIMENSION: u32 = 1024;
const DEFAULT_PHOTO_JPEG_QUALITY: u8 = 90;
const DEFAULT_BLOB_BASE_URL: &str = "memory://bazaar";

/// Runtime configuration for a Bazaar client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Longest edge, in pixels, of photos sent to object storage.
    #[serde(default = "default_max_photo_dimension")]
    pub max_photo_dimension: u32,
    /// JPEG quality (1-100) for uploaded photos.
    #[serde(default = "default_photo_jpeg_quality")]
    pub photo_jpeg_quality: u8,
    /// Base URL that download URLs of uploaded blobs are built from.
    #[serde(default = "default_blob_base_url")]
    pub blob_base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_photo_dimension: DEFAULT_MAX_PHOTO_DIMENSION,
            photo_jpeg_quality: DEFAULT_PHOTO_JPEG_QUALITY,
            blob_base_url: DEFAULT_BLOB_BASE_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from `BAZAAR_*` environment variables.
    ///
    /// Unset variables keep their defaults; set but malformed variables are
    /// reported as errors instead of being ignored.
    pub fn from_env() -> Result<Self> {
        parse_config(|key| env::var(key).ok())
    }

    /// Parse configuration from a JSON document.
    pub fn from_json(payload: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(payload)?;
        config.validated()
    }

    fn validated(mut self) -> Result<Self> {
        if self.max_photo_dimension == 0 {
            return Err(Error::Config(
                "max_photo_dimension must be greater than zero".to_string(),
            ));
        }
        if !(1..=100).contains(&self.photo_jpeg_quality) {
            return Err(Error::Config(format!(
                "photo_jpeg_quality must be between 1 and 100, got {}",
                self.photo_jpeg_quality
            )));
        }
        let base = self.blob_base_url.trim().trim_end_matches('/').to_string();
        if !is_blob_url(&base) {
            return Err(Error::Config(format!(
                "blob_base_url must include a scheme, got '{base}'"
            )));
        }
        self.blob_base_url = base;
        Ok(self)
    }
}

fn parse_config(lookup: impl Fn(&str) -> Option<String>) -> Result<ClientConfig> {
    let mut config = ClientConfig::default();

    if let Some(raw) = normalize_text_option(lookup(ENV_MAX_PHOTO_DIMENSION)) {
        config.max_photo_dimension = raw.parse().map_err(|error| {
            Error::Config(format!("{ENV_MAX_PHOTO_DIMENSION} is not a number: {error}"))
        })?;
    }
    if let Some(raw) = normalize_text_option(lookup(ENV_PHOTO_JPEG_QUALITY)) {
        config.photo_jpeg_quality = raw.parse().map_err(|error| {
            Error::Config(format!("{ENV_PHOTO_JPEG_QUALITY} is not a number: {error}"))
        })?;
    }
    if let Some(raw) = normalize_text_option(lookup(ENV_BLOB_BASE_URL)) {
        config.blob_base_url = raw;
    }

    config.validated()
}

fn default_max_photo_dimension() -> u32 {
    DEFAULT_MAX_PHOTO_DIMENSION
}

fn default_photo_jpeg_quality() -> u8 {
    DEFAULT_PHOTO_JPEG_QUALITY
}

fn default_blob_base_url() -> String {
    DEFAULT_BLOB_BASE_URL.to_string()
}
