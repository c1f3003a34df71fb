// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::{LayoutMode, PaperSize, SortBy};

/// Default cap on the combined size of one upload batch (500 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;

/// Default caption format (day/month/year hour:minute).
pub const DEFAULT_CAPTION_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Settings for a conversion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Paper size every page is laid out on.
    pub paper_size: PaperSize,
    /// Layout mode used when a request does not pick one.
    pub layout_mode: LayoutMode,
    /// Ordering used when a request does not pick one.
    pub sort_by: SortBy,
    /// Maximum combined size of all uploads in one request.
    pub max_upload_bytes: u64,
    /// Fully decode each image while probing its geometry, so corrupt bodies
    /// are caught before assembly. When false only the header is read.
    pub verify_decode: bool,
    /// `chrono` format string for timestamp captions.
    pub caption_format: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            layout_mode: LayoutMode::Standard,
            sort_by: SortBy::Name,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            verify_decode: true,
            caption_format: DEFAULT_CAPTION_FORMAT.to_string(),
        }
    }
}

impl ConvertConfig {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bildband.json");
        std::fs::write(&path, r#"{ "layout_mode": "receipts", "paper_size": "Letter" }"#).unwrap();

        let config = ConvertConfig::load(&path).unwrap();
        assert_eq!(config.layout_mode, LayoutMode::Grid2x2);
        assert_eq!(config.paper_size, PaperSize::Letter);
        assert_eq!(config.sort_by, SortBy::Name);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(config.verify_decode);
    }

    #[test]
    fn malformed_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = ConvertConfig::load(&path).unwrap_err();
        assert!(matches!(err, crate::BildbandError::Serialization(_)));
    }
}
