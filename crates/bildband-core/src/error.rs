// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Bildband.

use thiserror::Error;

use crate::types::AssetError;

/// Top-level error type for all Bildband operations.
///
/// Per-image failures are never raised through this type during a batch; they
/// are collected as [`AssetError`] values. Only the batch-fatal variants
/// (`NoValidImages`, `NothingProcessed`) end a conversion.
#[derive(Debug, Error)]
pub enum BildbandError {
    // -- Batch-fatal --
    #[error("no valid images were supplied")]
    NoValidImages,

    #[error("none of the {} image(s) could be processed", errors.len())]
    NothingProcessed { errors: Vec<AssetError> },

    // -- Intake --
    #[error("upload too large: {actual} bytes exceeds the {limit} byte limit")]
    UploadTooLarge { limit: u64, actual: u64 },

    #[error("invalid option: {0}")]
    InvalidOption(String),

    // -- Image / document --
    #[error("invalid image dimensions {width}x{height} for {name}")]
    InvalidDimensions {
        name: String,
        width: u32,
        height: u32,
    },

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BildbandError {
    /// Whether this error ends the whole conversion (as opposed to a
    /// configuration or I/O problem outside the batch).
    pub fn is_batch_fatal(&self) -> bool {
        matches!(self, Self::NoValidImages | Self::NothingProcessed { .. })
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BildbandError>;
