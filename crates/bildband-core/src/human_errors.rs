// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how the front end presents it.

use crate::error::BildbandError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Temporary problem, trying again may work.
    Transient,
    /// User must change something (pick other files, smaller batch, a flag).
    ActionRequired,
    /// Cannot be fixed by retrying: the input itself is unusable.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether trying again unchanged could succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `BildbandError` into a `HumanError`.
pub fn humanize_error(err: &BildbandError) -> HumanError {
    match err {
        BildbandError::NoValidImages => HumanError {
            message: "No valid images were found.".into(),
            suggestion: "Choose JPEG, PNG, BMP, GIF, TIFF or WebP files and try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        BildbandError::NothingProcessed { errors } => {
            let first = errors
                .first()
                .map(|e| format!(" (First problem: {e})"))
                .unwrap_or_default();
            HumanError {
                message: "None of the images could be processed.".into(),
                suggestion: format!(
                    "The files may be damaged or not really images. Try opening them in an image viewer first.{first}"
                ),
                retriable: false,
                severity: Severity::Permanent,
            }
        }

        BildbandError::UploadTooLarge { limit, .. } => HumanError {
            message: "The selected images are too large in total.".into(),
            suggestion: format!(
                "Split the images into smaller batches of at most {} MB each.",
                limit / (1024 * 1024)
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        BildbandError::InvalidOption(detail) => HumanError {
            message: "One of the options isn't recognised.".into(),
            suggestion: format!("Check the spelling of the option and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        BildbandError::InvalidDimensions { name, .. } => HumanError {
            message: format!("The image \"{name}\" has no visible content."),
            suggestion: "Remove this image from the batch, or export it again from its original app.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        BildbandError::ImageError(_) => HumanError {
            message: "There's a problem with one of the images.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        BildbandError::PdfError(_) => HumanError {
            message: "The document couldn't be created.".into(),
            suggestion: "Try again with fewer images. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        BildbandError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "Bildband doesn't have permission to use that file.".into(),
                    suggestion: "Check the file permissions, or try copying the file to a different location first.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your storage may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        BildbandError::Serialization(_) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: "Check that the configuration file is valid JSON.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}
