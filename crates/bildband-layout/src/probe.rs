// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry probe — reads the pixel dimensions of an input image.

use bildband_core::error::{BildbandError, Result};
use bildband_core::{AssetRef, ImageAsset};
use image::ImageReader;
use tracing::{debug, instrument};

/// Source of pixel geometry for the layout engine.
///
/// A failing probe is a per-image error: the engine records it and moves on.
pub trait GeometryProbe {
    fn probe(&self, asset: &AssetRef) -> Result<ImageAsset>;
}

/// Probe backed by the `image` crate, reading from the asset's path.
#[derive(Debug, Clone, Copy)]
pub struct FileProbe {
    verify_decode: bool,
}

impl FileProbe {
    /// Decode every image in full, so truncated or corrupt bodies fail here
    /// rather than during assembly.
    pub fn verifying() -> Self {
        Self {
            verify_decode: true,
        }
    }

    /// Read only the image header. Faster, but a damaged body goes unnoticed.
    pub fn header_only() -> Self {
        Self {
            verify_decode: false,
        }
    }

    pub fn new(verify_decode: bool) -> Self {
        Self { verify_decode }
    }
}

impl Default for FileProbe {
    fn default() -> Self {
        Self::verifying()
    }
}

impl GeometryProbe for FileProbe {
    #[instrument(skip_all, fields(asset = %asset.name))]
    fn probe(&self, asset: &AssetRef) -> Result<ImageAsset> {
        let reader = ImageReader::open(&asset.path)?.with_guessed_format()?;

        let (width, height) = if self.verify_decode {
            let img = reader.decode().map_err(|err| {
                BildbandError::ImageError(format!("failed to decode {}: {}", asset.name, err))
            })?;
            (img.width(), img.height())
        } else {
            reader.into_dimensions().map_err(|err| {
                BildbandError::ImageError(format!(
                    "failed to read dimensions of {}: {}",
                    asset.name, err
                ))
            })?
        };

        debug!(width, height, "Image geometry probed");
        ImageAsset::new(asset.clone(), width, height)
    }
}
