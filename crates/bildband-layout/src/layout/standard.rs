// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Standard layout: one image per page inside fixed 10mm margins.

use bildband_core::error::{BildbandError, Result};
use bildband_core::{Caption, ImageAsset};

use super::Slot;
use super::fit::{Size, scale_to_fit};

/// Margin on every side of the page.
pub const MARGIN_MM: f32 = 10.0;

/// Gap between a caption's baseline and the top of the image below it.
const CAPTION_BASELINE_GAP_MM: f32 = 3.0;

/// One image per page, centred horizontally and aligned to the top margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardLayout {
    page: Size,
}

impl StandardLayout {
    pub fn new(page: Size) -> Self {
        Self { page }
    }

    /// The box every image is fitted into.
    pub fn available(&self) -> Size {
        Size::new(
            self.page.width - 2.0 * MARGIN_MM,
            self.page.height - 2.0 * MARGIN_MM,
        )
    }

    /// Paper must leave a positive box inside the margins.
    pub fn check(&self) -> Result<()> {
        let available = self.available();
        if available.width > 0.0 && available.height > 0.0 {
            Ok(())
        } else {
            Err(BildbandError::InvalidOption(format!(
                "paper {}x{}mm leaves no room inside the {MARGIN_MM}mm margins",
                self.page.width, self.page.height
            )))
        }
    }

    /// Place the image at position `index` of the processed sequence.
    ///
    /// The caption sits in the top margin band, just above the image, so the
    /// image keeps the full available box.
    pub fn place(&self, index: usize, image: &ImageAsset, caption: Option<String>) -> Slot {
        let available = self.available();
        let fitted = scale_to_fit(available, image.aspect_ratio());
        let x_mm = MARGIN_MM + (available.width - fitted.width) / 2.0;
        let y_mm = MARGIN_MM;

        Slot {
            size: fitted,
            x_mm,
            y_mm,
            page_index: index,
            page_break_before: index > 0,
            grid_cell: None,
            caption: caption.map(|text| Caption {
                text,
                x_mm,
                y_mm: y_mm - CAPTION_BASELINE_GAP_MM,
            }),
        }
    }
}
