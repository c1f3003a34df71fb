// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Receipts layout: a 2x2 grid per page, edge to edge with no margins.

use bildband_core::error::{BildbandError, Result};
use bildband_core::{Caption, GridCell, ImageAsset};

use super::Slot;
use super::fit::{Size, scale_to_fit};

/// Images per page.
pub const CELLS_PER_PAGE: usize = 4;

/// Columns per row.
pub const COLUMNS: usize = 2;

/// Height taken from the bottom of a cell for its caption.
pub const CAPTION_ALLOWANCE_MM: f32 = 8.0;

/// Baseline offset of the caption inside its strip.
const CAPTION_BASELINE_MM: f32 = 5.5;

/// Four cells per page, each half the page wide and half the page high.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    page: Size,
}

impl GridLayout {
    pub fn new(page: Size) -> Self {
        Self { page }
    }

    pub fn cell(&self) -> Size {
        Size::new(self.page.width / 2.0, self.page.height / 2.0)
    }

    /// Every cell must stay taller than the caption strip.
    pub fn check(&self) -> Result<()> {
        let cell = self.cell();
        if cell.width > 0.0 && cell.height > CAPTION_ALLOWANCE_MM {
            Ok(())
        } else {
            Err(BildbandError::InvalidOption(format!(
                "paper {}x{}mm is too small for a 2x2 grid with {CAPTION_ALLOWANCE_MM}mm captions",
                self.page.width, self.page.height
            )))
        }
    }

    /// Grid position of the image at `index` in the processed sequence.
    pub fn cell_for(index: usize) -> GridCell {
        let within_page = index % CELLS_PER_PAGE;
        GridCell {
            row: (within_page / COLUMNS) as u32,
            col: (within_page % COLUMNS) as u32,
        }
    }

    /// Place the image at position `index` of the processed sequence.
    ///
    /// A captioned image is fitted into the cell minus the caption strip; the
    /// caption sits in that strip under the image.
    pub fn place(&self, index: usize, image: &ImageAsset, caption: Option<String>) -> Slot {
        let cell = self.cell();
        let grid_cell = Self::cell_for(index);
        let image_box = match caption {
            Some(_) => Size::new(cell.width, cell.height - CAPTION_ALLOWANCE_MM),
            None => cell,
        };
        let fitted = scale_to_fit(image_box, image.aspect_ratio());

        let cell_x = grid_cell.col as f32 * cell.width;
        let cell_y = grid_cell.row as f32 * cell.height;
        let x_mm = cell_x + (image_box.width - fitted.width) / 2.0;
        let y_mm = cell_y + (image_box.height - fitted.height) / 2.0;

        Slot {
            size: fitted,
            x_mm,
            y_mm,
            page_index: index / CELLS_PER_PAGE,
            page_break_before: index > 0 && index % CELLS_PER_PAGE == 0,
            grid_cell: Some(grid_cell),
            caption: caption.map(|text| Caption {
                text,
                x_mm: cell_x + 2.0,
                y_mm: cell_y + image_box.height + CAPTION_BASELINE_MM,
            }),
        }
    }
}
