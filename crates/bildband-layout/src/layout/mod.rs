// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout engine — turns an ordered batch into placement instructions.
//
// The page policy is chosen once per request. Images are probed one at a time
// in order; a failed probe becomes an `AssetError` and the image is skipped,
// so grid positions are counted over successfully placed images only.

pub mod fit;
pub mod grid;
pub mod standard;

use bildband_core::error::{BildbandError, Result};
use bildband_core::{
    AssetError, AssetRef, Caption, ConversionResult, GridCell, ImageAsset, LayoutMode, PaperSize,
    PlacementInstruction,
};
use tracing::{debug, info, instrument, warn};

use crate::probe::GeometryProbe;

pub use fit::{Size, scale_to_fit};
pub use grid::GridLayout;
pub use standard::StandardLayout;

/// One input to the engine, already in output order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedAsset {
    pub asset: AssetRef,
    pub caption: Option<String>,
}

impl OrderedAsset {
    pub fn new(asset: AssetRef) -> Self {
        Self {
            asset,
            caption: None,
        }
    }

    pub fn with_caption(asset: AssetRef, caption: impl Into<String>) -> Self {
        Self {
            asset,
            caption: Some(caption.into()),
        }
    }
}

/// Geometry a page policy decides for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub size: Size,
    pub x_mm: f32,
    pub y_mm: f32,
    pub page_index: usize,
    pub page_break_before: bool,
    pub grid_cell: Option<GridCell>,
    pub caption: Option<Caption>,
}

/// Page policy, one variant per [`LayoutMode`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PagePolicy {
    Standard(StandardLayout),
    Grid(GridLayout),
}

impl PagePolicy {
    pub fn for_mode(mode: LayoutMode, page: Size) -> Self {
        match mode {
            LayoutMode::Standard => Self::Standard(StandardLayout::new(page)),
            LayoutMode::Grid2x2 => Self::Grid(GridLayout::new(page)),
        }
    }

    pub fn mode(&self) -> LayoutMode {
        match self {
            Self::Standard(_) => LayoutMode::Standard,
            Self::Grid(_) => LayoutMode::Grid2x2,
        }
    }

    /// Reject paper on which this policy would produce empty or negative boxes.
    pub fn check(&self) -> Result<()> {
        match self {
            Self::Standard(layout) => layout.check(),
            Self::Grid(layout) => layout.check(),
        }
    }

    fn place(&self, index: usize, image: &ImageAsset, caption: Option<String>) -> Slot {
        match self {
            Self::Standard(layout) => layout.place(index, image, caption),
            Self::Grid(layout) => layout.place(index, image, caption),
        }
    }
}

/// Computes placements for a whole batch on one paper size.
#[derive(Debug, Clone, Copy)]
pub struct LayoutEngine {
    page: Size,
    policy: PagePolicy,
}

impl LayoutEngine {
    pub fn new(paper: PaperSize, mode: LayoutMode) -> Self {
        let (w, h) = paper.dimensions_mm();
        let page = Size::new(w as f32, h as f32);
        Self {
            page,
            policy: PagePolicy::for_mode(mode, page),
        }
    }

    pub fn mode(&self) -> LayoutMode {
        self.policy.mode()
    }

    /// Page size in millimetres.
    pub fn page_size(&self) -> Size {
        self.page
    }

    /// Lay out `ordered`, probing each asset through `probe`.
    ///
    /// Emission order equals input order. Fails when the paper is too small
    /// for the mode (`InvalidOption`), when the batch is empty
    /// (`NoValidImages`), or when no image could be placed
    /// (`NothingProcessed`); every other failure is recorded per image.
    #[instrument(skip_all, fields(mode = ?self.mode(), count = ordered.len()))]
    pub fn layout<P>(&self, ordered: &[OrderedAsset], probe: &P) -> Result<ConversionResult>
    where
        P: GeometryProbe + ?Sized,
    {
        self.policy.check()?;
        if ordered.is_empty() {
            return Err(BildbandError::NoValidImages);
        }

        let result = ordered
            .iter()
            .fold(ConversionResult::default(), |mut acc, item| {
                match probe.probe(&item.asset) {
                    Ok(image) => {
                        let slot = self.policy.place(acc.processed_count, &image, item.caption.clone());
                        debug!(
                            asset = %item.asset.name,
                            width_mm = slot.size.width,
                            height_mm = slot.size.height,
                            page = slot.page_index,
                            "Image placed"
                        );
                        acc.ordered_placements.push(PlacementInstruction {
                            asset: image.asset,
                            target_width: slot.size.width,
                            target_height: slot.size.height,
                            x_mm: slot.x_mm,
                            y_mm: slot.y_mm,
                            page_index: slot.page_index,
                            page_break_before: slot.page_break_before,
                            grid_cell: slot.grid_cell,
                            caption: slot.caption,
                        });
                        acc.processed_count += 1;
                    }
                    Err(err) => {
                        warn!(asset = %item.asset.name, error = %err, "Skipping image");
                        acc.errors.push(AssetError::new(&item.asset.name, err.to_string()));
                    }
                }
                acc
            });

        if result.processed_count == 0 {
            return Err(BildbandError::NothingProcessed {
                errors: result.errors,
            });
        }

        info!(
            processed = result.processed_count,
            failed = result.errors.len(),
            pages = result.page_count(),
            "Layout complete"
        );
        Ok(result)
    }
}
