// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion service — one request from uploads to finished PDF.
//
// Flow: stage uploads → extract + order + lay out → decode → assemble PDF.
// Images that pass the geometry probe but fail to decode are dropped and the
// rest are laid out again, so grid cells and pages stay dense. The staging
// area is owned by `convert` and dropped before it returns, whether the
// request succeeded or not.

use std::collections::HashSet;
use std::path::PathBuf;

use bildband_core::error::{BildbandError, Result};
use bildband_core::{AssetError, ConversionResult, ConvertConfig, LayoutMode, RequestId, SortBy};
use bildband_layout::{FileProbe, GeometryProbe, LayoutEngine, OrderedAsset, prepare};
use chrono::Local;
use tracing::{info, info_span, warn};

use crate::intake::{IntakeLimits, StagingArea, Upload};
use crate::pdf::assembler::PdfAssembler;

/// What the front end hands over for one conversion.
#[derive(Debug, Clone, Default)]
pub struct ConversionRequest {
    /// Uploads in arrival order.
    pub uploads: Vec<Upload>,
    /// Layout mode; the configured default when `None`.
    pub mode: Option<LayoutMode>,
    /// Ordering; the configured default when `None`.
    pub sort_by: Option<SortBy>,
}

/// The finished document plus the per-image problems encountered.
#[derive(Debug, Clone)]
pub struct ConvertedDocument {
    pub request_id: RequestId,
    /// Suggested download name, e.g. `bildband_20240105_183012.pdf`.
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub processed_count: usize,
    pub page_count: usize,
    pub errors: Vec<AssetError>,
}

/// Runs conversion requests against one configuration.
#[derive(Debug, Clone)]
pub struct ConversionService {
    config: ConvertConfig,
    temp_root: Option<PathBuf>,
}

impl ConversionService {
    pub fn new(config: ConvertConfig) -> Self {
        Self {
            config,
            temp_root: None,
        }
    }

    /// Stage uploads under `root` instead of the system temp directory.
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Convert one request. Batch-fatal conditions (no valid images, nothing
    /// processed, oversize upload) are errors; per-image failures are listed
    /// in the returned document.
    pub fn convert(&self, request: ConversionRequest) -> Result<ConvertedDocument> {
        let request_id = RequestId::new();
        let span = info_span!("convert", %request_id);
        let _enter = span.enter();

        let mode = request.mode.unwrap_or(self.config.layout_mode);
        let sort_by = request.sort_by.unwrap_or(self.config.sort_by);

        let staging = match &self.temp_root {
            Some(root) => StagingArea::new_in(root)?,
            None => StagingArea::new()?,
        };
        let assets = staging.stage(request.uploads, &IntakeLimits::from(&self.config))?;

        let probe = FileProbe::new(self.config.verify_decode);
        let engine = LayoutEngine::new(self.config.paper_size, mode);
        let ordered = prepare(assets, &self.config, sort_by);
        let planned = engine.layout(&ordered, &probe)?;

        let mut assembler = PdfAssembler::new(self.config.paper_size);
        assembler.set_title(format!("Bildband {request_id}"));
        let (images, unreadable) = assembler.decode_images(&planned);
        let result = if unreadable.is_empty() {
            planned
        } else {
            relayout_without(&engine, ordered, planned, unreadable, &probe)?
        };
        let bytes = assembler.assemble_decoded(&result, images)?;
        drop(staging);

        for error in &result.errors {
            warn!(asset = %error.asset, message = %error.message, "Image excluded from document");
        }
        info!(
            processed = result.processed_count,
            failed = result.errors.len(),
            bytes = bytes.len(),
            "Conversion complete"
        );

        Ok(ConvertedDocument {
            request_id,
            file_name: format!("bildband_{}.pdf", Local::now().format("%Y%m%d_%H%M%S")),
            bytes,
            processed_count: result.processed_count,
            page_count: result.page_count(),
            errors: result.errors,
        })
    }
}

/// Lay out again with only the images that were placed and decoded. The
/// probe and decode failures are kept, in that order, ahead of any new ones.
fn relayout_without<P>(
    engine: &LayoutEngine,
    ordered: Vec<OrderedAsset>,
    planned: ConversionResult,
    unreadable: Vec<AssetError>,
    probe: &P,
) -> Result<ConversionResult>
where
    P: GeometryProbe + ?Sized,
{
    let rejected: HashSet<&str> = unreadable.iter().map(|e| e.asset.as_str()).collect();
    let keep: HashSet<&str> = planned
        .ordered_placements
        .iter()
        .map(|p| p.asset.name.as_str())
        .filter(|name| !rejected.contains(name))
        .collect();
    let survivors: Vec<OrderedAsset> = ordered
        .into_iter()
        .filter(|item| keep.contains(item.asset.name.as_str()))
        .collect();

    let mut errors = planned.errors;
    errors.extend(unreadable);
    if survivors.is_empty() {
        return Err(BildbandError::NothingProcessed { errors });
    }

    info!(
        dropped = errors.len(),
        remaining = survivors.len(),
        "Laying out again without undecodable images"
    );
    let mut result = engine.layout(&survivors, probe)?;
    errors.append(&mut result.errors);
    result.errors = errors;
    Ok(result)
}
