// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion pipeline: extract → order → caption → lay out.

use std::fmt::Write as _;

use bildband_core::error::{BildbandError, Result};
use bildband_core::{
    AssetRef, ConversionResult, ConvertConfig, ImageMetadata, LayoutMode, MetadataSource, SortBy,
};
use chrono::NaiveDateTime;
use tracing::{info, instrument};

use crate::layout::{LayoutEngine, OrderedAsset};
use crate::metadata::MetadataExtractor;
use crate::ordering::{CatalogEntry, order};
use crate::probe::GeometryProbe;

/// Pair every asset with its extracted metadata, keeping arrival order.
pub fn catalog(assets: Vec<AssetRef>) -> Vec<CatalogEntry> {
    let extractor = MetadataExtractor::new();
    assets
        .into_iter()
        .map(|asset| {
            let metadata = extractor.extract(&asset);
            CatalogEntry { asset, metadata }
        })
        .collect()
}

/// Plan the whole document for `assets` (in arrival order).
///
/// Captions carry the formatted timestamp and are only attached when the
/// batch is ordered by metadata and the image has a real timestamp.
#[instrument(skip(assets, config, probe), fields(count = assets.len()))]
pub fn plan_document<P>(
    assets: Vec<AssetRef>,
    config: &ConvertConfig,
    mode: LayoutMode,
    sort_by: SortBy,
    probe: &P,
) -> Result<ConversionResult>
where
    P: GeometryProbe + ?Sized,
{
    if assets.is_empty() {
        return Err(BildbandError::NoValidImages);
    }

    let ordered = prepare(assets, config, sort_by);
    info!(
        paper = ?config.paper_size,
        ?mode,
        ?sort_by,
        captions = ordered.iter().filter(|o| o.caption.is_some()).count(),
        "Planning document"
    );

    LayoutEngine::new(config.paper_size, mode).layout(&ordered, probe)
}

/// Extract metadata, order the batch, and attach captions.
pub fn prepare(assets: Vec<AssetRef>, config: &ConvertConfig, sort_by: SortBy) -> Vec<OrderedAsset> {
    order(catalog(assets), sort_by)
        .into_iter()
        .map(|entry| {
            let caption = match sort_by {
                SortBy::Metadata => caption_for(&entry.metadata, &config.caption_format),
                SortBy::Name => None,
            };
            OrderedAsset {
                asset: entry.asset,
                caption,
            }
        })
        .collect()
}

fn caption_for(metadata: &ImageMetadata, format: &str) -> Option<String> {
    if metadata.source == MetadataSource::None {
        return None;
    }
    metadata.timestamp.and_then(|ts| format_timestamp(ts, format))
}

/// Format with a user-supplied `chrono` pattern; a bad pattern gives `None`
/// instead of panicking.
fn format_timestamp(ts: NaiveDateTime, format: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", ts.format(format)).ok()?;
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::FileProbe;
    use image::{Rgb, RgbImage};
    use std::path::Path;

    fn png(dir: &Path, name: &str, w: u32, h: u32) -> AssetRef {
        let path = dir.join(name);
        RgbImage::from_pixel(w, h, Rgb([10, 120, 200])).save(&path).unwrap();
        AssetRef::new(name, path)
    }

    fn corrupt(dir: &Path, name: &str) -> AssetRef {
        let path = dir.join(name);
        std::fs::write(&path, b"\x89PNG\r\n\x1a\ngarbage").unwrap();
        AssetRef::new(name, path)
    }

    fn names(result: &ConversionResult) -> Vec<&str> {
        result
            .ordered_placements
            .iter()
            .map(|p| p.asset.name.as_str())
            .collect()
    }

    #[test]
    fn three_images_by_name_standard() {
        let dir = tempfile::tempdir().unwrap();
        let assets = vec![
            png(dir.path(), "b.png", 30, 20),
            png(dir.path(), "a.png", 20, 30),
            png(dir.path(), "c.png", 25, 25),
        ];
        let result = plan_document(
            assets,
            &ConvertConfig::default(),
            LayoutMode::Standard,
            SortBy::Name,
            &FileProbe::default(),
        )
        .unwrap();

        assert_eq!(names(&result), ["a.png", "b.png", "c.png"]);
        assert_eq!(
            result.ordered_placements.iter().filter(|p| p.page_break_before).count(),
            2
        );
        assert!(result.ordered_placements.iter().all(|p| p.caption.is_none()));
    }

    #[test]
    fn metadata_order_uses_filename_dates_and_captions() {
        let dir = tempfile::tempdir().unwrap();
        let assets = vec![
            png(dir.path(), "IMG-20240310-WA0002.png", 10, 10),
            png(dir.path(), "IMG-20240102-WA0001.png", 10, 10),
            png(dir.path(), "IMG-20240215-WA0009.png", 10, 10),
        ];
        let result = plan_document(
            assets,
            &ConvertConfig::default(),
            LayoutMode::Grid2x2,
            SortBy::Metadata,
            &FileProbe::default(),
        )
        .unwrap();

        assert_eq!(
            names(&result),
            ["IMG-20240102-WA0001.png", "IMG-20240215-WA0009.png", "IMG-20240310-WA0002.png"]
        );
        let captions: Vec<&str> = result
            .ordered_placements
            .iter()
            .map(|p| p.caption.as_ref().unwrap().text.as_str())
            .collect();
        assert_eq!(captions, ["02/01/2024 00:00", "15/02/2024 00:00", "10/03/2024 00:00"]);
    }

    #[test]
    fn five_receipts_fill_two_pages() {
        let dir = tempfile::tempdir().unwrap();
        let assets: Vec<_> = (1..=5)
            .map(|i| png(dir.path(), &format!("r{i}.png"), 40, 60))
            .collect();
        let result = plan_document(
            assets,
            &ConvertConfig::default(),
            LayoutMode::Grid2x2,
            SortBy::Name,
            &FileProbe::default(),
        )
        .unwrap();

        assert_eq!(result.processed_count, 5);
        assert!(result.errors.is_empty());
        assert_eq!(result.page_count(), 2);
        // Only one image on page 2: its remaining three cells stay empty.
        assert_eq!(
            result.ordered_placements.iter().filter(|p| p.page_index == 1).count(),
            1
        );
    }

    #[test]
    fn corrupt_file_is_reported_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut assets: Vec<_> = (1..=4)
            .map(|i| png(dir.path(), &format!("ok{i}.png"), 8, 8))
            .collect();
        assets.insert(2, corrupt(dir.path(), "broken.png"));

        let result = plan_document(
            assets,
            &ConvertConfig::default(),
            LayoutMode::Standard,
            SortBy::Name,
            &FileProbe::default(),
        )
        .unwrap();

        assert_eq!(result.processed_count, 4);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].asset, "broken.png");
        assert_eq!(result.ordered_placements.len() + result.errors.len(), 5);
    }

    #[test]
    fn all_corrupt_is_batch_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let assets = vec![corrupt(dir.path(), "x.png"), corrupt(dir.path(), "y.jpg")];
        let err = plan_document(
            assets,
            &ConvertConfig::default(),
            LayoutMode::Standard,
            SortBy::Metadata,
            &FileProbe::default(),
        )
        .unwrap_err();
        assert!(err.is_batch_fatal());
        assert!(matches!(err, BildbandError::NothingProcessed { ref errors } if errors.len() == 2));
    }

    #[test]
    fn no_assets_is_batch_fatal() {
        let err = plan_document(
            Vec::new(),
            &ConvertConfig::default(),
            LayoutMode::Standard,
            SortBy::Name,
            &FileProbe::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BildbandError::NoValidImages));
    }

    #[test]
    fn bad_caption_format_drops_caption() {
        let ts = NaiveDateTime::parse_from_str("2024-01-05 18:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(format_timestamp(ts, "%d/%m/%Y %H:%M").as_deref(), Some("05/01/2024 18:30"));
        assert_eq!(format_timestamp(ts, "%Q"), None);
    }
}
