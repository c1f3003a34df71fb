// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Bildband image-to-document pipeline.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BildbandError;

/// Unique identifier for a conversion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raster extensions accepted at intake. Anything else is dropped before the
/// layout core sees it.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tiff", "webp"];

/// Whether `name` carries one of the [`ALLOWED_EXTENSIONS`] (case-insensitive).
pub fn is_allowed_image(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

// -- Assets -------------------------------------------------------------------

/// Reference to one input image: the name it was uploaded under and where it
/// lives on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef {
    /// Display name (original upload filename). Unique within a batch.
    pub name: String,
    /// On-disk location of the image bytes.
    pub path: PathBuf,
}

impl AssetRef {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// An input image whose pixel geometry is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub asset: AssetRef,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl ImageAsset {
    /// Build an asset, rejecting degenerate geometry.
    pub fn new(asset: AssetRef, pixel_width: u32, pixel_height: u32) -> Result<Self, BildbandError> {
        if pixel_width == 0 || pixel_height == 0 {
            return Err(BildbandError::InvalidDimensions {
                name: asset.name,
                width: pixel_width,
                height: pixel_height,
            });
        }
        Ok(Self {
            asset,
            pixel_width,
            pixel_height,
        })
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f32 {
        self.pixel_width as f32 / self.pixel_height as f32
    }
}

// -- Metadata -----------------------------------------------------------------

/// Where an image's timestamp came from. Variants are declared in ascending
/// authority, so `Ord` ranks them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetadataSource {
    #[default]
    None,
    FileModifiedTime,
    FilenamePattern,
    EmbeddedTag,
}

/// Which embedded tag supplied the sender. Ascending authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SenderSource {
    /// Free-text comment; low confidence.
    Comment,
    /// Windows `XPAuthor` tag.
    WindowsAuthor,
    /// EXIF `Artist` tag.
    Artist,
}

/// Best-effort provenance of one image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub sender: Option<String>,
    pub sender_source: Option<SenderSource>,
    pub timestamp: Option<NaiveDateTime>,
    pub source: MetadataSource,
}

impl ImageMetadata {
    /// Timestamp used for ordering. Missing timestamps sort as the Unix epoch.
    pub fn sort_key(&self) -> NaiveDateTime {
        self.timestamp
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH.naive_utc())
    }
}

// -- Request options ----------------------------------------------------------

/// How the image set is ordered before layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Name,
    Metadata,
}

impl FromStr for SortBy {
    type Err = BildbandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "metadata" => Ok(Self::Metadata),
            other => Err(BildbandError::InvalidOption(format!(
                "unknown sort order '{other}' (expected 'name' or 'metadata')"
            ))),
        }
    }
}

/// Page layout policy, fixed for the whole request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutMode {
    /// One image per page, 10mm margins.
    #[default]
    #[serde(rename = "standard")]
    Standard,
    /// Four images per page in a 2x2 grid, edge to edge.
    #[serde(rename = "receipts", alias = "grid")]
    Grid2x2,
}

impl FromStr for LayoutMode {
    type Err = BildbandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "receipts" | "grid" => Ok(Self::Grid2x2),
            other => Err(BildbandError::InvalidOption(format!(
                "unknown layout mode '{other}' (expected 'standard' or 'receipts')"
            ))),
        }
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Tabloid => (279, 432),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}

impl FromStr for PaperSize {
    type Err = BildbandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(Self::A4),
            "a3" => Ok(Self::A3),
            "a5" => Ok(Self::A5),
            "letter" => Ok(Self::Letter),
            "legal" => Ok(Self::Legal),
            "tabloid" => Ok(Self::Tabloid),
            other => {
                // Custom sizes as WIDTHxHEIGHT in millimetres, e.g. "100x150".
                let parsed = other.split_once('x').and_then(|(w, h)| {
                    Some((w.trim().parse::<u32>().ok()?, h.trim().parse::<u32>().ok()?))
                });
                match parsed {
                    Some((width_mm, height_mm)) if width_mm > 0 && height_mm > 0 => {
                        Ok(Self::Custom {
                            width_mm,
                            height_mm,
                        })
                    }
                    _ => Err(BildbandError::InvalidOption(format!(
                        "unknown paper size '{other}'"
                    ))),
                }
            }
        }
    }
}

// -- Layout output ------------------------------------------------------------

/// Position of an image in the 2x2 grid of its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub row: u32,
    pub col: u32,
}

/// Caption text and where its baseline starts, in page millimetres from the
/// top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    pub text: String,
    pub x_mm: f32,
    pub y_mm: f32,
}

/// Where and how large one image appears in the output document.
///
/// Coordinates are millimetres measured from the top-left corner of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementInstruction {
    pub asset: AssetRef,
    pub target_width: f32,
    pub target_height: f32,
    pub x_mm: f32,
    pub y_mm: f32,
    /// 0-based page the image lands on.
    pub page_index: usize,
    pub page_break_before: bool,
    pub grid_cell: Option<GridCell>,
    pub caption: Option<Caption>,
}

/// A per-image failure, attributable to one input by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetError {
    pub asset: String,
    pub message: String,
}

impl AssetError {
    pub fn new(asset: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for AssetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.asset, self.message)
    }
}

/// Everything the layout engine hands to the document assembler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub ordered_placements: Vec<PlacementInstruction>,
    pub processed_count: usize,
    pub errors: Vec<AssetError>,
}

impl ConversionResult {
    /// Number of pages the placements span.
    pub fn page_count(&self) -> usize {
        self.ordered_placements
            .last()
            .map(|p| p.page_index + 1)
            .unwrap_or(0)
    }
}
