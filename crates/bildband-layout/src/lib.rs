// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bildband-layout — the decision core of the image-to-document pipeline.
//
// Derives provenance metadata for each image (filename conventions, EXIF tags,
// file timestamps), orders the batch by name or capture time, and computes the
// placement of every image on fixed-size pages in either the one-per-page or
// the 2x2 receipts layout. Nothing here renders pixels; the output is a
// `ConversionResult` for a document assembler to consume.

pub mod layout;
pub mod metadata;
pub mod ordering;
pub mod pipeline;
pub mod probe;

pub use layout::{LayoutEngine, OrderedAsset};
pub use metadata::MetadataExtractor;
pub use ordering::{CatalogEntry, order};
pub use pipeline::{catalog, plan_document, prepare};
pub use probe::{FileProbe, GeometryProbe};
