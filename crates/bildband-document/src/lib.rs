// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bildband-document — everything around the layout core.
//
// Stages uploaded images in a private temporary directory, assembles the
// planned placements into a PDF, and ties both ends to the layout pipeline in
// a single conversion service.

pub mod intake;
pub mod pdf;
pub mod service;

// Re-export the primary structs so callers can use `bildband_document::PdfAssembler` etc.
pub use intake::{IntakeLimits, StagingArea, Upload, collect_directory, collect_paths};
pub use pdf::assembler::{DecodedImages, PdfAssembler};
pub use service::{ConversionRequest, ConversionService, ConvertedDocument};
