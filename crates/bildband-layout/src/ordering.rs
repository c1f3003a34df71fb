// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ordering strategy — a stable permutation of the batch by name or capture time.

use bildband_core::{AssetRef, ImageMetadata, SortBy};
use serde::Serialize;
use tracing::{debug, instrument};

/// An asset paired with the metadata extracted for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub asset: AssetRef,
    pub metadata: ImageMetadata,
}

/// Order the batch. Both strategies are stable sorts: entries with equal keys
/// keep their arrival order, and nothing is ever dropped.
///
/// `Name` compares the raw display names byte-wise (no case folding).
/// `Metadata` compares timestamps, with missing ones sorting as the epoch.
#[instrument(skip(entries), fields(count = entries.len()))]
pub fn order(mut entries: Vec<CatalogEntry>, sort_by: SortBy) -> Vec<CatalogEntry> {
    match sort_by {
        SortBy::Name => entries.sort_by(|a, b| a.asset.name.cmp(&b.asset.name)),
        SortBy::Metadata => entries.sort_by_key(|e| e.metadata.sort_key()),
    }
    debug!(
        first = entries.first().map(|e| e.asset.name.as_str()),
        "Batch ordered"
    );
    entries
}
