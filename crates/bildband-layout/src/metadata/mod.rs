// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Metadata extraction — best-effort capture time and sender for each image.
//
// Three independent sources each produce a partial record: the file name, the
// embedded EXIF tags, and the file's modification time. The partials are then
// merged field by field, keeping whichever value came from the most
// authoritative source.

pub mod filename;
pub mod tags;

use std::path::Path;

use bildband_core::{AssetRef, ImageMetadata, MetadataSource, SenderSource};
use chrono::{DateTime, Local, NaiveDateTime};
use tracing::{debug, instrument};

pub use filename::timestamp_from_filename;
pub use tags::{EmbeddedTags, read_embedded_tags};

/// One source's contribution, tagged with its authority.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct PartialMetadata {
    timestamp: Option<(NaiveDateTime, MetadataSource)>,
    sender: Option<(String, SenderSource)>,
}

impl PartialMetadata {
    /// Field-wise merge: the higher-authority value wins, ties keep `self`.
    fn merge(self, other: Self) -> Self {
        Self {
            timestamp: pick(self.timestamp, other.timestamp, |t| t.1),
            sender: pick(self.sender, other.sender, |s| s.1),
        }
    }

    fn into_metadata(self) -> ImageMetadata {
        let (timestamp, source) = match self.timestamp {
            Some((ts, source)) => (Some(ts), source),
            None => (None, MetadataSource::None),
        };
        let (sender, sender_source) = match self.sender {
            Some((name, source)) => (Some(name), Some(source)),
            None => (None, None),
        };
        ImageMetadata {
            sender,
            sender_source,
            timestamp,
            source,
        }
    }
}

fn pick<T, K: Ord>(current: Option<T>, candidate: Option<T>, rank: impl Fn(&T) -> K) -> Option<T> {
    match (current, candidate) {
        (Some(a), Some(b)) => {
            if rank(&b) > rank(&a) {
                Some(b)
            } else {
                Some(a)
            }
        }
        (a, b) => a.or(b),
    }
}

/// Derives [`ImageMetadata`] for assets. Extraction never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataExtractor;

impl MetadataExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract metadata for one asset. The file name is taken from the
    /// asset's display name; tags and modification time from its path.
    #[instrument(skip_all, fields(asset = %asset.name))]
    pub fn extract(&self, asset: &AssetRef) -> ImageMetadata {
        let merged = [
            from_filename(&asset.name),
            from_tags(read_embedded_tags(&asset.path)),
            from_modified_time(&asset.path),
        ]
        .into_iter()
        .fold(PartialMetadata::default(), PartialMetadata::merge);

        let metadata = merged.into_metadata();
        debug!(
            timestamp = ?metadata.timestamp,
            source = ?metadata.source,
            sender = ?metadata.sender,
            "Metadata extracted"
        );
        metadata
    }
}

fn from_filename(name: &str) -> PartialMetadata {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name);
    PartialMetadata {
        timestamp: timestamp_from_filename(base).map(|ts| (ts, MetadataSource::FilenamePattern)),
        sender: None,
    }
}

fn from_tags(tags: EmbeddedTags) -> PartialMetadata {
    let sender = [
        tags.artist.map(|s| (s, SenderSource::Artist)),
        tags.windows_author.map(|s| (s, SenderSource::WindowsAuthor)),
        tags.comment.map(|s| (s, SenderSource::Comment)),
    ]
    .into_iter()
    .fold(None, |best, candidate| pick(best, candidate, |s| s.1));

    PartialMetadata {
        timestamp: tags
            .capture_time
            .map(|ts| (ts, MetadataSource::EmbeddedTag)),
        sender,
    }
}

fn from_modified_time(path: &Path) -> PartialMetadata {
    let timestamp = std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .map(|modified| DateTime::<Local>::from(modified).naive_local())
        .map(|ts| (ts, MetadataSource::FileModifiedTime));
    PartialMetadata {
        timestamp,
        sender: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn embedded_capture_time_beats_filename_and_mtime() {
        let merged = [
            PartialMetadata {
                timestamp: Some((ts(2024, 1, 1), MetadataSource::FilenamePattern)),
                sender: None,
            },
            from_tags(EmbeddedTags {
                capture_time: Some(ts(2023, 6, 30)),
                ..Default::default()
            }),
            PartialMetadata {
                timestamp: Some((ts(2025, 2, 2), MetadataSource::FileModifiedTime)),
                sender: None,
            },
        ]
        .into_iter()
        .fold(PartialMetadata::default(), PartialMetadata::merge)
        .into_metadata();

        assert_eq!(merged.timestamp, Some(ts(2023, 6, 30)));
        assert_eq!(merged.source, MetadataSource::EmbeddedTag);
    }

    #[test]
    fn mtime_is_only_a_fallback() {
        let merged = from_modified_time_stub(ts(2025, 2, 2))
            .merge(PartialMetadata::default())
            .into_metadata();
        assert_eq!(merged.source, MetadataSource::FileModifiedTime);

        let merged = from_modified_time_stub(ts(2025, 2, 2))
            .merge(from_filename("IMG-20240105-WA0001.jpg"))
            .into_metadata();
        assert_eq!(merged.source, MetadataSource::FilenamePattern);
        assert_eq!(merged.timestamp.unwrap().date(), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    fn from_modified_time_stub(at: NaiveDateTime) -> PartialMetadata {
        PartialMetadata {
            timestamp: Some((at, MetadataSource::FileModifiedTime)),
            sender: None,
        }
    }

    #[test]
    fn sender_prefers_artist_over_author_over_comment() {
        let tags = EmbeddedTags {
            artist: None,
            windows_author: Some("Ana".into()),
            comment: Some("from the shop".into()),
            ..Default::default()
        };
        let meta = from_tags(tags).into_metadata();
        assert_eq!(meta.sender.as_deref(), Some("Ana"));
        assert_eq!(meta.sender_source, Some(SenderSource::WindowsAuthor));

        let tags = EmbeddedTags {
            comment: Some("from the shop".into()),
            ..Default::default()
        };
        let meta = from_tags(tags).into_metadata();
        assert_eq!(meta.sender_source, Some(SenderSource::Comment));

        let tags = EmbeddedTags {
            artist: Some("Marco".into()),
            windows_author: Some("Ana".into()),
            ..Default::default()
        };
        assert_eq!(from_tags(tags).into_metadata().sender.as_deref(), Some("Marco"));
    }

    #[test]
    fn extract_reads_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stored.png");
        image::RgbImage::new(2, 2).save(&path).unwrap();

        // Uploaded under a messenger-style name, stored under another.
        let asset = AssetRef::new("IMG-20240105-WA0001.png", &path);
        let meta = MetadataExtractor::new().extract(&asset);
        assert_eq!(meta.source, MetadataSource::FilenamePattern);
        assert_eq!(meta.sender, None);

        let plain = AssetRef::new("holiday.png", &path);
        let meta = MetadataExtractor::new().extract(&plain);
        assert_eq!(meta.source, MetadataSource::FileModifiedTime);
        assert!(meta.timestamp.is_some());
    }

    #[test]
    fn extract_never_fails_on_missing_file() {
        let asset = AssetRef::new("photo.jpg", "/nonexistent/photo.jpg");
        let meta = MetadataExtractor::new().extract(&asset);
        assert_eq!(meta, ImageMetadata::default());
    }
}
