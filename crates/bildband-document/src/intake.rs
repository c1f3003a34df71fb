// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Upload intake — filtering, size limits, and temporary staging.
//
// Each request gets its own `StagingArea`. The directory lives exactly as long
// as the value: it is removed on drop, so every exit path cleans up.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use bildband_core::error::{BildbandError, Result};
use bildband_core::{AssetRef, ConvertConfig, is_allowed_image};
use tempfile::TempDir;
use tracing::{debug, info, instrument, warn};

/// One uploaded file as received from the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub display_name: String,
    pub bytes: Vec<u8>,
    /// Modification time of the original file, carried onto the staged copy
    /// so the metadata fallback sees the source's date and not the staging
    /// time.
    pub modified: Option<SystemTime>,
}

impl Upload {
    pub fn new(display_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            display_name: display_name.into(),
            bytes,
            modified: None,
        }
    }

    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = Some(modified);
        self
    }
}

/// Limits enforced before anything touches disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeLimits {
    pub max_total_bytes: u64,
}

impl From<&ConvertConfig> for IntakeLimits {
    fn from(config: &ConvertConfig) -> Self {
        Self {
            max_total_bytes: config.max_upload_bytes,
        }
    }
}

/// Private temporary directory holding one request's input files.
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
}

impl StagingArea {
    /// Create a staging directory under the system temp directory.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("bildband-").tempdir()?;
        debug!(path = %dir.path().display(), "Staging area created");
        Ok(Self { dir })
    }

    /// Create a staging directory under `root`.
    pub fn new_in(root: impl AsRef<Path>) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("bildband-")
            .tempdir_in(root.as_ref())?;
        debug!(path = %dir.path().display(), "Staging area created");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write the uploads into the staging directory and return their refs in
    /// arrival order.
    ///
    /// Files whose names are empty or lack an allowed image extension are
    /// dropped here and never reach the layout core. Duplicate names get a
    /// ` (n)` suffix so every display name stays unique.
    #[instrument(skip_all, fields(uploads = uploads.len()))]
    pub fn stage(&self, uploads: Vec<Upload>, limits: &IntakeLimits) -> Result<Vec<AssetRef>> {
        if uploads.iter().all(|u| u.display_name.trim().is_empty()) {
            return Err(BildbandError::NoValidImages);
        }

        let total: u64 = uploads.iter().map(|u| u.bytes.len() as u64).sum();
        if total > limits.max_total_bytes {
            return Err(BildbandError::UploadTooLarge {
                limit: limits.max_total_bytes,
                actual: total,
            });
        }

        let mut taken = HashSet::new();
        let mut assets = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let Some(base) = base_name(&upload.display_name) else {
                debug!(name = %upload.display_name, "Dropping upload without a file name");
                continue;
            };
            if !is_allowed_image(&base) {
                debug!(name = %base, "Dropping upload with unsupported extension");
                continue;
            }

            let name = unique_name(&base, &mut taken);
            let path = self.dir.path().join(&name);
            std::fs::write(&path, &upload.bytes)?;
            if let Some(modified) = upload.modified {
                File::options().write(true).open(&path)?.set_modified(modified)?;
            }
            assets.push(AssetRef::new(name, path));
        }

        if assets.is_empty() {
            return Err(BildbandError::NoValidImages);
        }

        info!(staged = assets.len(), total_bytes = total, "Uploads staged");
        Ok(assets)
    }
}

/// Last path component of an upload name; browsers and some clients send
/// full paths.
fn base_name(display_name: &str) -> Option<String> {
    let normalised = display_name.replace('\\', "/");
    let base = normalised.rsplit('/').next()?.trim();
    if base.is_empty() || base == "." || base == ".." {
        None
    } else {
        Some(base.to_string())
    }
}

fn unique_name(base: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(base.to_string()) {
        return base.to_string();
    }
    let path = Path::new(base);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(base);
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or_default();
    let mut n = 2;
    loop {
        let candidate = format!("{stem} ({n}).{ext}");
        if taken.insert(candidate.clone()) {
            warn!(original = %base, renamed = %candidate, "Duplicate upload name");
            return candidate;
        }
        n += 1;
    }
}

/// Load every allowed image in `dir`, sorted by file name. Files that cannot
/// be read are logged and skipped.
pub fn collect_directory(dir: impl AsRef<Path>) -> Result<Vec<Upload>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir.as_ref())?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_allowed_image)
        })
        .collect();
    paths.sort();

    Ok(paths.iter().filter_map(|p| read_or_skip(p)).collect())
}

/// Load uploads from a mix of files and directories, in the given order.
/// Directories expand to their allowed images; files outside the allow-list
/// or that cannot be read are skipped with a warning.
pub fn collect_paths(paths: &[PathBuf]) -> Result<Vec<Upload>> {
    let mut uploads = Vec::new();
    for path in paths {
        if path.is_dir() {
            uploads.extend(collect_directory(path)?);
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(is_allowed_image)
        {
            uploads.extend(read_or_skip(path));
        } else {
            warn!(path = %path.display(), "Skipping file that is not a supported image");
        }
    }
    Ok(uploads)
}

fn read_or_skip(path: &Path) -> Option<Upload> {
    match read_upload(path) {
        Ok(upload) => Some(upload),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Skipping unreadable file");
            None
        }
    }
}

fn read_upload(path: &Path) -> Result<Upload> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let upload = Upload::new(name, bytes);
    Ok(match std::fs::metadata(path).and_then(|meta| meta.modified()) {
        Ok(modified) => upload.with_modified(modified),
        Err(_) => upload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bildband_core::{LayoutMode, SortBy};
    use bildband_layout::{FileProbe, plan_document};
    use image::{Rgb, RgbImage};
    use std::time::Duration;

    const LIMITS: IntakeLimits = IntakeLimits {
        max_total_bytes: 1024,
    };

    #[test]
    fn stages_allowed_files_in_arrival_order() {
        let staging = StagingArea::new().unwrap();
        let uploads = vec![
            Upload::new("b.jpg", b"bbb".to_vec()),
            Upload::new("notes.txt", b"skip me".to_vec()),
            Upload::new("A.PNG", b"aaa".to_vec()),
        ];
        let assets = staging.stage(uploads, &LIMITS).unwrap();

        let names: Vec<_> = assets.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["b.jpg", "A.PNG"]);
        for asset in &assets {
            assert!(asset.path.starts_with(staging.path()));
            assert!(asset.path.exists());
        }
        assert_eq!(std::fs::read(&assets[0].path).unwrap(), b"bbb");
    }

    #[test]
    fn directory_components_are_stripped() {
        let staging = StagingArea::new().unwrap();
        let uploads = vec![
            Upload::new("../../etc/evil.jpg", b"x".to_vec()),
            Upload::new(r"C:\Users\ana\receipt.jpg", b"y".to_vec()),
        ];
        let assets = staging.stage(uploads, &LIMITS).unwrap();
        assert_eq!(assets[0].name, "evil.jpg");
        assert_eq!(assets[1].name, "receipt.jpg");
        assert!(assets.iter().all(|a| a.path.parent() == Some(staging.path())));
    }

    #[test]
    fn duplicate_names_are_made_unique() {
        let staging = StagingArea::new().unwrap();
        let uploads = vec![
            Upload::new("scan.jpg", b"1".to_vec()),
            Upload::new("scan.jpg", b"2".to_vec()),
            Upload::new("scan.jpg", b"3".to_vec()),
        ];
        let assets = staging.stage(uploads, &LIMITS).unwrap();
        let names: Vec<_> = assets.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["scan.jpg", "scan (2).jpg", "scan (3).jpg"]);
        assert_eq!(std::fs::read(&assets[2].path).unwrap(), b"3");
    }

    #[test]
    fn oversized_batch_is_rejected_before_writing() {
        let staging = StagingArea::new().unwrap();
        let uploads = vec![
            Upload::new("a.jpg", vec![0; 600]),
            Upload::new("b.jpg", vec![0; 600]),
        ];
        let err = staging.stage(uploads, &LIMITS).unwrap_err();
        assert!(matches!(err, BildbandError::UploadTooLarge { limit: 1024, actual: 1200 }));
        assert_eq!(std::fs::read_dir(staging.path()).unwrap().count(), 0);
    }

    #[test]
    fn no_usable_files_is_no_valid_images() {
        let staging = StagingArea::new().unwrap();
        let err = staging.stage(Vec::new(), &LIMITS).unwrap_err();
        assert!(matches!(err, BildbandError::NoValidImages));

        let err = staging
            .stage(vec![Upload::new("readme.md", b"#".to_vec())], &LIMITS)
            .unwrap_err();
        assert!(matches!(err, BildbandError::NoValidImages));
    }

    #[test]
    fn staging_directory_is_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let staging = StagingArea::new_in(root.path()).unwrap();
        staging
            .stage(vec![Upload::new("a.jpg", b"a".to_vec())], &LIMITS)
            .unwrap();
        let staged_dir = staging.path().to_path_buf();
        assert!(staged_dir.exists());

        drop(staging);
        assert!(!staged_dir.exists());
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn collects_directory_and_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"b").unwrap();
        std::fs::write(dir.path().join("a.png"), b"a").unwrap();
        std::fs::write(dir.path().join("ignore.txt"), b"t").unwrap();
        let loose = dir.path().join("loose.gif");
        std::fs::write(&loose, b"g").unwrap();

        let from_dir = collect_directory(dir.path()).unwrap();
        let names: Vec<_> = from_dir.iter().map(|u| u.display_name.as_str()).collect();
        assert_eq!(names, ["a.png", "b.jpg", "loose.gif"]);

        let mixed = collect_paths(&[loose.clone(), dir.path().join("ignore.txt")]).unwrap();
        assert_eq!(mixed.len(), 1);
        assert_eq!(mixed[0].display_name, "loose.gif");
        assert_eq!(mixed[0].bytes, b"g");
        assert!(mixed[0].modified.is_some());
    }

    #[test]
    fn unreadable_input_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.jpg");
        std::fs::write(&present, b"p").unwrap();

        let uploads = collect_paths(&[dir.path().join("vanished.jpg"), present]).unwrap();
        let names: Vec<_> = uploads.iter().map(|u| u.display_name.as_str()).collect();
        assert_eq!(names, ["present.jpg"]);
    }

    fn backdate(path: &Path, secs_since_epoch: u64) -> SystemTime {
        let when = SystemTime::UNIX_EPOCH + Duration::from_secs(secs_since_epoch);
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(when)
            .unwrap();
        when
    }

    fn png(path: &Path) {
        RgbImage::from_pixel(6, 4, Rgb([90, 90, 90])).save(path).unwrap();
    }

    #[test]
    fn staged_copies_keep_source_modification_time() {
        let src = tempfile::tempdir().unwrap();
        let a = src.path().join("a.png");
        let b = src.path().join("b.png");
        png(&a);
        png(&b);
        let a_time = backdate(&a, 1_600_000_000); // 2020-09-13
        let b_time = backdate(&b, 1_500_000_000); // 2017-07-14

        let uploads = collect_paths(&[a, b]).unwrap();
        let staging = StagingArea::new().unwrap();
        let assets = staging.stage(uploads, &IntakeLimits { max_total_bytes: 1 << 20 }).unwrap();

        let staged: Vec<SystemTime> = assets
            .iter()
            .map(|a| std::fs::metadata(&a.path).unwrap().modified().unwrap())
            .collect();
        assert_eq!(staged, [a_time, b_time]);

        // Ordering by metadata now follows the original file dates.
        let result = plan_document(
            assets,
            &ConvertConfig::default(),
            LayoutMode::Grid2x2,
            SortBy::Metadata,
            &FileProbe::default(),
        )
        .unwrap();
        let order: Vec<(&str, &str)> = result
            .ordered_placements
            .iter()
            .map(|p| (p.asset.name.as_str(), p.caption.as_ref().unwrap().text.as_str()))
            .collect();
        assert_eq!(order[0].0, "b.png");
        assert!(order[0].1.contains("/2017 "));
        assert_eq!(order[1].0, "a.png");
        assert!(order[1].1.contains("/2020 "));
    }
}
