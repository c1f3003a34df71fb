// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Embedded EXIF tags: capture time, artist, Windows author, and comments.
//
// Every decode step is best effort. A tag that is missing, malformed, or empty
// simply yields `None`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use exif::{Context, Exif, In, Reader, Tag, Value};
use tracing::debug;

/// Windows Explorer author field (UTF-16LE).
const XP_AUTHOR: Tag = Tag(Context::Tiff, 0x9c9d);
/// Windows Explorer comment field (UTF-16LE).
const XP_COMMENT: Tag = Tag(Context::Tiff, 0x9c9c);

/// Raw tag values of interest, before authority is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedTags {
    pub capture_time: Option<NaiveDateTime>,
    pub artist: Option<String>,
    pub windows_author: Option<String>,
    pub comment: Option<String>,
}

/// Read the EXIF block of the file at `path`. Files without EXIF, or that
/// cannot be opened, produce an empty record.
pub fn read_embedded_tags(path: &Path) -> EmbeddedTags {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "cannot open file for tag reading");
            return EmbeddedTags::default();
        }
    };
    let mut reader = BufReader::new(file);
    match Reader::new().read_from_container(&mut reader) {
        Ok(exif) => tags_from_exif(&exif),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "no readable EXIF block");
            EmbeddedTags::default()
        }
    }
}

fn tags_from_exif(exif: &Exif) -> EmbeddedTags {
    let capture_time = exif
        .get_field(Tag::DateTimeOriginal, In::PRIMARY)
        .and_then(|field| match &field.value {
            Value::Ascii(parts) => parts.first().and_then(|raw| capture_time_from_ascii(raw)),
            _ => None,
        });

    let artist = exif
        .get_field(Tag::Artist, In::PRIMARY)
        .and_then(|field| match &field.value {
            Value::Ascii(parts) => parts.first().and_then(|raw| clean_text(&String::from_utf8_lossy(raw))),
            _ => None,
        });

    let windows_author = exif
        .get_field(XP_AUTHOR, In::PRIMARY)
        .and_then(|field| raw_bytes(&field.value))
        .and_then(decode_utf16le);

    let comment = exif
        .get_field(Tag::UserComment, In::PRIMARY)
        .and_then(|field| raw_bytes(&field.value))
        .and_then(decode_user_comment)
        .or_else(|| {
            exif.get_field(XP_COMMENT, In::PRIMARY)
                .and_then(|field| raw_bytes(&field.value))
                .and_then(decode_utf16le)
        });

    EmbeddedTags {
        capture_time,
        artist,
        windows_author,
        comment,
    }
}

/// Byte payload of BYTE/UNDEFINED fields; the XP tags use either.
fn raw_bytes(value: &Value) -> Option<&[u8]> {
    match value {
        Value::Byte(bytes) => Some(bytes),
        Value::Undefined(bytes, _) => Some(bytes),
        _ => None,
    }
}

/// Parse an EXIF `YYYY:MM:DD HH:MM:SS` value.
pub fn capture_time_from_ascii(raw: &[u8]) -> Option<NaiveDateTime> {
    let dt = exif::DateTime::from_ascii(raw).ok()?;
    NaiveDate::from_ymd_opt(i32::from(dt.year), u32::from(dt.month), u32::from(dt.day))?
        .and_hms_opt(u32::from(dt.hour), u32::from(dt.minute), u32::from(dt.second))
}

/// Decode a UTF-16LE byte sequence, dropping trailing NULs.
pub fn decode_utf16le(bytes: &[u8]) -> Option<String> {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let text = String::from_utf16(&units).ok()?;
    clean_text(&text)
}

/// Decode an EXIF `UserComment`: an 8-byte character-code prefix followed by
/// the text.
pub fn decode_user_comment(bytes: &[u8]) -> Option<String> {
    if bytes.len() < 8 {
        return None;
    }
    let (code, body) = bytes.split_at(8);
    match code {
        b"UNICODE\0" => decode_utf16le(body),
        // JIS text needs a Shift-JIS decoder we don't carry.
        b"JIS\0\0\0\0\0" => None,
        _ => clean_text(&String::from_utf8_lossy(body)),
    }
}

fn clean_text(text: &str) -> Option<String> {
    let trimmed = text.trim_end_matches('\0').trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
