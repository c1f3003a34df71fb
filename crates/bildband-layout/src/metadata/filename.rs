// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Timestamps encoded in file names.
//
// Two conventions are recognised, tried in order:
//   1. messenger exports: `IMG-20240105-WA0007.jpg` (date only)
//   2. camera/phone names: `IMG_20240105_183012.jpg`, `20240105-183012.png`

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

static MESSENGER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z])(?:IMG|VID|AUD|PTT|DOC|STK)-(\d{8})-WA\d+")
        .expect("valid messenger name regex")
});

static CAMERA_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\D)(\d{8})[_-](\d{6})(?:\D|$)").expect("valid camera name regex")
});

/// Extract a timestamp from a file name, if it follows a known convention and
/// the digits form a real calendar date.
pub fn timestamp_from_filename(name: &str) -> Option<NaiveDateTime> {
    messenger_date(name).or_else(|| camera_timestamp(name))
}

fn messenger_date(name: &str) -> Option<NaiveDateTime> {
    let caps = MESSENGER_NAME.captures(name)?;
    NaiveDate::parse_from_str(&caps[1], "%Y%m%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
}

fn camera_timestamp(name: &str) -> Option<NaiveDateTime> {
    let caps = CAMERA_NAME.captures(name)?;
    let joined = format!("{}{}", &caps[1], &caps[2]);
    NaiveDateTime::parse_from_str(&joined, "%Y%m%d%H%M%S").ok()
}
