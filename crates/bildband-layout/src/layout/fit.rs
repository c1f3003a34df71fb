// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scale-to-fit: the one geometry rule both page layouts share.

/// A width/height pair in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Largest size with the given aspect ratio (width / height) that fits inside
/// `bounds` without cropping. The result always touches at least one edge of
/// the box.
///
/// Fit by width first; if that overflows the height, fit by height instead.
pub fn scale_to_fit(bounds: Size, aspect_ratio: f32) -> Size {
    let by_width = Size::new(bounds.width, bounds.width / aspect_ratio);
    if by_width.height <= bounds.height {
        return by_width;
    }
    // Rounding in `height * ratio` can land one ulp past the box.
    Size::new((bounds.height * aspect_ratio).min(bounds.width), bounds.height)
}
