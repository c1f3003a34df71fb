// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF assembler — turn planned placements into a document using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`. Placements arrive in top-left millimetres; PDF user
// space is bottom-left points, so every position is flipped here.

use std::collections::HashMap;
use std::path::Path;

use bildband_core::error::{BildbandError, Result};
use bildband_core::{AssetError, Caption, ConversionResult, PaperSize, PlacementInstruction};
use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, RawImage,
    RawImageData, RawImageFormat, TextItem, XObjectTransform,
};
use tracing::{debug, info, instrument, warn};

/// At 72 DPI one pixel is one point, which keeps the scale factors simple.
const IMAGE_DPI: f32 = 72.0;

const CAPTION_FONT_SIZE_PT: f32 = 9.0;

/// Decoded pixels keyed by asset name.
pub type DecodedImages = HashMap<String, RawImage>;

/// Builds the output PDF from a [`ConversionResult`].
///
/// The assembler never re-derives geometry: sizes, positions, pages, and
/// captions come from the placements as-is.
pub struct PdfAssembler {
    /// Paper size for page creation.
    paper_size: PaperSize,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl PdfAssembler {
    pub fn new(paper_size: PaperSize) -> Self {
        Self {
            paper_size,
            title: None,
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Paper dimensions in printpdf's Mm units.
    fn page_dimensions(&self) -> (Mm, Mm) {
        let (w_mm, h_mm) = self.paper_size.dimensions_mm();
        (Mm(w_mm as f32), Mm(h_mm as f32))
    }

    /// Decode every placed image. Images that fail are returned as
    /// [`AssetError`]s instead of failing the whole document.
    #[instrument(skip_all, fields(placements = result.ordered_placements.len()))]
    pub fn decode_images(&self, result: &ConversionResult) -> (DecodedImages, Vec<AssetError>) {
        let mut images = DecodedImages::new();
        let mut failed = Vec::new();
        for placement in &result.ordered_placements {
            let name = &placement.asset.name;
            match load_raw_image(&placement.asset.path, name) {
                Ok(raw) => {
                    images.insert(name.clone(), raw);
                }
                Err(err) => {
                    warn!(asset = %name, error = %err, "Image cannot be embedded");
                    failed.push(AssetError::new(name, err.to_string()));
                }
            }
        }
        (images, failed)
    }

    /// Assemble every placement into one PDF and return its bytes. Any image
    /// that cannot be decoded fails the assembly.
    pub fn assemble(&self, result: &ConversionResult) -> Result<Vec<u8>> {
        let mut images = DecodedImages::new();
        for placement in &result.ordered_placements {
            let raw = load_raw_image(&placement.asset.path, &placement.asset.name)?;
            images.insert(placement.asset.name.clone(), raw);
        }
        self.assemble_decoded(result, images)
    }

    /// Assemble using images already produced by [`decode_images`](Self::decode_images).
    #[instrument(skip_all, fields(placements = result.ordered_placements.len()))]
    pub fn assemble_decoded(&self, result: &ConversionResult, mut images: DecodedImages) -> Result<Vec<u8>> {
        if result.ordered_placements.is_empty() {
            return Err(BildbandError::PdfError("nothing to assemble".into()));
        }

        let (page_w, page_h) = self.page_dimensions();
        let page_h_pt = page_h.into_pt().0;
        let title = self.title.as_deref().unwrap_or("Bildband Document");
        info!(paper = ?self.paper_size, title, "Assembling PDF");

        let mut doc = PdfDocument::new(title);
        let mut page_ops: Vec<Vec<Op>> = (0..result.page_count()).map(|_| Vec::new()).collect();

        for placement in &result.ordered_placements {
            let raw = images.remove(&placement.asset.name).ok_or_else(|| {
                BildbandError::PdfError(format!("no decoded image for {}", placement.asset.name))
            })?;
            let (px_w, px_h) = (raw.width as f32, raw.height as f32);
            let xobject_id = doc.add_image(&raw);

            let ops = page_ops.get_mut(placement.page_index).ok_or_else(|| {
                BildbandError::PdfError(format!(
                    "placement for {} targets page {} of {}",
                    placement.asset.name,
                    placement.page_index + 1,
                    result.page_count()
                ))
            })?;

            if let Some(caption) = &placement.caption {
                push_caption(ops, caption, page_h_pt);
            }
            ops.push(Op::UseXobject {
                id: xobject_id,
                transform: image_transform(placement, px_w, px_h, page_h_pt),
            });

            debug!(
                asset = %placement.asset.name,
                page = placement.page_index,
                "Image added to page"
            );
        }

        let pages: Vec<PdfPage> = page_ops
            .into_iter()
            .map(|ops| PdfPage::new(page_w, page_h, ops))
            .collect();
        let page_count = pages.len();
        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        info!(pages = page_count, bytes = output.len(), "PDF assembled");

        Ok(output)
    }
}

/// Decode the image at `path` into RGB8 pixels for embedding.
fn load_raw_image(path: &Path, name: &str) -> Result<RawImage> {
    let dynamic_image = ::image::open(path).map_err(|err| {
        BildbandError::ImageError(format!("failed to decode {name} for PDF: {err}"))
    })?;

    let width = dynamic_image.width() as usize;
    let height = dynamic_image.height() as usize;
    let rgb_image = dynamic_image.to_rgb8();

    Ok(RawImage {
        pixels: RawImageData::U8(rgb_image.into_raw()),
        width,
        height,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    })
}

/// Scale the image's natural size to the target box and move its bottom-left
/// corner into place.
fn image_transform(p: &PlacementInstruction, px_w: f32, px_h: f32, page_h_pt: f32) -> XObjectTransform {
    let target_w_pt = Mm(p.target_width).into_pt().0;
    let target_h_pt = Mm(p.target_height).into_pt().0;
    let x_pt = Mm(p.x_mm).into_pt().0;
    let bottom_pt = page_h_pt - Mm(p.y_mm + p.target_height).into_pt().0;

    XObjectTransform {
        translate_x: Some(Pt(x_pt)),
        translate_y: Some(Pt(bottom_pt)),
        scale_x: Some(target_w_pt / px_w),
        scale_y: Some(target_h_pt / px_h),
        dpi: Some(IMAGE_DPI),
        rotate: None,
    }
}

fn push_caption(ops: &mut Vec<Op>, caption: &Caption, page_h_pt: f32) {
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point {
            x: Pt(Mm(caption.x_mm).into_pt().0),
            y: Pt(page_h_pt - Mm(caption.y_mm).into_pt().0),
        },
    });
    ops.push(Op::SetFontSizeBuiltinFont {
        size: Pt(CAPTION_FONT_SIZE_PT),
        font: BuiltinFont::Helvetica,
    });
    ops.push(Op::WriteTextBuiltinFont {
        items: vec![TextItem::Text(caption.text.clone())],
        font: BuiltinFont::Helvetica,
    });
    ops.push(Op::EndTextSection);
}
