//! PDF document abstraction layer
//!
//! Wraps PDFium behind a small synchronous API. All coordinates handed out
//! by this module use a top-left origin to match screen space; PDFium's
//! native bottom-left character bounds are converted on the way out.

use image::RgbaImage;
use pdfium_render::prelude::*;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    /// Failed to initialize the PDFium library
    #[error("PDFium initialization error: {0}")]
    Initialization(String),

    /// Failed to load a PDF document
    #[error("PDF load error: {0}")]
    Load(String),

    /// Page index out of range
    #[error("invalid page index: {0}")]
    InvalidPageIndex(u16),

    /// Rasterization or text extraction failure
    #[error("PDF render error: {0}")]
    Render(String),
}

/// Result type for PDF operations
pub type PdfResult<T> = Result<T, PdfError>;

/// Page dimensions in points (1/72 inch)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageDimensions {
    pub width: f32,
    pub height: f32,
}

/// A whitespace-delimited run of text with its bounding box
///
/// Coordinates are in page points, top-left origin.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpanInfo {
    /// The text content
    pub text: String,
    /// Left edge in page coordinates
    pub x: f32,
    /// Top edge in page coordinates
    pub y: f32,
    /// Width in page coordinates
    pub width: f32,
    /// Height in page coordinates
    pub height: f32,
}

/// Character bounding box in top-left page coordinates
#[derive(Debug, Clone, Copy)]
pub(crate) struct CharBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// PDF document handle
///
/// Wraps a PDFium document and provides the operations the viewer needs:
/// page count and metrics, page rasterization, and text extraction.
pub struct PdfDocument {
    /// The loaded PDF document (owns the Pdfium instance internally)
    document: pdfium_render::prelude::PdfDocument<'static>,
}

impl PdfDocument {
    /// Initialize PDFium library (helper function)
    ///
    /// Search order:
    /// 1. Executable's directory (for app bundles)
    /// 2. Current working directory
    /// 3. System library paths
    fn init_pdfium() -> PdfResult<Pdfium> {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()));

        if let Some(ref dir) = exe_dir {
            if let Ok(bindings) =
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            {
                return Ok(Pdfium::new(bindings));
            }
        }

        Ok(Pdfium::new(
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library())
                .map_err(|e| PdfError::Initialization(e.to_string()))?,
        ))
    }

    /// Load a PDF document from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> PdfResult<Self> {
        let pdfium = Box::leak(Box::new(Self::init_pdfium()?));

        let document = pdfium
            .load_pdf_from_file(path.as_ref(), None)
            .map_err(|e| PdfError::Load(e.to_string()))?;

        Ok(Self { document })
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> u16 {
        self.document.pages().len()
    }

    /// Get a page by zero-based index
    fn get_page(&self, index: u16) -> PdfResult<PdfPage<'_>> {
        self.document
            .pages()
            .get(index)
            .map_err(|_| PdfError::InvalidPageIndex(index))
    }

    /// Get a page's dimensions in points
    pub fn page_dimensions(&self, index: u16) -> PdfResult<PageDimensions> {
        let page = self.get_page(index)?;
        Ok(PageDimensions {
            width: page.width().value,
            height: page.height().value,
        })
    }

    /// Render a page to RGBA pixel data at the given pixel size
    pub fn render_page_rgba(&self, page_index: u16, width: u32, height: u32) -> PdfResult<Vec<u8>> {
        if width == 0 || height == 0 {
            return Err(PdfError::Render(format!(
                "zero-area render target: {}x{}",
                width, height
            )));
        }

        let page = self.get_page(page_index)?;

        let config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_target_height(height as i32);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| PdfError::Render(e.to_string()))?;

        Ok(bitmap.as_rgba_bytes().to_vec())
    }

    /// Render a page rotated in clockwise quarter turns
    ///
    /// `width` and `height` are the unrotated target size; the returned
    /// dimensions are swapped for odd quarter turns.
    pub fn render_page_rotated(
        &self,
        page_index: u16,
        width: u32,
        height: u32,
        quarter_turns: u8,
    ) -> PdfResult<(Vec<u8>, u32, u32)> {
        let rgba = self.render_page_rgba(page_index, width, height)?;
        rotate_rgba(rgba, width, height, quarter_turns)
    }

    /// Render a page scaled to fit within max dimensions, preserving aspect
    ///
    /// Returns `(rgba_data, actual_width, actual_height)`. Used for sidebar
    /// thumbnails.
    pub fn render_page_scaled(
        &self,
        page_index: u16,
        max_width: u32,
        max_height: u32,
    ) -> PdfResult<(Vec<u8>, u32, u32)> {
        let dims = self.page_dimensions(page_index)?;

        let scale = (max_width as f32 / dims.width)
            .min(max_height as f32 / dims.height)
            .max(0.1);

        let render_width = (dims.width * scale) as u32;
        let render_height = (dims.height * scale) as u32;

        let rgba = self.render_page_rgba(page_index, render_width, render_height)?;
        Ok((rgba, render_width, render_height))
    }

    /// Extract all text from a page
    ///
    /// Returns an empty string if the page has no selectable text.
    pub fn extract_page_text(&self, page_index: u16) -> PdfResult<String> {
        let page = self.get_page(page_index)?;

        let text = page
            .text()
            .map_err(|e| PdfError::Render(format!("failed to extract text: {}", e)))?
            .all()
            .to_string();

        Ok(text)
    }

    /// Extract text spans with bounding boxes from a page
    ///
    /// Characters are grouped into whitespace-delimited spans with merged
    /// bounds, in reading order. Used for search highlighting.
    pub fn extract_text_spans(&self, page_index: u16) -> PdfResult<Vec<TextSpanInfo>> {
        let page = self.get_page(page_index)?;
        let page_height = page.height().value;

        let text_page = page
            .text()
            .map_err(|e| PdfError::Render(format!("failed to get text page: {}", e)))?;

        let chars = text_page.chars();
        let positioned = chars.iter().filter_map(|char_result| {
            let c = char_result.unicode_char()?;
            let bounds = char_result.loose_bounds().ok()?;

            // PDFium bounds have a bottom-left origin; flip to top-left.
            Some((
                c,
                CharBox {
                    x: bounds.left().value,
                    y: page_height - bounds.top().value,
                    width: bounds.right().value - bounds.left().value,
                    height: bounds.top().value - bounds.bottom().value,
                },
            ))
        });

        Ok(group_chars_into_spans(positioned))
    }
}

/// Rotate an RGBA buffer in clockwise quarter turns
fn rotate_rgba(
    rgba: Vec<u8>,
    width: u32,
    height: u32,
    quarter_turns: u8,
) -> PdfResult<(Vec<u8>, u32, u32)> {
    if quarter_turns % 4 == 0 {
        return Ok((rgba, width, height));
    }

    let image = RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| PdfError::Render("pixel buffer size mismatch".to_string()))?;

    match quarter_turns % 4 {
        1 => Ok((image::imageops::rotate90(&image).into_raw(), height, width)),
        2 => Ok((image::imageops::rotate180(&image).into_raw(), width, height)),
        _ => Ok((image::imageops::rotate270(&image).into_raw(), height, width)),
    }
}

/// Group characters into whitespace-delimited spans with merged bounds
fn group_chars_into_spans(chars: impl IntoIterator<Item = (char, CharBox)>) -> Vec<TextSpanInfo> {
    struct Accumulator {
        text: String,
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
    }

    let mut spans = Vec::new();
    let mut current: Option<Accumulator> = None;

    let flush = |current: &mut Option<Accumulator>, spans: &mut Vec<TextSpanInfo>| {
        if let Some(acc) = current.take() {
            spans.push(TextSpanInfo {
                text: acc.text,
                x: acc.min_x,
                y: acc.min_y,
                width: acc.max_x - acc.min_x,
                height: acc.max_y - acc.min_y,
            });
        }
    };

    for (c, bounds) in chars {
        if c.is_whitespace() {
            flush(&mut current, &mut spans);
            continue;
        }

        match current.as_mut() {
            Some(acc) => {
                acc.text.push(c);
                acc.min_x = acc.min_x.min(bounds.x);
                acc.min_y = acc.min_y.min(bounds.y);
                acc.max_x = acc.max_x.max(bounds.x + bounds.width);
                acc.max_y = acc.max_y.max(bounds.y + bounds.height);
            }
            None => {
                current = Some(Accumulator {
                    text: c.to_string(),
                    min_x: bounds.x,
                    min_y: bounds.y,
                    max_x: bounds.x + bounds.width,
                    max_y: bounds.y + bounds.height,
                });
            }
        }
    }

    flush(&mut current, &mut spans);
    spans
}
