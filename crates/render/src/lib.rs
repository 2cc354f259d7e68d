//! Vellum render library
//!
//! PDFium-backed document service: loading, page metrics, rasterization
//! with 90-degree rotation, and text extraction with bounding boxes.

pub mod pdf;

pub use pdf::{PageDimensions, PdfDocument, PdfError, PdfResult, TextSpanInfo};
