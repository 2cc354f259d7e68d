//! Vellum core library
//!
//! Pure view-state logic for the viewer: page navigation, zoom and fit,
//! rotation, the page-to-pixel viewport transform, per-page text search,
//! and the resize debouncer. No GUI or PDF-library dependencies.

pub mod debounce;
pub mod search;
pub mod text_layer;
pub mod viewer;
pub mod viewport;

pub use debounce::Debouncer;
pub use search::{SearchError, SearchMatch, SearchState};
pub use text_layer::{Highlight, TextLayer, TextSpan};
pub use viewer::{PageSize, Rotation, ViewerState, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
pub use viewport::{PageRect, Viewport};
