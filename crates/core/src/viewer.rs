//! Viewer state: page navigation, zoom, fit modes, and rotation

/// Minimum zoom scale (25%)
pub const MIN_ZOOM: f32 = 0.25;

/// Maximum zoom scale (300%)
pub const MAX_ZOOM: f32 = 3.0;

/// Zoom step for the +/- controls
pub const ZOOM_STEP: f32 = 0.25;

/// Padding subtracted from the container when computing fit scales
const FIT_PADDING: f32 = 40.0;

/// Page rotation in clockwise 90-degree steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Rotation angle in degrees, always in `[0, 360)`
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Number of clockwise quarter turns (0..=3)
    pub fn quarter_turns(self) -> u8 {
        (self.degrees() / 90) as u8
    }

    /// Rotate 90 degrees clockwise
    pub fn clockwise(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg90,
            Rotation::Deg90 => Rotation::Deg180,
            Rotation::Deg180 => Rotation::Deg270,
            Rotation::Deg270 => Rotation::Deg0,
        }
    }

    /// Rotate 90 degrees counterclockwise
    pub fn counterclockwise(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg270,
            Rotation::Deg90 => Rotation::Deg0,
            Rotation::Deg180 => Rotation::Deg90,
            Rotation::Deg270 => Rotation::Deg180,
        }
    }

    /// Whether this rotation swaps page width and height
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

/// Page size in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// View state for the open document
///
/// All mutations go through methods that maintain the UI invariants: zoom
/// stays within `[MIN_ZOOM, MAX_ZOOM]`, rotation within the four quarter
/// turns, and the page index within the document bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    /// Zero-based index of the current page
    pub page_index: usize,
    /// Total page count; zero when no document is open
    pub page_count: usize,
    /// Current zoom scale (1.0 = 100%)
    pub zoom: f32,
    /// Current page rotation
    pub rotation: Rotation,
    /// Cached size of the current page, in points
    pub page_size: Option<PageSize>,
    /// Whether the thumbnail sidebar is shown
    pub sidebar_visible: bool,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_count: 0,
            zoom: 1.0,
            rotation: Rotation::default(),
            page_size: None,
            sidebar_visible: true,
        }
    }
}

impl ViewerState {
    /// Reset state for a newly opened document
    ///
    /// Page and rotation reset; zoom carries over, matching the previous
    /// session's reading scale.
    pub fn open_document(&mut self, page_count: usize) {
        self.page_count = page_count;
        self.page_index = 0;
        self.rotation = Rotation::default();
        self.page_size = None;
    }

    pub fn has_document(&self) -> bool {
        self.page_count > 0
    }

    /// Record the current page's size for fit and overlay computations
    pub fn update_page_size(&mut self, size: PageSize) {
        self.page_size = Some(size);
    }

    /// Current page size with rotation applied
    pub fn rotated_page_size(&self) -> Option<PageSize> {
        self.page_size.map(|size| {
            if self.rotation.swaps_axes() {
                PageSize { width: size.height, height: size.width }
            } else {
                size
            }
        })
    }

    pub fn can_go_prev(&self) -> bool {
        self.has_document() && self.page_index > 0
    }

    pub fn can_go_next(&self) -> bool {
        self.has_document() && self.page_index + 1 < self.page_count
    }

    /// Move to the previous page; returns whether the page changed
    pub fn prev_page(&mut self) -> bool {
        if !self.can_go_prev() {
            return false;
        }
        self.page_index -= 1;
        true
    }

    /// Move to the next page; returns whether the page changed
    pub fn next_page(&mut self) -> bool {
        if !self.can_go_next() {
            return false;
        }
        self.page_index += 1;
        true
    }

    /// Jump to a specific page; returns whether the page changed
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page >= self.page_count || page == self.page_index {
            return false;
        }
        self.page_index = page;
        true
    }

    pub fn can_zoom_in(&self) -> bool {
        self.zoom < MAX_ZOOM
    }

    pub fn can_zoom_out(&self) -> bool {
        self.zoom > MIN_ZOOM
    }

    /// Increase zoom by one step; returns whether the zoom changed
    pub fn zoom_in(&mut self) -> bool {
        if !self.can_zoom_in() {
            return false;
        }
        self.zoom = (self.zoom + ZOOM_STEP).min(MAX_ZOOM);
        true
    }

    /// Decrease zoom by one step; returns whether the zoom changed
    pub fn zoom_out(&mut self) -> bool {
        if !self.can_zoom_out() {
            return false;
        }
        self.zoom = (self.zoom - ZOOM_STEP).max(MIN_ZOOM);
        true
    }

    /// Set zoom directly, clamped to the valid range
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Scale the rotated page to the container width
    ///
    /// Returns false when no page size is cached yet.
    pub fn fit_to_width(&mut self, container_width: f32) -> bool {
        let Some(size) = self.rotated_page_size() else {
            return false;
        };
        let available = (container_width - FIT_PADDING).max(1.0);
        self.set_zoom(available / size.width);
        true
    }

    /// Scale the rotated page so it fits the container in both dimensions
    pub fn fit_to_page(&mut self, container_width: f32, container_height: f32) -> bool {
        let Some(size) = self.rotated_page_size() else {
            return false;
        };
        let available_width = (container_width - FIT_PADDING).max(1.0);
        let available_height = (container_height - FIT_PADDING).max(1.0);
        let width_scale = available_width / size.width;
        let height_scale = available_height / size.height;
        self.set_zoom(width_scale.min(height_scale));
        true
    }

    pub fn rotate_cw(&mut self) {
        self.rotation = self.rotation.clockwise();
    }

    pub fn rotate_ccw(&mut self) {
        self.rotation = self.rotation.counterclockwise();
    }

    /// Zoom as a rounded percentage for display
    pub fn zoom_percent(&self) -> u32 {
        (self.zoom * 100.0).round() as u32
    }

    /// Page indicator text, e.g. "3 / 10"
    pub fn page_label(&self) -> String {
        if self.has_document() {
            format!("{} / {}", self.page_index + 1, self.page_count)
        } else {
            "— / —".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_pages(page_count: usize) -> ViewerState {
        let mut state = ViewerState::default();
        state.open_document(page_count);
        state.update_page_size(PageSize { width: 600.0, height: 800.0 });
        state
    }

    #[test]
    fn navigation_disables_at_document_boundaries() {
        let mut state = state_with_pages(3);

        assert!(!state.can_go_prev());
        assert!(state.can_go_next());
        assert!(!state.prev_page());

        assert!(state.next_page());
        assert!(state.next_page());
        assert_eq!(state.page_index, 2);

        assert!(!state.can_go_next());
        assert!(!state.next_page());
        assert_eq!(state.page_index, 2);
    }

    #[test]
    fn navigation_noop_without_document() {
        let mut state = ViewerState::default();
        assert!(!state.can_go_prev());
        assert!(!state.can_go_next());
        assert!(!state.next_page());
        assert!(!state.go_to_page(0));
    }

    #[test]
    fn go_to_page_rejects_out_of_range_and_same_page() {
        let mut state = state_with_pages(5);
        assert!(state.go_to_page(4));
        assert!(!state.go_to_page(4));
        assert!(!state.go_to_page(5));
        assert_eq!(state.page_index, 4);
    }

    #[test]
    fn zoom_stays_within_bounds() {
        let mut state = state_with_pages(1);

        for _ in 0..20 {
            state.zoom_in();
        }
        assert_eq!(state.zoom, MAX_ZOOM);
        assert!(!state.can_zoom_in());

        for _ in 0..40 {
            state.zoom_out();
        }
        assert_eq!(state.zoom, MIN_ZOOM);
        assert!(!state.can_zoom_out());

        state.set_zoom(99.0);
        assert_eq!(state.zoom, MAX_ZOOM);
        state.set_zoom(0.0);
        assert_eq!(state.zoom, MIN_ZOOM);
    }

    #[test]
    fn zoom_percent_rounds_for_display() {
        let mut state = state_with_pages(1);
        state.set_zoom(1.0);
        assert_eq!(state.zoom_percent(), 100);
        state.set_zoom(0.333);
        assert_eq!(state.zoom_percent(), 33);
    }

    #[test]
    fn rotation_steps_stay_in_quarter_turns() {
        let mut state = state_with_pages(1);

        state.rotate_cw();
        assert_eq!(state.rotation.degrees(), 90);
        state.rotate_cw();
        state.rotate_cw();
        state.rotate_cw();
        assert_eq!(state.rotation.degrees(), 0);

        state.rotate_ccw();
        assert_eq!(state.rotation.degrees(), 270);

        // Any long sequence remains a quarter turn
        for _ in 0..7 {
            state.rotate_ccw();
        }
        assert!(state.rotation.degrees() % 90 == 0);
        assert!(state.rotation.degrees() < 360);
    }

    #[test]
    fn rotated_size_swaps_axes_at_odd_turns() {
        let mut state = state_with_pages(1);
        let upright = state.rotated_page_size().unwrap();
        assert_eq!(upright.width, 600.0);

        state.rotate_cw();
        let sideways = state.rotated_page_size().unwrap();
        assert_eq!(sideways.width, 800.0);
        assert_eq!(sideways.height, 600.0);
    }

    #[test]
    fn fit_to_width_uses_container_minus_padding() {
        let mut state = state_with_pages(1);
        assert!(state.fit_to_width(640.0));
        // (640 - 40) / 600 = 1.0
        assert_eq!(state.zoom, 1.0);
    }

    #[test]
    fn fit_to_page_picks_smaller_ratio() {
        let mut state = state_with_pages(1);
        assert!(state.fit_to_page(640.0, 440.0));
        // width ratio 1.0, height ratio 0.5 -> 0.5
        assert_eq!(state.zoom, 0.5);
    }

    #[test]
    fn fit_respects_zoom_bounds() {
        let mut state = state_with_pages(1);
        assert!(state.fit_to_width(1_000_000.0));
        assert_eq!(state.zoom, MAX_ZOOM);

        assert!(state.fit_to_page(50.0, 50.0));
        assert_eq!(state.zoom, MIN_ZOOM);
    }

    #[test]
    fn fit_uses_rotated_page_size() {
        let mut state = state_with_pages(1);
        state.rotate_cw();
        assert!(state.fit_to_width(840.0));
        // rotated width is 800: (840 - 40) / 800 = 1.0
        assert_eq!(state.zoom, 1.0);
    }

    #[test]
    fn fit_requires_cached_page_size() {
        let mut state = ViewerState::default();
        state.open_document(2);
        assert!(!state.fit_to_width(800.0));
        assert!(!state.fit_to_page(800.0, 600.0));
    }

    #[test]
    fn open_document_resets_page_and_rotation_but_keeps_zoom() {
        let mut state = state_with_pages(10);
        state.go_to_page(7);
        state.rotate_cw();
        state.set_zoom(2.0);

        state.open_document(4);
        assert_eq!(state.page_index, 0);
        assert_eq!(state.rotation, Rotation::Deg0);
        assert_eq!(state.zoom, 2.0);
        assert!(state.page_size.is_none());
    }

    #[test]
    fn page_label_formats() {
        let mut state = ViewerState::default();
        assert_eq!(state.page_label(), "— / —");
        state.open_document(10);
        state.go_to_page(2);
        assert_eq!(state.page_label(), "3 / 10");
    }
}
