//! Vellum - a desktop PDF viewer
//!
//! eframe shell over the pdfium-backed render crate: toolbar, thumbnail
//! sidebar, page viewport with search highlighting, and a native file
//! dialog. All view-state rules live in `vellum-core`; this binary is the
//! event-handling glue.

mod recent_files;

use eframe::egui;
use recent_files::RecentFiles;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use vellum_core::{
    Debouncer, PageRect, PageSize, SearchState, TextLayer, TextSpan, Viewport, ViewerState,
};
use vellum_render::PdfDocument;

/// Resize debounce delay before the page cache is rebuilt
const RESIZE_DEBOUNCE: Duration = Duration::from_millis(200);

/// Thumbnail raster budget
const THUMB_MAX_WIDTH: u32 = 100;
const THUMB_MAX_HEIGHT: u32 = 140;

fn main() -> eframe::Result {
    if let Err(e) = simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    ) {
        eprintln!("failed to initialize logger: {}", e);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Vellum"),
        ..Default::default()
    };

    eframe::run_native(
        "Vellum",
        options,
        Box::new(|cc| Ok(Box::new(ViewerApp::new(cc)))),
    )
}

/// Cache key for the rendered page texture
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct PageTextureKey {
    page: usize,
    zoom_percent: u32,
    rotation_degrees: u16,
}

/// Rendered page texture
struct PageTexture {
    handle: egui::TextureHandle,
}

/// Thumbnail texture for a sidebar page
struct ThumbnailTexture {
    handle: egui::TextureHandle,
}

struct ViewerApp {
    // Document state
    document: Option<PdfDocument>,
    file_path: Option<PathBuf>,
    state: ViewerState,

    // Current page text, indexed for search
    text_layer: Option<TextLayer>,
    search: SearchState,
    search_query: String,
    search_visible: bool,
    // One-shot: armed when the search bar opens, cleared once the
    // input field has been given focus
    search_focus_pending: bool,

    // A picked file waits one frame behind the spinner before the
    // blocking pdfium load runs
    pending_load: Option<(PathBuf, bool)>,

    // Texture caches
    page_textures: HashMap<PageTextureKey, PageTexture>,
    thumbnails: HashMap<usize, ThumbnailTexture>,

    // Resize handling
    resize_debounce: Debouncer,
    last_viewport_size: egui::Vec2,

    recent_files: RecentFiles,
}

impl Default for ViewerApp {
    fn default() -> Self {
        let mut recent_files = RecentFiles::new();
        if let Err(e) = recent_files.load() {
            log::warn!("could not load recent files: {}", e);
        }

        Self {
            document: None,
            file_path: None,
            state: ViewerState::default(),
            text_layer: None,
            search: SearchState::default(),
            search_query: String::new(),
            search_visible: false,
            search_focus_pending: false,
            pending_load: None,
            page_textures: HashMap::new(),
            thumbnails: HashMap::new(),
            resize_debounce: Debouncer::new(RESIZE_DEBOUNCE),
            last_viewport_size: egui::Vec2::ZERO,
            recent_files,
        }
    }
}

impl ViewerApp {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self::default()
    }

    /// Open a PDF file using the native file picker
    fn open_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("PDF", &["pdf"])
            .pick_file()
        {
            self.request_load(path);
        }
    }

    fn request_load(&mut self, path: PathBuf) {
        self.pending_load = Some((path, false));
    }

    /// Run a requested load, leaving one frame for the spinner to paint
    fn process_pending_load(&mut self, ctx: &egui::Context) {
        let Some((path, spinner_shown)) = self.pending_load.take() else {
            return;
        };

        if !spinner_shown {
            self.pending_load = Some((path, true));
            ctx.request_repaint();
            return;
        }

        self.load_document(path);

        if let Some(name) = self
            .file_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
        {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(format!("{} — Vellum", name)));
        }
    }

    /// Load a PDF from path
    ///
    /// On failure the previous document and view state stay untouched.
    fn load_document(&mut self, path: PathBuf) {
        let document = match PdfDocument::open(&path) {
            Ok(document) => document,
            Err(e) => {
                log::error!("failed to open {}: {}", path.display(), e);
                return;
            }
        };

        self.state.open_document(document.page_count() as usize);
        self.document = Some(document);
        self.file_path = Some(path.clone());
        self.page_textures.clear();
        self.thumbnails.clear();

        self.recent_files.add(&path);
        if let Err(e) = self.recent_files.save() {
            log::warn!("could not save recent files: {}", e);
        }

        self.after_page_change();
        log::info!(
            "opened {} ({} pages)",
            path.display(),
            self.state.page_count
        );
    }

    /// Refresh everything derived from the current page
    fn after_page_change(&mut self) {
        self.refresh_page_metrics();
        self.refresh_text_layer();
        self.rerun_search();
    }

    fn refresh_page_metrics(&mut self) {
        let Some(document) = &self.document else {
            return;
        };

        match document.page_dimensions(self.state.page_index as u16) {
            Ok(dims) => self
                .state
                .update_page_size(PageSize { width: dims.width, height: dims.height }),
            Err(e) => log::warn!("failed to read page size: {}", e),
        }
    }

    fn refresh_text_layer(&mut self) {
        let Some(document) = &self.document else {
            self.text_layer = None;
            return;
        };

        match document.extract_text_spans(self.state.page_index as u16) {
            Ok(spans) => {
                let spans = spans
                    .into_iter()
                    .map(|s| TextSpan {
                        text: s.text,
                        rect: PageRect::new(s.x, s.y, s.width, s.height),
                    })
                    .collect();
                self.text_layer = Some(TextLayer::from_spans(spans));
            }
            Err(e) => {
                log::error!("text extraction failed: {}", e);
                self.text_layer = None;
            }
        }
    }

    /// Re-run the active query against the current page
    fn rerun_search(&mut self) {
        if !self.search_visible || self.search_query.is_empty() {
            self.search.clear();
            return;
        }

        let Some(layer) = &self.text_layer else {
            self.search.clear();
            return;
        };

        if let Err(e) = self.search.run(layer, &self.search_query) {
            log::warn!("search failed: {}", e);
        }
    }

    /// Show the search bar and arm a focus request for its input field
    fn open_search(&mut self) {
        self.search_visible = true;
        self.search_focus_pending = true;
    }

    /// Consume the pending focus request, if any
    fn take_search_focus(&mut self) -> bool {
        std::mem::take(&mut self.search_focus_pending)
    }

    fn close_search(&mut self) {
        self.search_visible = false;
        self.search_focus_pending = false;
        self.search_query.clear();
        self.search.clear();
    }

    /// Navigate to a specific page
    fn go_to_page(&mut self, page: usize) {
        if self.state.go_to_page(page) {
            self.after_page_change();
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keyboard_shortcuts(ctx);
        self.process_pending_load(ctx);
        self.draw_toolbar(ctx);
        self.draw_search_bar(ctx);
        self.draw_sidebar(ctx);
        self.draw_viewport(ctx);
        self.draw_spinner(ctx);
    }
}

impl ViewerApp {
    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        let modifiers = ctx.input(|i| i.modifiers);
        let cmd_or_ctrl = modifiers.command || modifiers.ctrl;
        let typing = ctx.wants_keyboard_input();

        ctx.input(|i| {
            // Cmd/Ctrl+F: open search
            if cmd_or_ctrl && i.key_pressed(egui::Key::F) {
                self.open_search();
            }

            // Escape: close search
            if i.key_pressed(egui::Key::Escape) && self.search_visible {
                self.close_search();
            }

            // Enter in search: step matches
            if self.search_visible && i.key_pressed(egui::Key::Enter) {
                if modifiers.shift {
                    self.search.prev_match();
                } else {
                    self.search.next_match();
                }
            }

            // Navigation and zoom only while no text field has focus
            if !typing {
                if i.key_pressed(egui::Key::ArrowLeft) && self.state.prev_page() {
                    self.after_page_change();
                }
                if i.key_pressed(egui::Key::ArrowRight) && self.state.next_page() {
                    self.after_page_change();
                }
                if (i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals))
                    && self.state.zoom_in()
                {
                    self.page_textures.clear();
                }
                if i.key_pressed(egui::Key::Minus) && self.state.zoom_out() {
                    self.page_textures.clear();
                }
            }
        });
    }

    fn draw_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.add_space(8.0);

                if ui.button("📂 Open").clicked() {
                    self.open_file();
                }

                self.draw_recent_menu(ui);

                ui.separator();

                if ui
                    .selectable_label(self.state.sidebar_visible, "☰ Pages")
                    .clicked()
                {
                    self.state.sidebar_visible = !self.state.sidebar_visible;
                }

                ui.separator();

                ui.add_enabled_ui(self.document.is_some(), |ui| {
                    if ui
                        .add_enabled(self.state.can_go_prev(), egui::Button::new("◀"))
                        .clicked()
                        && self.state.prev_page()
                    {
                        self.after_page_change();
                    }

                    ui.label(self.state.page_label());

                    if ui
                        .add_enabled(self.state.can_go_next(), egui::Button::new("▶"))
                        .clicked()
                        && self.state.next_page()
                    {
                        self.after_page_change();
                    }

                    ui.separator();

                    if ui
                        .add_enabled(self.state.can_zoom_out(), egui::Button::new("−"))
                        .clicked()
                        && self.state.zoom_out()
                    {
                        self.page_textures.clear();
                    }

                    ui.label(format!("{}%", self.state.zoom_percent()));

                    if ui
                        .add_enabled(self.state.can_zoom_in(), egui::Button::new("+"))
                        .clicked()
                        && self.state.zoom_in()
                    {
                        self.page_textures.clear();
                    }

                    if ui.button("↔ Fit Width").clicked()
                        && self.state.fit_to_width(self.last_viewport_size.x)
                    {
                        self.page_textures.clear();
                    }

                    if ui.button("⛶ Fit Page").clicked()
                        && self
                            .state
                            .fit_to_page(self.last_viewport_size.x, self.last_viewport_size.y)
                    {
                        self.page_textures.clear();
                    }

                    ui.separator();

                    if ui.button("⟲").on_hover_text("Rotate left").clicked() {
                        self.state.rotate_ccw();
                        self.page_textures.clear();
                    }
                    if ui.button("⟳").on_hover_text("Rotate right").clicked() {
                        self.state.rotate_cw();
                        self.page_textures.clear();
                    }

                    ui.separator();

                    if ui
                        .selectable_label(self.search_visible, "🔍 Search")
                        .clicked()
                    {
                        if self.search_visible {
                            self.close_search();
                        } else {
                            self.open_search();
                        }
                    }
                });
            });
        });
    }

    fn draw_recent_menu(&mut self, ui: &mut egui::Ui) {
        let recent: Vec<PathBuf> = self.recent_files.files().to_vec();

        ui.menu_button("Recent", |ui| {
            if recent.is_empty() {
                ui.weak("No recent files");
                return;
            }

            for path in recent {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                if ui.button(name).on_hover_text(path.display().to_string()).clicked() {
                    self.request_load(path);
                    ui.close_menu();
                }
            }

            ui.separator();
            if ui.button("Clear Recent").clicked() {
                self.recent_files.clear();
                if let Err(e) = self.recent_files.save() {
                    log::warn!("could not save recent files: {}", e);
                }
                ui.close_menu();
            }
        });
    }

    fn draw_search_bar(&mut self, ctx: &egui::Context) {
        if !self.search_visible {
            return;
        }

        egui::TopBottomPanel::top("search_bar")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(8.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut self.search_query)
                            .hint_text("Search...")
                            .desired_width(200.0),
                    );

                    // Auto-focus once on open
                    if self.take_search_focus() {
                        response.request_focus();
                    }

                    if response.changed() {
                        self.rerun_search();
                    }

                    ui.separator();

                    if self.search_query.is_empty() {
                        ui.weak("Type to search this page");
                    } else {
                        ui.label(self.search.label());
                    }

                    if ui
                        .add_enabled(self.search.can_prev(), egui::Button::new("▲"))
                        .clicked()
                    {
                        self.search.prev_match();
                    }
                    if ui
                        .add_enabled(self.search.can_next(), egui::Button::new("▼"))
                        .clicked()
                    {
                        self.search.next_match();
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("✕").clicked() {
                            self.close_search();
                        }
                    });
                });
            });
    }

    fn draw_sidebar(&mut self, ctx: &egui::Context) {
        if !self.state.sidebar_visible {
            return;
        }

        egui::SidePanel::left("thumbnails")
            .default_width(130.0)
            .resizable(true)
            .show(ctx, |ui| {
                ui.heading("Pages");
                ui.separator();

                if self.document.is_none() {
                    ui.weak("No document loaded");
                    return;
                }

                egui::ScrollArea::vertical().show(ui, |ui| {
                    for page in 0..self.state.page_count {
                        let is_current = page == self.state.page_index;

                        self.render_thumbnail(ctx, page);

                        let frame = if is_current {
                            egui::Frame::NONE
                                .stroke(egui::Stroke::new(2.0, ui.visuals().selection.bg_fill))
                                .inner_margin(2.0)
                                .corner_radius(4.0)
                        } else {
                            egui::Frame::NONE
                                .stroke(egui::Stroke::new(
                                    1.0,
                                    ui.visuals().widgets.inactive.bg_stroke.color,
                                ))
                                .inner_margin(2.0)
                                .corner_radius(4.0)
                        };

                        let response = frame.show(ui, |ui| {
                            ui.vertical_centered(|ui| {
                                if let Some(thumb) = self.thumbnails.get(&page) {
                                    ui.image(&thumb.handle);
                                } else {
                                    // Placeholder while loading
                                    let (rect, _) = ui.allocate_exact_size(
                                        egui::vec2(THUMB_MAX_WIDTH as f32, THUMB_MAX_HEIGHT as f32),
                                        egui::Sense::hover(),
                                    );
                                    ui.painter().rect_filled(
                                        rect,
                                        4.0,
                                        ui.visuals().widgets.inactive.bg_fill,
                                    );
                                }

                                ui.small(format!("{}", page + 1));
                            });
                        });

                        if response.response.interact(egui::Sense::click()).clicked() {
                            self.go_to_page(page);
                        }

                        ui.add_space(4.0);
                    }
                });
            });
    }

    /// Render a thumbnail for a page and cache it
    fn render_thumbnail(&mut self, ctx: &egui::Context, page: usize) {
        if self.thumbnails.contains_key(&page) {
            return;
        }

        let Some(document) = &self.document else {
            return;
        };

        match document.render_page_scaled(page as u16, THUMB_MAX_WIDTH, THUMB_MAX_HEIGHT) {
            Ok((rgba, width, height)) => {
                let image = egui::ColorImage::from_rgba_unmultiplied(
                    [width as usize, height as usize],
                    &rgba,
                );
                let handle = ctx.load_texture(
                    format!("thumb_{}", page),
                    image,
                    egui::TextureOptions::LINEAR,
                );
                self.thumbnails.insert(page, ThumbnailTexture { handle });
            }
            Err(e) => {
                log::error!("failed to render thumbnail for page {}: {}", page, e);
            }
        }
    }

    /// Make sure the current page texture exists for the active zoom and
    /// rotation; returns the cache key and display size in points
    fn ensure_page_texture(
        &mut self,
        ctx: &egui::Context,
    ) -> Option<(PageTextureKey, f32, f32)> {
        let document = self.document.as_ref()?;
        let page_size = self.state.page_size?;
        let rotated = self.state.rotated_page_size()?;

        let scale = self.state.zoom;
        let display_width = rotated.width * scale;
        let display_height = rotated.height * scale;

        let key = PageTextureKey {
            page: self.state.page_index,
            zoom_percent: self.state.zoom_percent(),
            rotation_degrees: self.state.rotation.degrees(),
        };

        if self.page_textures.contains_key(&key) {
            return Some((key, display_width, display_height));
        }

        let pixels_per_point = ctx.pixels_per_point();
        let render_width = (page_size.width * scale * pixels_per_point) as u32;
        let render_height = (page_size.height * scale * pixels_per_point) as u32;

        match document.render_page_rotated(
            self.state.page_index as u16,
            render_width,
            render_height,
            self.state.rotation.quarter_turns(),
        ) {
            Ok((rgba, width, height)) => {
                let image = egui::ColorImage::from_rgba_unmultiplied(
                    [width as usize, height as usize],
                    &rgba,
                );
                let handle = ctx.load_texture(
                    format!(
                        "page_{}_{}_{}",
                        key.page, key.zoom_percent, key.rotation_degrees
                    ),
                    image,
                    egui::TextureOptions::LINEAR,
                );
                self.page_textures.insert(key, PageTexture { handle });
                Some((key, display_width, display_height))
            }
            Err(e) => {
                log::error!("failed to render page {}: {}", self.state.page_index, e);
                None
            }
        }
    }

    fn draw_viewport(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.document.is_none() {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open a PDF to get started");
                });
                return;
            }

            let viewport_size = ui.available_size();
            if viewport_size != self.last_viewport_size {
                if self.last_viewport_size != egui::Vec2::ZERO {
                    self.resize_debounce.trigger(Instant::now());
                }
                self.last_viewport_size = viewport_size;
            }

            if self.resize_debounce.fire(Instant::now()) {
                // Re-rasterize at the settled size
                self.page_textures.clear();
            }
            if self.resize_debounce.is_armed() {
                ctx.request_repaint_after(Duration::from_millis(50));
            }

            let rendered = self.ensure_page_texture(ctx);

            egui::ScrollArea::both().auto_shrink([false, false]).show(ui, |ui| {
                let Some((key, page_width, page_height)) = rendered else {
                    return;
                };
                let Some(texture) = self.page_textures.get(&key) else {
                    return;
                };

                let size = egui::vec2(page_width, page_height);

                // Center the page in the viewport
                let available = ui.available_size();
                let padding_x = ((available.x - size.x) / 2.0).max(0.0);
                let padding_y = ((available.y - size.y) / 2.0).max(0.0);

                ui.add_space(padding_y);
                ui.horizontal(|ui| {
                    ui.add_space(padding_x);
                    let (rect, _response) = ui.allocate_exact_size(size, egui::Sense::hover());

                    ui.painter().image(
                        texture.handle.id(),
                        rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );

                    self.paint_highlights(ui.painter(), rect);
                });
            });
        });
    }

    /// Paint search highlights over the page image
    fn paint_highlights(&self, painter: &egui::Painter, page_rect: egui::Rect) {
        let Some(layer) = &self.text_layer else {
            return;
        };
        let Some(page_size) = self.state.page_size else {
            return;
        };
        if self.search.is_empty() {
            return;
        }

        let viewport = Viewport::new(page_size, self.state.zoom, self.state.rotation);

        for highlight in layer.highlight_rects(&viewport, &self.search) {
            let rect = egui::Rect::from_min_size(
                page_rect.min + egui::vec2(highlight.rect.x, highlight.rect.y),
                egui::vec2(highlight.rect.width, highlight.rect.height),
            );

            let color = if highlight.selected {
                egui::Color32::from_rgba_unmultiplied(255, 150, 50, 110)
            } else {
                egui::Color32::from_rgba_unmultiplied(255, 235, 60, 80)
            };

            painter.rect_filled(rect, 2.0, color);
        }
    }

    fn draw_spinner(&self, ctx: &egui::Context) {
        if self.pending_load.is_none() {
            return;
        }

        egui::Area::new(egui::Id::new("loading_spinner"))
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.add(egui::Spinner::new().size(32.0));
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_search_arms_focus_once() {
        let mut app = ViewerApp::default();

        app.open_search();
        assert!(app.search_visible);
        assert!(app.take_search_focus());

        // Subsequent frames must not re-request focus
        assert!(!app.take_search_focus());
        assert!(!app.take_search_focus());
    }

    #[test]
    fn test_reopening_search_rearms_focus() {
        let mut app = ViewerApp::default();

        app.open_search();
        assert!(app.take_search_focus());

        app.close_search();
        assert!(!app.search_visible);

        app.open_search();
        assert!(app.take_search_focus());
        assert!(!app.take_search_focus());
    }

    #[test]
    fn test_close_search_clears_pending_focus() {
        let mut app = ViewerApp::default();

        app.open_search();
        app.close_search();

        assert!(!app.take_search_focus());
        assert!(app.search_query.is_empty());
    }
}
