// Main window for the folio portfolio gallery
// GTK4 ApplicationWindow with the masonry grid, filter bar, and lightbox

use gdk4::Display;
use gtk4::glib;
use gtk4::prelude::*;
use gtk4::{
    Align, Application, ApplicationWindow, Box as GtkBox, Button, CssProvider, Label, Orientation,
    Overlay, Settings, STYLE_PROVIDER_PRIORITY_APPLICATION,
};
use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::{Rc, Weak};
use std::time::Duration;

use super::grid_view::GalleryGridView;
use super::lightbox::Lightbox;
use crate::data::{DemoSource, FetchError, ProjectSource, StoreSource};
use crate::gallery::{FetchDecision, Pager, Selection};
use crate::layout::{column_count_for_width, partition, MasonryLayout};
use crate::models::{filter_projects, Category, CategoryFilter, ContentStore, Project};

const FALLBACK_LAYOUT_WIDTH: f32 = 1200.0;
const RESIZE_DEBOUNCE: Duration = Duration::from_millis(80);

struct FetchRequest {
    page: u32,
    generation: u64,
}

type FetchOutcome = (u64, Result<Vec<Project>, FetchError>);

/// CSS for the light portfolio aesthetic - embedded as fallback
const FALLBACK_CSS: &str = r#"
window {
    background-color: #faf8f5;
    color: #1c1c1c;
}

.page-title {
    font-size: 28px;
    font-weight: bold;
    letter-spacing: 1px;
}

.page-subtitle {
    color: #8a8378;
    font-size: 13px;
}

.filter-bar button {
    background-color: transparent;
    border: none;
    color: #8a8378;
    padding: 4px 10px;
}

.filter-bar button:hover {
    color: #1c1c1c;
}

.filter-bar button.filter-active {
    color: #1c1c1c;
    font-weight: bold;
    border-bottom: 2px solid #1c1c1c;
    border-radius: 0;
}

.project-tile {
    background-color: #eeeae4;
}

.tile-caption {
    background-color: rgba(250, 248, 245, 0.92);
    padding: 8px 12px;
}

.tile-title {
    font-weight: bold;
    font-size: 13px;
}

.tile-category {
    color: #8a8378;
    font-size: 11px;
}

.lightbox-backdrop {
    background-color: rgba(16, 14, 12, 0.88);
}

.lightbox-content {
    background-color: #faf8f5;
    padding: 24px;
    border-radius: 4px;
}

.lightbox-category {
    color: #8a8378;
    font-size: 11px;
}

.lightbox-title {
    font-size: 22px;
    font-weight: bold;
}

.lightbox-description {
    color: #4a463f;
}

.lightbox-detail-name {
    color: #8a8378;
    font-size: 12px;
}

.lightbox-detail-value {
    font-size: 12px;
}

.status-bar {
    color: #8a8378;
    font-size: 11px;
    padding: 4px 8px;
}
"#;

/// Load and apply the stylesheet.
fn load_css() {
    let provider = CssProvider::new();

    // Try to load from file first, fall back to embedded CSS
    let css_path = concat!(env!("CARGO_MANIFEST_DIR"), "/src/style.css");

    if Path::new(css_path).exists() {
        provider.load_from_path(css_path);
        tracing::info!("Loaded CSS from: {}", css_path);
    } else {
        provider.load_from_string(FALLBACK_CSS);
        tracing::info!("Loaded fallback embedded CSS");
    }

    if let Some(display) = Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}

fn choose_source(art_dir: Option<&Path>) -> Box<dyn ProjectSource> {
    match ContentStore::open_default() {
        Ok(store) => match store.count_projects() {
            Ok(count) if count > 0 => {
                tracing::info!("Serving {} projects from the local store", count);
                return Box::new(StoreSource::new(store));
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(error = ?err, "Could not count stored projects"),
        },
        Err(err) => tracing::warn!(error = ?err, "Content store unavailable"),
    }

    match art_dir {
        Some(dir) => Box::new(DemoSource::with_art_dir(dir)),
        None => Box::new(DemoSource::new()),
    }
}

/// Main window for the portfolio gallery
pub struct MainWindow {
    self_weak: RefCell<Weak<MainWindow>>,
    window: ApplicationWindow,
    grid_view: Rc<GalleryGridView>,
    lightbox: Lightbox,
    status_label: Label,
    filter_buttons: RefCell<Vec<(CategoryFilter, Button)>>,
    pager: RefCell<Pager>,
    selection: RefCell<Selection>,
    active_filter: Cell<CategoryFilter>,
    base_projects: RefCell<Vec<Project>>,
    layout: MasonryLayout,
    exhausted: Cell<bool>,
    last_layout_width: Cell<i32>,
    resize_relayout_pending: Cell<bool>,
    fetch_tx: flume::Sender<FetchRequest>,
}

impl MainWindow {
    pub fn new(app: &Application, art_dir: Option<&Path>) -> Rc<Self> {
        // Load CSS before creating widgets
        load_css();
        if let Some(settings) = Settings::default() {
            settings.set_gtk_application_prefer_dark_theme(false);
        }

        let window = ApplicationWindow::builder()
            .application(app)
            .title("folio")
            .default_width(1200)
            .default_height(800)
            .build();

        let root = GtkBox::new(Orientation::Vertical, 0);

        // Page header
        let header = GtkBox::new(Orientation::Vertical, 4);
        header.set_margin_top(24);
        header.set_margin_bottom(16);
        header.set_margin_start(24);
        header.set_margin_end(24);

        let title = Label::new(Some("Selected Work"));
        title.set_halign(Align::Start);
        title.add_css_class("page-title");
        header.append(&title);

        let subtitle = Label::new(Some("A collection of recent projects and explorations"));
        subtitle.set_halign(Align::Start);
        subtitle.add_css_class("page-subtitle");
        header.append(&subtitle);

        root.append(&header);

        // Category filter bar
        let filter_bar = GtkBox::new(Orientation::Horizontal, 8);
        filter_bar.set_margin_start(24);
        filter_bar.set_margin_end(24);
        filter_bar.set_margin_bottom(12);
        filter_bar.add_css_class("filter-bar");

        let mut filter_buttons = Vec::new();
        let mut filters = vec![CategoryFilter::All];
        filters.extend(Category::ALL.iter().map(|c| CategoryFilter::Only(*c)));
        for filter in filters {
            let button = Button::with_label(filter.label());
            filter_bar.append(&button);
            filter_buttons.push((filter, button));
        }
        root.append(&filter_bar);

        // Gallery with the lightbox stacked above it
        let grid_view = Rc::new(GalleryGridView::new());
        let lightbox = Lightbox::new();

        let overlay = Overlay::new();
        overlay.set_vexpand(true);
        overlay.set_child(Some(grid_view.widget()));
        overlay.add_overlay(&lightbox);
        root.append(&overlay);

        // Status bar
        let status_bar = GtkBox::new(Orientation::Horizontal, 0);
        status_bar.add_css_class("status-bar");
        let status_label = Label::new(Some("Loading projects..."));
        status_label.set_halign(Align::Start);
        status_label.set_hexpand(true);
        status_bar.append(&status_label);
        root.append(&status_bar);

        window.set_child(Some(&root));

        // Fetch worker: owns the source, serves one page per request
        let source = choose_source(art_dir);
        let (fetch_tx, fetch_rx) = flume::unbounded::<FetchRequest>();
        let (result_tx, result_rx) = flume::unbounded::<FetchOutcome>();
        std::thread::spawn(move || {
            while let Ok(req) = fetch_rx.recv() {
                let result = source.fetch_page(req.page);
                let _ = result_tx.send((req.generation, result));
            }
        });

        let main_window = Rc::new(Self {
            self_weak: RefCell::new(Weak::new()),
            window,
            grid_view,
            lightbox,
            status_label,
            filter_buttons: RefCell::new(filter_buttons),
            pager: RefCell::new(Pager::new()),
            selection: RefCell::new(Selection::new()),
            active_filter: Cell::new(CategoryFilter::All),
            base_projects: RefCell::new(Vec::new()),
            layout: MasonryLayout::default(),
            exhausted: Cell::new(false),
            last_layout_width: Cell::new(0),
            resize_relayout_pending: Cell::new(false),
            fetch_tx,
        });
        *main_window.self_weak.borrow_mut() = Rc::downgrade(&main_window);

        main_window.setup_filter_buttons();
        main_window.setup_gallery_callbacks();
        main_window.setup_lightbox_callbacks();
        main_window.setup_layout_resize_observer();
        main_window.setup_fetch_pump(result_rx);
        main_window.update_filter_styles();

        main_window.request_more();

        main_window
    }

    fn setup_filter_buttons(self: &Rc<Self>) {
        for (filter, button) in self.filter_buttons.borrow().iter() {
            let weak_self = Rc::downgrade(self);
            let filter = *filter;
            button.connect_clicked(move |_| {
                if let Some(window) = weak_self.upgrade() {
                    window.set_filter(filter);
                }
            });
        }
    }

    fn setup_gallery_callbacks(self: &Rc<Self>) {
        let weak_self = Rc::downgrade(self);
        self.grid_view.connect_tile_activated(move |id| {
            if let Some(window) = weak_self.upgrade() {
                window.open_project(id);
            }
        });

        let weak_self = Rc::downgrade(self);
        self.grid_view.connect_load_more(move || {
            if let Some(window) = weak_self.upgrade() {
                window.request_more();
            }
        });
    }

    fn setup_lightbox_callbacks(self: &Rc<Self>) {
        let grid_view = self.grid_view.clone();
        self.lightbox.connect_scroll_lock(move |locked| {
            grid_view.set_scroll_locked(locked);
        });

        let weak_self = Rc::downgrade(self);
        self.lightbox.connect_close(move || {
            if let Some(window) = weak_self.upgrade() {
                window.selection.borrow_mut().close();
            }
        });
    }

    fn setup_layout_resize_observer(self: &Rc<Self>) {
        let weak_self = Rc::downgrade(self);
        let scrolled = self.grid_view.widget().clone();
        scrolled.add_tick_callback(move |_widget, _clock| {
            if let Some(window) = weak_self.upgrade() {
                let width = window.grid_view.content_width().round() as i32;
                if width <= 0 {
                    return glib::ControlFlow::Continue;
                }
                let last = window.last_layout_width.get();
                if (width - last).abs() >= 1 {
                    window.last_layout_width.set(width);
                    window.schedule_relayout_debounced(RESIZE_DEBOUNCE);
                }
            }
            glib::ControlFlow::Continue
        });
    }

    fn setup_fetch_pump(self: &Rc<Self>, result_rx: flume::Receiver<FetchOutcome>) {
        let weak_self = Rc::downgrade(self);
        glib::timeout_add_local(Duration::from_millis(16), move || {
            let Some(window) = weak_self.upgrade() else {
                return glib::ControlFlow::Break;
            };
            while let Ok((generation, result)) = result_rx.try_recv() {
                window.handle_fetch_result(generation, result);
            }
            glib::ControlFlow::Continue
        });
    }

    /// Ask the pager for the next page and dispatch it to the fetch worker.
    fn request_more(&self) {
        if self.exhausted.get() {
            return;
        }

        let decision = self
            .pager
            .borrow_mut()
            .request(&self.active_filter.get());
        match decision {
            FetchDecision::Fetch { page, generation } => {
                tracing::debug!(page, generation, "Fetching project page");
                if page > 0 {
                    self.set_status("Loading more work...");
                }
                let _ = self.fetch_tx.send(FetchRequest { page, generation });
            }
            FetchDecision::SkipBusy => {
                tracing::debug!("Fetch already in flight, skipping");
            }
            FetchDecision::SkipFiltered => {
                tracing::debug!("Category filter active, pagination suppressed");
            }
        }
    }

    fn handle_fetch_result(&self, generation: u64, result: Result<Vec<Project>, FetchError>) {
        match result {
            Ok(projects) => {
                let advance = !projects.is_empty();
                if !self
                    .pager
                    .borrow_mut()
                    .complete(generation, advance)
                {
                    tracing::debug!(generation, "Discarding stale fetch result");
                    return;
                }

                if projects.is_empty() {
                    self.exhausted.set(true);
                    self.grid_view.disconnect_load_more();
                    self.update_status_for_collection();
                    return;
                }

                self.base_projects.borrow_mut().extend(projects);
                self.relayout();
                self.update_status_for_collection();
            }
            Err(err) => {
                // Keep whatever is on screen; the sentinel can retry later
                self.pager.borrow_mut().complete(generation, false);
                tracing::error!(error = ?err, "Failed to load projects");
                self.set_status("Couldn't load more work. Scroll to retry.");
            }
        }
    }

    fn set_filter(&self, filter: CategoryFilter) {
        if self.active_filter.get() == filter {
            return;
        }
        self.active_filter.set(filter);
        self.update_filter_styles();
        self.relayout();
        self.update_status_for_collection();
    }

    fn update_filter_styles(&self) {
        let active = self.active_filter.get();
        for (filter, button) in self.filter_buttons.borrow().iter() {
            if *filter == active {
                button.add_css_class("filter-active");
            } else {
                button.remove_css_class("filter-active");
            }
        }
    }

    /// Rebuild the masonry columns from the current collection and width.
    fn relayout(&self) {
        let base = self.base_projects.borrow();
        let visible = filter_projects(&base, &self.active_filter.get());
        drop(base);

        let mut viewport_width = self.grid_view.content_width();
        if !viewport_width.is_finite() || viewport_width <= 0.0 {
            viewport_width = FALLBACK_LAYOUT_WIDTH;
        }

        let column_count = column_count_for_width(viewport_width);
        let tile_size = self.layout.column_width(viewport_width, column_count);
        let columns = partition(&visible, column_count);

        tracing::debug!(
            width = viewport_width,
            columns = column_count,
            items = visible.len(),
            "Masonry relayout"
        );
        self.grid_view.set_columns(&columns, tile_size as i32);
    }

    fn schedule_relayout_debounced(&self, delay: Duration) {
        if self.resize_relayout_pending.replace(true) {
            return;
        }
        let weak_self = self.self_weak.borrow().clone();
        glib::timeout_add_local(delay, move || {
            if let Some(window) = weak_self.upgrade() {
                window.resize_relayout_pending.set(false);
                window.relayout();
            }
            glib::ControlFlow::Break
        });
    }

    fn update_status_for_collection(&self) {
        let base = self.base_projects.borrow();
        let filter = self.active_filter.get();
        let shown = filter_projects(&base, &filter).len();

        let status = match filter {
            CategoryFilter::All if self.exhausted.get() => {
                format!("{} projects. That's everything.", shown)
            }
            CategoryFilter::All => format!("{} projects", shown),
            CategoryFilter::Only(category) => {
                format!("{} projects in {}", shown, category.as_str())
            }
        };
        self.set_status(&status);
    }

    fn open_project(&self, id: u64) {
        let project = {
            let base = self.base_projects.borrow();
            base.iter().find(|p| p.id == id).cloned()
        };
        let Some(project) = project else {
            tracing::warn!(id, "Activated tile has no backing project");
            return;
        };

        self.selection.borrow_mut().select(project.clone());
        self.lightbox.show_project(&project);
    }

    fn set_status(&self, text: &str) {
        self.status_label.set_text(text);
    }

    /// Present the window
    pub fn present(&self) {
        self.window.present();
    }
}
