// Masonry grid view for the gallery
// Fixed column boxes inside a ScrolledWindow, with a sentinel row at the
// bottom that drives infinite scroll

use gtk4::prelude::*;
use gtk4::{
    glib, Align, Box as GtkBox, EventControllerScroll, EventControllerScrollFlags, Orientation,
    PolicyType, PropagationPhase, ScrolledWindow,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::tile_widget::ProjectTile;
use crate::gallery::EdgeTrigger;
use crate::models::Project;

const SENTINEL_HEIGHT: i32 = 40;
const COLUMN_GAP: i32 = 16;

/// GalleryGridView wraps a ScrolledWindow holding the masonry columns and a
/// sentinel box below them. When the sentinel scrolls into view the
/// load-more callback fires, at most once per entry.
pub struct GalleryGridView {
    scrolled_window: ScrolledWindow,
    columns_box: GtkBox,
    sentinel: GtkBox,
    trigger: Rc<RefCell<EdgeTrigger>>,
    on_load_more: Rc<RefCell<Option<Box<dyn Fn()>>>>,
    on_tile_activated: Rc<RefCell<Option<Box<dyn Fn(u64)>>>>,
    scroll_lock: RefCell<Option<EventControllerScroll>>,
    bounds_warned: Rc<Cell<bool>>,
}

impl GalleryGridView {
    pub fn new() -> Self {
        let content = GtkBox::new(Orientation::Vertical, 0);
        content.set_hexpand(true);

        let columns_box = GtkBox::new(Orientation::Horizontal, COLUMN_GAP);
        columns_box.set_homogeneous(true);
        columns_box.set_hexpand(true);
        columns_box.set_valign(Align::Start);
        columns_box.add_css_class("masonry-columns");
        content.append(&columns_box);

        // Invisible strip below the columns; its visibility is the
        // load-more signal.
        let sentinel = GtkBox::new(Orientation::Horizontal, 0);
        sentinel.set_size_request(-1, SENTINEL_HEIGHT);
        sentinel.add_css_class("scroll-sentinel");
        content.append(&sentinel);

        let scrolled_window = ScrolledWindow::builder()
            .hscrollbar_policy(PolicyType::Never)
            .vscrollbar_policy(PolicyType::Automatic)
            .kinetic_scrolling(true)
            .propagate_natural_width(false)
            .propagate_natural_height(false)
            .child(&content)
            .build();
        scrolled_window.set_min_content_width(0);
        scrolled_window.set_min_content_height(0);

        let trigger = Rc::new(RefCell::new(EdgeTrigger::default()));
        let on_load_more: Rc<RefCell<Option<Box<dyn Fn()>>>> = Rc::new(RefCell::new(None));
        let on_tile_activated: Rc<RefCell<Option<Box<dyn Fn(u64)>>>> = Rc::new(RefCell::new(None));
        let bounds_warned = Rc::new(Cell::new(false));

        let view = Self {
            scrolled_window,
            columns_box,
            sentinel,
            trigger,
            on_load_more,
            on_tile_activated,
            scroll_lock: RefCell::new(None),
            bounds_warned,
        };
        view.setup_sentinel_watch();
        view
    }

    /// Get the scrolled window widget to add to the window
    pub fn widget(&self) -> &ScrolledWindow {
        &self.scrolled_window
    }

    /// Get the content width available to the grid (excludes scrollbars).
    pub fn content_width(&self) -> f32 {
        let width = self.scrolled_window.allocation().width() as f32;
        if width <= 0.0 {
            return 0.0;
        }

        let vscrollbar = self.scrolled_window.vscrollbar();
        if vscrollbar.is_visible() {
            let vscrollbar_width = vscrollbar.allocated_width() as f32;
            return (width - vscrollbar_width).max(0.0);
        }

        width
    }

    /// Replace the grid contents with partitioned columns of tiles.
    pub fn set_columns(&self, columns: &[Vec<Project>], tile_size: i32) {
        // Tear down the previous column boxes wholesale
        while let Some(child) = self.columns_box.first_child() {
            self.columns_box.remove(&child);
        }

        for column in columns {
            let column_box = GtkBox::new(Orientation::Vertical, COLUMN_GAP);
            column_box.set_valign(Align::Start);
            column_box.add_css_class("masonry-column");

            for project in column {
                let tile = ProjectTile::new();
                tile.bind(project, tile_size);
                let on_tile_activated = self.on_tile_activated.clone();
                tile.connect_activated(move |id| {
                    if let Some(ref callback) = *on_tile_activated.borrow() {
                        callback(id);
                    }
                });
                column_box.append(&tile);
            }

            self.columns_box.append(&column_box);
        }

        // New content below the fold rearms the sentinel.
        self.trigger.borrow_mut().reset();
    }

    pub fn connect_tile_activated<F>(&self, callback: F)
    where
        F: Fn(u64) + 'static,
    {
        *self.on_tile_activated.borrow_mut() = Some(Box::new(callback));
    }

    /// Replaces any previously registered load-more callback.
    pub fn connect_load_more<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        *self.on_load_more.borrow_mut() = Some(Box::new(callback));
        self.trigger.borrow_mut().reset();
    }

    /// Removes the load-more subscription; the sentinel goes quiet.
    pub fn disconnect_load_more(&self) {
        *self.on_load_more.borrow_mut() = None;
        self.trigger.borrow_mut().reset();
    }

    fn setup_sentinel_watch(&self) {
        let vadj = self.scrolled_window.vadjustment();

        let scrolled_weak = self.scrolled_window.downgrade();
        let sentinel_weak = self.sentinel.downgrade();
        let trigger = self.trigger.clone();
        let on_load_more = self.on_load_more.clone();
        let bounds_warned = self.bounds_warned.clone();

        let check = move || {
            let (Some(scrolled), Some(sentinel)) =
                (scrolled_weak.upgrade(), sentinel_weak.upgrade())
            else {
                return;
            };

            let fraction = match sentinel_visible_fraction(&sentinel, &scrolled) {
                Some(fraction) => fraction,
                None => {
                    // No usable geometry; behave as a plain paged view
                    // instead of guessing at visibility.
                    if !bounds_warned.replace(true) {
                        tracing::warn!(
                            "Sentinel bounds unavailable, automatic loading disabled"
                        );
                    }
                    return;
                }
            };

            if trigger.borrow_mut().update(fraction) {
                if let Some(ref callback) = *on_load_more.borrow() {
                    callback();
                }
            }
        };

        let check_on_scroll = check.clone();
        vadj.connect_value_changed(move |_| check_on_scroll());
        // `changed` fires when content size shifts, e.g. after a page of
        // tiles is appended while the sentinel is still on screen.
        vadj.connect_changed(move |_| check());
    }

    /// Lock or unlock wheel/touch scrolling while an overlay is open.
    pub fn set_scroll_locked(&self, locked: bool) {
        let mut lock = self.scroll_lock.borrow_mut();
        if locked {
            if lock.is_some() {
                return;
            }
            let controller = EventControllerScroll::new(EventControllerScrollFlags::BOTH_AXES);
            controller.set_propagation_phase(PropagationPhase::Capture);
            controller.connect_scroll(|_, _, _| glib::Propagation::Stop);
            self.scrolled_window.add_controller(controller.clone());
            self.scrolled_window.set_kinetic_scrolling(false);
            *lock = Some(controller);
        } else if let Some(controller) = lock.take() {
            self.scrolled_window.remove_controller(&controller);
            self.scrolled_window.set_kinetic_scrolling(true);
        }
    }
}

/// Fraction of the sentinel currently inside the scroller's viewport,
/// or None when geometry is not available (widget unmapped, no frame yet).
fn sentinel_visible_fraction(sentinel: &GtkBox, scrolled: &ScrolledWindow) -> Option<f64> {
    let bounds = sentinel.compute_bounds(scrolled)?;
    let sentinel_height = bounds.height() as f64;
    if sentinel_height <= 0.0 {
        return None;
    }

    let viewport_height = scrolled.allocation().height() as f64;
    let top = bounds.y() as f64;
    let bottom = top + sentinel_height;

    let visible = (bottom.min(viewport_height) - top.max(0.0)).max(0.0);
    Some(visible / sentinel_height)
}

impl Default for GalleryGridView {
    fn default() -> Self {
        Self::new()
    }
}
