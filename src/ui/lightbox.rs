// Lightbox overlay for viewing a single project
// Covers the gallery while open; Escape, the close button, or a click on
// the backdrop dismisses it

use gdk4::Texture;
use gdk4::Key;
use gtk4::prelude::*;
use gtk4::subclass::prelude::*;
use gtk4::{
    gdk, glib, graphene, Align, Box as GtkBox, Button, ContentFit, EventControllerKey,
    GestureClick, Label, Orientation, Picture, Separator,
};
use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use image::GenericImageView;

use crate::models::Project;

const LIGHTBOX_MAX_SIZE: u32 = 2048;
const IMAGE_MIN_WIDTH: i32 = 480;
const IMAGE_MIN_HEIGHT: i32 = 360;

struct LoadResult {
    rgba: Vec<u8>,
    width: u32,
    height: u32,
}

fn decode_lightbox_image(path: &PathBuf) -> Option<LoadResult> {
    let img = image::open(path).ok()?;
    let resized = img.thumbnail(LIGHTBOX_MAX_SIZE, LIGHTBOX_MAX_SIZE);
    let (width, height) = resized.dimensions();
    Some(LoadResult {
        rgba: resized.to_rgba8().into_raw(),
        width: width.max(1),
        height: height.max(1),
    })
}

fn create_texture_from_rgba(rgba: Vec<u8>, width: u32, height: u32) -> Option<Texture> {
    if width == 0 || height == 0 {
        return None;
    }
    let bytes = glib::Bytes::from_owned(rgba);
    let texture = gdk::MemoryTexture::new(
        width as i32,
        height as i32,
        gdk::MemoryFormat::R8g8b8a8,
        &bytes,
        (width * 4) as usize,
    );
    Some(texture.upcast())
}

mod imp {
    use super::*;

    #[derive(Default)]
    pub struct LightboxInner {
        pub picture: RefCell<Option<Picture>>,
        pub category_label: RefCell<Option<Label>>,
        pub title_label: RefCell<Option<Label>>,
        pub description_label: RefCell<Option<Label>>,
        pub client_value: RefCell<Option<Label>>,
        pub year_value: RefCell<Option<Label>>,
        pub timeline_value: RefCell<Option<Label>>,
        pub services_value: RefCell<Option<Label>>,
        pub visible: Cell<bool>,
        pub load_generation: Cell<u64>,
        pub load_generation_atomic: Arc<AtomicU64>,
        pub load_sender: RefCell<Option<async_channel::Sender<(u64, Option<LoadResult>)>>>,
        pub key_controller: RefCell<Option<EventControllerKey>>,
        pub on_close: RefCell<Option<Rc<dyn Fn()>>>,
        pub on_scroll_lock: RefCell<Option<Rc<dyn Fn(bool)>>>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for LightboxInner {
        const NAME: &'static str = "FolioLightbox";
        type Type = super::Lightbox;
        type ParentType = GtkBox;
    }

    impl ObjectImpl for LightboxInner {}
    impl WidgetImpl for LightboxInner {}
    impl BoxImpl for LightboxInner {}
}

glib::wrapper! {
    pub struct Lightbox(ObjectSubclass<imp::LightboxInner>)
        @extends GtkBox, gtk4::Widget,
        @implements gtk4::Accessible, gtk4::Buildable, gtk4::ConstraintTarget, gtk4::Orientable;
}

impl Lightbox {
    pub fn new() -> Self {
        let obj: Self = glib::Object::builder().build();
        obj.setup_channels();
        obj.setup_widgets();
        obj
    }

    fn setup_channels(&self) {
        let imp = self.imp();

        let (sender, receiver) = async_channel::unbounded::<(u64, Option<LoadResult>)>();
        *imp.load_sender.borrow_mut() = Some(sender);

        let lightbox_weak = self.downgrade();
        glib::spawn_future_local(async move {
            while let Ok((generation, result)) = receiver.recv().await {
                if let Some(lightbox) = lightbox_weak.upgrade() {
                    lightbox.handle_load_result(generation, result);
                } else {
                    break;
                }
            }
        });
    }

    fn setup_widgets(&self) {
        let imp = self.imp();

        self.set_orientation(Orientation::Vertical);
        self.set_halign(Align::Fill);
        self.set_valign(Align::Fill);
        self.set_hexpand(true);
        self.set_vexpand(true);
        self.add_css_class("lightbox-backdrop");
        self.set_visible(false);

        let content = GtkBox::new(Orientation::Horizontal, 24);
        content.set_halign(Align::Center);
        content.set_valign(Align::Center);
        content.set_hexpand(true);
        content.set_vexpand(true);
        content.add_css_class("lightbox-content");

        let picture = Picture::new();
        picture.set_can_shrink(true);
        picture.set_content_fit(ContentFit::Contain);
        picture.set_size_request(IMAGE_MIN_WIDTH, IMAGE_MIN_HEIGHT);
        picture.add_css_class("lightbox-image");
        content.append(&picture);

        // Details panel on the right
        let details = GtkBox::new(Orientation::Vertical, 8);
        details.set_valign(Align::Center);
        details.set_size_request(280, -1);
        details.add_css_class("lightbox-details");

        let top_row = GtkBox::new(Orientation::Horizontal, 8);
        let category_label = Label::new(None);
        category_label.set_halign(Align::Start);
        category_label.set_hexpand(true);
        category_label.add_css_class("lightbox-category");
        top_row.append(&category_label);

        let close_button = Button::with_label("\u{2715}");
        close_button.set_tooltip_text(Some("Close (Escape)"));
        close_button.add_css_class("lightbox-close");
        top_row.append(&close_button);
        details.append(&top_row);

        let title_label = Label::new(None);
        title_label.set_halign(Align::Start);
        title_label.set_wrap(true);
        title_label.add_css_class("lightbox-title");
        details.append(&title_label);

        let description_label = Label::new(None);
        description_label.set_halign(Align::Start);
        description_label.set_wrap(true);
        description_label.set_xalign(0.0);
        description_label.add_css_class("lightbox-description");
        details.append(&description_label);

        details.append(&Separator::new(Orientation::Horizontal));

        let (client_row, client_value) = detail_row("Client");
        let (year_row, year_value) = detail_row("Year");
        let (timeline_row, timeline_value) = detail_row("Timeline");
        let (services_row, services_value) = detail_row("Services");
        details.append(&client_row);
        details.append(&year_row);
        details.append(&timeline_row);
        details.append(&services_row);

        content.append(&details);
        self.append(&content);

        let lightbox = self.clone();
        close_button.connect_clicked(move |_| {
            lightbox.hide_overlay();
        });

        // Clicks outside the content panel dismiss the overlay; clicks on
        // the image or details do nothing.
        let lightbox = self.clone();
        let content_for_click = content.clone();
        let backdrop_click = GestureClick::new();
        backdrop_click.set_button(1);
        backdrop_click.connect_released(move |_, _n, x, y| {
            let inside = content_for_click
                .compute_bounds(&lightbox)
                .map(|bounds| bounds.contains_point(&graphene::Point::new(x as f32, y as f32)))
                .unwrap_or(false);
            if !inside {
                lightbox.hide_overlay();
            }
        });
        self.add_controller(backdrop_click);

        imp.picture.replace(Some(picture));
        imp.category_label.replace(Some(category_label));
        imp.title_label.replace(Some(title_label));
        imp.description_label.replace(Some(description_label));
        imp.client_value.replace(Some(client_value));
        imp.year_value.replace(Some(year_value));
        imp.timeline_value.replace(Some(timeline_value));
        imp.services_value.replace(Some(services_value));
    }

    /// Show the overlay for a project.
    pub fn show_project(&self, project: &Project) {
        let imp = self.imp();

        if let Some(ref label) = *imp.category_label.borrow() {
            label.set_text(project.category.as_str());
        }
        if let Some(ref label) = *imp.title_label.borrow() {
            label.set_text(&project.title);
        }
        if let Some(ref label) = *imp.description_label.borrow() {
            label.set_text(project.description.as_deref().unwrap_or(
                "A selected piece from the studio's recent work.",
            ));
        }
        if let Some(ref label) = *imp.client_value.borrow() {
            label.set_text(project.client.as_deref().unwrap_or("Private commission"));
        }
        if let Some(ref label) = *imp.year_value.borrow() {
            label.set_text(project.year.as_deref().unwrap_or("2025"));
        }
        if let Some(ref label) = *imp.timeline_value.borrow() {
            label.set_text(project.timeline.as_deref().unwrap_or("6 weeks"));
        }
        if let Some(ref label) = *imp.services_value.borrow() {
            label.set_text(
                project
                    .services
                    .as_deref()
                    .unwrap_or(project.category.as_str()),
            );
        }

        // Invalidate any pending load, then kick off the new one
        let generation = imp.load_generation.get().wrapping_add(1);
        imp.load_generation.set(generation);
        imp.load_generation_atomic
            .store(generation, Ordering::SeqCst);

        if let Some(ref picture) = *imp.picture.borrow() {
            picture.set_paintable(Option::<&Texture>::None);
        }

        if !project.image_url.is_empty() {
            let path = PathBuf::from(&project.image_url);
            let generation_guard = imp.load_generation_atomic.clone();
            let sender = imp.load_sender.borrow().as_ref().cloned();
            if let Some(sender) = sender {
                std::thread::spawn(move || {
                    if generation_guard.load(Ordering::SeqCst) != generation {
                        return;
                    }
                    let result = decode_lightbox_image(&path);
                    let _ = sender.send_blocking((generation, result));
                });
            }
        }

        let was_visible = imp.visible.replace(true);
        self.set_visible(true);

        if !was_visible {
            self.install_escape_handler();
            if let Some(ref lock) = *imp.on_scroll_lock.borrow() {
                lock(true);
            }
        }
    }

    /// Dismiss the overlay. No-op when already hidden.
    pub fn hide_overlay(&self) {
        let imp = self.imp();
        if !imp.visible.replace(false) {
            return;
        }

        // Drop any in-flight image load
        let generation = imp.load_generation.get().wrapping_add(1);
        imp.load_generation.set(generation);
        imp.load_generation_atomic
            .store(generation, Ordering::SeqCst);

        self.set_visible(false);
        self.remove_escape_handler();

        if let Some(ref lock) = *imp.on_scroll_lock.borrow() {
            lock(false);
        }
        if let Some(ref on_close) = *imp.on_close.borrow() {
            on_close();
        }
    }

    pub fn is_open(&self) -> bool {
        self.imp().visible.get()
    }

    pub fn connect_close<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        *self.imp().on_close.borrow_mut() = Some(Rc::new(callback));
    }

    /// Callback invoked with `true` while the overlay is open and `false`
    /// once it closes; the window uses it to lock gallery scrolling.
    pub fn connect_scroll_lock<F>(&self, callback: F)
    where
        F: Fn(bool) + 'static,
    {
        *self.imp().on_scroll_lock.borrow_mut() = Some(Rc::new(callback));
    }

    // The Escape binding lives on the toplevel window, installed on open and
    // removed on close so it never shadows other views.
    fn install_escape_handler(&self) {
        let imp = self.imp();
        if imp.key_controller.borrow().is_some() {
            return;
        }
        let Some(root) = self.root() else {
            return;
        };

        let lightbox_weak = self.downgrade();
        let controller = EventControllerKey::new();
        controller.connect_key_pressed(move |_, key, _code, _state| {
            if key == Key::Escape {
                if let Some(lightbox) = lightbox_weak.upgrade() {
                    lightbox.hide_overlay();
                    return glib::Propagation::Stop;
                }
            }
            glib::Propagation::Proceed
        });
        root.add_controller(controller.clone());
        imp.key_controller.replace(Some(controller));
    }

    fn remove_escape_handler(&self) {
        if let Some(controller) = self.imp().key_controller.take() {
            if let Some(root) = self.root() {
                root.remove_controller(&controller);
            }
        }
    }

    fn handle_load_result(&self, generation: u64, result: Option<LoadResult>) {
        let imp = self.imp();
        if generation != imp.load_generation.get() || !imp.visible.get() {
            return;
        }

        let Some(result) = result else {
            tracing::warn!("Lightbox image failed to decode");
            return;
        };

        let texture = create_texture_from_rgba(result.rgba, result.width, result.height);
        if let (Some(picture), Some(texture)) = (imp.picture.borrow().as_ref(), texture) {
            picture.set_paintable(Some(&texture));
        }
    }
}

fn detail_row(name: &str) -> (GtkBox, Label) {
    let row = GtkBox::new(Orientation::Horizontal, 8);
    row.add_css_class("lightbox-detail-row");

    let name_label = Label::new(Some(name));
    name_label.set_halign(Align::Start);
    name_label.set_hexpand(true);
    name_label.add_css_class("lightbox-detail-name");
    row.append(&name_label);

    let value_label = Label::new(None);
    value_label.set_halign(Align::End);
    value_label.add_css_class("lightbox-detail-value");
    row.append(&value_label);

    (row, value_label)
}

impl Default for Lightbox {
    fn default() -> Self {
        Self::new()
    }
}
