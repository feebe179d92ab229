// Tile widget for a single project in the masonry grid
// Renders a square cover image with a hover caption overlay

use gdk4::Texture;
use glib::Object;
use gtk4::prelude::*;
use gtk4::subclass::prelude::*;
use gtk4::{
    gdk, glib, Align, ContentFit, EventControllerMotion, GestureClick, Label, Overlay, Picture,
};
use image::GenericImageView;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Duration;

use crate::models::Project;

const TILE_PREVIEW_SIZE: u32 = 512;
const TILE_LOADER_THREADS: usize = 2;
const TILE_LOADER_QUEUE: usize = 256;
const TILE_CACHE_ENTRIES: usize = 512;

// Placeholder texture - generated once and reused
fn placeholder_texture() -> &'static Texture {
    static PLACEHOLDER: OnceLock<Texture> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        let width = 64;
        let height = 64;
        let mut pixels = vec![0u8; width * height * 4];

        // Fill with warm light gray (#e9e5e0) RGBA
        for chunk in pixels.chunks_exact_mut(4) {
            chunk[0] = 0xe9; // R
            chunk[1] = 0xe5; // G
            chunk[2] = 0xe0; // B
            chunk[3] = 0xff; // A
        }

        let bytes = glib::Bytes::from_owned(pixels);
        gdk::MemoryTexture::new(
            width as i32,
            height as i32,
            gdk::MemoryFormat::R8g8b8a8,
            &bytes,
            width * 4,
        )
        .upcast()
    })
}

#[derive(Debug)]
struct TileDecodeRequest {
    path: PathBuf,
}

#[derive(Debug)]
struct TileDecodeResult {
    path: PathBuf,
    rgba: Option<Vec<u8>>,
    width: u32,
    height: u32,
}

#[derive(Clone)]
struct TileWaiter {
    widget: glib::WeakRef<ProjectTile>,
    token: u64,
}

struct TileLoaderState {
    pending_paths: HashSet<PathBuf>,
    waiters: HashMap<PathBuf, Vec<TileWaiter>>,
    cache: lru::LruCache<PathBuf, Texture>,
}

struct TileImageLoader {
    request_tx: flume::Sender<TileDecodeRequest>,
    result_rx: flume::Receiver<TileDecodeResult>,
    state: RefCell<TileLoaderState>,
}

static NEXT_LOAD_TOKEN: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static TILE_IMAGE_LOADER: Rc<TileImageLoader> = TileImageLoader::new();
}

impl TileImageLoader {
    fn new() -> Rc<Self> {
        let (request_tx, request_rx) = flume::bounded::<TileDecodeRequest>(TILE_LOADER_QUEUE);
        let (result_tx, result_rx) = flume::unbounded::<TileDecodeResult>();

        for _ in 0..TILE_LOADER_THREADS {
            let rx = request_rx.clone();
            let tx = result_tx.clone();
            std::thread::spawn(move || {
                while let Ok(req) = rx.recv() {
                    let decoded = decode_tile_preview(&req.path);
                    let (rgba, width, height) = match decoded {
                        Some((data, w, h)) => (Some(data), w, h),
                        None => (None, 0, 0),
                    };
                    let _ = tx.send(TileDecodeResult {
                        path: req.path,
                        rgba,
                        width,
                        height,
                    });
                }
            });
        }

        let loader = Rc::new(Self {
            request_tx,
            result_rx,
            state: RefCell::new(TileLoaderState {
                pending_paths: HashSet::new(),
                waiters: HashMap::new(),
                cache: lru::LruCache::new(NonZeroUsize::new(TILE_CACHE_ENTRIES).unwrap()),
            }),
        });

        let loader_weak = Rc::downgrade(&loader);
        glib::timeout_add_local(Duration::from_millis(16), move || {
            if let Some(loader) = loader_weak.upgrade() {
                loader.process_results();
                glib::ControlFlow::Continue
            } else {
                glib::ControlFlow::Break
            }
        });

        loader
    }

    fn request(&self, tile: &ProjectTile, path: &Path, token: u64) {
        let mut state = self.state.borrow_mut();

        if let Some(texture) = state.cache.get(path).cloned() {
            let widget_weak = tile.downgrade();
            let path = path.to_path_buf();
            glib::idle_add_local_once(move || {
                if let Some(tile) = widget_weak.upgrade() {
                    tile.apply_async_texture(token, &path, Some(&texture));
                }
            });
            return;
        }

        state
            .waiters
            .entry(path.to_path_buf())
            .or_default()
            .push(TileWaiter {
                widget: tile.downgrade(),
                token,
            });

        if state.pending_paths.insert(path.to_path_buf()) {
            if self
                .request_tx
                .try_send(TileDecodeRequest {
                    path: path.to_path_buf(),
                })
                .is_err()
            {
                state.pending_paths.remove(path);
                state.waiters.remove(path);
            }
        }
    }

    fn process_results(&self) {
        while let Ok(result) = self.result_rx.try_recv() {
            let texture = result
                .rgba
                .and_then(|rgba| create_texture_from_rgba(rgba, result.width, result.height));

            let waiters = {
                let mut state = self.state.borrow_mut();
                state.pending_paths.remove(&result.path);
                if let Some(ref texture) = texture {
                    state.cache.put(result.path.clone(), texture.clone());
                }
                state.waiters.remove(&result.path).unwrap_or_default()
            };

            for waiter in waiters {
                if let Some(tile) = waiter.widget.upgrade() {
                    tile.apply_async_texture(waiter.token, &result.path, texture.as_ref());
                }
            }
        }
    }
}

// Unreadable or malformed images report None; the tile keeps its placeholder.
fn decode_tile_preview(path: &Path) -> Option<(Vec<u8>, u32, u32)> {
    let img = image::open(path).ok()?;
    let resized = img.thumbnail(TILE_PREVIEW_SIZE, TILE_PREVIEW_SIZE);
    let (width, height) = resized.dimensions();
    let rgba = resized.to_rgba8().into_raw();
    Some((rgba, width.max(1), height.max(1)))
}

fn create_texture_from_rgba(rgba: Vec<u8>, width: u32, height: u32) -> Option<Texture> {
    if width == 0 || height == 0 {
        return None;
    }
    let expected = (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4);
    if rgba.len() < expected {
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

// GObject subclass for ProjectTile
mod imp {
    use super::*;

    #[derive(Default)]
    pub struct ProjectTileInner {
        pub picture: RefCell<Option<Picture>>,
        pub caption: RefCell<Option<gtk4::Box>>,
        pub title_label: RefCell<Option<Label>>,
        pub category_label: RefCell<Option<Label>>,
        pub project_id: Cell<u64>,
        pub image_path: RefCell<Option<PathBuf>>,
        pub load_token: Cell<u64>,
        pub on_activated: RefCell<Option<Rc<dyn Fn(u64)>>>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for ProjectTileInner {
        const NAME: &'static str = "FolioProjectTile";
        type Type = super::ProjectTile;
        type ParentType = Overlay;
    }

    impl ObjectImpl for ProjectTileInner {
        fn constructed(&self) {
            self.parent_constructed();

            let obj = self.obj();
            obj.add_css_class("project-tile");

            let picture = Picture::new();
            picture.set_can_shrink(true);
            // Square tiles: fill the allocation, crop the source.
            picture.set_content_fit(ContentFit::Cover);
            picture.add_css_class("tile-image");
            obj.set_child(Some(&picture));

            // Caption strip shown on hover only
            let caption = gtk4::Box::new(gtk4::Orientation::Vertical, 2);
            caption.set_halign(Align::Fill);
            caption.set_valign(Align::End);
            caption.add_css_class("tile-caption");
            caption.set_visible(false);

            let title_label = Label::new(None);
            title_label.set_halign(Align::Start);
            title_label.set_ellipsize(gtk4::pango::EllipsizeMode::End);
            title_label.add_css_class("tile-title");
            caption.append(&title_label);

            let category_label = Label::new(None);
            category_label.set_halign(Align::Start);
            category_label.add_css_class("tile-category");
            caption.append(&category_label);

            obj.add_overlay(&caption);

            let motion = EventControllerMotion::new();
            let caption_enter = caption.clone();
            motion.connect_enter(move |_, _, _| {
                caption_enter.set_visible(true);
            });
            let caption_leave = caption.clone();
            motion.connect_leave(move |_| {
                caption_leave.set_visible(false);
            });
            obj.add_controller(motion);

            let tile = obj.clone();
            let click = GestureClick::new();
            click.set_button(1);
            click.connect_released(move |_, _n, _x, _y| {
                tile.emit_activated();
            });
            obj.add_controller(click);

            self.picture.replace(Some(picture));
            self.caption.replace(Some(caption));
            self.title_label.replace(Some(title_label));
            self.category_label.replace(Some(category_label));
        }
    }

    impl WidgetImpl for ProjectTileInner {}
    impl OverlayImpl for ProjectTileInner {}
}

glib::wrapper! {
    pub struct ProjectTile(ObjectSubclass<imp::ProjectTileInner>)
        @extends Overlay, gtk4::Widget,
        @implements gtk4::Accessible, gtk4::Buildable, gtk4::ConstraintTarget;
}

impl ProjectTile {
    pub fn new() -> Self {
        Object::builder().build()
    }

    /// Bind a project to this tile at the given square edge length.
    pub fn bind(&self, project: &Project, tile_size: i32) {
        let imp = self.imp();
        imp.project_id.set(project.id);

        self.set_size_request(tile_size, tile_size);
        if let Some(ref picture) = *imp.picture.borrow() {
            picture.set_size_request(tile_size, tile_size);
            picture.set_paintable(Some(placeholder_texture()));
        }
        if let Some(ref label) = *imp.title_label.borrow() {
            label.set_text(&project.title);
        }
        if let Some(ref label) = *imp.category_label.borrow() {
            label.set_text(project.category.as_str());
        }

        if project.image_url.is_empty() {
            imp.image_path.replace(None);
            imp.load_token.set(0);
            return;
        }

        let path = PathBuf::from(&project.image_url);
        let token = NEXT_LOAD_TOKEN.fetch_add(1, Ordering::Relaxed);
        imp.image_path.replace(Some(path.clone()));
        imp.load_token.set(token);
        TILE_IMAGE_LOADER.with(|loader| {
            loader.request(self, &path, token);
        });
    }

    fn apply_async_texture(&self, token: u64, expected_path: &Path, texture: Option<&Texture>) {
        let Some(texture) = texture else {
            return;
        };
        let imp = self.imp();
        if imp.load_token.get() != token {
            return;
        }
        if imp.image_path.borrow().as_deref() != Some(expected_path) {
            return;
        }
        if let Some(ref picture) = *imp.picture.borrow() {
            picture.set_paintable(Some(texture));
        }
    }

    pub fn project_id(&self) -> u64 {
        self.imp().project_id.get()
    }

    pub fn connect_activated<F>(&self, callback: F)
    where
        F: Fn(u64) + 'static,
    {
        *self.imp().on_activated.borrow_mut() = Some(Rc::new(callback));
    }

    fn emit_activated(&self) {
        let imp = self.imp();
        let id = imp.project_id.get();
        if let Some(ref callback) = *imp.on_activated.borrow() {
            callback(id);
        }
    }
}

impl Default for ProjectTile {
    fn default() -> Self {
        Self::new()
    }
}
