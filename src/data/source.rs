//! Project sources for the gallery.
//!
//! A source serves one page of projects at a time. Sources run on worker
//! threads (the window spawns one per fetch), so the trait is synchronous
//! and `Send`; results travel back to the UI thread over a channel.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::models::{Category, ContentStore, Project};

/// Item count of the first page.
pub const INITIAL_PAGE_SIZE: usize = 20;
/// Item count of every subsequent page.
pub const PAGE_SIZE: usize = 10;

/// Maps a page number to its (offset, limit) span in the full collection.
/// Page 0 is larger than the rest so the first paint fills the viewport.
pub fn page_span(page: u32) -> (usize, usize) {
    if page == 0 {
        (0, INITIAL_PAGE_SIZE)
    } else {
        (
            INITIAL_PAGE_SIZE + (page as usize - 1) * PAGE_SIZE,
            PAGE_SIZE,
        )
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("content store error: {0}")]
    Store(anyhow::Error),
}

/// A paged supplier of gallery projects.
///
/// An empty page means the collection is exhausted; the caller stops asking.
/// Implementations must hand out globally unique project ids so pages can be
/// appended without keying collisions.
pub trait ProjectSource: Send {
    fn fetch_page(&self, page: u32) -> Result<Vec<Project>, FetchError>;
}

// =============================================================================
// DemoSource
// =============================================================================

const DEMO_TITLES_A: [&str; 8] = [
    "Lunar", "Verdant", "Monochrome", "Kinetic", "Paper", "Atlas", "Ember", "Quiet",
];

const DEMO_TITLES_B: [&str; 7] = [
    "Identity", "Editorial", "Series", "Campaign", "System", "Study", "Collection",
];

// Advisory heights cycled per item, mirroring a varied-height source feed.
const DEMO_HEIGHTS: [u32; 6] = [400, 300, 500, 350, 450, 380];

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "webp", "gif", "bmp"];

/// Deterministic built-in source used when no content store is populated.
///
/// Generates projects on demand, cycling titles, categories, and tile images.
/// Optionally seeded with images discovered under a local art directory;
/// without one, tiles fall back to the placeholder texture.
pub struct DemoSource {
    images: Vec<PathBuf>,
    /// Total number of projects the source will ever serve.
    total: usize,
}

impl DemoSource {
    pub fn new() -> Self {
        Self {
            images: Vec::new(),
            total: 60,
        }
    }

    /// Seeds the source with every image file found under `dir` (recursive,
    /// sorted by path for stable ordering across runs).
    pub fn with_art_dir(dir: &Path) -> Self {
        let mut images: Vec<PathBuf> = WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| {
                        IMAGE_EXTENSIONS
                            .iter()
                            .any(|known| ext.eq_ignore_ascii_case(known))
                    })
                    .unwrap_or(false)
            })
            .map(|entry| entry.into_path())
            .collect();

        images.sort();

        if images.is_empty() {
            warn!("No images found under {:?}, tiles will use placeholders", dir);
        } else {
            debug!("Seeded demo source with {} images from {:?}", images.len(), dir);
        }

        Self {
            images,
            total: 60,
        }
    }

    fn generate(&self, index: usize) -> Project {
        let id = index as u64 + 1;
        let title = format!(
            "{} {}",
            DEMO_TITLES_A[index % DEMO_TITLES_A.len()],
            DEMO_TITLES_B[index % DEMO_TITLES_B.len()],
        );
        let category = Category::ALL[index % Category::ALL.len()];
        let image_url = if self.images.is_empty() {
            String::new()
        } else {
            self.images[index % self.images.len()]
                .to_string_lossy()
                .into_owned()
        };

        let mut project = Project::new(id, title, category, image_url);
        project.height = DEMO_HEIGHTS[index % DEMO_HEIGHTS.len()];
        project.description = Some(format!(
            "A {} project exploring form, rhythm, and restraint.",
            category.as_str().to_lowercase()
        ));
        project.client = Some("Studio Client".to_string());
        project.year = Some("2025".to_string());
        project.timeline = Some("6 weeks".to_string());
        project.services = Some(category.as_str().to_string());
        project
    }
}

impl Default for DemoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectSource for DemoSource {
    fn fetch_page(&self, page: u32) -> Result<Vec<Project>, FetchError> {
        let (offset, limit) = page_span(page);
        let end = (offset + limit).min(self.total);
        if offset >= end {
            return Ok(Vec::new());
        }

        Ok((offset..end).map(|i| self.generate(i)).collect())
    }
}

// =============================================================================
// StoreSource
// =============================================================================

/// Source backed by the local SQLite content store.
pub struct StoreSource {
    store: ContentStore,
}

impl StoreSource {
    pub fn new(store: ContentStore) -> Self {
        Self { store }
    }
}

impl ProjectSource for StoreSource {
    fn fetch_page(&self, page: u32) -> Result<Vec<Project>, FetchError> {
        let (offset, limit) = page_span(page);
        self.store
            .page_of_projects(offset, limit)
            .map_err(FetchError::Store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::tempdir;

    #[test]
    fn test_page_span() {
        assert_eq!(page_span(0), (0, 20));
        assert_eq!(page_span(1), (20, 10));
        assert_eq!(page_span(2), (30, 10));
    }

    #[test]
    fn test_demo_first_page_is_larger() {
        let source = DemoSource::new();
        assert_eq!(source.fetch_page(0).unwrap().len(), INITIAL_PAGE_SIZE);
        assert_eq!(source.fetch_page(1).unwrap().len(), PAGE_SIZE);
    }

    #[test]
    fn test_demo_ids_unique_across_pages() {
        let source = DemoSource::new();
        let mut seen = HashSet::new();

        for page in 0..3 {
            for project in source.fetch_page(page).unwrap() {
                assert!(seen.insert(project.id), "duplicate id {}", project.id);
            }
        }
    }

    #[test]
    fn test_demo_is_deterministic() {
        let a = DemoSource::new().fetch_page(0).unwrap();
        let b = DemoSource::new().fetch_page(0).unwrap();

        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.title, y.title);
            assert_eq!(x.category, y.category);
        }
    }

    #[test]
    fn test_demo_exhausts() {
        let source = DemoSource::new();
        // 60 items: page 0 takes 20, pages 1..=4 take 10 each.
        assert_eq!(source.fetch_page(4).unwrap().len(), PAGE_SIZE);
        assert!(source.fetch_page(5).unwrap().is_empty());
    }

    #[test]
    fn test_demo_art_dir_discovery() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("b.PNG"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let source = DemoSource::with_art_dir(dir.path());
        let page = source.fetch_page(0).unwrap();
        assert!(page.iter().all(|p| !p.image_url.is_empty()));
        assert!(!page.iter().any(|p| p.image_url.ends_with("notes.txt")));
    }

    #[test]
    fn test_store_source_pages() {
        let dir = tempdir().unwrap();
        let store = ContentStore::open(&dir.path().join("test.sqlite")).unwrap();
        for i in 0..25 {
            store
                .create_project(&Project::new(
                    0,
                    format!("p{}", i),
                    Category::Branding,
                    "",
                ))
                .unwrap();
        }

        let source = StoreSource::new(store);
        assert_eq!(source.fetch_page(0).unwrap().len(), 20);
        assert_eq!(source.fetch_page(1).unwrap().len(), 5);
        assert!(source.fetch_page(2).unwrap().is_empty());
    }
}
