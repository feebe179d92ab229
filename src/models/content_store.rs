//! SQLite-based content store for the portfolio.
//!
//! This module provides the `ContentStore` struct which manages all database
//! operations for folio:
//! - Project records (the gallery's items, paged newest-first)
//! - Page content blocks keyed by (page, section)
//! - Site settings as a key/value table
//!
//! The store is the local counterpart of the hosted database the site
//! variant talks to; the gallery only reads from it, the editing surface
//! writes through the CRUD operations below.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::models::{Category, Project};

/// SQLite-backed storage for projects, page content, and site settings.
///
/// The database is stored at `XDG_CONFIG_HOME/folio/content.sqlite` and uses
/// WAL mode for concurrent read/write performance.
pub struct ContentStore {
    conn: Connection,
}

/// A single editable content block on a public page.
#[derive(Debug, Clone)]
pub struct PageSection {
    pub page: String,
    pub section_key: String,
    pub content: String,
    pub updated_at: i64,
}

impl ContentStore {
    /// Opens or creates the database at the default XDG location.
    pub fn open_default() -> Result<Self> {
        let db_path = Self::default_db_path()?;
        Self::open(&db_path)
    }

    /// Returns the default database path based on XDG directories.
    pub fn default_db_path() -> Result<PathBuf> {
        let proj_dirs = directories::ProjectDirs::from("", "", "folio")
            .context("Failed to determine project directories")?;

        let config_dir = proj_dirs.config_dir();
        std::fs::create_dir_all(config_dir)
            .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;

        Ok(config_dir.join("content.sqlite"))
    }

    /// Opens or creates the database at the specified path.
    ///
    /// Configures SQLite with WAL journaling and NORMAL synchronous mode,
    /// the same profile the rest of the app assumes.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {:?}", path))?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA foreign_keys = ON;
            ",
        )
        .context("Failed to configure SQLite pragmas")?;

        let store = Self { conn };
        store.create_tables()?;

        info!("Opened content store at {:?}", path);
        Ok(store)
    }

    /// Creates the database schema if it doesn't exist.
    fn create_tables(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
            -- Portfolio projects (gallery items)
            CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                category TEXT NOT NULL,
                image_url TEXT NOT NULL,
                height INTEGER NOT NULL DEFAULT 400,
                description TEXT,
                client TEXT,
                year TEXT,
                timeline TEXT,
                services TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            -- Newest-first listing is the hot query
            CREATE INDEX IF NOT EXISTS idx_projects_created ON projects(created_at DESC);
            CREATE INDEX IF NOT EXISTS idx_projects_category ON projects(category);

            -- Editable content blocks on the public pages
            CREATE TABLE IF NOT EXISTS page_content (
                page TEXT NOT NULL,
                section_key TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (page, section_key)
            );

            -- Site-wide settings
            CREATE TABLE IF NOT EXISTS site_settings (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            ",
            )
            .context("Failed to create database tables")?;

        debug!("Database tables created/verified");
        Ok(())
    }

    // =========================================================================
    // Project Operations
    // =========================================================================

    /// Inserts a new project and returns its assigned id.
    pub fn create_project(&self, project: &Project) -> Result<u64> {
        let now = Self::now();
        self.conn
            .execute(
                "
            INSERT INTO projects (
                title, category, image_url, height,
                description, client, year, timeline, services,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
            ",
                params![
                    project.title,
                    project.category.as_str(),
                    project.image_url,
                    project.height,
                    project.description,
                    project.client,
                    project.year,
                    project.timeline,
                    project.services,
                    now,
                ],
            )
            .context("Failed to insert project")?;

        Ok(self.conn.last_insert_rowid() as u64)
    }

    /// Retrieves a project by id.
    pub fn get_project(&self, id: u64) -> Result<Option<Project>> {
        let result = self
            .conn
            .query_row(
                "
            SELECT id, title, category, image_url, height,
                   description, client, year, timeline, services
            FROM projects WHERE id = ?1
            ",
                params![id],
                Self::row_to_project,
            )
            .optional()
            .context("Failed to query project")?;

        Ok(result)
    }

    /// Retrieves all projects, newest first.
    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, title, category, image_url, height,
                   description, client, year, timeline, services
            FROM projects
            ORDER BY created_at DESC, id DESC
            ",
        )?;

        let projects = stmt
            .query_map([], Self::row_to_project)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query projects")?;

        Ok(projects)
    }

    /// Retrieves one page of projects, newest first.
    pub fn page_of_projects(&self, offset: usize, limit: usize) -> Result<Vec<Project>> {
        let mut stmt = self.conn.prepare_cached(
            "
            SELECT id, title, category, image_url, height,
                   description, client, year, timeline, services
            FROM projects
            ORDER BY created_at DESC, id DESC
            LIMIT ?1 OFFSET ?2
            ",
        )?;

        let projects = stmt
            .query_map(params![limit as i64, offset as i64], Self::row_to_project)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query project page")?;

        Ok(projects)
    }

    /// Updates an existing project in place. Returns false if no row matched.
    pub fn update_project(&self, project: &Project) -> Result<bool> {
        let rows = self
            .conn
            .execute(
                "
            UPDATE projects SET
                title = ?1, category = ?2, image_url = ?3, height = ?4,
                description = ?5, client = ?6, year = ?7, timeline = ?8,
                services = ?9, updated_at = ?10
            WHERE id = ?11
            ",
                params![
                    project.title,
                    project.category.as_str(),
                    project.image_url,
                    project.height,
                    project.description,
                    project.client,
                    project.year,
                    project.timeline,
                    project.services,
                    Self::now(),
                    project.id,
                ],
            )
            .context("Failed to update project")?;

        Ok(rows > 0)
    }

    /// Deletes a project by id. Returns false if no row matched.
    pub fn delete_project(&self, id: u64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1", params![id])
            .context("Failed to delete project")?;
        Ok(rows > 0)
    }

    /// Returns the total count of projects.
    pub fn count_projects(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))?;
        Ok(count)
    }

    fn row_to_project(row: &rusqlite::Row<'_>) -> rusqlite::Result<Project> {
        let category: String = row.get(2)?;
        Ok(Project {
            id: row.get::<_, i64>(0)? as u64,
            title: row.get(1)?,
            // Rows written by older builds may carry labels the enum no
            // longer knows; keep them renderable under the first category.
            category: category.parse().unwrap_or(Category::Branding),
            image_url: row.get(3)?,
            height: row.get(4)?,
            description: row.get(5)?,
            client: row.get(6)?,
            year: row.get(7)?,
            timeline: row.get(8)?,
            services: row.get(9)?,
        })
    }

    // =========================================================================
    // Page Content Operations
    // =========================================================================

    /// Retrieves all content blocks for a page.
    pub fn page_content(&self, page: &str) -> Result<Vec<PageSection>> {
        let mut stmt = self.conn.prepare_cached(
            "
            SELECT page, section_key, content, updated_at
            FROM page_content
            WHERE page = ?1
            ORDER BY section_key
            ",
        )?;

        let sections = stmt
            .query_map(params![page], |row| {
                Ok(PageSection {
                    page: row.get(0)?,
                    section_key: row.get(1)?,
                    content: row.get(2)?,
                    updated_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query page content")?;

        Ok(sections)
    }

    /// Inserts or replaces a single content block.
    pub fn set_page_content(&self, page: &str, section_key: &str, content: &str) -> Result<()> {
        let now = Self::now();
        self.conn
            .execute(
                "
            INSERT INTO page_content (page, section_key, content, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT(page, section_key) DO UPDATE SET
                content = excluded.content,
                updated_at = excluded.updated_at
            ",
                params![page, section_key, content, now],
            )
            .context("Failed to upsert page content")?;

        Ok(())
    }

    // =========================================================================
    // Site Settings Operations
    // =========================================================================

    /// Retrieves a site setting by key.
    pub fn setting(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM site_settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to query setting")?;
        Ok(value)
    }

    /// Inserts or replaces a site setting.
    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "
            INSERT INTO site_settings (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
                params![key, value, Self::now()],
            )
            .context("Failed to upsert setting")?;

        Ok(())
    }

    /// Returns the current Unix timestamp.
    pub fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_project(title: &str, category: Category) -> Project {
        let mut project = Project::new(0, title, category, format!("/art/{}.jpg", title));
        project.description = Some("Case study".to_string());
        project.client = Some("Sample Client".to_string());
        project.year = Some("2025".to_string());
        project
    }

    #[test]
    fn test_open_and_create() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.sqlite");

        let store = ContentStore::open(&db_path).unwrap();
        assert!(db_path.exists());
        assert_eq!(store.count_projects().unwrap(), 0);
    }

    #[test]
    fn test_create_and_get_project() {
        let dir = tempdir().unwrap();
        let store = ContentStore::open(&dir.path().join("test.sqlite")).unwrap();

        let id = store
            .create_project(&test_project("Rebrand", Category::Branding))
            .unwrap();
        assert!(id > 0);

        let retrieved = store.get_project(id).unwrap().unwrap();
        assert_eq!(retrieved.id, id);
        assert_eq!(retrieved.title, "Rebrand");
        assert_eq!(retrieved.category, Category::Branding);
        assert_eq!(retrieved.client.as_deref(), Some("Sample Client"));
    }

    #[test]
    fn test_update_project() {
        let dir = tempdir().unwrap();
        let store = ContentStore::open(&dir.path().join("test.sqlite")).unwrap();

        let id = store
            .create_project(&test_project("Draft", Category::Typography))
            .unwrap();

        let mut updated = store.get_project(id).unwrap().unwrap();
        updated.title = "Final".to_string();
        updated.category = Category::Packaging;
        assert!(store.update_project(&updated).unwrap());

        let retrieved = store.get_project(id).unwrap().unwrap();
        assert_eq!(retrieved.title, "Final");
        assert_eq!(retrieved.category, Category::Packaging);

        // Updating a missing id matches no row.
        updated.id = 9999;
        assert!(!store.update_project(&updated).unwrap());
    }

    #[test]
    fn test_delete_project() {
        let dir = tempdir().unwrap();
        let store = ContentStore::open(&dir.path().join("test.sqlite")).unwrap();

        let id = store
            .create_project(&test_project("Gone", Category::Illustration))
            .unwrap();
        assert!(store.delete_project(id).unwrap());
        assert!(store.get_project(id).unwrap().is_none());
        assert!(!store.delete_project(id).unwrap());
    }

    #[test]
    fn test_page_of_projects_is_stable() {
        let dir = tempdir().unwrap();
        let store = ContentStore::open(&dir.path().join("test.sqlite")).unwrap();

        for i in 0..25 {
            store
                .create_project(&test_project(&format!("p{}", i), Category::WebDesign))
                .unwrap();
        }

        let first = store.page_of_projects(0, 20).unwrap();
        let second = store.page_of_projects(20, 10).unwrap();
        assert_eq!(first.len(), 20);
        assert_eq!(second.len(), 5);

        // Pages never overlap: ids are unique across the paging seam.
        let mut ids: Vec<u64> = first.iter().chain(second.iter()).map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 25);
    }

    #[test]
    fn test_page_content_round_trip() {
        let dir = tempdir().unwrap();
        let store = ContentStore::open(&dir.path().join("test.sqlite")).unwrap();

        store.set_page_content("about", "intro", "Hello").unwrap();
        store.set_page_content("about", "bio", "Designer").unwrap();
        store.set_page_content("about", "intro", "Hello again").unwrap();

        let sections = store.page_content("about").unwrap();
        assert_eq!(sections.len(), 2);
        let intro = sections.iter().find(|s| s.section_key == "intro").unwrap();
        assert_eq!(intro.content, "Hello again");

        assert!(store.page_content("home").unwrap().is_empty());
    }

    #[test]
    fn test_settings_round_trip() {
        let dir = tempdir().unwrap();
        let store = ContentStore::open(&dir.path().join("test.sqlite")).unwrap();

        assert!(store.setting("site_title").unwrap().is_none());
        store.set_setting("site_title", "Studio").unwrap();
        store.set_setting("site_title", "Studio Folio").unwrap();
        assert_eq!(
            store.setting("site_title").unwrap().as_deref(),
            Some("Studio Folio")
        );
    }
}
