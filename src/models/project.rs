use std::fmt;
use std::str::FromStr;

/// Fixed set of portfolio categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Branding,
    WebDesign,
    Illustration,
    Typography,
    Packaging,
}

impl Category {
    /// All categories in display order (matches the filter bar).
    pub const ALL: [Category; 5] = [
        Category::Branding,
        Category::WebDesign,
        Category::Illustration,
        Category::Typography,
        Category::Packaging,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Branding => "Branding",
            Category::WebDesign => "Web Design",
            Category::Illustration => "Illustration",
            Category::Typography => "Typography",
            Category::Packaging => "Packaging",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

/// Active category filter for the projects listing.
///
/// `All` shows the full collection and keeps pagination enabled;
/// any concrete category is treated as a complete, non-paginated result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CategoryFilter::All => "All",
            CategoryFilter::Only(c) => c.as_str(),
        }
    }
}

/// A single gallery entry (project / work sample).
///
/// `id` is the keyed identity for rendering and must be unique within a
/// displayed collection. `height` is advisory only: tiles render with a
/// forced square aspect, so it never drives layout.
#[derive(Debug, Clone)]
pub struct Project {
    pub id: u64,
    pub title: String,
    pub category: Category,
    /// Path or URL of the tile image. May point at nothing; the tile
    /// falls back to a placeholder texture rather than failing the grid.
    pub image_url: String,
    pub height: u32,
    pub description: Option<String>,
    pub client: Option<String>,
    pub year: Option<String>,
    pub timeline: Option<String>,
    pub services: Option<String>,
}

impl Project {
    /// Create a project with just the display-essential fields.
    pub fn new(id: u64, title: impl Into<String>, category: Category, image_url: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            category,
            image_url: image_url.into(),
            height: 400,
            description: None,
            client: None,
            year: None,
            timeline: None,
            services: None,
        }
    }
}

/// Returns the subsequence of `projects` matching `filter`, preserving
/// relative order. `All` returns the input unchanged.
pub fn filter_projects(projects: &[Project], filter: &CategoryFilter) -> Vec<Project> {
    projects
        .iter()
        .filter(|p| filter.matches(p.category))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_project(id: u64, category: Category) -> Project {
        Project::new(id, format!("Project {}", id), category, format!("/art/{}.jpg", id))
    }

    #[test]
    fn test_category_round_trip() {
        for category in Category::ALL {
            let parsed: Category = category.as_str().parse().unwrap();
            assert_eq!(parsed, category);
        }
    }

    #[test]
    fn test_category_parse_case_insensitive() {
        assert_eq!("branding".parse::<Category>().unwrap(), Category::Branding);
        assert_eq!("web design".parse::<Category>().unwrap(), Category::WebDesign);
        assert!("Sculpture".parse::<Category>().is_err());
    }

    #[test]
    fn test_filter_all_is_identity() {
        let projects: Vec<Project> = (0..6)
            .map(|i| make_project(i, Category::ALL[i as usize % 5]))
            .collect();

        let filtered = filter_projects(&projects, &CategoryFilter::All);
        assert_eq!(filtered.len(), projects.len());
        for (a, b) in filtered.iter().zip(projects.iter()) {
            assert_eq!(a.id, b.id);
        }
    }

    #[test]
    fn test_filter_by_category_preserves_order() {
        let projects = vec![
            make_project(1, Category::Branding),
            make_project(2, Category::Typography),
            make_project(3, Category::Branding),
            make_project(4, Category::Packaging),
            make_project(5, Category::Branding),
        ];

        let filtered = filter_projects(&projects, &CategoryFilter::Only(Category::Branding));
        let ids: Vec<u64> = filtered.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3, 5]);
        assert!(filtered.iter().all(|p| p.category == Category::Branding));
    }

    #[test]
    fn test_filter_no_matches() {
        let projects = vec![make_project(1, Category::Branding)];
        let filtered = filter_projects(&projects, &CategoryFilter::Only(Category::Packaging));
        assert!(filtered.is_empty());
    }
}
