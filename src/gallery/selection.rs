use crate::models::Project;

/// Focused-item state for the lightbox.
///
/// At most one project is focused at a time; `None` means no overlay is
/// open. Set on tile activation, cleared on explicit close, on backdrop
/// activation, or on Escape.
#[derive(Debug, Default)]
pub struct Selection {
    focused: Option<Project>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Focuses `project`, replacing any previous focus.
    pub fn select(&mut self, project: Project) {
        self.focused = Some(project);
    }

    /// Clears the focus. Returns the previously focused project, if any.
    pub fn close(&mut self) -> Option<Project> {
        self.focused.take()
    }

    pub fn focused(&self) -> Option<&Project> {
        self.focused.as_ref()
    }

    pub fn is_focused(&self, id: u64) -> bool {
        self.focused.as_ref().is_some_and(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn make_project(id: u64) -> Project {
        Project::new(id, format!("Project {}", id), Category::Branding, "")
    }

    #[test]
    fn test_select_sets_focus() {
        let mut selection = Selection::new();
        assert!(selection.focused().is_none());

        selection.select(make_project(7));
        assert!(selection.is_focused(7));
        assert_eq!(selection.focused().unwrap().id, 7);
    }

    #[test]
    fn test_select_replaces_previous_focus() {
        let mut selection = Selection::new();
        selection.select(make_project(1));
        selection.select(make_project(2));

        assert!(!selection.is_focused(1));
        assert!(selection.is_focused(2));
    }

    #[test]
    fn test_close_clears_focus() {
        let mut selection = Selection::new();
        selection.select(make_project(3));

        let closed = selection.close();
        assert_eq!(closed.unwrap().id, 3);
        assert!(selection.focused().is_none());

        // Closing again is a no-op.
        assert!(selection.close().is_none());
    }
}
