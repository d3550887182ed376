//! Working-directory resolution for checks.
//!
//! Instead of mutating the process-wide current directory around each
//! check, the effective directory is composed explicitly from the ancestor
//! `working_directory` values along the path from the assignment root
//! through the student record down to the check.

use std::path::{Path, PathBuf};

/// Compose a working directory from a base and ancestor components.
///
/// Components are applied in order from outermost to innermost; `None`
/// components are inherited (skipped). An absolute component replaces
/// everything accumulated so far.
pub fn compose(base: &Path, components: &[Option<&str>]) -> PathBuf {
    let mut dir = base.to_path_buf();
    for component in components.iter().flatten() {
        dir.push(component);
    }
    dir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_nest_under_the_base() {
        let dir = compose(
            Path::new("/grading"),
            &[Some("jdoe"), Some("hw-01")],
        );
        assert_eq!(dir, PathBuf::from("/grading/jdoe/hw-01"));
    }

    #[test]
    fn missing_components_are_inherited() {
        let dir = compose(Path::new("/grading"), &[None, Some("hw-01"), None]);
        assert_eq!(dir, PathBuf::from("/grading/hw-01"));
    }

    #[test]
    fn absolute_component_overrides_ancestors() {
        let dir = compose(Path::new("/grading"), &[Some("jdoe"), Some("/srv/submissions")]);
        assert_eq!(dir, PathBuf::from("/srv/submissions"));
    }
}
