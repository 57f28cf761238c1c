//! Host note storage
//!
//! The pipeline reads notes through the [`VaultStore`] trait. Two
//! implementations ship with the crate: [`FsVaultStore`] over a directory of
//! Markdown files and [`MockVaultStore`] for tests. [`parse_structural_metadata`]
//! emulates the host's structural parse for stores that have none.

pub mod fs;
pub mod metadata;
pub mod mock;
pub mod models;
pub mod traits;

pub use fs::FsVaultStore;
pub use metadata::{parse_structural_metadata, split_frontmatter};
pub use mock::MockVaultStore;
pub use models::*;
pub use traits::VaultStore;

/// File stem of a vault path (`folder/My Note.md` -> `My Note`).
pub fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.strip_suffix(".md").unwrap_or(name)
}

/// Whether `path` lies inside one of the excluded folders.
pub fn is_excluded(path: &str, excluded_folders: &[String]) -> bool {
    excluded_folders.iter().any(|folder| {
        let folder = folder.trim_matches('/');
        !folder.is_empty()
            && (path == folder
                || path
                    .strip_prefix(folder)
                    .is_some_and(|rest| rest.starts_with('/')))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("folder/My Note.md"), "My Note");
        assert_eq!(file_stem("plain"), "plain");
    }

    #[test]
    fn test_is_excluded() {
        let excluded = vec!["Templates".to_string(), "archive/".to_string()];
        assert!(is_excluded("Templates/daily.md", &excluded));
        assert!(is_excluded("archive/old/x.md", &excluded));
        assert!(!is_excluded("TemplatesNot/x.md", &excluded));
        assert!(!is_excluded("notes/x.md", &excluded));
    }
}
