//! Plugin repository
//!
//! The engine's plugins are shared libraries. The repository only knows where
//! to look for them; loading is the engine's business.

use std::path::{Path, PathBuf};

/// Ordered list of directories searched for plugin libraries
#[derive(Debug, Clone, Default)]
pub struct PluginRepository {
    paths: Vec<PathBuf>,
}

impl PluginRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a directory at the front of the search order
    pub fn add_first_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.paths.retain(|p| p != &path);
        self.paths.insert(0, path);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// File names a plugin library may have across platforms
    pub fn library_file_names(name: &str) -> [String; 4] {
        [
            format!("lib{}.so", name),
            format!("{}.so", name),
            format!("lib{}.dylib", name),
            format!("{}.dll", name),
        ]
    }

    /// Find the first matching library file for `name`
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        let candidates = Self::library_file_names(name);
        self.paths
            .iter()
            .flat_map(|dir| candidates.iter().map(move |file| dir.join(file)))
            .find(|path| is_file(path))
    }
}

fn is_file(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sofa_plugin_{}_{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_add_first_path_prepends() {
        let mut repo = PluginRepository::new();
        repo.add_first_path("/a");
        repo.add_first_path("/b");
        repo.add_first_path("/a");
        assert_eq!(repo.paths(), &[PathBuf::from("/a"), PathBuf::from("/b")]);
    }

    #[test]
    fn test_locate_finds_library() {
        let dir = scratch_dir("locate");
        fs::write(dir.join("libSofa.Component.Mass.so"), b"").unwrap();

        let mut repo = PluginRepository::new();
        repo.add_first_path(&dir);

        assert_eq!(
            repo.locate("Sofa.Component.Mass"),
            Some(dir.join("libSofa.Component.Mass.so"))
        );
        assert!(repo.locate("SofaHaptics").is_none());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_search_order() {
        let first = scratch_dir("order_first");
        let second = scratch_dir("order_second");
        fs::write(first.join("SofaPython3.dll"), b"").unwrap();
        fs::write(second.join("libSofaPython3.so"), b"").unwrap();

        let mut repo = PluginRepository::new();
        repo.add_first_path(&second);
        repo.add_first_path(&first);

        assert_eq!(repo.locate("SofaPython3"), Some(first.join("SofaPython3.dll")));

        fs::remove_dir_all(&first).unwrap();
        fs::remove_dir_all(&second).unwrap();
    }

    #[test]
    fn test_directories_are_not_libraries() {
        let dir = scratch_dir("dirs");
        fs::create_dir_all(dir.join("libFake.so")).unwrap();

        let mut repo = PluginRepository::new();
        repo.add_first_path(&dir);
        assert!(repo.locate("Fake").is_none());

        fs::remove_dir_all(&dir).unwrap();
    }
}
