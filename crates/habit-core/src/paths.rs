use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const HABIT_DIR: &str = ".habit";
pub const STORE_FILE: &str = ".habit/store.json";
pub const CONFIG_FILE: &str = ".habit/config.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn habit_dir(root: &Path) -> PathBuf {
    root.join(HABIT_DIR)
}

pub fn store_path(root: &Path) -> PathBuf {
    root.join(STORE_FILE)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/home");
        assert_eq!(store_path(root), PathBuf::from("/tmp/home/.habit/store.json"));
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/home/.habit/config.yaml")
        );
    }
}
