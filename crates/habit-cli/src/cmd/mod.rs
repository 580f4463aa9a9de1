pub mod chat;
pub mod goal;
pub mod init;
pub mod status;
pub mod track;

use anyhow::bail;
use habit_core::store::Store;
use std::path::Path;

/// Open the store, refusing to operate on an uninitialized root.
pub fn open_store(root: &Path) -> anyhow::Result<Store> {
    let store = Store::open(root);
    if !store.exists() {
        bail!(
            "no habit store in {}: run 'tinyhabit init' first",
            root.display()
        );
    }
    Ok(store)
}
