use anyhow::Context;
use habit_core::{config::HabitConfig, paths, store::Store};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing habit store in: {}", root.display());

    let store = Store::open(root);
    let existed = store.exists();
    store.init().context("failed to create habit store")?;
    if existed {
        println!("  exists:  {}", paths::STORE_FILE);
    } else {
        println!("  created: {}", paths::STORE_FILE);
    }

    let config_path = paths::config_path(root);
    if config_path.exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
    } else {
        HabitConfig::default()
            .save(root)
            .context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    }

    println!("\nNext: tinyhabit goal set \"Read 20 pages\"");
    Ok(())
}
