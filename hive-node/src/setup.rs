use std::path::Path;

use hive_common::Result;
use tracing::info;

use crate::config::Config;

/// Writes a default config to `path` unless one already exists.
pub fn ensure_config(path: &str) -> Result<()> {
    if Path::new(path).exists() {
        return Ok(());
    }
    info!("⚠️ Config not found. Generating defaults at {}...", path);

    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let config = Config {
        name: format!("hive-{}", &suffix[..8]),
        ..Config::default()
    };

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    config.save_to_file(path)?;
    info!("✅ Config generated ({})", config.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_once_and_keeps_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let path = path.to_str().unwrap();

        ensure_config(path).unwrap();
        let first = Config::load_from_file(path).unwrap();
        assert!(first.name.starts_with("hive-"));

        ensure_config(path).unwrap();
        let second = Config::load_from_file(path).unwrap();
        assert_eq!(first.name, second.name);
    }
}
