use anyhow::{bail, Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{get_config_path, Config};

const HEADER: &str = "# gcg-score configuration\n\
# output.format: table | json\n\
# output.precision: decimal places for scores\n\
# output.colors: auto | always | never\n";

/// Write the default configuration file.
///
/// Refuses to overwrite an existing file unless `force` is set. Returns the
/// path written.
pub fn write_default_config(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let config_path = match path {
        Some(p) => p,
        None => get_config_path()?,
    };

    if config_path.exists() && !force {
        bail!(
            "Config file already exists at {}. Use --force to overwrite",
            config_path.display()
        );
    }

    if let Some(parent) = config_path.parent() {
        ensure_dir(parent)?;
    }

    let yaml = serde_saphyr::to_string(&Config::default())
        .context("Failed to serialize default config")?;

    let mut file = AtomicWriteFile::open(&config_path)
        .with_context(|| format!("Failed to open atomic write file at {}", config_path.display()))?;
    file.write_all(format!("{}{}", HEADER, yaml).as_bytes())
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    file.commit().context("Failed to save config")?;

    Ok(config_path)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.as_os_str().is_empty() && !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory at {}", dir.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use std::env;

    #[test]
    fn test_write_then_load_default_config() {
        let dir = env::temp_dir().join("gcg_score_test_init");
        let path = dir.join("config.yaml");
        let _ = fs::remove_file(&path);

        let written = write_default_config(Some(path.clone()), false).unwrap();
        assert_eq!(written, path);

        let loaded = load_config(Some(path.clone())).unwrap();
        assert_eq!(loaded, Config::default());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_refuses_overwrite_without_force() {
        let dir = env::temp_dir().join("gcg_score_test_init_force");
        let path = dir.join("config.yaml");
        let _ = fs::remove_dir_all(&dir);

        write_default_config(Some(path.clone()), false).unwrap();
        assert!(write_default_config(Some(path.clone()), false).is_err());
        assert!(write_default_config(Some(path.clone()), true).is_ok());

        let _ = fs::remove_dir_all(&dir);
    }
}
