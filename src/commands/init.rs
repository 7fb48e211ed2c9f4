use crate::config::{GrowthmapConfig, CONFIG_FILE_NAME};
use crate::io;
use anyhow::Result;
use std::path::Path;

pub fn init_config(force: bool) -> Result<()> {
    init_config_in(Path::new("."), force)?;
    println!("Created {CONFIG_FILE_NAME} configuration file");
    Ok(())
}

pub(crate) fn init_config_in(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    let contents = format!(
        "# Growthmap configuration\n\n{}",
        GrowthmapConfig::default_toml()?
    );
    io::write_file(&config_path, &contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_and_validate_config;
    use tempfile::TempDir;

    #[test]
    fn test_written_config_parses_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        init_config_in(dir.path(), false).unwrap();
        let contents = std::fs::read_to_string(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(
            parse_and_validate_config(&contents).unwrap(),
            GrowthmapConfig::default()
        );
    }

    #[test]
    fn test_existing_file_requires_force() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "# mine\n").unwrap();

        let err = init_config_in(dir.path(), false).unwrap_err();
        assert!(err.to_string().contains("--force"));

        init_config_in(dir.path(), true).unwrap();
        let contents = std::fs::read_to_string(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(contents.contains("[analysis]"));
    }
}
