use std::fs;
use std::path::{Path, PathBuf};

use super::GrowthmapConfig;

pub const CONFIG_FILE_NAME: &str = ".growthmap.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Parse and validate config from a TOML string
pub fn parse_and_validate_config(contents: &str) -> Result<GrowthmapConfig, String> {
    let config = toml::from_str::<GrowthmapConfig>(contents)
        .map_err(|e| format!("Failed to parse {CONFIG_FILE_NAME}: {e}"))?;

    config
        .analysis
        .validate()
        .map_err(|e| format!("Invalid [analysis] section: {e}"))?;
    config
        .thresholds
        .validate()
        .map_err(|e| format!("Invalid [thresholds] section: {e}"))?;

    Ok(config)
}

/// Try loading config from a specific path
pub(crate) fn try_load_config_from_path(config_path: &Path) -> Option<GrowthmapConfig> {
    let contents = match fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_and_validate_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("{}. Using defaults.", e);
            None
        }
    }
}

fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    // Only log actual errors, not "file not found"
    if error.kind() != std::io::ErrorKind::NotFound {
        log::warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

/// Directory ancestors up to a depth limit, starting with `start`
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for the nearest config file
pub fn load_config_from(start: PathBuf) -> GrowthmapConfig {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            GrowthmapConfig::default()
        })
}

pub fn load_config() -> GrowthmapConfig {
    match std::env::current_dir() {
        Ok(dir) => load_config_from(dir),
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            GrowthmapConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_directory_ancestors_stops_at_depth() {
        let dirs: Vec<PathBuf> =
            directory_ancestors(PathBuf::from("/a/b/c/d"), 3).collect();
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/a/b/c/d"),
                PathBuf::from("/a/b/c"),
                PathBuf::from("/a/b"),
            ]
        );
    }

    #[test]
    fn test_finds_config_in_parent_directory() {
        let root = TempDir::new().unwrap();
        fs::write(
            root.path().join(CONFIG_FILE_NAME),
            "[analysis]\nenable_sampling = false\n",
        )
        .unwrap();
        let nested = root.path().join("src").join("deep");
        fs::create_dir_all(&nested).unwrap();

        let config = load_config_from(nested);
        assert!(!config.analysis.enable_sampling);
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let root = TempDir::new().unwrap();
        fs::write(
            root.path().join(CONFIG_FILE_NAME),
            "[analysis]\nsample_sizes = [100, 10]\n",
        )
        .unwrap();

        let config = load_config_from(root.path().to_path_buf());
        assert_eq!(config, GrowthmapConfig::default());
    }

    #[test]
    fn test_parse_reports_section() {
        let err = parse_and_validate_config("[thresholds]\nmedium_discount = 2.0\n").unwrap_err();
        assert!(err.contains("[thresholds]"));
    }
}
