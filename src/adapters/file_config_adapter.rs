//! INI configuration adapter.
//!
//! Section and key names are case-insensitive. Values are trimmed, and a key
//! with an empty value reads as absent.

use std::path::{Path, PathBuf};

use configparser::ini::Ini;

use crate::domain::error::BarlensError;
use crate::ports::config_port::ConfigPort;

#[derive(Debug)]
pub struct FileConfigAdapter {
    ini: Ini,
    source: PathBuf,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BarlensError> {
        let path = path.as_ref();
        let mut ini = Ini::new();
        ini.load(path).map_err(|reason| BarlensError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        log::debug!("loaded config from {}", path.display());
        Ok(Self {
            ini,
            source: path.to_path_buf(),
        })
    }

    pub fn from_string(content: &str) -> Result<Self, BarlensError> {
        let mut ini = Ini::new();
        ini.read(content.to_string())
            .map_err(|reason| BarlensError::ConfigParse {
                file: "<inline>".to_string(),
                reason,
            })?;
        Ok(Self {
            ini,
            source: PathBuf::from("<inline>"),
        })
    }

    /// Path the config was loaded from, `<inline>` for string input.
    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.ini
            .get(section, key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.get_string(section, key)
            .and_then(|value| value.parse().ok())
            .unwrap_or(default)
    }
}
