use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

use crate::db::DB_FILE_NAME;
use crate::profile::DEFAULT_PROFILE_URL;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".coal-mine";
const LOG_FILE_NAME: &str = "coal-mine.log";

/// Resolved runtime settings. Anything the command line leaves unset falls
/// back to a file inside `~/.coal-mine/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_path: PathBuf,
    pub profile_url: String,
}

impl AppConfig {
    pub fn resolve(
        db_path: Option<PathBuf>,
        log_path: Option<PathBuf>,
        profile_url: Option<String>,
    ) -> Result<Self> {
        let profile_url = profile_url.unwrap_or_else(|| DEFAULT_PROFILE_URL.to_string());

        if let (Some(db_path), Some(log_path)) = (&db_path, &log_path) {
            return Ok(Self {
                db_path: db_path.clone(),
                log_path: log_path.clone(),
                profile_url,
            });
        }

        let data_dir = data_dir()?;
        Ok(Self {
            db_path: db_path.unwrap_or_else(|| data_dir.join(DB_FILE_NAME)),
            log_path: log_path.unwrap_or_else(|| data_dir.join(LOG_FILE_NAME)),
            profile_url,
        })
    }
}

/// Resolve the application data directory inside the user's home.
fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
