pub mod book;
pub mod corpus;
pub mod flatten;
pub mod gematria;
pub mod logger;
pub mod types;

use std::error::Error;
use std::fs::create_dir_all;
use std::path::PathBuf;

use app_dirs::{AppDataType, AppInfo, get_app_root};

pub const APP_INFO: AppInfo = AppInfo { name: "otzaria-convert", author: "otzaria" };

/// Per-user application data directory, created on first access.
/// Holds the log file.
pub fn get_create_otzaria_dir() -> Result<PathBuf, Box<dyn Error>> {
    let p = get_app_root(AppDataType::UserData, &APP_INFO)?;
    if !p.exists() {
        create_dir_all(&p)?;
    }
    Ok(p)
}
