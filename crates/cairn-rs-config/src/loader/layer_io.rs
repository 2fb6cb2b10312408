//! Default config file location.

use super::{DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILE};
use directories::UserDirs;
use std::path::PathBuf;

/// Default user config path under the home directory.
pub(super) fn default_user_config_path() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE)
    })
}
