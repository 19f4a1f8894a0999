use std::path::{Path, PathBuf};

/// Locations of the SSH client config file and the key directory.
///
/// Resolved once at start-up and handed to every config/key operation, so
/// nothing below `main` looks at `$HOME` on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshPaths {
    pub config_file: PathBuf,
    pub key_dir: PathBuf,
}

impl SshPaths {
    /// `<home>/.ssh/config` and `<home>/.ssh/`
    pub fn from_home(home: &Path) -> Self {
        Self::from_ssh_dir(home.join(".ssh"))
    }

    pub fn from_ssh_dir(ssh_dir: impl Into<PathBuf>) -> Self {
        let key_dir = ssh_dir.into();
        Self {
            config_file: key_dir.join("config"),
            key_dir,
        }
    }
}

/// Expand a leading `~` against `home`.
pub fn expand_tilde(path: &str, home: &Path) -> PathBuf {
    if path == "~" {
        home.to_path_buf()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(path)
    }
}
