use crate::error::{Error, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Files in `~/.ssh` that have nothing to do with key pairs
const RESERVED_NAMES: [&str; 3] = ["config", "known_hosts", "authorized_keys"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    #[default]
    Ed25519,
    Rsa,
    Ecdsa,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Ed25519 => "ed25519",
            KeyType::Rsa => "rsa",
            KeyType::Ecdsa => "ecdsa",
        }
    }

    /// Key length (or curve size) used when none is given; ed25519 has none.
    pub fn default_bits(&self) -> Option<u32> {
        match self {
            KeyType::Ed25519 => None,
            KeyType::Rsa => Some(4096),
            KeyType::Ecdsa => Some(256),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// List private keys in `key_dir` that have a `<name>.pub` sibling.
///
/// Entries come back in directory order. A missing directory has no keys.
pub fn list_keys(key_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(key_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!("Key directory not found at {:?}", key_dir);
            return Ok(Vec::new());
        }
        Err(e) => return Err(Error::io(key_dir, e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(key_dir, e))?;
        let file_type = entry.file_type().map_err(|e| Error::io(entry.path(), e))?;
        if file_type.is_dir() {
            continue;
        }
        files.push(entry.file_name());
    }

    let stems: HashSet<&OsStr> = files
        .iter()
        .filter(|name| is_public_key(name))
        .filter_map(|name| Path::new(name).file_stem())
        .collect();

    let keys: Vec<PathBuf> = files
        .iter()
        .filter(|name| !is_public_key(name) && !is_reserved(name))
        .filter(|name| stems.contains(name.as_os_str()))
        .map(|name| key_dir.join(name))
        .collect();

    tracing::debug!("Found {} key pairs in {:?}", keys.len(), key_dir);
    Ok(keys)
}

fn is_public_key(name: &OsStr) -> bool {
    Path::new(name).extension() == Some(OsStr::new("pub"))
}

fn is_reserved(name: &OsStr) -> bool {
    RESERVED_NAMES.iter().any(|reserved| name == OsStr::new(reserved))
        || name == OsStr::new(".known_hosts")
        || Path::new(name).extension() == Some(OsStr::new("known_hosts"))
}

/// Parameters handed to `ssh-keygen`.
#[derive(Debug, Clone, Default)]
pub struct KeyGenRequest {
    pub key_type: KeyType,
    pub bits: Option<u32>,
    pub comment: Option<String>,
    /// Target file; relative names live in the key directory
    pub file: Option<String>,
}

impl KeyGenRequest {
    pub fn target_path(&self, key_dir: &Path) -> PathBuf {
        match self.file.as_deref().filter(|f| !f.is_empty()) {
            None => key_dir.join(format!("id_{}", self.key_type)),
            Some(file) if Path::new(file).is_absolute() => PathBuf::from(file),
            Some(file) => key_dir.join(file),
        }
    }

    fn keygen_args(&self, target: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-t".into(),
            self.key_type.as_str().into(),
            "-f".into(),
            target.as_os_str().to_os_string(),
            "-q".into(),
            "-N".into(),
            "".into(),
        ];

        if let Some(bits) = self.bits.or_else(|| self.key_type.default_bits()) {
            if self.key_type != KeyType::Ed25519 {
                args.push("-b".into());
                args.push(bits.to_string().into());
            }
        }

        if let Some(comment) = self.comment.as_deref().filter(|c| !c.is_empty()) {
            args.push("-C".into());
            args.push(comment.into());
        }

        args
    }
}

/// Run `ssh-keygen` to create a new key pair and return the private key path.
///
/// Refuses to run when the target already exists; ssh-keygen would
/// otherwise stop and ask about overwriting it.
pub fn generate_key(key_dir: &Path, request: &KeyGenRequest) -> Result<PathBuf> {
    let target = request.target_path(key_dir);
    // symlink_metadata so a dangling link still counts as taken
    if fs::symlink_metadata(&target).is_ok() {
        return Err(Error::Conflict(format!(
            "key file already exists: {} (delete it first or choose a different filename)",
            target.display()
        )));
    }

    let keygen = which::which("ssh-keygen")
        .map_err(|e| Error::KeyGen(format!("ssh-keygen not found: {}", e)))?;

    let args = request.keygen_args(&target);
    tracing::info!("Generating {} key at {:?}", request.key_type, target);

    let status = Command::new(keygen)
        .args(&args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| Error::KeyGen(format!("failed to run ssh-keygen: {}", e)))?;

    if !status.success() {
        tracing::error!("ssh-keygen finished with a non-zero status: {}", status);
        return Err(Error::KeyGen(format!("ssh-keygen exited with {}", status)));
    }

    Ok(target)
}
