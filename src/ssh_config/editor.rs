use crate::error::{Error, Result};
use crate::models::HostEntry;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Append a new `Host` block to the end of the config file, creating the
/// file (and its directory) first if needed. Existing content is never touched.
pub fn append_host(config_file: &Path, host: &HostEntry) -> Result<()> {
    ensure_config_exists(config_file)?;

    let mut file = OpenOptions::new()
        .append(true)
        .open(config_file)
        .map_err(|e| Error::io(config_file, e))?;

    let mut block = String::from("\n");
    for line in host.to_block_lines() {
        block.push_str(&line);
        block.push('\n');
    }

    file.write_all(block.as_bytes())
        .map_err(|e| Error::io(config_file, e))?;

    tracing::info!("Appended host '{}' to {:?}", host.alias, config_file);
    Ok(())
}

/// Replace the block of `original_alias` with `updated`.
///
/// Returns `false` (and leaves the file alone) when no block matches.
pub fn update_host(config_file: &Path, original_alias: &str, updated: &HostEntry) -> Result<bool> {
    let found = rewrite(config_file, original_alias, Some(updated))?;
    if found {
        tracing::info!("Updated host '{}' -> '{}'", original_alias, updated.alias);
    }
    Ok(found)
}

/// Remove the block of `alias`. Returns `false` when no block matches.
pub fn delete_host(config_file: &Path, alias: &str) -> Result<bool> {
    let found = rewrite(config_file, alias, None)?;
    if found {
        tracing::info!("Deleted host '{}'", alias);
    }
    Ok(found)
}

fn rewrite(config_file: &Path, alias: &str, replacement: Option<&HostEntry>) -> Result<bool> {
    let content = fs::read(config_file).map_err(|e| Error::io_or_not_found(config_file, e))?;

    match rewrite_block(&content, alias, replacement) {
        Some(new_content) => {
            write_replace(config_file, &new_content)?;
            Ok(true)
        }
        None => {
            tracing::warn!("Host '{}' not found in {:?}", alias, config_file);
            Ok(false)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Outside,
    InsideTarget,
}

/// Line scanner behind update and delete.
///
/// A block starts at a line equal (trimmed, ignoring case) to `Host <alias>`
/// and runs until the next line whose trimmed text starts with `Host `.
/// That block is swapped for `replacement`'s lines, or dropped when there is
/// none. Every other line is copied through byte for byte, whatever its
/// encoding. Returns `None` when no block matched.
fn rewrite_block(content: &[u8], alias: &str, replacement: Option<&HostEntry>) -> Option<Vec<u8>> {
    let target = format!("Host {}", alias).to_lowercase();
    let mut state = ScanState::Outside;
    let mut found = false;
    let mut out: Vec<Vec<u8>> = Vec::new();

    for line in content.split(|&b| b == b'\n') {
        let text = String::from_utf8_lossy(line);
        let trimmed = text.trim();

        if trimmed.to_lowercase() == target {
            found = true;
            state = ScanState::InsideTarget;
            if let Some(host) = replacement {
                out.extend(host.to_block_lines().into_iter().map(String::into_bytes));
            }
            continue;
        }

        if state == ScanState::InsideTarget {
            if trimmed.starts_with("Host ") {
                state = ScanState::Outside;
            } else {
                continue;
            }
        }

        out.push(line.to_vec());
    }

    found.then(|| out.join(&b'\n'))
}

fn ensure_config_exists(config_file: &Path) -> Result<()> {
    if config_file.exists() {
        return Ok(());
    }

    if let Some(dir) = parent_dir(config_file) {
        create_private_dir(dir).map_err(|e| Error::io(dir, e))?;
    }

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(false);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(config_file).map_err(|e| Error::io(config_file, e))?;

    tracing::info!("Created SSH config file at {:?}", config_file);
    Ok(())
}

fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)
}

/// Write `content` to a temporary sibling and rename it over `path`, so a
/// crash never leaves a half-written config behind.
fn write_replace(path: &Path, content: &[u8]) -> Result<()> {
    let dir = parent_dir(path).unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    tmp.write_all(content)
        .map_err(|e| Error::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| Error::io(tmp.path(), e))?;
    set_owner_only(tmp.path())?;

    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}

#[cfg(unix)]
fn set_owner_only(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| Error::io(path, e))
}

#[cfg(not(unix))]
fn set_owner_only(_path: &Path) -> Result<()> {
    Ok(())
}

fn parent_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}
