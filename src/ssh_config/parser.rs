use crate::error::{Error, Result};
use crate::models::HostEntry;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Read the config file and return its host blocks in file order.
///
/// A missing file is an empty config.
pub fn list_hosts(config_file: &Path) -> Result<Vec<HostEntry>> {
    let content = match fs::read(config_file) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!("SSH config file not found at {:?}", config_file);
            return Ok(Vec::new());
        }
        Err(e) => return Err(Error::io(config_file, e)),
    };

    let hosts = parse(&content)?;
    tracing::info!("Loaded {} hosts from SSH config", hosts.len());
    Ok(hosts)
}

/// Decode raw config bytes into host entries.
///
/// The `Host *` defaults block and anything before the first `Host` line are
/// not reported. Only `HostName`, `User`, `Port` and `IdentityFile` are kept;
/// other directives are skipped.
pub fn parse(content: &[u8]) -> Result<Vec<HostEntry>> {
    let text = decode(content)?;

    let mut hosts = Vec::new();
    // None while outside a reportable block (global section, `Host *`, `Match`)
    let mut current_host: Option<HostEntry> = None;

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (keyword, value) = split_directive(line);
        let keyword = keyword.to_ascii_lowercase();

        match keyword.as_str() {
            "host" => {
                if let Some(host) = current_host.take() {
                    hosts.push(host);
                }

                let alias = value.split_whitespace().next().ok_or_else(|| Error::Parse {
                    line: line_no,
                    message: "Host directive without a pattern".to_string(),
                })?;

                if alias != "*" {
                    current_host = Some(HostEntry::new(alias));
                }
                continue;
            }
            "match" => {
                if let Some(host) = current_host.take() {
                    hosts.push(host);
                }
                continue;
            }
            _ => {}
        }

        let Some(host) = current_host.as_mut() else {
            continue;
        };

        let field = match keyword.as_str() {
            "hostname" => &mut host.host_name,
            "user" => &mut host.user,
            "port" => &mut host.port,
            "identityfile" => &mut host.identity_file,
            _ => continue,
        };

        if value.is_empty() {
            return Err(Error::Parse {
                line: line_no,
                message: format!("missing value for {}", keyword),
            });
        }
        *field = value.to_string();
    }

    if let Some(host) = current_host {
        hosts.push(host);
    }

    Ok(hosts)
}

fn decode(content: &[u8]) -> Result<&str> {
    std::str::from_utf8(content).map_err(|e| Error::Parse {
        line: line_at(content, e.valid_up_to()),
        message: "invalid UTF-8".to_string(),
    })
}

/// Split `Keyword value` or `Keyword=value` into its two halves, dropping a
/// trailing `# comment` from the value.
fn split_directive(line: &str) -> (&str, &str) {
    let end = line
        .find(|c: char| c.is_whitespace() || c == '=')
        .unwrap_or(line.len());
    let (keyword, rest) = line.split_at(end);
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('=').unwrap_or(rest).trim_start();
    (keyword, strip_comment(rest).trim())
}

/// A `#` starts a comment at the beginning of the value or after whitespace.
fn strip_comment(value: &str) -> &str {
    let cut = value
        .char_indices()
        .find(|&(i, c)| c == '#' && (i == 0 || value[..i].ends_with(char::is_whitespace)))
        .map(|(i, _)| i);
    match cut {
        Some(i) => &value[..i],
        None => value,
    }
}

fn line_at(content: &[u8], offset: usize) -> usize {
    content[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}
