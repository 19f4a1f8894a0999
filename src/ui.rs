use std::fmt::Write;
use std::path::PathBuf;

use crate::models::HostEntry;

/// One line per host: `alias  user@hostname:port`
pub fn host_table(hosts: &[HostEntry]) -> String {
    let mut out = String::new();
    for host in hosts {
        let _ = writeln!(
            out,
            "{:<20}  {}@{}:{}",
            host.alias,
            host.user,
            host.host_name,
            host.effective_port()
        );
    }
    out
}

pub fn host_details(host: &HostEntry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  Alias       : {}", host.alias);
    let _ = writeln!(out, "  HostName    : {}", host.host_name);
    let _ = writeln!(out, "  User        : {}", host.user);
    let _ = writeln!(out, "  Port        : {}", host.effective_port());
    let _ = writeln!(out, "  IdentityFile: {}", or_none(&host.identity_file));
    out
}

pub fn key_list(keys: &[PathBuf]) -> String {
    let mut out = String::new();
    for key in keys {
        let _ = writeln!(out, " • {}", key.display());
    }
    out
}

fn or_none(value: &str) -> &str {
    if value.is_empty() {
        "(none)"
    } else {
        value
    }
}
