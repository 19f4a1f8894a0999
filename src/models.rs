use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: &str = "22";

/// One `Host` block of the SSH client config.
///
/// Empty strings stand for directives that are absent from the block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEntry {
    pub alias: String,
    pub host_name: String,
    pub user: String,
    pub port: String,
    pub identity_file: String,
}

impl HostEntry {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            ..Default::default()
        }
    }

    pub fn with_host_name(mut self, host_name: impl Into<String>) -> Self {
        self.host_name = host_name.into();
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = port.into();
        self
    }

    pub fn with_identity_file(mut self, identity_file: impl Into<String>) -> Self {
        self.identity_file = identity_file.into();
        self
    }

    /// Port as ssh would use it
    pub fn effective_port(&self) -> &str {
        if self.port.is_empty() {
            DEFAULT_PORT
        } else {
            &self.port
        }
    }

    pub fn matches_alias(&self, alias: &str) -> bool {
        self.alias.to_lowercase() == alias.to_lowercase()
    }

    /// Render the block as written to the config file: the `Host` line, then
    /// two-space-indented directives. Empty fields are left out, and so is a
    /// port equal to the default.
    pub fn to_block_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Host {}", self.alias)];
        if !self.host_name.is_empty() {
            lines.push(format!("  HostName {}", self.host_name));
        }
        if !self.user.is_empty() {
            lines.push(format!("  User {}", self.user));
        }
        if !self.port.is_empty() && self.port != DEFAULT_PORT {
            lines.push(format!("  Port {}", self.port));
        }
        if !self.identity_file.is_empty() {
            lines.push(format!("  IdentityFile {}", self.identity_file));
        }
        lines
    }
}
