use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::path::PathBuf;

use crate::cli::{AddArgs, Command, EditArgs, KeygenArgs};
use crate::error::{Error, Result};
use crate::keys::{self, KeyGenRequest, KeyType};
use crate::models::HostEntry;
use crate::paths::SshPaths;
use crate::{ssh_config, ui};

/// Every call re-reads the config file; nothing is cached between commands.
#[derive(Debug)]
pub struct App {
    pub paths: SshPaths,
    pub default_key_type: KeyType,
}

impl App {
    pub fn new(paths: SshPaths, default_key_type: KeyType) -> Self {
        tracing::info!("SSH config path: {:?}", paths.config_file);
        Self {
            paths,
            default_key_type,
        }
    }

    pub fn run(&self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::List { query, json } => {
                let hosts = self.list_hosts(query.as_deref())?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&hosts)?);
                } else if hosts.is_empty() {
                    println!("No SSH hosts found in {}.", self.paths.config_file.display());
                } else {
                    print!("{}", ui::host_table(&hosts));
                }
            }
            Command::Show { alias } => {
                let host = self.find_host(&alias)?;
                print!("{}", ui::host_details(&host));
            }
            Command::Add(args) => {
                let alias = args.alias.clone();
                self.add_host(args)?;
                println!(
                    "Host [{}] added to {} successfully!",
                    alias,
                    self.paths.config_file.display()
                );
            }
            Command::Edit(args) => {
                let host = self.edit_host(&args)?;
                println!("Host updated successfully!");
                print!("{}", ui::host_details(&host));
            }
            Command::Delete { alias } => {
                self.delete_host(&alias)?;
                println!("Host [{}] deleted.", alias);
            }
            Command::Keys => {
                let keys = self.list_keys()?;
                if keys.is_empty() {
                    println!("No SSH private keys found in {}.", self.paths.key_dir.display());
                } else {
                    println!("SSH Private Keys:");
                    print!("{}", ui::key_list(&keys));
                }
            }
            Command::Keygen(args) => {
                let path = self.generate_key(args)?;
                println!("Key generated successfully: {}", path.display());
            }
        }
        Ok(())
    }

    /// Hosts in file order, or ranked by fuzzy score when `query` is given.
    pub fn list_hosts(&self, query: Option<&str>) -> Result<Vec<HostEntry>> {
        let hosts = ssh_config::list_hosts(&self.paths.config_file)?;

        let Some(query) = query.filter(|q| !q.is_empty()) else {
            return Ok(hosts);
        };

        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, HostEntry)> = hosts
            .into_iter()
            .filter_map(|host| {
                let score = [&host.alias, &host.host_name, &host.user]
                    .into_iter()
                    .filter_map(|field| matcher.fuzzy_match(field, query))
                    .max()?;
                Some((score, host))
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scored.into_iter().map(|(_, host)| host).collect())
    }

    pub fn find_host(&self, alias: &str) -> Result<HostEntry> {
        ssh_config::list_hosts(&self.paths.config_file)?
            .into_iter()
            .find(|h| h.matches_alias(alias))
            .ok_or_else(|| Error::HostNotFound(alias.to_string()))
    }

    pub fn add_host(&self, args: AddArgs) -> Result<()> {
        validate_alias(&args.alias)?;

        let hosts = ssh_config::list_hosts(&self.paths.config_file)?;
        if hosts.iter().any(|h| h.matches_alias(&args.alias)) {
            return Err(Error::Conflict(format!("host '{}' already exists", args.alias)));
        }

        let host = HostEntry::new(args.alias)
            .with_host_name(args.hostname)
            .with_user(args.user.unwrap_or_default())
            .with_port(args.port.unwrap_or_default())
            .with_identity_file(args.identity_file.unwrap_or_default());
        ssh_config::append_host(&self.paths.config_file, &host)
    }

    pub fn edit_host(&self, args: &EditArgs) -> Result<HostEntry> {
        let hosts = ssh_config::list_hosts(&self.paths.config_file)?;
        let current = hosts
            .iter()
            .find(|h| h.matches_alias(&args.alias))
            .ok_or_else(|| Error::HostNotFound(args.alias.clone()))?;

        let mut updated = current.clone();
        if let Some(alias) = &args.new_alias {
            validate_alias(alias)?;
            let taken = hosts
                .iter()
                .any(|h| h.matches_alias(alias) && !h.matches_alias(&current.alias));
            if taken {
                return Err(Error::Conflict(format!("host '{}' already exists", alias)));
            }
            updated.alias = alias.clone();
        }
        if let Some(host_name) = &args.hostname {
            updated.host_name = host_name.clone();
        }
        if let Some(user) = &args.user {
            updated.user = user.clone();
        }
        if let Some(port) = &args.port {
            updated.port = port.clone();
        }
        if let Some(identity_file) = &args.identity_file {
            updated.identity_file = identity_file.clone();
        }

        if !ssh_config::update_host(&self.paths.config_file, &current.alias, &updated)? {
            return Err(Error::HostNotFound(current.alias.clone()));
        }
        Ok(updated)
    }

    pub fn delete_host(&self, alias: &str) -> Result<()> {
        if !ssh_config::delete_host(&self.paths.config_file, alias)? {
            return Err(Error::HostNotFound(alias.to_string()));
        }
        Ok(())
    }

    pub fn list_keys(&self) -> Result<Vec<PathBuf>> {
        keys::list_keys(&self.paths.key_dir)
    }

    pub fn generate_key(&self, args: KeygenArgs) -> Result<PathBuf> {
        let request = KeyGenRequest {
            key_type: args.key_type.unwrap_or(self.default_key_type),
            bits: args.bits,
            comment: args.comment,
            file: args.file,
        };
        keys::generate_key(&self.paths.key_dir, &request)
    }
}

fn validate_alias(alias: &str) -> Result<()> {
    if alias.is_empty() || alias == "*" || alias.chars().any(char::is_whitespace) {
        return Err(Error::InvalidAlias(alias.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn app_in(dir: &TempDir) -> App {
        App::new(SshPaths::from_ssh_dir(dir.path().join(".ssh")), KeyType::Ed25519)
    }

    fn add_args(alias: &str, hostname: &str) -> AddArgs {
        AddArgs {
            alias: alias.to_string(),
            hostname: hostname.to_string(),
            user: None,
            port: None,
            identity_file: None,
        }
    }

    fn edit_args(alias: &str) -> EditArgs {
        EditArgs {
            alias: alias.to_string(),
            new_alias: None,
            hostname: None,
            user: None,
            port: None,
            identity_file: None,
        }
    }

    #[test]
    fn test_add_then_list_normalizes_default_port() {
        let dir = TempDir::new().unwrap();
        let app = app_in(&dir);

        app.add_host(AddArgs {
            user: Some("ubuntu".to_string()),
            port: Some("22".to_string()),
            ..add_args("web1", "1.2.3.4")
        })
        .unwrap();

        assert_eq!(
            app.list_hosts(None).unwrap(),
            vec![HostEntry::new("web1").with_host_name("1.2.3.4").with_user("ubuntu")]
        );
    }

    #[test]
    fn test_add_duplicate_alias_is_conflict() {
        let dir = TempDir::new().unwrap();
        let app = app_in(&dir);
        app.add_host(add_args("web1", "1.2.3.4")).unwrap();
        let before = fs::read_to_string(&app.paths.config_file).unwrap();

        let err = app.add_host(add_args("WEB1", "5.6.7.8")).unwrap_err();

        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(fs::read_to_string(&app.paths.config_file).unwrap(), before);
    }

    #[test]
    fn test_add_rejects_wildcard_and_spaces() {
        let dir = TempDir::new().unwrap();
        let app = app_in(&dir);

        assert!(matches!(app.add_host(add_args("*", "h")), Err(Error::InvalidAlias(_))));
        assert!(matches!(app.add_host(add_args("a b", "h")), Err(Error::InvalidAlias(_))));
        assert!(!app.paths.config_file.exists());
    }

    #[test]
    fn test_delete_first_of_two_hosts() {
        let dir = TempDir::new().unwrap();
        let app = app_in(&dir);
        app.add_host(add_args("a", "a.local")).unwrap();
        app.add_host(AddArgs {
            port: Some("2200".to_string()),
            ..add_args("b", "b.local")
        })
        .unwrap();

        app.delete_host("a").unwrap();

        assert_eq!(
            app.list_hosts(None).unwrap(),
            vec![HostEntry::new("b").with_host_name("b.local").with_port("2200")]
        );
    }

    #[test]
    fn test_delete_unknown_host() {
        let dir = TempDir::new().unwrap();
        let app = app_in(&dir);
        app.add_host(add_args("a", "a.local")).unwrap();

        assert!(matches!(app.delete_host("zzz"), Err(Error::HostNotFound(_))));
    }

    #[test]
    fn test_delete_without_config_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let app = app_in(&dir);

        assert!(matches!(app.delete_host("a"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_edit_keeps_unset_fields_and_clears_empty_ones() {
        let dir = TempDir::new().unwrap();
        let app = app_in(&dir);
        app.add_host(AddArgs {
            user: Some("root".to_string()),
            port: Some("2222".to_string()),
            ..add_args("box", "box.local")
        })
        .unwrap();

        let updated = app
            .edit_host(&EditArgs {
                new_alias: Some("box2".to_string()),
                user: Some(String::new()),
                ..edit_args("BOX")
            })
            .unwrap();

        let expected = HostEntry::new("box2")
            .with_host_name("box.local")
            .with_port("2222");
        assert_eq!(updated, expected);
        assert_eq!(app.list_hosts(None).unwrap(), vec![expected]);
    }

    #[test]
    fn test_edit_rename_onto_existing_alias_is_conflict() {
        let dir = TempDir::new().unwrap();
        let app = app_in(&dir);
        app.add_host(add_args("a", "a.local")).unwrap();
        app.add_host(add_args("b", "b.local")).unwrap();

        let err = app
            .edit_host(&EditArgs {
                new_alias: Some("B".to_string()),
                ..edit_args("a")
            })
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        // Changing only the case of its own alias is allowed
        let updated = app
            .edit_host(&EditArgs {
                new_alias: Some("A".to_string()),
                ..edit_args("a")
            })
            .unwrap();
        assert_eq!(updated.alias, "A");
    }

    #[test]
    fn test_edit_unknown_host() {
        let dir = TempDir::new().unwrap();
        let app = app_in(&dir);
        app.add_host(add_args("a", "a.local")).unwrap();

        assert!(matches!(app.edit_host(&edit_args("nope")), Err(Error::HostNotFound(_))));
    }

    #[test]
    fn test_find_host_ignores_case() {
        let dir = TempDir::new().unwrap();
        let app = app_in(&dir);
        app.add_host(add_args("Prod", "prod.local")).unwrap();

        assert_eq!(app.find_host("prod").unwrap().host_name, "prod.local");
        assert!(matches!(app.find_host("dev"), Err(Error::HostNotFound(_))));
    }

    #[test]
    fn test_list_hosts_fuzzy_filter() {
        let dir = TempDir::new().unwrap();
        let app = app_in(&dir);
        app.add_host(add_args("web1", "10.0.0.1")).unwrap();
        app.add_host(add_args("db", "database.internal")).unwrap();
        app.add_host(add_args("web2", "10.0.0.2")).unwrap();

        let aliases: Vec<String> = app
            .list_hosts(Some("web"))
            .unwrap()
            .into_iter()
            .map(|h| h.alias)
            .collect();
        assert_eq!(aliases.len(), 2);
        assert!(aliases.iter().all(|a| a.starts_with("web")));

        let hosts = app.list_hosts(Some("database")).unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].alias, "db");
    }

    #[test]
    fn test_generate_key_conflict_uses_default_key_type() {
        let dir = TempDir::new().unwrap();
        let app = app_in(&dir);
        fs::create_dir_all(&app.paths.key_dir).unwrap();
        fs::write(app.paths.key_dir.join("id_ed25519"), "").unwrap();

        let err = app
            .generate_key(KeygenArgs {
                key_type: None,
                bits: None,
                comment: None,
                file: None,
            })
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }
}
