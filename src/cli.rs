use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::keys::KeyType;

/// Manage hosts in ~/.ssh/config and the SSH keys next to it
#[derive(Parser, Debug)]
#[command(name = "mssh", author, version, about, long_about = None)]
pub struct Cli {
    /// Use this directory instead of ~/.ssh
    #[arg(long, global = true)]
    pub ssh_dir: Option<PathBuf>,

    /// Write debug output to the log file
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List hosts, optionally fuzzy-filtered
    List {
        query: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one host
    Show { alias: String },
    /// Append a new host block
    Add(AddArgs),
    /// Rewrite an existing host block
    Edit(EditArgs),
    /// Remove a host block
    Delete { alias: String },
    /// List private keys that have a matching .pub file
    Keys,
    /// Generate a new key pair with ssh-keygen
    Keygen(KeygenArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    pub alias: String,
    #[arg(long)]
    pub hostname: String,
    #[arg(long)]
    pub user: Option<String>,
    #[arg(long)]
    pub port: Option<String>,
    #[arg(long)]
    pub identity_file: Option<String>,
}

/// Unset flags keep the current value; an empty string clears it.
#[derive(Args, Debug)]
pub struct EditArgs {
    pub alias: String,
    /// Rename the host
    #[arg(long = "alias", value_name = "NEW_ALIAS")]
    pub new_alias: Option<String>,
    #[arg(long)]
    pub hostname: Option<String>,
    #[arg(long)]
    pub user: Option<String>,
    #[arg(long)]
    pub port: Option<String>,
    #[arg(long)]
    pub identity_file: Option<String>,
}

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Key algorithm (defaults to the configured one)
    #[arg(long = "type", value_enum)]
    pub key_type: Option<KeyType>,
    /// RSA key length or ECDSA curve size
    #[arg(long)]
    pub bits: Option<u32>,
    #[arg(long)]
    pub comment: Option<String>,
    /// Target file name; relative names go in the SSH directory
    #[arg(long)]
    pub file: Option<String>,
}
