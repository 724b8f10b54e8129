//! Command-line argument definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::ftp::DEFAULT_CONFIG;
use crate::model::ResourceKind;

/// berth - an interactive console for container engine resources
#[derive(Parser, Debug)]
#[command(name = "berth")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Skip every confirmation prompt, in the console too
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Log file (default: berth.log in the temp directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the logging level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Enable verbose logging (equivalent to --log-level debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run (omit to open the container console)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Filter directive for the subscriber when `RUST_LOG` is unset.
    pub fn log_directive(&self) -> &str {
        if self.verbose { "debug" } else { self.log_level.as_str() }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive console for containers, images, volumes and networks
    Console,

    /// Interactive console for an FTP daemon configuration file
    Ftp {
        #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },

    /// List containers
    List {
        #[arg(long)]
        json: bool,
    },

    /// List images
    Images {
        #[arg(long)]
        json: bool,
    },

    /// List volumes with the containers using them
    Volumes {
        #[arg(long)]
        json: bool,
    },

    /// List networks
    Networks {
        #[arg(long)]
        json: bool,
    },

    /// Start a container
    Start { name: String },

    /// Stop a container, or every running one with --all
    Stop(Selection),

    /// Restart a container
    Restart { name: String },

    /// Show the last lines of a container's log
    Logs { name: String },

    /// Open a shell inside a container
    Shell { name: String },

    /// Show the full detail of a resource
    Inspect {
        name: String,
        #[arg(long, value_enum, default_value_t = KindArg::Container)]
        kind: KindArg,
    },

    /// Remove a container, or all of them with --all
    Rm(Selection),

    /// Remove an image, or all of them with --all
    Rmi(Selection),

    /// Remove a volume, or all of them with --all
    Rmv(Selection),

    /// Remove a network, or every custom one with --all
    Rmn(Selection),

    /// Remove unused resources of one kind, or of every kind
    Prune {
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },

    /// Stop and remove every container, volume, custom network and image
    Reset,
}

/// One named resource or `--all`.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    #[arg(required_unless_present = "all")]
    pub name: Option<String>,

    #[arg(long, conflicts_with = "name")]
    pub all: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    Container,
    Image,
    Volume,
    Network,
}

impl From<KindArg> for ResourceKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Container => ResourceKind::Container,
            KindArg::Image => ResourceKind::Image,
            KindArg::Volume => ResourceKind::Volume,
            KindArg::Network => ResourceKind::Network,
        }
    }
}
