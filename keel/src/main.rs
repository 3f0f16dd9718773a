//! Resource status and artifact registry CLI.
//!
//! Operates on the `.keel/` directory of the current working directory:
//! pause records, per-resource event histories and the artifact set store.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use keel::artifacts::{ArtifactRegistry, RegistryError};
use keel::core::types::{ArtifactType, DeliveryArtifact, DeliveryArtifactVersion};
use keel::exit_codes;
use keel::io::event_store::FileEventHistory;
use keel::io::init::{InitOptions, KeelPaths, init_keel};
use keel::io::pause_store::FilePauseTracker;
use keel::io::set_store::FileSetStore;
use keel::logging;
use keel::status::ResourceStatusService;

#[derive(Parser)]
#[command(
    name = "keel",
    version,
    about = "Resource status classification and delivery artifact registry"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create `.keel/` with config and empty stores.
    Init {
        /// Overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },
    /// Print the current status of a resource.
    Status {
        /// Resource id, e.g. `ec2:cluster:prod:fnord`.
        resource_id: String,
        /// Print the full status report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Register artifacts and record or list their versions.
    #[command(subcommand)]
    Artifact(ArtifactCommand),
}

#[derive(Subcommand)]
enum ArtifactCommand {
    /// Register an artifact identity (no-op if already registered).
    Register(ArtifactArgs),
    /// Record a discovered version of a registered artifact.
    Record {
        #[command(flatten)]
        artifact: ArtifactArgs,
        /// Version token, e.g. `1.2.3-h45.abcdef`.
        version: String,
        /// Metadata entry as `key=value`; may be repeated.
        #[arg(long = "meta", value_parser = parse_metadata)]
        metadata: Vec<(String, String)>,
    },
    /// Print a registered artifact; exits non-zero if it is not registered.
    Get(ArtifactArgs),
    /// Print recorded versions, newest first.
    Versions {
        #[command(flatten)]
        artifact: ArtifactArgs,
        /// Print full version records as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print all registered artifacts.
    List,
}

#[derive(Args)]
struct ArtifactArgs {
    /// Artifact name.
    name: String,
    /// Artifact type (`deb` or `docker`).
    #[arg(long = "type", short = 't')]
    kind: ArtifactType,
}

impl ArtifactArgs {
    fn artifact(&self) -> DeliveryArtifact {
        DeliveryArtifact::new(self.name.clone(), self.kind)
    }
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let root = std::env::current_dir().context("resolve current directory")?;
    match cli.command {
        Command::Init { force } => cmd_init(&root, force),
        Command::Status { resource_id, json } => cmd_status(&root, &resource_id, json),
        Command::Artifact(command) => cmd_artifact(&root, command),
    }
}

fn cmd_init(root: &Path, force: bool) -> Result<i32> {
    let paths = init_keel(root, &InitOptions { force })?;
    println!("initialized {}", paths.keel_dir.display());
    Ok(exit_codes::OK)
}

fn cmd_status(root: &Path, resource_id: &str, json: bool) -> Result<i32> {
    let paths = KeelPaths::load(root)?;
    let service = ResourceStatusService::new(
        FileEventHistory::new(&paths.events_dir),
        FilePauseTracker::new(&paths.paused_path),
    );
    let report = service.status_report(resource_id);
    if json {
        print_json(&report)?;
    } else {
        println!("{}", report.status);
    }
    Ok(exit_codes::OK)
}

fn cmd_artifact(root: &Path, command: ArtifactCommand) -> Result<i32> {
    let paths = KeelPaths::load(root)?;
    let registry = ArtifactRegistry::new(FileSetStore::new(&paths.sets_path));
    match command {
        ArtifactCommand::Register(args) => {
            let artifact = args.artifact();
            if registry.register(&artifact)? {
                println!("registered {}", artifact);
            } else {
                println!("already registered {}", artifact);
            }
            Ok(exit_codes::OK)
        }
        ArtifactCommand::Record {
            artifact,
            version,
            metadata,
        } => {
            let mut record = DeliveryArtifactVersion::new(artifact.artifact(), version);
            record.metadata.extend(metadata);
            match registry.record_version(&record) {
                Ok(_) => {
                    println!("recorded {} {}", record.artifact, record.version);
                    Ok(exit_codes::OK)
                }
                Err(err @ RegistryError::NotRegistered { .. }) => {
                    eprintln!("{} (register it first)", err);
                    Ok(exit_codes::NOT_REGISTERED)
                }
                Err(err) => Err(err.into()),
            }
        }
        ArtifactCommand::Get(args) => match registry.get(&args.name, args.kind)? {
            Some(artifact) => {
                print_json(&artifact)?;
                Ok(exit_codes::OK)
            }
            None => {
                eprintln!("artifact {} is not registered", args.artifact());
                Ok(exit_codes::NOT_FOUND)
            }
        },
        ArtifactCommand::Versions { artifact, json } => {
            let versions = registry.versions(&artifact.artifact())?;
            if json {
                print_json(&versions)?;
            } else {
                for version in &versions {
                    println!("{}", version.version);
                }
            }
            Ok(exit_codes::OK)
        }
        ArtifactCommand::List => {
            for artifact in registry.artifacts()? {
                println!("{}", artifact);
            }
            Ok(exit_codes::OK)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value).context("serialize json")?;
    println!("{}", payload);
    Ok(())
}

fn parse_metadata(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    if key.trim().is_empty() {
        return Err(format!("metadata key must be non-empty in '{}'", raw));
    }
    Ok((key.trim().to_string(), value.to_string()))
}
