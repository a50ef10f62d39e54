//! SIGIL CLI
//!
//! Command-line interface for minting prefix-constrained identities and
//! managing the local key vault.

mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Password};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sigil_core::constants::DEFAULT_PREFIX_LENGTH;
use sigil_core::traits::IdentityVault;
use sigil_core::types::{Identity, OriginNode};
use sigil_crypto::{check_prefix_length, decode, expected_attempts, matches_prefix};
use sigil_identity::{ChannelNotifier, Creation, IdentityRequest, IdentityService};
use sigil_vault::FileVault;

use crate::config::{CliConfig, ENV_VAULT_PATH};

/// SIGIL - prefix-constrained identities and key vault
#[derive(Parser)]
#[command(name = "sigil")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Vault file
    #[arg(long, global = true, env = ENV_VAULT_PATH)]
    vault: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mine a new identity
    New {
        /// Display name
        name: String,
        /// Number of leading zero bits the address must have
        #[arg(short, long, default_value_t = DEFAULT_PREFIX_LENGTH)]
        prefix: u8,
        /// Origin node (bitcoinauthenticator.org or localhost)
        #[arg(short, long)]
        node: Option<String>,
    },

    /// Import an existing private key
    Import {
        /// Display name
        name: String,
        /// Hex-encoded private key (prompted for if omitted)
        #[arg(short, long)]
        key: Option<String>,
        /// Number of leading zero bits the key's address must have
        #[arg(short, long, default_value_t = 0)]
        prefix: u8,
        /// Origin node (bitcoinauthenticator.org or localhost)
        #[arg(short, long)]
        node: Option<String>,
    },

    /// List stored identities
    List,

    /// Show one stored identity
    Show {
        /// Encoded address
        address: String,
    },

    /// Decode and check an address without touching the vault
    Decode {
        /// Encoded address
        address: String,
    },

    /// Print the private key of a stored identity
    ExportKey {
        /// Encoded address
        address: String,
    },

    /// Permanently delete a stored identity
    Delete {
        /// Encoded address
        address: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "sigil=debug,info"
    } else {
        "sigil=warn,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(
            cli.json_logs
                .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        )
        .with(
            (!cli.json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
        .init();

    let mut config = CliConfig::from_env().context("Invalid configuration")?;
    if let Some(path) = cli.vault {
        config.vault_path = path;
    }

    match cli.command {
        Commands::New { name, prefix, node } => cmd_new(&config, name, prefix, node).await,
        Commands::Import {
            name,
            key,
            prefix,
            node,
        } => cmd_import(&config, name, key, prefix, node).await,
        Commands::List => cmd_list(&config).await,
        Commands::Show { address } => cmd_show(&config, &address).await,
        Commands::Decode { address } => cmd_decode(&address),
        Commands::ExportKey { address } => cmd_export_key(&config, &address).await,
        Commands::Delete { address, yes } => cmd_delete(&config, &address, yes).await,
    }
}

/// Opens the vault, creating its directory on first use.
async fn open_vault(config: &CliConfig) -> Result<Arc<FileVault>> {
    if let Some(parent) = config.vault_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let vault = FileVault::open(&config.vault_path)
        .await
        .with_context(|| format!("Failed to open vault {}", config.vault_path.display()))?;
    Ok(Arc::new(vault))
}

/// Builds the identity service with a notifier whose queue is drained here.
///
/// The network watcher runs elsewhere; this process only logs the hand-off.
fn build_service(config: &CliConfig, vault: Arc<FileVault>) -> Result<IdentityService<FileVault>> {
    let (notifier, mut receiver) = ChannelNotifier::new(config.notify_capacity)?;
    tokio::spawn(async move {
        while let Some(request) = receiver.recv().await {
            info!(address = %request.address, node = %request.origin_node, "Watch requested");
        }
    });
    Ok(IdentityService::with_notifier(vault, Arc::new(notifier)))
}

fn resolve_node(config: &CliConfig, node: Option<String>) -> Result<OriginNode> {
    match node {
        Some(node) => Ok(node.parse()?),
        None => Ok(config.default_node),
    }
}

/// Describes a mining run, rejecting an out-of-range prefix first.
fn mining_banner(prefix: u8) -> Result<String> {
    check_prefix_length(prefix)?;
    Ok(format!(
        "{} {} bit prefix (~{} attempts expected)",
        "⛏️  Mining identity with".cyan().bold(),
        prefix,
        expected_attempts(prefix)
    ))
}

/// Mine a new identity
async fn cmd_new(config: &CliConfig, name: String, prefix: u8, node: Option<String>) -> Result<()> {
    let node = resolve_node(config, node)?;
    println!("{}", mining_banner(prefix)?);

    let vault = open_vault(config).await?;
    let service = build_service(config, vault)?;
    let pending = service.start(IdentityRequest::generate(name, prefix).origin_node(node))?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    let control = pending.control();
    let ticker = {
        let pb = pb.clone();
        let control = control.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(200));
            loop {
                interval.tick().await;
                if let Some(control) = &control {
                    pb.set_message(format!("{} attempts", control.attempts()));
                }
            }
        })
    };
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            if let Some(control) = control {
                control.cancel();
            }
        }
    });

    let creation = pending.complete().await;
    ticker.abort();
    interrupt.abort();
    pb.finish_and_clear();

    match creation.context("Failed to create identity")? {
        Creation::Created(identity) => {
            println!("\n{}", "✅ Identity created:".green().bold());
            print_identity(&identity);
        }
        Creation::Cancelled { attempts } => {
            println!("\n{} after {} attempts", "⚠️  Mining cancelled".yellow(), attempts);
        }
    }

    Ok(())
}

/// Import an existing private key
async fn cmd_import(
    config: &CliConfig,
    name: String,
    key: Option<String>,
    prefix: u8,
    node: Option<String>,
) -> Result<()> {
    let node = resolve_node(config, node)?;
    let key = match key {
        Some(key) => key,
        None => Password::new()
            .with_prompt("Private key (hex)")
            .interact()
            .context("Failed to read private key")?,
    };

    let vault = open_vault(config).await?;
    let service = build_service(config, vault)?;
    let creation = service
        .create(IdentityRequest::import(name, prefix, key).origin_node(node))
        .await
        .context("Failed to import key")?;

    match creation {
        Creation::Created(identity) => {
            println!("{}", "✅ Identity imported:".green().bold());
            print_identity(&identity);
            Ok(())
        }
        Creation::Cancelled { .. } => bail!("import was cancelled"),
    }
}

/// List stored identities
async fn cmd_list(config: &CliConfig) -> Result<()> {
    let vault = open_vault(config).await?;
    let identities = vault.list().await?;

    if identities.is_empty() {
        println!("{}", "No identities yet. Create one with `sigil new <name>`.".yellow());
        return Ok(());
    }

    println!("{} {}\n", identities.len().to_string().bold(), "identities:".cyan().bold());
    for identity in &identities {
        println!(
            "  {:<20} {}  {} {}",
            identity.display_name().bold(),
            identity.address().to_string().green(),
            format!("[{} bits]", identity.prefix_length()).dimmed(),
            identity.origin_node().to_string().dimmed(),
        );
    }

    Ok(())
}

/// Show one stored identity
async fn cmd_show(config: &CliConfig, address: &str) -> Result<()> {
    let vault = open_vault(config).await?;
    let identity = vault
        .find_by_address(address)
        .await
        .context("Identity not found")?;
    print_identity(&identity);
    Ok(())
}

/// Decode an address
fn cmd_decode(address: &str) -> Result<()> {
    let decoded = decode(address).context("Invalid address")?;

    println!("{}", "✅ Valid address".green().bold());
    println!("   {} {}", "Version:".dimmed(), decoded.version());
    println!("   {} {} bits", "Prefix length:".dimmed(), decoded.prefix_length());
    println!("   {} {}", "Payload:".dimmed(), hex::encode(decoded.payload()));
    println!("   {} {}", "Checksum:".dimmed(), hex::encode(decoded.checksum()));

    if matches_prefix(&decoded) {
        println!("   {} prefix satisfied", "✓".green());
    } else {
        println!("   {} payload does not satisfy its prefix", "✗".red());
    }

    Ok(())
}

/// Print a private key
async fn cmd_export_key(config: &CliConfig, address: &str) -> Result<()> {
    let vault = open_vault(config).await?;
    let secret = vault
        .export_private_key(address)
        .await
        .context("Identity not found")?;

    println!("{}", "⚠️  Anyone with this key controls the identity.".red().bold());
    println!("{}", secret.to_hex());
    Ok(())
}

/// Delete an identity
async fn cmd_delete(config: &CliConfig, address: &str, yes: bool) -> Result<()> {
    let vault = open_vault(config).await?;
    let identity = vault
        .find_by_address(address)
        .await
        .context("Identity not found")?;

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete '{}' ({})? Its private key will be lost forever",
                identity.display_name(),
                identity.address()
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", "Aborted.".yellow());
            return Ok(());
        }
    }

    vault.delete(identity.address().encoded()).await?;
    println!("{} {}", "🗑️  Deleted".green(), identity.address());
    Ok(())
}

fn print_identity(identity: &Identity) {
    let created = chrono::DateTime::from_timestamp(identity.created_at() as i64, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| identity.created_at().to_string());

    println!("   {} {}", "Name:".yellow(), identity.display_name());
    println!("   {} {}", "Address:".yellow(), identity.address().to_string().green());
    println!("   {} {} bits", "Prefix:".dimmed(), identity.prefix_length());
    println!("   {} {}", "Node:".dimmed(), identity.origin_node());
    println!("   {} {}", "Public key:".dimmed(), identity.keypair().public.to_hex());
    println!("   {} {}", "Created:".dimmed(), created);
}
