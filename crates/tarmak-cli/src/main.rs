// ABOUTME: CLI entry point for the tarmak binary.
// ABOUTME: Dispatches ssh-key subcommands to the per-environment credential manager.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::Path;
use tarmak_cli::config::{
    resolve_config_directory, validate_environment_name, CONFIG_DIRECTORY_ENV,
    DEFAULT_CONFIG_DIRECTORY,
};
use tarmak_cli::explain_ssh_error;
use tarmak_ssh::{CredentialManager, EnvironmentSigner, RsaPrivateKey};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "tarmak")]
#[command(about = "Tarmak is a toolkit for provisioning and managing Kubernetes clusters.")]
#[command(version)]
struct Cli {
    /// Config directory for tarmak's configuration
    #[arg(
        short = 'c',
        long,
        global = true,
        env = CONFIG_DIRECTORY_ENV,
        default_value = DEFAULT_CONFIG_DIRECTORY
    )]
    config_directory: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage an environment's SSH key
    SshKey {
        /// Environment whose key to use
        #[arg(short, long)]
        environment: String,

        #[command(subcommand)]
        action: SshKeyCommands,
    },
}

#[derive(Subcommand)]
enum SshKeyCommands {
    /// Print the path of the private key file
    Path,

    /// Load the key, generating it on first use
    Ensure,

    /// Print the OpenSSH public key, generating the key on first use
    Public,

    /// Print the SHA256 fingerprint of an existing key
    Fingerprint,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tarmak_log::init(cli.verbose);

    let config_directory = resolve_config_directory(&cli.config_directory)?;
    debug!(config_directory = %config_directory.display(), "resolved config directory");

    match cli.command {
        Commands::SshKey {
            environment,
            action,
        } => run_ssh_key(&config_directory, &environment, action),
    }
}

/// Handle ssh-key subcommands
fn run_ssh_key(config_directory: &Path, environment: &str, action: SshKeyCommands) -> Result<()> {
    validate_environment_name(environment)?;
    let manager = CredentialManager::new(config_directory, environment);

    match action {
        SshKeyCommands::Path => {
            println!("{}", manager.key_path().display());
        }
        SshKeyCommands::Ensure => {
            let key = manager.load_or_generate().map_err(explain_ssh_error)?;
            let signer = signer_for(&manager, &key)?;
            info!(environment, "SSH key ready");
            println!("{}", manager.key_path().display());
            println!("{}", signer.fingerprint());
        }
        SshKeyCommands::Public => {
            let key = manager.load_or_generate().map_err(explain_ssh_error)?;
            let signer = signer_for(&manager, &key)?;
            println!("{}", signer.authorized_key()?);
        }
        SshKeyCommands::Fingerprint => {
            let key = manager.load().map_err(|e| {
                if e.is_not_found() {
                    anyhow::anyhow!(
                        "No SSH key for environment '{}' yet. Run 'tarmak ssh-key -e {} ensure' first.",
                        environment,
                        environment
                    )
                } else {
                    explain_ssh_error(e)
                }
            })?;
            let signer = signer_for(&manager, &key)?;
            println!("{}", signer.fingerprint());
        }
    }

    Ok(())
}

fn signer_for(manager: &CredentialManager, key: &RsaPrivateKey) -> Result<EnvironmentSigner> {
    let comment = format!("tarmak@{}", manager.environment());
    Ok(EnvironmentSigner::new(key, &comment)?)
}
