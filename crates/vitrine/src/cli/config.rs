//! The `vitrine config` command for configuration management.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use vitrine_core::Config;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Config file to operate on (defaults to the platform location)
    #[arg(long, global = true)]
    pub path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,

    /// Show the config file path
    Path,

    /// Write a config file populated with defaults
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn resolve_path(override_path: Option<PathBuf>) -> PathBuf {
    override_path.unwrap_or_else(Config::default_path)
}

/// Write a default config file at `path`, creating parent directories.
/// Refuses to clobber an existing file unless `force` is set.
fn write_default_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let toml = Config::default().to_toml()?;
    std::fs::write(path, toml)?;
    Ok(())
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    let path = resolve_path(args.path);

    match args.command {
        ConfigCommand::Show => {
            // Missing file is not an error here: show what the pipeline
            // would actually run with.
            let config = if path.exists() {
                Config::load_from(&path)?
            } else {
                Config::default()
            };
            println!("# {}", path.display());
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", path.display());
        }

        ConfigCommand::Init { force } => {
            write_default_config(&path, force)?;
            tracing::info!(path = %path.display(), "config file created");
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}
