use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "charmgen",
    about = "charmgen — generate charms and deployment bundles from a release catalog",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate every local charm and the deployment bundle for a release.
    ///
    /// Charms are written to <dir>/trusty/<service>, the bundle to
    /// <dir>/bundles.yaml. Nothing is written if any service in the
    /// release topology is missing from the registry.
    Generate {
        /// Release catalog file
        #[arg(short, long, default_value = "charmgen.toml")]
        config: PathBuf,
        /// Output directory
        #[arg(short = 'd', long, default_value = ".")]
        dir: PathBuf,
        /// Release version to generate
        #[arg(value_name = "VERSION")]
        release: String,
    },
    /// Print the metadata and hook list of one service
    Metadata {
        #[arg(short, long, default_value = "charmgen.toml")]
        config: PathBuf,
        #[arg(value_name = "VERSION")]
        release: String,
        /// Registry key or topology instance name
        service: String,
        /// Output format: yaml or json
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },
    /// Print the deployment bundle of a release
    Bundle {
        #[arg(short, long, default_value = "charmgen.toml")]
        config: PathBuf,
        #[arg(value_name = "VERSION")]
        release: String,
        /// Output format: yaml or json
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },
    /// Write a starter charmgen.toml
    Init {
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
        /// Deployment name used as the bundle's top-level key
        #[arg(long, default_value = "cloudfoundry")]
        name: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("charmgen=info".parse()?)
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { config, dir, release } => {
            commands::generate::generate(&config, &dir, &release)
        }
        Commands::Metadata { config, release, service, format } => {
            commands::inspect::metadata(&config, &release, &service, &format)
        }
        Commands::Bundle { config, release, format } => {
            commands::inspect::bundle(&config, &release, &format)
        }
        Commands::Init { path, name } => commands::init::init(&path, &name),
    }
}
