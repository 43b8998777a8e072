mod commands;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use cropcatalog_core::config::RemoteConfig;
use cropcatalog_core::remote::cloudinary::CloudinaryHost;
use cropcatalog_core::remote::RemoteHost;
use cropcatalog_core::Catalog;
use tracing_subscriber::EnvFilter;

/// CropCatalog — field image catalog with a remote metadata mirror
#[derive(Parser)]
#[command(name = "cropcatalog", version, about)]
struct Cli {
    /// Path to the catalog database
    #[arg(long, default_value_t = default_db_path())]
    db: String,

    /// Path to the remote host credentials file
    #[arg(long, default_value_t = default_remote_config_path())]
    remote_config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add an image to the catalog, uploading it to the remote host
    Add {
        /// Path to the image file
        image: PathBuf,
        /// Observation note
        #[arg(long)]
        note: String,
        /// Plant or record title
        #[arg(long)]
        title: Option<String>,
        /// Owner or grower name
        #[arg(long)]
        owner: Option<String>,
        /// Disease or category label
        #[arg(long)]
        category: Option<String>,
        /// Location name
        #[arg(long)]
        location: Option<String>,
        /// Freeform details
        #[arg(long)]
        details: Option<String>,
        /// Skip the remote upload and keep the record local-only
        #[arg(long)]
        local_only: bool,
    },
    /// List catalog records, most recent first
    Ls {
        /// Case-insensitive filter on titles and notes
        query: Option<String>,
    },
    /// Show one record in full
    Show {
        /// Record id
        id: i64,
    },
    /// Edit a record's display fields
    Edit {
        /// Record id
        id: i64,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        details: Option<String>,
    },
    /// Remove a record (and queue a remote cleanup when mirrored)
    Rm {
        /// Record id
        id: i64,
    },
    /// Re-push the metadata of every mirrored record to the remote host
    Resync,
    /// Fetch the metadata currently stored on the host for an asset
    Context {
        /// Host-assigned public id
        public_id: String,
    },
}

fn default_db_path() -> String {
    home_dir().join("catalog.db").to_string_lossy().to_string()
}

fn default_remote_config_path() -> String {
    home_dir()
        .join("remote.json")
        .to_string_lossy()
        .to_string()
}

fn home_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".cropcatalog")
}

/// Remote ops need credentials; everything else should work without them.
fn open_host(config_path: &Path, required: bool) -> Result<Arc<dyn RemoteHost>> {
    if config_path.exists() {
        let config = RemoteConfig::load(config_path)?;
        return Ok(Arc::new(CloudinaryHost::new(config)));
    }
    if required {
        bail!(
            "remote credentials required: create {} with cloud_name, api_key and api_secret",
            config_path.display()
        );
    }
    Ok(Arc::new(commands::UnconfiguredHost))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db_path = PathBuf::from(&cli.db);
    let config_path = PathBuf::from(&cli.remote_config);

    // Only add (without --local-only) refuses to run unconfigured; edits,
    // removals and resync degrade to local-only best effort.
    let remote_required = matches!(
        &cli.command,
        Commands::Add {
            local_only: false,
            ..
        } | Commands::Context { .. }
    );
    let host = open_host(&config_path, remote_required)?;
    let catalog = Catalog::open(&db_path, host)?;

    match cli.command {
        Commands::Add {
            image,
            note,
            title,
            owner,
            category,
            location,
            details,
            local_only,
        } => commands::add::run(
            &catalog,
            commands::add::AddArgs {
                image,
                note,
                title,
                owner,
                category,
                location,
                details,
                local_only,
            },
        )?,
        Commands::Ls { query } => commands::ls::run(&catalog, query.as_deref())?,
        Commands::Show { id } => commands::show::run(&catalog, id)?,
        Commands::Edit {
            id,
            note,
            title,
            owner,
            category,
            location,
            details,
        } => commands::edit::run(
            &catalog,
            id,
            commands::edit::EditArgs {
                note,
                title,
                owner,
                category,
                location,
                details,
            },
        )?,
        Commands::Rm { id } => commands::rm::run(&catalog, id)?,
        Commands::Resync => commands::resync::run(&catalog)?,
        Commands::Context { public_id } => commands::context::run(&catalog, &public_id)?,
    }

    Ok(())
}
