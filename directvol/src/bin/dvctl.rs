//! Command-line surface over the direct-volume metadata store.
//!
//! `dvctl` manages the persisted mount descriptors a VM-based container
//! runtime reads when attaching volumes to a guest:
//!
//! ```bash
//! dvctl add /mnt/vol1 '{"volume-type":"fs","fstype":"nfs","options":["10.0.0.1:/export"]}'
//! dvctl inspect /mnt/vol1
//! dvctl remove /mnt/vol1
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use directvol::{DEFAULT_ROOT, DirectVolumeStore};

#[derive(Parser)]
#[command(name = "dvctl")]
#[command(about = "Manage persisted direct-volume mount metadata", long_about = None)]
struct Cli {
    /// Root directory holding the volume metadata tree.
    #[arg(long, value_name = "DIR", default_value = DEFAULT_ROOT)]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a mount descriptor for a volume path.
    Add {
        #[arg(value_name = "VOLUME_PATH")]
        volume_path: String,
        /// Mount descriptor as a JSON document.
        #[arg(value_name = "MOUNT_INFO")]
        mount_info: String,
    },
    /// Delete all metadata recorded for a volume path.
    Remove {
        #[arg(value_name = "VOLUME_PATH")]
        volume_path: String,
    },
    /// Print the mount descriptor recorded for a volume path.
    Inspect {
        #[arg(value_name = "VOLUME_PATH")]
        volume_path: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let store = DirectVolumeStore::new(cli.root);

    match cli.command {
        Commands::Add {
            volume_path,
            mount_info,
        } => store
            .add(&volume_path, &mount_info)
            .with_context(|| format!("failed to add volume {volume_path}"))?,
        Commands::Remove { volume_path } => store
            .remove(&volume_path)
            .with_context(|| format!("failed to remove volume {volume_path}"))?,
        Commands::Inspect { volume_path } => {
            let info = store
                .mount_info(&volume_path)
                .with_context(|| format!("failed to load mount descriptor for {volume_path}"))?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }

    Ok(())
}
