//! DriftFS FUSE mount daemon.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use driftfs_client::{ClientConfig, HttpTransport, ProtocolClient, TokenStore};
use driftfs_engine::RemoteFs;
use driftfs_fuse::mount::{options_to_fuser, parse_mount_options, validate_mountpoint};
use driftfs_fuse::{DriftConfig, DriftFilesystem};

#[derive(Parser, Debug)]
#[command(name = "driftfs", version, about = "Mount a remote drive as a local filesystem")]
struct Args {
    /// Directory to mount the remote drive on.
    mountpoint: PathBuf,

    /// Directory holding driftfs.toml and the cached tokens.
    #[arg(long, env = "DRIFTFS_CONFIG_DIR", default_value = ".")]
    config_dir: PathBuf,

    /// Comma-separated mount options: allow_other, allow_root,
    /// default_permissions, auto_unmount, ro, rw.
    #[arg(short, long, default_value = "auto_unmount")]
    options: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    validate_mountpoint(&args.mountpoint)?;
    let opts = parse_mount_options(&args.options)?;

    let config = ClientConfig::from_dir(&args.config_dir)?;
    let store = TokenStore::new(&args.config_dir);
    let transport = HttpTransport::new().map_err(|e| anyhow::anyhow!("http client: {e}"))?;
    let mut client = ProtocolClient::new(config, store, Box::new(transport))?;
    client.initialize()?;

    let engine = Arc::new(RemoteFs::new(client));

    let fs_config = DriftConfig {
        uid: unsafe { libc::getuid() },
        gid: unsafe { libc::getgid() },
        ..DriftConfig::default()
    };

    tracing::info!("mounting driftfs on {}", args.mountpoint.display());
    fuser::mount2(
        DriftFilesystem::new(fs_config, engine),
        &args.mountpoint,
        &options_to_fuser(&opts),
    )?;

    Ok(())
}
