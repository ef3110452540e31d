//! pacfs-mount: Mount the installed pacman packages as a directory tree.
//!
//! # Usage
//!
//! ```bash
//! # Mount in the foreground (Ctrl+C or `fusermount -u` to stop)
//! pacfs-mount ~/packages
//!
//! ls ~/packages/pacman
//! readlink ~/packages/pacman/glibc.dep
//! ```

use clap::Parser;
use env_logger::Env;
use log::{error, info};
use pacfs::{MountConfig, PackageTree};
use std::fs;
use std::path::PathBuf;
use std::process;

/// Expose installed packages as a read-only filesystem.
///
/// Each package is a directory with metadata files and one symlink per
/// installed dependency.
#[derive(Parser, Debug)]
#[command(name = "pacfs-mount")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Where to mount the file system (created if missing)
    #[arg(value_name = "MOUNTPOINT")]
    mountpoint: PathBuf,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Package database directory (default: /var/lib/pacman)
    #[arg(long, value_name = "DIR")]
    db_path: Option<PathBuf>,

    /// Installation root backup paths are relative to (default: /)
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// pacman configuration listing the repositories
    #[arg(long, value_name = "FILE")]
    pacman_conf: Option<PathBuf>,

    /// Do not search icon directories for package icons
    #[arg(long)]
    no_icon_lookup: bool,

    /// Do not expose .directory and url.desktop files
    #[arg(long)]
    no_desktop_entries: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable FUSE debugging output
    #[arg(long)]
    debug_fuse: bool,
}

fn build_config(args: &Args, mount_path: PathBuf) -> pacfs::Result<MountConfig> {
    let mut config = match &args.config {
        Some(path) => MountConfig::from_toml_file(path)?,
        None => MountConfig::default(),
    };

    config.mount_path = mount_path;
    if let Some(db_path) = &args.db_path {
        config.db.db_path = db_path.clone();
    }
    if let Some(root) = &args.root {
        config.db.root_dir = root.clone();
    }
    if let Some(pacman_conf) = &args.pacman_conf {
        config.db.pacman_conf = pacman_conf.clone();
    }
    if args.no_icon_lookup {
        config.icon_lookup = false;
    }
    if args.no_desktop_entries {
        config.desktop_entries = false;
    }

    config.validate()?;
    Ok(config)
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    // Prepare the mount point
    if let Err(e) = fs::create_dir_all(&args.mountpoint) {
        error!("Cannot create {}: {}", args.mountpoint.display(), e);
        process::exit(1);
    }
    let mount_path = match fs::canonicalize(&args.mountpoint) {
        Ok(p) => p,
        Err(e) => {
            error!("Cannot resolve {}: {}", args.mountpoint.display(), e);
            process::exit(1);
        }
    };

    let config = match build_config(&args, mount_path) {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    // Load the package catalog
    info!("Reading package database: {}", config.db.db_path.display());
    let tree = match PackageTree::load(&config) {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to load packages: {}", e);
            process::exit(1);
        }
    };

    info!("Packages: {}", tree.catalog().len());
    if !tree.overflowed_packages().is_empty() {
        info!(
            "{} package listings truncated at {} entries",
            tree.overflowed_packages().len(),
            config.max_entries_per_package
        );
    }

    info!("Mounting at {}", config.mount_path.display());
    if let Err(e) = pacfs::fuse::mount(
        tree,
        &config.mount_path,
        config.attr_ttl(),
        args.debug_fuse,
    ) {
        error!("Mount error: {}", e);
        process::exit(1);
    }

    info!("Unmounted {}", config.mount_path.display());
}
