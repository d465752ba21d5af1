//! SuperSMP launcher command line.
//!
//! ## Commands
//!
//! - `versions`: list the game versions the pack is published for
//! - `download`: resolve, download and install the content pack (and its runtime)
//! - `install-runtime`: install one runtime version
//! - `launch`: build the launch command and start the game

mod progress;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use progress::ConsoleProgressReporter;
use smp_lib::game::launcher::spawn_invocation;
use smp_lib::{ContentVariant, LauncherConfig, LauncherError, LauncherPipeline, LoaderKind, PackSelection};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "smp-launcher")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Installs and launches the SuperSMP content pack", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Launcher data directory (runtime, libraries, assets, instance)
    #[arg(long, global = true, env = "SMP_DATA_DIR", default_value = ".supersmp")]
    data_dir: PathBuf,

    /// Catalog API base URL
    #[arg(long, global = true, env = "SMP_CATALOG_BASE")]
    catalog_base: Option<String>,

    /// Catalog project holding the pack
    #[arg(long, global = true, env = "SMP_PROJECT")]
    project: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List game versions the pack is available for
    Versions,

    /// Resolve, download and install the content pack
    Download {
        /// Mod loader the pack targets
        #[arg(short, long, default_value = "fabric")]
        loader: String,

        /// Game version (default: any)
        #[arg(short, long)]
        game_version: Option<String>,

        /// Content variant: standard or shaders
        #[arg(long)]
        variant: Option<ContentVariant>,

        /// Only install the pack, not its runtime
        #[arg(long)]
        skip_runtime: bool,
    },

    /// Install a runtime version (client, libraries, assets)
    InstallRuntime {
        /// Exact runtime version id, e.g. 1.20.1
        version: String,
    },

    /// Build the launch command and start the game
    Launch {
        /// Installed runtime version id
        version: String,

        /// Mod loader, decides the entry point when the version has none
        #[arg(short, long, default_value = "fabric")]
        loader: LoaderKind,

        /// Java executable
        #[arg(long, env = "JAVA_PATH", default_value = "java")]
        java: PathBuf,

        /// Print the command instead of running it
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut config = match &cli.catalog_base {
        Some(base) => LauncherConfig {
            catalog_base: base.trim_end_matches('/').to_string(),
            ..LauncherConfig::default()
        },
        None => LauncherConfig::default(),
    };
    if let Some(project) = &cli.project {
        config.project_id = project.clone();
    }

    let pipeline =
        LauncherPipeline::new(config, &cli.data_dir).context("Failed to set up launcher")?;
    log::debug!("{:?}", pipeline);

    match cli.command {
        Commands::Versions => {
            let versions = pipeline.available_game_versions().await?;
            if versions.is_empty() {
                println!("No versions published.");
            }
            for version in versions {
                println!("{}", version);
            }
        }

        Commands::Download {
            loader,
            game_version,
            variant,
            skip_runtime,
        } => {
            let selection = PackSelection::new(loader)
                .with_game_version(game_version)
                .with_variant(variant);
            let reporter = Arc::new(ConsoleProgressReporter::default());

            let record = match pipeline.resolve(&selection).await {
                Ok(record) => record,
                Err(LauncherError::NoMatch(diagnostics)) => {
                    eprintln!("{}", diagnostics);
                    anyhow::bail!("No pack version matches the selection");
                }
                Err(e) => return Err(e).context("Failed to resolve pack version"),
            };

            let pack = pipeline
                .install_pack(&record, &selection, &*reporter)
                .await
                .context("Failed to install content pack")?;
            println!(
                "Installed {} ({} files) into {}",
                pack.record.label,
                pack.copied_files,
                pipeline.game_dir().display()
            );

            if skip_runtime {
                return Ok(());
            }
            match pack.runtime_version {
                Some(version) => {
                    let report = pipeline
                        .install_runtime(&version, reporter)
                        .await
                        .with_context(|| format!("Failed to install runtime {}", version))?;
                    println!("{}", report.summary());
                }
                None => log::warn!("Pack declares no game version; runtime not installed"),
            }
        }

        Commands::InstallRuntime { version } => {
            let report = pipeline
                .install_runtime(&version, Arc::new(ConsoleProgressReporter::default()))
                .await
                .with_context(|| format!("Failed to install runtime {}", version))?;
            println!("{}", report.summary());
        }

        Commands::Launch {
            version,
            loader,
            java,
            dry_run,
        } => {
            let invocation = pipeline
                .launch_invocation(&java, &version, loader)
                .with_context(|| format!("Failed to prepare launch of {}", version))?;

            if dry_run {
                println!("cd {}", invocation.working_dir.display());
                println!("{}", invocation.display_command());
                return Ok(());
            }

            let target = pipeline.server_target();
            if !pipeline.probe_server().await {
                log::warn!("{} is not reachable right now; launching anyway", target);
            }

            let mut child = spawn_invocation(&invocation).await?;
            let status = child.wait().await.context("Failed to wait for game process")?;
            log::info!("Game exited with {}", status);
        }
    }

    Ok(())
}
