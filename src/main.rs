// centy-bootstrap: installs Centy release binaries for the current platform.
//
// `install`: for each requested binary, resolve the version (latest from the
// release index, or a uniform pinned one), download the platform artifact with
// the multi-format fallback, extract it, place it under the versioned install
// tree and publish a symlink in the shared bin directory. Failures are
// collected per binary; the PATH of the user's shell is configured once if
// anything succeeded, and the process exits non-zero if anything failed.
// `uninstall` and `list` operate on the versioned install tree directly.

mod error;
mod libs;
pub mod logger;

use clap::{Parser, Subcommand};
use colored::Colorize;
use libs::install::{self, BinarySpec, InstallLayout, InstallerConfig};
use libs::platform;
use libs::report;
use libs::shell::PathConfigurator;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "centy-bootstrap")]
#[command(about = "Install Centy release binaries", long_about = None)]
#[command(version)]
struct Cli {
    /// Install root (default: ~/.centy)
    #[arg(long, env = "CENTY_BOOTSTRAP_HOME", global = true)]
    install_root: Option<PathBuf>,

    /// Turn debugging information on
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download and install release binaries
    Install {
        /// Binaries to install (release repository names)
        #[arg(
            env = "CENTY_BOOTSTRAP_BINARIES",
            value_delimiter = ' ',
            default_value = "centy-daemon"
        )]
        binaries: Vec<String>,

        /// Pin all binaries to this version instead of resolving the latest
        #[arg(short, long, env = "CENTY_BOOTSTRAP_VERSION")]
        pin: Option<String>,

        /// GitHub organization hosting the release repositories
        #[arg(long, env = "CENTY_BOOTSTRAP_ORG", default_value = "centy-io")]
        org: String,
    },

    /// Remove an installed binary
    Uninstall {
        /// Binary to uninstall
        binary: String,

        /// Version to remove. If not specified, removes all versions
        #[arg(short, long)]
        version: Option<String>,
    },

    /// List installed binaries and their versions
    List,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.debug);

    let layout = match cli.install_root {
        Some(root) => InstallLayout::new(root),
        None => match InstallLayout::default_root() {
            Ok(layout) => layout,
            Err(e) => {
                log_error!("{e}");
                return ExitCode::FAILURE;
            }
        },
    };
    log_debug!("[Main] Install root: {}", layout.root.display());

    match cli.command {
        Commands::Install { binaries, pin, org } => {
            run_install(&binaries, pin.as_deref(), &org, &layout)
        }
        Commands::Uninstall { binary, version } => {
            match install::uninstall(&layout, &binary, version.as_deref()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    log_error!("{e}");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::List => run_list(&layout),
    }
}

fn run_install(
    binaries: &[String],
    pin: Option<&str>,
    org: &str,
    layout: &InstallLayout,
) -> ExitCode {
    // No target platform means no binary can ever be fetched; abort up front.
    let platform = match platform::detect() {
        Ok(p) => p,
        Err(e) => {
            log_error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    log_debug!(
        "[Main] Target platform: {}-{} (legacy {}-{})",
        platform.arch.cyan(),
        platform.triple_new.cyan(),
        platform.triple_legacy.dimmed(),
        platform.arch.dimmed()
    );

    let mut specs = Vec::with_capacity(binaries.len());
    for name in binaries {
        match BinarySpec::new(name) {
            Ok(spec) => specs.push(spec),
            Err(e) => {
                log_error!("{e}");
                return ExitCode::FAILURE;
            }
        }
    }

    let config = InstallerConfig::new(org);
    let results = install::install_all(&specs, pin, &platform, layout, &config);

    // Configure PATH once per run, and only when there is something to reach.
    if results.iter().any(|r| r.succeeded()) {
        match PathConfigurator::from_env() {
            Some(configurator) => configurator.ensure_on_path(&layout.bin_dir()),
            None => log_warn!(
                "[Shell] Could not determine home directory; add {} to your PATH manually",
                layout.bin_dir().display()
            ),
        }
    }

    if report::summarize(&results) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run_list(layout: &InstallLayout) -> ExitCode {
    let installed = match layout.list_installed() {
        Ok(installed) => installed,
        Err(e) => {
            log_error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if installed.is_empty() {
        println!("No binaries installed");
        return ExitCode::SUCCESS;
    }

    println!("Installed binaries:");
    for (name, versions) in installed {
        println!("  {} (versions: {})", name, versions.join(", "));
    }
    ExitCode::SUCCESS
}
