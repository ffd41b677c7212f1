// Final run summary: one line per binary, grouped into succeeded and failed,
// after the per-step progress lines the installer already streamed.

use crate::libs::install::InstallResult;
use crate::{log_info, log_warn};
use colored::Colorize;

/// Prints the end-of-run summary and reports whether anything failed.
pub fn summarize(results: &[InstallResult]) -> bool {
    let (ok, failed): (Vec<_>, Vec<_>) = results.iter().partition(|r| r.succeeded());

    eprintln!();
    log_info!("[Summary] {} installed, {} failed", ok.len(), failed.len());

    for result in &ok {
        let version = result
            .version
            .as_ref()
            .map(|v| v.normalized.clone())
            .unwrap_or_default();
        let link = result
            .symlink_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        log_info!(
            "[Summary]   {} {} -> {}",
            result.binary.name.bold().bright_green(),
            version.cyan(),
            link.dimmed()
        );
    }

    for result in &failed {
        log_warn!(
            "[Summary]   {}: {}",
            result.binary.name.bold().bright_red(),
            result.cause.as_deref().unwrap_or("unknown failure")
        );
    }

    if !failed.is_empty() {
        let names: Vec<&str> = failed.iter().map(|r| r.binary.name.as_str()).collect();
        log_warn!(
            "[Summary] Retry the failed binaries with: centy-bootstrap {}",
            names.join(" ").yellow()
        );
    }

    !failed.is_empty()
}
