// Shell PATH configuration.
//
// After a successful batch the shared bin directory must be reachable from
// the user's shell. The configurator holds its inputs (home directory, $SHELL
// and $PATH values) explicitly instead of reading ambient globals, so the
// idempotence guarantees are testable. Nothing in here is allowed to fail the
// run; every problem is downgraded to a warning.

use crate::{log_debug, log_info, log_warn};
use colored::Colorize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct PathConfigurator {
    home: PathBuf,
    /// Value of `$SHELL`, e.g. "/bin/zsh".
    shell: Option<String>,
    /// Value of `$PATH` inherited by this process.
    path_var: Option<String>,
}

impl PathConfigurator {
    pub fn new(home: PathBuf, shell: Option<String>, path_var: Option<String>) -> Self {
        Self {
            home,
            shell,
            path_var,
        }
    }

    /// Builds a configurator from the process environment.
    pub fn from_env() -> Option<Self> {
        let home = dirs::home_dir()?;
        Some(Self::new(
            home,
            std::env::var("SHELL").ok(),
            std::env::var("PATH").ok(),
        ))
    }

    /// Ensures `bin_dir` ends up on the user's PATH. No-op when it already is;
    /// otherwise appends an export line to the login shell's startup file,
    /// once, creating the file if needed.
    pub fn ensure_on_path(&self, bin_dir: &Path) {
        let bin_str = bin_dir.to_string_lossy();

        if self.path_contains(&bin_str) {
            log_debug!("[Shell] {} already on PATH, nothing to do", bin_str.dimmed());
            return;
        }

        let rc_path = self.rc_file();
        log_debug!(
            "[Shell] Configuring PATH via {}",
            rc_path.display().to_string().cyan()
        );

        match append_path_export(&rc_path, &bin_str) {
            Ok(true) => log_info!(
                "[Shell] Added {} to PATH in {} (restart your shell to pick it up)",
                bin_str.bold(),
                rc_path.display()
            ),
            Ok(false) => log_debug!(
                "[Shell] {} already referenced in {}, left unchanged",
                bin_str.dimmed(),
                rc_path.display()
            ),
            Err(e) => log_warn!(
                "[Shell] Could not update {}: {}. Add {} to your PATH manually.",
                rc_path.display(),
                e,
                bin_str.bold()
            ),
        }
    }

    // Whether bin_dir already appears as a delimited PATH segment.
    fn path_contains(&self, bin_dir: &str) -> bool {
        let delimiter = if cfg!(windows) { ';' } else { ':' };
        self.path_var
            .as_deref()
            .map(|path| path.split(delimiter).any(|seg| seg == bin_dir))
            .unwrap_or(false)
    }

    /// Startup file for the user's login shell. Fixed per-shell mapping;
    /// unknown shells fall back to the generic `.profile`.
    pub fn rc_file(&self) -> PathBuf {
        let shell_name = self
            .shell
            .as_deref()
            .and_then(|s| s.rsplit('/').next())
            .unwrap_or("");

        match shell_name {
            "zsh" => self.home.join(".zshrc"),
            "bash" => self.home.join(".bashrc"),
            "fish" => self.home.join(".config").join("fish").join("config.fish"),
            _ => self.home.join(".profile"),
        }
    }
}

// Appends the export line unless the directory string is already present in
// the file. Returns whether anything was written.
fn append_path_export(rc_path: &Path, bin_dir: &str) -> std::io::Result<bool> {
    let existing = std::fs::read_to_string(rc_path).unwrap_or_default();
    if existing.contains(bin_dir) {
        return Ok(false);
    }

    if let Some(parent) = rc_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(rc_path)?;
    writeln!(file, "\n# Added by centy-bootstrap")?;
    writeln!(file, "export PATH=\"$PATH:{bin_dir}\"")?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn configurator(home: &Path, shell: &str, path_var: Option<&str>) -> PathConfigurator {
        PathConfigurator::new(
            home.to_path_buf(),
            Some(shell.to_string()),
            path_var.map(str::to_string),
        )
    }

    #[test]
    fn rc_file_per_shell() {
        let home = TempDir::new().unwrap();
        let h = home.path();

        assert_eq!(configurator(h, "/bin/zsh", None).rc_file(), h.join(".zshrc"));
        assert_eq!(configurator(h, "/bin/bash", None).rc_file(), h.join(".bashrc"));
        assert_eq!(
            configurator(h, "/usr/bin/fish", None).rc_file(),
            h.join(".config/fish/config.fish")
        );
        assert_eq!(configurator(h, "/bin/dash", None).rc_file(), h.join(".profile"));
    }

    #[test]
    fn noop_when_already_on_path() {
        let home = TempDir::new().unwrap();
        let bin = home.path().join("bin");
        let path_var = format!("/usr/bin:{}", bin.display());

        let cfg = configurator(home.path(), "/bin/zsh", Some(&path_var));
        cfg.ensure_on_path(&bin);

        assert!(!home.path().join(".zshrc").exists());
    }

    #[test]
    fn appends_export_line_and_creates_file() {
        let home = TempDir::new().unwrap();
        let bin = home.path().join("bin");

        let cfg = configurator(home.path(), "/bin/bash", Some("/usr/bin"));
        cfg.ensure_on_path(&bin);

        let rc = std::fs::read_to_string(home.path().join(".bashrc")).unwrap();
        assert!(rc.contains(&format!("export PATH=\"$PATH:{}\"", bin.display())));
    }

    #[test]
    fn second_run_leaves_the_file_unchanged() {
        let home = TempDir::new().unwrap();
        let bin = home.path().join("bin");
        let cfg = configurator(home.path(), "/bin/bash", Some("/usr/bin"));

        cfg.ensure_on_path(&bin);
        let after_first = std::fs::read_to_string(home.path().join(".bashrc")).unwrap();

        cfg.ensure_on_path(&bin);
        let after_second = std::fs::read_to_string(home.path().join(".bashrc")).unwrap();

        assert_eq!(after_first, after_second);
    }

    #[test]
    fn substring_path_segment_does_not_count_as_present() {
        let home = TempDir::new().unwrap();
        let bin = home.path().join("bin");
        // PATH contains a longer path that merely has bin as a prefix.
        let path_var = format!("{}-extras", bin.display());

        let cfg = configurator(home.path(), "/bin/bash", Some(&path_var));
        cfg.ensure_on_path(&bin);

        assert!(home.path().join(".bashrc").exists());
    }
}
