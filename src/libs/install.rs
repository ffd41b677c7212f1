// Per-binary installation orchestration.
//
// Each binary goes through resolve -> fetch -> extract/stage -> move into the
// versioned directory -> chmod -> symlink. A failure at any step is recorded
// in that binary's result and the batch moves on; one binary's failure never
// aborts the others. Download and extraction happen inside a `TempDir` scoped
// to the attempt, so temp files are cleaned up on every exit path.

use crate::error::{BootstrapError, Result};
use crate::libs::archive;
use crate::libs::artifact::{self, ArtifactKind, FetchedArtifact};
use crate::libs::platform::TargetPlatform;
use crate::libs::release::{self, ResolvedVersion};
use crate::{log_debug, log_info, log_warn};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// One binary the caller wants installed. The name doubles as the release
/// repository name and must be usable as a single path component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinarySpec {
    pub name: String,
}

impl BinarySpec {
    pub fn new(name: &str) -> Result<Self> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(BootstrapError::InvalidBinaryName(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }
}

/// On-disk layout of an installation root.
///
/// `versions/{binary}/{version}/{binary}` keeps every installed version;
/// `bin/{binary}` is a symlink to the currently selected one. The versions
/// tree doubles as the implicit install ledger.
#[derive(Debug, Clone)]
pub struct InstallLayout {
    pub root: PathBuf,
}

impl InstallLayout {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Default root: `~/.centy`.
    pub fn default_root() -> Result<Self> {
        let home = dirs::home_dir().ok_or(BootstrapError::HomeDirNotFound)?;
        Ok(Self::new(home.join(".centy")))
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.root.join("versions")
    }

    pub fn version_dir(&self, binary: &str, version: &str) -> PathBuf {
        self.versions_dir().join(binary).join(version)
    }

    pub fn binary_path(&self, binary: &str, version: &str) -> PathBuf {
        self.version_dir(binary, version).join(binary)
    }

    pub fn symlink_path(&self, binary: &str) -> PathBuf {
        self.bin_dir().join(binary)
    }

    /// Whether a specific binary/version is already present.
    pub fn is_installed(&self, binary: &str, version: &str) -> bool {
        self.binary_path(binary, version).is_file()
    }

    /// Lists installed versions per binary, read back from the versions tree.
    pub fn list_installed(&self) -> Result<Vec<(String, Vec<String>)>> {
        let versions_dir = self.versions_dir();
        if !versions_dir.exists() {
            return Ok(Vec::new());
        }

        let mut installed = Vec::new();
        for entry in std::fs::read_dir(&versions_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };

            let mut versions = Vec::new();
            for v in std::fs::read_dir(entry.path())? {
                let v = v?;
                if v.file_type()?.is_dir() {
                    if let Some(ver) = v.file_name().to_str() {
                        versions.push(ver.to_string());
                    }
                }
            }
            versions.sort();
            installed.push((name, versions));
        }
        installed.sort();
        Ok(installed)
    }
}

/// Where releases are resolved and downloaded from.
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    pub org: String,
    pub api_base: String,
    pub download_base: String,
}

impl InstallerConfig {
    pub fn new(org: &str) -> Self {
        Self {
            org: org.to_string(),
            api_base: release::DEFAULT_API_BASE.to_string(),
            download_base: artifact::DEFAULT_DOWNLOAD_BASE.to_string(),
        }
    }
}

/// Terminal state of one install attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    DownloadFailed,
    ExtractFailed,
    NotFoundInArchive,
    Failed,
}

/// Record of one binary's install attempt, kept for the final report.
#[derive(Debug)]
pub struct InstallResult {
    pub binary: BinarySpec,
    pub version: Option<ResolvedVersion>,
    pub install_path: Option<PathBuf>,
    pub symlink_path: Option<PathBuf>,
    pub outcome: Outcome,
    pub cause: Option<String>,
}

impl InstallResult {
    pub fn succeeded(&self) -> bool {
        self.outcome == Outcome::Success
    }

    fn failure(binary: BinarySpec, version: Option<ResolvedVersion>, err: &BootstrapError) -> Self {
        let outcome = match err {
            BootstrapError::ArtifactNotFound { .. } | BootstrapError::Network(_) => {
                Outcome::DownloadFailed
            }
            BootstrapError::UnsupportedArchiveFormat(_) | BootstrapError::Extraction(_) => {
                Outcome::ExtractFailed
            }
            BootstrapError::BinaryNotFoundInArchive(_) => Outcome::NotFoundInArchive,
            _ => Outcome::Failed,
        };
        Self {
            binary,
            version,
            install_path: None,
            symlink_path: None,
            outcome,
            cause: Some(err.to_string()),
        }
    }
}

/// Installs every requested binary, in order, collecting one result each.
/// Earlier failures never stop later binaries.
pub fn install_all(
    specs: &[BinarySpec],
    pinned: Option<&str>,
    platform: &TargetPlatform,
    layout: &InstallLayout,
    config: &InstallerConfig,
) -> Vec<InstallResult> {
    specs
        .iter()
        .map(|spec| install_one(spec, pinned, platform, layout, config))
        .collect()
}

/// Installs one binary, returning its result rather than propagating errors.
pub fn install_one(
    spec: &BinarySpec,
    pinned: Option<&str>,
    platform: &TargetPlatform,
    layout: &InstallLayout,
    config: &InstallerConfig,
) -> InstallResult {
    log_info!("[Install] Installing {} ...", spec.name.bold().bright_blue());

    let version = match release::resolve_version(&config.api_base, &config.org, &spec.name, pinned)
    {
        Ok(v) => v,
        Err(e) => {
            log_warn!("[Install] Could not resolve a version for {}: {}", spec.name.bold(), e);
            return InstallResult::failure(spec.clone(), None, &e);
        }
    };

    if layout.is_installed(&spec.name, &version.normalized) {
        log_debug!(
            "[Install] {} {} already present, reinstalling in place",
            spec.name.bold(),
            version.normalized.cyan()
        );
    }

    match run_install(spec, &version, platform, layout, config) {
        Ok((install_path, symlink_path)) => {
            log_info!(
                "[Install] Installed {} {} -> {}",
                spec.name.bold().bright_green(),
                version.normalized.cyan(),
                install_path.display()
            );
            InstallResult {
                binary: spec.clone(),
                version: Some(version),
                install_path: Some(install_path),
                symlink_path: Some(symlink_path),
                outcome: Outcome::Success,
                cause: None,
            }
        }
        Err(e) => {
            log_warn!("[Install] Failed to install {}: {}", spec.name.bold(), e);
            InstallResult::failure(spec.clone(), Some(version), &e)
        }
    }
}

/// Removes one installed version of `binary`, or every version when `version`
/// is `None`. The `bin/` symlink is dropped once it no longer resolves, so an
/// uninstall never leaves a dangling link behind.
pub fn uninstall(layout: &InstallLayout, binary: &str, version: Option<&str>) -> Result<()> {
    let target = match version {
        Some(v) => layout.version_dir(binary, v),
        None => layout.versions_dir().join(binary),
    };
    if !target.is_dir() {
        let what = match version {
            Some(v) => format!("{binary} {v}"),
            None => binary.to_string(),
        };
        return Err(BootstrapError::NotInstalled(what));
    }
    std::fs::remove_dir_all(&target)?;

    // Drop the per-binary directory once its last version is gone.
    let binary_dir = layout.versions_dir().join(binary);
    if binary_dir.is_dir() && std::fs::read_dir(&binary_dir)?.next().is_none() {
        std::fs::remove_dir(&binary_dir)?;
    }

    // `metadata` follows the link, so an Err here means the target is gone.
    let link = layout.symlink_path(binary);
    if link.is_symlink() && std::fs::metadata(&link).is_err() {
        std::fs::remove_file(&link)?;
        log_debug!("[Uninstall] Removed dangling symlink {}", link.display());
    }

    match version {
        Some(v) => log_info!("[Uninstall] Removed {} {}", binary.bold(), v.cyan()),
        None => log_info!("[Uninstall] Removed all versions of {}", binary.bold()),
    }
    Ok(())
}

// The fallible middle of an install. The `TempDir` created here owns all
// download and extraction scratch space and removes it when this function
// returns, on success and failure alike.
fn run_install(
    spec: &BinarySpec,
    version: &ResolvedVersion,
    platform: &TargetPlatform,
    layout: &InstallLayout,
    config: &InstallerConfig,
) -> Result<(PathBuf, PathBuf)> {
    let temp = TempDir::new()?;

    let fetched = artifact::fetch(
        &config.download_base,
        &config.org,
        &spec.name,
        version,
        platform,
        temp.path(),
    )?;

    let staged = stage_payload(&fetched, &spec.name, temp.path())?;

    let install_path = layout.binary_path(&spec.name, &version.normalized);
    if let Some(parent) = install_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    // Overwrites any previous install of the same version.
    std::fs::copy(&staged, &install_path)?;
    make_executable(&install_path)?;

    let symlink_path = layout.symlink_path(&spec.name);
    std::fs::create_dir_all(layout.bin_dir())?;
    // Only republish the link once the target is in place and executable.
    replace_symlink(&install_path, &symlink_path)?;

    Ok((install_path, symlink_path))
}

// Turns a fetched artifact into a path to the binary payload: archives are
// unpacked and searched, raw executables are used as-is.
fn stage_payload(fetched: &FetchedArtifact, binary: &str, temp_root: &Path) -> Result<PathBuf> {
    match fetched.kind {
        ArtifactKind::RawExecutable => Ok(fetched.path.clone()),
        ArtifactKind::Archive(ext) => {
            let extracted = temp_root.join("extracted");
            std::fs::create_dir_all(&extracted)?;
            archive::extract(&fetched.path, ext, &extracted)?;
            archive::locate_binary(&extracted, binary)
        }
    }
}

fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(path, perms)?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

fn replace_symlink(target: &Path, link: &Path) -> Result<()> {
    if link.exists() || link.is_symlink() {
        std::fs::remove_file(link)?;
    }

    #[cfg(unix)]
    std::os::unix::fs::symlink(target, link)?;

    #[cfg(windows)]
    std::os::windows::fs::symlink_file(target, link)?;

    Ok(())
}
