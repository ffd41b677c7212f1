// Artifact download with multi-format fallback.
//
// Release artifacts have been published under three naming conventions over
// the project's lifetime. The candidates below are a fixed, ordered
// compatibility list; the fetcher walks them in priority order and
// short-circuits on the first URL that yields a non-empty payload. Per-attempt
// transport/HTTP errors are swallowed on purpose: a miss on one format simply
// means trying the next.

use crate::error::{BootstrapError, Result};
use crate::libs::platform::{ArchiveExt, OsFamily, TargetPlatform};
use crate::libs::release::ResolvedVersion;
use crate::{log_debug, log_info};
use colored::Colorize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Default base URL for release downloads.
pub const DEFAULT_DOWNLOAD_BASE: &str = "https://github.com";

/// How a downloaded payload should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Compressed archive wrapping the binary.
    Archive(ArchiveExt),
    /// The payload is the executable itself.
    RawExecutable,
}

/// One download URL to try, with the treatment its naming convention implies.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub url: String,
    pub kind: ArtifactKind,
}

/// A successfully downloaded artifact, staged in the caller's temp directory.
#[derive(Debug)]
pub struct FetchedArtifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
    pub url: String,
}

/// Builds the candidate URLs for `binary` in fixed priority order:
/// 1. versioned archive (`{name}-{tag}-{arch}-{triple}.{ext}`),
/// 2. legacy raw binary (`{name}-{os}-{arch}`),
/// 3. legacy raw binary with `.exe` suffix (Windows only).
pub fn candidate_urls(
    download_base: &str,
    org: &str,
    binary: &str,
    version: &ResolvedVersion,
    platform: &TargetPlatform,
) -> Vec<Candidate> {
    let tag = version.tag();
    let release_base = format!("{download_base}/{org}/{binary}/releases/download/{tag}");

    let mut candidates = vec![
        Candidate {
            url: format!(
                "{release_base}/{binary}-{tag}-{}-{}.{}",
                platform.arch,
                platform.triple_new,
                platform.archive_ext.as_str()
            ),
            kind: ArtifactKind::Archive(platform.archive_ext),
        },
        Candidate {
            url: format!(
                "{release_base}/{binary}-{}-{}",
                platform.triple_legacy, platform.arch
            ),
            kind: ArtifactKind::RawExecutable,
        },
    ];

    if platform.os == OsFamily::Windows {
        candidates.push(Candidate {
            url: format!(
                "{release_base}/{binary}-{}-{}.exe",
                platform.triple_legacy, platform.arch
            ),
            kind: ArtifactKind::RawExecutable,
        });
    }

    candidates
}

/// Tries each candidate URL in order, streaming the first successful payload
/// into `dest_dir`. Exhausting every candidate yields `ArtifactNotFound`
/// carrying the full list of URLs tried.
pub fn fetch(
    download_base: &str,
    org: &str,
    binary: &str,
    version: &ResolvedVersion,
    platform: &TargetPlatform,
    dest_dir: &Path,
) -> Result<FetchedArtifact> {
    let candidates = candidate_urls(download_base, org, binary, version, platform);
    let mut tried = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        log_debug!("[Fetch] Trying {}", candidate.url.blue());

        let filename = match candidate.kind {
            ArtifactKind::Archive(ext) => format!("download.{}", ext.as_str()),
            ArtifactKind::RawExecutable => binary.to_string(),
        };
        let dest = dest_dir.join(filename);

        match download(&candidate.url, &dest) {
            Ok(bytes) if bytes > 0 => {
                log_info!(
                    "[Fetch] Downloaded {} ({} bytes) from {}",
                    binary.bold(),
                    bytes,
                    candidate.url.dimmed()
                );
                return Ok(FetchedArtifact {
                    path: dest,
                    kind: candidate.kind,
                    url: candidate.url,
                });
            }
            Ok(_) => log_debug!("[Fetch] Empty payload from {}", candidate.url.dimmed()),
            Err(e) => log_debug!("[Fetch] Attempt failed ({e}) for {}", candidate.url.dimmed()),
        }
        tried.push(candidate.url);
    }

    Err(BootstrapError::ArtifactNotFound { urls: tried })
}

// Streams one URL to disk, returning the byte count. Any transport or HTTP
// error is surfaced to the caller, which treats it as a fallback signal.
fn download(url: &str, dest: &Path) -> std::result::Result<u64, String> {
    let response = ureq::get(url)
        .set("User-Agent", "centy-bootstrap")
        .call()
        .map_err(|e| match e {
            ureq::Error::Status(code, _) => format!("HTTP {code}"),
            other => other.to_string(),
        })?;

    let mut file = File::create(dest).map_err(|e| e.to_string())?;
    let mut reader = response.into_reader();
    std::io::copy(&mut reader, &mut file).map_err(|e| e.to_string())
}
