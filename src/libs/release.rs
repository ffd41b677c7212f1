// Release index queries. Resolves the version to install for a binary: either
// a pinned version supplied by the caller (no network involved) or the latest
// published release tag from the GitHub API.

use crate::error::{BootstrapError, Result};
use crate::{log_debug, log_info};
use colored::Colorize;
use serde_json::Value;

/// Default base URL of the release index API. Kept as a parameter everywhere
/// below so tests can point resolution at a local server.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// A version resolved for installation.
///
/// `raw` is the tag as published (it may or may not carry the leading 'v');
/// `normalized` always has exactly one leading 'v' stripped and is the form
/// used for display and install paths. `tag()` is the v-prefixed form
/// required when building download URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub raw: String,
    pub normalized: String,
}

impl ResolvedVersion {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = raw.strip_prefix('v').unwrap_or(&raw).to_string();
        Self { raw, normalized }
    }

    /// The v-prefixed tag used in release download URLs.
    pub fn tag(&self) -> String {
        format!("v{}", self.normalized)
    }
}

impl std::fmt::Display for ResolvedVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.normalized)
    }
}

/// Resolves the version to install for `binary`.
///
/// A pinned version short-circuits without any network call. Otherwise a
/// single GET against `{api_base}/repos/{org}/{binary}/releases/latest` is
/// issued and the `tag_name` field extracted from the response body.
pub fn resolve_version(
    api_base: &str,
    org: &str,
    binary: &str,
    pinned: Option<&str>,
) -> Result<ResolvedVersion> {
    if let Some(v) = pinned {
        let resolved = ResolvedVersion::new(v);
        log_debug!(
            "[Release] Using pinned version {} for {}",
            resolved.normalized.cyan(),
            binary.bold()
        );
        return Ok(resolved);
    }

    let url = format!("{}/repos/{}/{}/releases/latest", api_base, org, binary);
    log_info!("[Release] Fetching latest version of {} ...", binary.bold());
    log_debug!("[Release] Release index URL: {}", url.blue());

    // ureq follows 301/302 redirects transparently up to its fixed limit;
    // exhausting that limit surfaces as a transport error below.
    let response = match ureq::get(&url)
        .set("User-Agent", "centy-bootstrap")
        .call()
    {
        Ok(resp) => resp,
        Err(ureq::Error::Status(code, _)) => {
            return Err(BootstrapError::ReleaseNotFound {
                org: org.to_string(),
                binary: binary.to_string(),
                reason: format!("release index returned HTTP {code}"),
            });
        }
        Err(e) => return Err(BootstrapError::Network(e.to_string())),
    };

    let body: Value = response
        .into_json()
        .map_err(|e| BootstrapError::Network(format!("malformed release response: {e}")))?;

    let tag = find_tag_name(&body).ok_or_else(|| BootstrapError::ReleaseNotFound {
        org: org.to_string(),
        binary: binary.to_string(),
        reason: "response carried no tag_name field".to_string(),
    })?;

    let resolved = ResolvedVersion::new(tag);
    log_info!(
        "[Release] Latest version of {} is {}",
        binary.bold(),
        resolved.normalized.cyan()
    );
    log_debug!(
        "[Release] Release tag {} normalized to {}",
        resolved.raw.dimmed(),
        resolved.normalized.dimmed()
    );
    Ok(resolved)
}

// Tolerant scan for the release tag: the field is usually at the top level,
// but some index frontends nest the release record, so search the whole value.
fn find_tag_name(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(tag)) = map.get("tag_name") {
                if !tag.is_empty() {
                    return Some(tag.clone());
                }
            }
            map.values().find_map(find_tag_name)
        }
        Value::Array(items) => items.iter().find_map(find_tag_name),
        _ => None,
    }
}
