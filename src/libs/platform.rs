// Host platform detection. Maps the running OS and CPU architecture onto the
// target-triple fragments used to name release artifacts. Releases have been
// published under two naming conventions over time, so both the current
// rustc-style triple ("apple-darwin") and the legacy two-part form ("darwin")
// are carried; URL construction needs both.

use crate::error::{BootstrapError, Result};

/// OS family of the host, after name normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Darwin,
    Linux,
    Windows,
}

/// Archive format the release pipeline publishes for a given OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveExt {
    TarGz,
    Zip,
}

impl ArchiveExt {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveExt::TarGz => "tar.gz",
            ArchiveExt::Zip => "zip",
        }
    }
}

/// The detected host platform. Derived once per run, never mutated.
#[derive(Debug, Clone)]
pub struct TargetPlatform {
    pub os: OsFamily,
    /// rustc-style OS part, e.g. "apple-darwin".
    pub triple_new: &'static str,
    /// Legacy OS part used by older release artifacts, e.g. "darwin".
    pub triple_legacy: &'static str,
    /// Canonical architecture name, e.g. "x86_64".
    pub arch: &'static str,
    pub archive_ext: ArchiveExt,
}

/// Detects the platform of the running process.
pub fn detect() -> Result<TargetPlatform> {
    detect_from(std::env::consts::OS, std::env::consts::ARCH)
}

/// Pure mapping from OS/arch name strings to a `TargetPlatform`. Accepts both
/// rustc's names ("macos") and uname-style names ("darwin", "amd64") so the
/// table can be exercised with arbitrary host facts.
pub fn detect_from(os: &str, arch: &str) -> Result<TargetPlatform> {
    let (family, triple_new, triple_legacy) = match os.to_lowercase().as_str() {
        "macos" | "darwin" => (OsFamily::Darwin, "apple-darwin", "darwin"),
        "linux" => (OsFamily::Linux, "unknown-linux-gnu", "linux"),
        // POSIX emulation layers on Windows report their own names.
        "windows" | "msys" | "cygwin" | "mingw" => {
            (OsFamily::Windows, "pc-windows-msvc", "windows")
        }
        other => return Err(BootstrapError::UnsupportedPlatform(other.to_string())),
    };

    let arch_name = match arch.to_lowercase().as_str() {
        "x86_64" | "amd64" => "x86_64",
        "aarch64" | "arm64" => "aarch64",
        "armv7l" => "armv7",
        other => return Err(BootstrapError::UnsupportedArchitecture(other.to_string())),
    };

    let archive_ext = match family {
        OsFamily::Windows => ArchiveExt::Zip,
        _ => ArchiveExt::TarGz,
    };

    Ok(TargetPlatform {
        os: family,
        triple_new,
        triple_legacy,
        arch: arch_name,
        archive_ext,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn darwin_triples() {
        let p = detect_from("darwin", "arm64").unwrap();
        assert_eq!(p.os, OsFamily::Darwin);
        assert_eq!(p.triple_new, "apple-darwin");
        assert_eq!(p.triple_legacy, "darwin");
        assert_eq!(p.arch, "aarch64");
        assert_eq!(p.archive_ext, ArchiveExt::TarGz);

        // rustc's name for the same OS maps identically
        let q = detect_from("macos", "aarch64").unwrap();
        assert_eq!(q.triple_new, p.triple_new);
        assert_eq!(q.arch, p.arch);
    }

    #[test]
    fn linux_triples() {
        let p = detect_from("linux", "x86_64").unwrap();
        assert_eq!(p.triple_new, "unknown-linux-gnu");
        assert_eq!(p.triple_legacy, "linux");
        assert_eq!(p.archive_ext, ArchiveExt::TarGz);

        let armv7 = detect_from("linux", "armv7l").unwrap();
        assert_eq!(armv7.arch, "armv7");
    }

    #[test]
    fn windows_triples_including_emulation_layers() {
        for os in ["windows", "msys", "cygwin", "mingw"] {
            let p = detect_from(os, "amd64").unwrap();
            assert_eq!(p.os, OsFamily::Windows);
            assert_eq!(p.triple_new, "pc-windows-msvc");
            assert_eq!(p.triple_legacy, "windows");
            assert_eq!(p.arch, "x86_64");
            assert_eq!(p.archive_ext, ArchiveExt::Zip);
        }
    }

    #[test]
    fn unsupported_os_is_an_error() {
        match detect_from("plan9", "x86_64") {
            Err(BootstrapError::UnsupportedPlatform(os)) => assert_eq!(os, "plan9"),
            other => panic!("expected UnsupportedPlatform, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_arch_is_an_error() {
        match detect_from("linux", "riscv64") {
            Err(BootstrapError::UnsupportedArchitecture(a)) => assert_eq!(a, "riscv64"),
            other => panic!("expected UnsupportedArchitecture, got {other:?}"),
        }
    }

    #[test]
    fn current_host_is_supported() {
        let p = detect().expect("host platform should be supported");
        assert!(!p.arch.is_empty());
    }
}
