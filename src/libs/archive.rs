// Archive extraction and binary location.
//
// Downloaded archives are unpacked into a fresh temporary directory; the
// binary payload is then located with a deterministic search: directly at the
// archive root, then inside a same-named wrapper directory, then by a
// recursive walk for the first exact filename match.

use crate::error::{BootstrapError, Result};
use crate::log_debug;
use crate::libs::platform::ArchiveExt;
use colored::Colorize;
use flate2::read::GzDecoder;
use std::fs::File;
use std::path::{Path, PathBuf};
use tar::Archive;
use walkdir::WalkDir;
use zip::ZipArchive;

/// Unpacks `archive_path` into `dest`, which must be an existing directory.
pub fn extract(archive_path: &Path, ext: ArchiveExt, dest: &Path) -> Result<()> {
    log_debug!(
        "[Extract] Unpacking {} into {}",
        archive_path.display().to_string().blue(),
        dest.display().to_string().cyan()
    );

    match ext {
        ArchiveExt::TarGz => {
            let file = File::open(archive_path)?;
            let decoder = GzDecoder::new(file);
            let mut archive = Archive::new(decoder);
            // A truncated or non-gzip payload surfaces here, not at open time.
            archive
                .unpack(dest)
                .map_err(|e| BootstrapError::Extraction(e.to_string()))?;
        }
        ArchiveExt::Zip => {
            let file = File::open(archive_path)?;
            let mut archive = ZipArchive::new(file)
                .map_err(|e| BootstrapError::UnsupportedArchiveFormat(e.to_string()))?;
            archive
                .extract(dest)
                .map_err(|e| BootstrapError::Extraction(e.to_string()))?;
        }
    }

    log_debug!("[Extract] Archive contents available at {}", dest.display());
    Ok(())
}

/// Locates the binary payload inside an extracted archive tree.
///
/// Search order is fixed: `{root}/{name}`, then `{root}/{name}/{name}` for
/// archives that wrap their contents in a same-named subdirectory, then the
/// first file exactly named `{name}` anywhere below `root`.
pub fn locate_binary(root: &Path, name: &str) -> Result<PathBuf> {
    let direct = root.join(name);
    if direct.is_file() {
        return Ok(direct);
    }

    let wrapped = root.join(name).join(name);
    if wrapped.is_file() {
        return Ok(wrapped);
    }

    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_file() && entry.file_name() == name {
            return Ok(entry.into_path());
        }
    }

    Err(BootstrapError::BinaryNotFoundInArchive(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    // Builds an in-memory .tar.gz with the given entries.
    fn tar_gz(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, content) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append_data(&mut header, path, *content).unwrap();
        }
        let tar_bytes = builder.into_inner().unwrap();

        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&tar_bytes).unwrap();
        encoder.finish().unwrap()
    }

    fn write_archive(dir: &Path, bytes: &[u8]) -> PathBuf {
        let path = dir.join("download.tar.gz");
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn tar_gz_round_trip() {
        let tmp = TempDir::new().unwrap();
        let archive = write_archive(tmp.path(), &tar_gz(&[("centy-daemon", b"payload")]));

        let out = tmp.path().join("extracted");
        std::fs::create_dir_all(&out).unwrap();
        extract(&archive, ArchiveExt::TarGz, &out).unwrap();

        let found = locate_binary(&out, "centy-daemon").unwrap();
        assert_eq!(std::fs::read(found).unwrap(), b"payload");
    }

    #[test]
    fn zip_round_trip() {
        let tmp = TempDir::new().unwrap();
        let buf = std::io::Cursor::new(Vec::new());
        let mut writer = zip::ZipWriter::new(buf);
        writer
            .start_file("centy-daemon", zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(b"zip payload").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let archive = tmp.path().join("download.zip");
        std::fs::write(&archive, bytes).unwrap();

        let out = tmp.path().join("extracted");
        std::fs::create_dir_all(&out).unwrap();
        extract(&archive, ArchiveExt::Zip, &out).unwrap();

        let found = locate_binary(&out, "centy-daemon").unwrap();
        assert_eq!(std::fs::read(found).unwrap(), b"zip payload");
    }

    #[test]
    fn corrupt_tar_gz_is_an_extraction_error() {
        let tmp = TempDir::new().unwrap();
        let bogus = write_archive(tmp.path(), b"this is not gzip data");

        let out = tmp.path().join("extracted");
        std::fs::create_dir_all(&out).unwrap();
        match extract(&bogus, ArchiveExt::TarGz, &out) {
            Err(BootstrapError::Extraction(_)) => {}
            other => panic!("expected Extraction, got {other:?}"),
        }
    }

    #[test]
    fn non_zip_payload_with_zip_ext_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let bogus = tmp.path().join("download.zip");
        std::fs::write(&bogus, b"not actually a zip").unwrap();

        let out = tmp.path().join("extracted");
        std::fs::create_dir_all(&out).unwrap();
        match extract(&bogus, ArchiveExt::Zip, &out) {
            Err(BootstrapError::UnsupportedArchiveFormat(_)) => {}
            other => panic!("expected UnsupportedArchiveFormat, got {other:?}"),
        }
    }

    #[test]
    fn root_match_beats_wrapper_directory() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("centy-daemon"), b"root").unwrap();
        std::fs::create_dir_all(tmp.path().join("centy-daemon-dir")).unwrap();

        let wrapper = tmp.path().join("nested").join("centy-daemon");
        std::fs::create_dir_all(wrapper.parent().unwrap()).unwrap();
        std::fs::write(&wrapper, b"nested").unwrap();

        let found = locate_binary(tmp.path(), "centy-daemon").unwrap();
        assert_eq!(std::fs::read(found).unwrap(), b"root");
    }

    #[test]
    fn wrapper_directory_beats_recursive_search() {
        let tmp = TempDir::new().unwrap();
        let wrapper = tmp.path().join("centy-daemon");
        std::fs::create_dir_all(&wrapper).unwrap();
        std::fs::write(wrapper.join("centy-daemon"), b"wrapped").unwrap();

        let deep = tmp.path().join("a").join("b");
        std::fs::create_dir_all(&deep).unwrap();
        std::fs::write(deep.join("centy-daemon"), b"deep").unwrap();

        let found = locate_binary(tmp.path(), "centy-daemon").unwrap();
        assert_eq!(std::fs::read(found).unwrap(), b"wrapped");
    }

    #[test]
    fn recursive_search_finds_deeply_nested_binary() {
        let tmp = TempDir::new().unwrap();
        let deep = tmp.path().join("release").join("bin");
        std::fs::create_dir_all(&deep).unwrap();
        std::fs::write(deep.join("centy-daemon"), b"deep").unwrap();

        let found = locate_binary(tmp.path(), "centy-daemon").unwrap();
        assert_eq!(std::fs::read(found).unwrap(), b"deep");
    }

    #[test]
    fn missing_binary_is_reported() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("README.md"), b"docs").unwrap();

        match locate_binary(tmp.path(), "centy-daemon") {
            Err(BootstrapError::BinaryNotFoundInArchive(name)) => {
                assert_eq!(name, "centy-daemon");
            }
            other => panic!("expected BinaryNotFoundInArchive, got {other:?}"),
        }
    }
}
