//! Archive unpacking.
//!
//! Supports zip, tar, gzip-compressed tar and plain gzip. The format is sniffed
//! from the file's magic bytes with `infer`; the file name is only consulted
//! when the content is not recognized.

use crate::file_organizer::{OrganizeError, OrganizeResult};
use flate2::read::GzDecoder;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
    /// A single gzip-compressed file.
    Gz,
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::Tar => "tar",
            ArchiveFormat::TarGz => "tar.gz",
            ArchiveFormat::Gz => "gzip",
        };
        f.write_str(name)
    }
}

impl ArchiveFormat {
    /// Detects the format of the file at `path`, by content first and by name
    /// second.
    pub fn detect(path: &Path) -> Option<Self> {
        let by_content = infer::get_from_path(path)
            .ok()
            .flatten()
            .and_then(|kind| match kind.mime_type() {
                "application/zip" => Some(ArchiveFormat::Zip),
                "application/x-tar" => Some(ArchiveFormat::Tar),
                "application/gzip" => Some(Self::gzip_flavour(path)),
                _ => None,
            });
        by_content.or_else(|| Self::from_file_name(path))
    }

    /// Guesses the format from the file name alone.
    pub fn from_file_name(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveFormat::TarGz)
        } else if name.ends_with(".gz") {
            Some(ArchiveFormat::Gz)
        } else if name.ends_with(".tar") {
            Some(ArchiveFormat::Tar)
        } else if name.ends_with(".zip") {
            Some(ArchiveFormat::Zip)
        } else {
            None
        }
    }

    fn gzip_flavour(path: &Path) -> Self {
        match Self::from_file_name(path) {
            Some(ArchiveFormat::TarGz) => ArchiveFormat::TarGz,
            _ => ArchiveFormat::Gz,
        }
    }
}

/// Unpacks `archive` into `destination`, which must already exist.
///
/// Entries whose paths would escape `destination` are refused by the
/// underlying readers. A plain gzip file is decompressed into a single file
/// named after the archive without its `.gz` suffix.
pub fn extract(archive: &Path, destination: &Path) -> OrganizeResult<ArchiveFormat> {
    let format =
        ArchiveFormat::detect(archive).ok_or_else(|| OrganizeError::UnsupportedArchive {
            path: archive.to_path_buf(),
        })?;

    let failed = |source: Box<dyn std::error::Error + Send + Sync>| {
        OrganizeError::ExtractionFailed {
            path: archive.to_path_buf(),
            format,
            source,
        }
    };

    let file = File::open(archive).map_err(|e| failed(e.into()))?;
    let reader = BufReader::new(file);

    match format {
        ArchiveFormat::Zip => {
            let mut zip = zip::ZipArchive::new(reader).map_err(|e| failed(e.into()))?;
            zip.extract(destination).map_err(|e| failed(e.into()))?;
        }
        ArchiveFormat::Tar => {
            tar::Archive::new(reader)
                .unpack(destination)
                .map_err(|e| failed(e.into()))?;
        }
        ArchiveFormat::TarGz => {
            tar::Archive::new(GzDecoder::new(reader))
                .unpack(destination)
                .map_err(|e| failed(e.into()))?;
        }
        ArchiveFormat::Gz => {
            let inner_name = archive
                .file_stem()
                .ok_or_else(|| failed("archive has no file name".into()))?;
            let output_path = destination.join(inner_name);
            let mut output = File::create(&output_path).map_err(|e| failed(e.into()))?;
            let mut decoder = GzDecoder::new(reader);
            if let Err(e) = io::copy(&mut decoder, &mut output) {
                // Leave no truncated output behind.
                let _ = std::fs::remove_file(&output_path);
                return Err(failed(e.into()));
            }
        }
    }

    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    fn tar_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap()
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_detect_by_name_when_content_is_unknown() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.tar.gz");
        fs::write(&path, b"").unwrap();
        assert_eq!(ArchiveFormat::detect(&path), Some(ArchiveFormat::TarGz));
    }

    #[test]
    fn test_detect_by_content_ignores_misleading_name() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("really_a_gzip.zip");
        fs::write(&path, gzip(b"payload")).unwrap();
        assert_eq!(ArchiveFormat::detect(&path), Some(ArchiveFormat::Gz));
    }

    #[test]
    fn test_from_file_name() {
        assert_eq!(
            ArchiveFormat::from_file_name(Path::new("a.TGZ")),
            Some(ArchiveFormat::TarGz)
        );
        assert_eq!(
            ArchiveFormat::from_file_name(Path::new("a.tar")),
            Some(ArchiveFormat::Tar)
        );
        assert_eq!(ArchiveFormat::from_file_name(Path::new("a.rar")), None);
    }

    #[test]
    fn test_extract_tar() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("bundle.tar");
        fs::write(&archive, tar_bytes(&[("docs/readme.txt", &b"read me"[..])])).unwrap();
        let dest = temp_dir.path().join("out");
        fs::create_dir(&dest).unwrap();

        assert_eq!(extract(&archive, &dest).unwrap(), ArchiveFormat::Tar);
        assert_eq!(
            fs::read_to_string(dest.join("docs").join("readme.txt")).unwrap(),
            "read me"
        );
    }

    #[test]
    fn test_extract_tar_gz() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("bundle.tar.gz");
        fs::write(&archive, gzip(&tar_bytes(&[("a.txt", &b"alpha"[..])]))).unwrap();
        let dest = temp_dir.path().join("out");
        fs::create_dir(&dest).unwrap();

        assert_eq!(extract(&archive, &dest).unwrap(), ArchiveFormat::TarGz);
        assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "alpha");
    }

    #[test]
    fn test_extract_plain_gzip() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("notes.txt.gz");
        fs::write(&archive, gzip(b"compressed notes")).unwrap();
        let dest = temp_dir.path().join("out");
        fs::create_dir(&dest).unwrap();

        assert_eq!(extract(&archive, &dest).unwrap(), ArchiveFormat::Gz);
        assert_eq!(
            fs::read_to_string(dest.join("notes.txt")).unwrap(),
            "compressed notes"
        );
    }

    #[test]
    fn test_unsupported_archive() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("mystery.bin");
        fs::write(&archive, b"nothing recognizable").unwrap();

        let result = extract(&archive, temp_dir.path());
        assert!(matches!(
            result,
            Err(OrganizeError::UnsupportedArchive { .. })
        ));
    }

    #[test]
    fn test_truncated_gzip_fails() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("cut.gz");
        let mut data = gzip(b"some longer payload that gets cut off");
        data.truncate(data.len() / 2);
        fs::write(&archive, data).unwrap();
        let dest = temp_dir.path().join("out");
        fs::create_dir(&dest).unwrap();

        let err = extract(&archive, &dest).unwrap_err();
        assert!(matches!(err, OrganizeError::ExtractionFailed { .. }));
        assert!(std::error::Error::source(&err).is_some());
        assert!(!dest.join("cut").exists());
    }
}
