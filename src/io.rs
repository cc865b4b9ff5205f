// File-level helpers for reading tag files.
//
// Provides `read_file()` and `read_files()`, which load a path fully into
// memory, decode it and report read statistics. Optionally computes a
// SHA-256 of the file bytes (feature-gated behind `file-io`) and decodes
// several files concurrently (feature-gated behind `parallel`).

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::error::TagError;
use crate::tag::Container;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `read_file()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadStats {
    /// Input file size in bytes.
    pub file_size: u64,
    /// Number of real types (sentinel excluded).
    pub types: usize,
    /// Number of ITEM records.
    pub items: usize,
    /// Number of PTCH records.
    pub patches: usize,
    /// Size of the DATA payload in bytes.
    pub data_size: usize,
    /// SHA-256 of the input file (if `file-io` feature is enabled).
    pub sha256: Option<[u8; 32]>,
}

impl ReadStats {
    /// Lowercase hex rendering of the checksum, if one was computed.
    pub fn sha256_hex(&self) -> Option<String> {
        self.sha256
            .map(|h| h.iter().map(|b| format!("{b:02x}")).collect())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file I/O operations.
#[derive(Debug)]
pub enum IoError {
    /// I/O error (file open, read).
    Io(io::Error),
    /// The file was read but is not a valid tag file.
    Decode(TagError),
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Decode(e) => write!(f, "decode error: {e}"),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Decode(e) => Some(e),
        }
    }
}

impl From<io::Error> for IoError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<TagError> for IoError {
    fn from(e: TagError) -> Self {
        match e {
            TagError::Io(e) => Self::Io(e),
            other => Self::Decode(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Default buffer size
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// read_file
// ---------------------------------------------------------------------------

/// Read and decode one tag file.
///
/// The whole file is held in memory for the duration of the decode; the
/// returned container owns copies of everything it needs.
pub fn read_file(path: &Path) -> Result<(Container, ReadStats), IoError> {
    let file = File::open(path)?;
    let hint = file.metadata().map(|m| m.len() as usize).unwrap_or(0);
    let mut reader = BufReader::with_capacity(BUF_SIZE, file);
    let mut bytes = Vec::with_capacity(hint);
    reader.read_to_end(&mut bytes)?;

    #[cfg(feature = "file-io")]
    let sha256: Option<[u8; 32]> = Some(sha2::Sha256::digest(&bytes).into());
    #[cfg(not(feature = "file-io"))]
    let sha256: Option<[u8; 32]> = None;

    let container = Container::decode(&bytes)?;
    let stats = ReadStats {
        file_size: bytes.len() as u64,
        types: container.types.len().saturating_sub(1),
        items: container.items.len(),
        patches: container.patches.len(),
        data_size: container.data.len(),
        sha256,
    };
    log::debug!("{}: {} bytes decoded", path.display(), stats.file_size);
    Ok((container, stats))
}

/// Per-file outcome of `read_files()`, in input order.
pub type FileResult = (PathBuf, Result<(Container, ReadStats), IoError>);

/// Read and decode several independent files.
///
/// With the `parallel` feature the files are decoded on the rayon pool;
/// otherwise one after another. Results keep the order of `paths` either way.
pub fn read_files<P: AsRef<Path> + Sync>(paths: &[P]) -> Vec<FileResult> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        paths
            .par_iter()
            .map(|p| (p.as_ref().to_path_buf(), read_file(p.as_ref())))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        paths
            .iter()
            .map(|p| (p.as_ref().to_path_buf(), read_file(p.as_ref())))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::tag::section::write_section;
    use crate::tag::strings::write_string_list;
    use crate::tag::{Tag, packed};

    /// Smallest valid container: no types, no items, four bytes of data.
    fn minimal_container() -> Vec<u8> {
        let mut body = Vec::new();
        write_section(&mut body, Tag::SDKV, |w| {
            w.extend_from_slice(b"20150100");
            Ok(())
        })
        .unwrap();
        write_section(&mut body, Tag::DATA, |w| {
            w.extend_from_slice(&[1, 2, 3, 4]);
            Ok(())
        })
        .unwrap();
        write_section(&mut body, Tag::TYPE, |w| {
            write_section(w, Tag::TSTR, |w| write_string_list(w, ["T"]))?;
            write_section(w, Tag::FSTR, |w| write_string_list(w, ["f"]))?;
            write_section(w, Tag::TNAM, |w| packed::write(w, 0))?;
            write_section(w, Tag::TBOD, |_| Ok(()))?;
            write_section(w, Tag::THSH, |w| packed::write(w, 0))
        })
        .unwrap();
        write_section(&mut body, Tag::INDX, |w| {
            write_section(w, Tag::ITEM, |_| Ok(()))?;
            write_section(w, Tag::PTCH, |_| Ok(()))
        })
        .unwrap();

        let mut out = Vec::new();
        write_section(&mut out, Tag::TAG0, |w| {
            w.extend_from_slice(&body);
            Ok(())
        })
        .unwrap();
        out
    }

    #[test]
    fn read_file_reports_stats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("min.tag");
        let bytes = minimal_container();
        std::fs::write(&path, &bytes).unwrap();

        let (container, stats) = read_file(&path).unwrap();
        assert_eq!(container.data, vec![1, 2, 3, 4]);
        assert_eq!(stats.file_size, bytes.len() as u64);
        assert_eq!(stats.types, 0);
        assert_eq!(stats.items, 0);
        assert_eq!(stats.patches, 0);
        assert_eq!(stats.data_size, 4);
    }

    #[cfg(feature = "file-io")]
    #[test]
    fn sha256_checksum_computed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("min.tag");
        let bytes = minimal_container();
        std::fs::write(&path, &bytes).unwrap();

        let (_, stats) = read_file(&path).unwrap();
        let expected: [u8; 32] = sha2::Sha256::digest(&bytes).into();
        assert_eq!(stats.sha256, Some(expected));
        assert_eq!(stats.sha256_hex().map(|h| h.len()), Some(64));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_file(&dir.path().join("absent.tag")).unwrap_err();
        assert!(matches!(err, IoError::Io(_)));
    }

    #[test]
    fn corrupt_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.tag");
        let mut bytes = minimal_container();
        bytes.push(0);
        std::fs::write(&path, &bytes).unwrap();

        match read_file(&path).unwrap_err() {
            IoError::Decode(e) => assert_eq!(e.kind(), ErrorKind::FormatMismatch),
            other => panic!("expected decode error, got {other}"),
        }
    }

    #[test]
    fn read_files_keeps_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.tag");
        let bad = dir.path().join("bad.tag");
        std::fs::write(&good, minimal_container()).unwrap();
        std::fs::write(&bad, b"nope").unwrap();

        let results = read_files(&[&good, &bad, &good]);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, good);
        assert!(results[0].1.is_ok());
        assert_eq!(results[1].0, bad);
        assert!(results[1].1.is_err());
        assert!(results[2].1.is_ok());
    }
}
