//! Container codec for uploaded and exported price lists.
//!
//! Uploads carry one CSV entry inside a zip or tar container. Extraction returns the
//! first entry (in listing order) whose name ends with `.csv`. Packing writes a single
//! entry named [`ENTRY_NAME`].

use pl_types::ArchiveKind;
use std::io::{Cursor, Read, Write};
use thiserror::Error;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Suffix an entry name must carry to be picked up as the price list.
pub const TABULAR_SUFFIX: &str = ".csv";

/// Name of the single entry written by [`pack`].
pub const ENTRY_NAME: &str = "data.csv";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("malformed zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("archive i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv file not found")]
    NoTabularEntry,
}

/// Extract the first `.csv` entry from a container of the given kind.
pub fn extract(bytes: &[u8], kind: ArchiveKind) -> Result<Vec<u8>, ExtractionError> {
    match kind {
        ArchiveKind::Zip => extract_zip(bytes),
        ArchiveKind::Tar => extract_tar(bytes),
    }
}

fn extract_zip(bytes: &[u8]) -> Result<Vec<u8>, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() || !entry.name().ends_with(TABULAR_SUFFIX) {
            continue;
        }
        debug!(entry = entry.name(), size = entry.size(), "extracting zip entry");
        let mut out = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut out)?;
        return Ok(out);
    }
    Err(ExtractionError::NoTabularEntry)
}

fn extract_tar(bytes: &[u8]) -> Result<Vec<u8>, ExtractionError> {
    let mut archive = tar::Archive::new(Cursor::new(bytes));
    for entry in archive.entries()? {
        let mut entry = entry?;
        if entry.header().entry_type().is_dir() {
            continue;
        }
        let matches = entry.path_bytes().ends_with(TABULAR_SUFFIX.as_bytes());
        if !matches {
            continue;
        }
        debug!(
            entry = %String::from_utf8_lossy(&entry.path_bytes()),
            size = entry.size(),
            "extracting tar entry"
        );
        let mut out = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut out)?;
        return Ok(out);
    }
    Err(ExtractionError::NoTabularEntry)
}

/// Package CSV bytes as a zip holding exactly one entry named [`ENTRY_NAME`].
pub fn pack(tabular: &[u8]) -> Result<Vec<u8>, ExtractionError> {
    pack_as(ArchiveKind::Zip, tabular)
}

/// Package CSV bytes as a single-entry container of the given kind.
pub fn pack_as(kind: ArchiveKind, tabular: &[u8]) -> Result<Vec<u8>, ExtractionError> {
    match kind {
        ArchiveKind::Zip => {
            let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
            writer.start_file(ENTRY_NAME, options)?;
            writer.write_all(tabular)?;
            Ok(writer.finish()?.into_inner())
        }
        ArchiveKind::Tar => {
            let mut builder = tar::Builder::new(Vec::new());
            let mut header = tar::Header::new_gnu();
            header.set_size(tabular.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, ENTRY_NAME, tabular)?;
            Ok(builder.into_inner()?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zip_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn tar_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, body) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(body.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *body).unwrap();
        }
        builder.into_inner().unwrap()
    }

    #[test]
    fn zip_returns_first_csv_entry_in_listing_order() {
        let bytes = zip_with(&[
            ("readme.txt", b"ignore me"),
            ("first.csv", b"a,b\n1,2\n"),
            ("second.csv", b"x,y\n"),
        ]);
        assert_eq!(extract(&bytes, ArchiveKind::Zip).unwrap(), b"a,b\n1,2\n");
    }

    #[test]
    fn tar_returns_first_csv_entry_in_listing_order() {
        let bytes = tar_with(&[
            ("notes.md", b"#"),
            ("dir/prices.csv", b"h\n"),
            ("other.csv", b"x\n"),
        ]);
        assert_eq!(extract(&bytes, ArchiveKind::Tar).unwrap(), b"h\n");
    }

    #[test]
    fn missing_csv_entry_is_an_error() {
        let bytes = zip_with(&[("data.txt", b"1,2")]);
        assert!(matches!(
            extract(&bytes, ArchiveKind::Zip),
            Err(ExtractionError::NoTabularEntry)
        ));
        let bytes = tar_with(&[("data.json", b"{}")]);
        assert!(matches!(
            extract(&bytes, ArchiveKind::Tar),
            Err(ExtractionError::NoTabularEntry)
        ));
    }

    #[test]
    fn garbage_is_rejected_as_zip() {
        assert!(matches!(
            extract(b"definitely not a zip", ArchiveKind::Zip),
            Err(ExtractionError::Zip(_))
        ));
    }

    #[test]
    fn pack_writes_single_fixed_entry() {
        let zipped = pack(b"id\n").unwrap();
        let mut archive = ZipArchive::new(Cursor::new(zipped.as_slice())).unwrap();
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.by_index(0).unwrap().name(), ENTRY_NAME);
        assert_eq!(extract(&zipped, ArchiveKind::Zip).unwrap(), b"id\n");

        let tarred = pack_as(ArchiveKind::Tar, b"id\n").unwrap();
        assert_eq!(extract(&tarred, ArchiveKind::Tar).unwrap(), b"id\n");
    }
}
