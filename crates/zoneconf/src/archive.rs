//! Bundle archive extraction.

use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use crate::error::{FetchError, FetchResult};

/// Upper bound on the uncompressed size of a single archive entry.
///
/// The size recorded in the zip headers comes from the response body and is
/// checked before any allocation, so a forged entry size cannot drive memory
/// exhaustion.
pub const MAX_ENTRY_SIZE: u64 = 64 * 1024 * 1024;

/// Decompress a zip archive fully into memory.
///
/// The returned map holds every file entry in the archive keyed by entry
/// name; directory entries are skipped. Duplicate entry names keep the last
/// occurrence. Identical input bytes always yield an identical map.
pub fn unzip(bytes: &[u8]) -> FetchResult<BTreeMap<String, Vec<u8>>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(corrupt)?;

    let mut entries = BTreeMap::new();
    for index in 0..archive.len() {
        let mut file = archive.by_index(index).map_err(corrupt)?;
        if file.is_dir() {
            continue;
        }

        let name = file.name().to_string();
        check_entry_size(&name, file.size())?;

        let mut data = Vec::new();
        file.take(MAX_ENTRY_SIZE + 1)
            .read_to_end(&mut data)
            .map_err(|e| FetchError::CorruptArchive {
                message: format!("entry {}: {}", name, e),
            })?;
        // The declared size can understate the real one; the bounded reader
        // above makes the overrun detectable here.
        check_entry_size(&name, data.len() as u64)?;
        entries.insert(name, data);
    }

    Ok(entries)
}

fn check_entry_size(name: &str, size: u64) -> FetchResult<()> {
    if size > MAX_ENTRY_SIZE {
        return Err(FetchError::CorruptArchive {
            message: format!(
                "entry {}: size {} exceeds limit of {} bytes",
                name, size, MAX_ENTRY_SIZE
            ),
        });
    }
    Ok(())
}

fn corrupt(err: zip::result::ZipError) -> FetchError {
    FetchError::CorruptArchive {
        message: err.to_string(),
    }
}

#[cfg(test)]
pub(crate) fn build_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    use std::io::Write;

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();

    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }

    writer.finish().unwrap().into_inner()
}
