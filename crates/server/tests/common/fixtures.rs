//! Test fixtures for generating test data.

use bytes::Bytes;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use sha2::{Digest, Sha256};

/// Attempt id present in [`quiz_archive`] fixtures built with the defaults.
#[allow(dead_code)]
pub const PRESENT_ATTEMPT_ID: u64 = 13775;

/// Generate deterministic test data based on a seed.
pub fn seeded_bytes(seed: u64, len: usize) -> Bytes {
    let mut data = vec![0u8; len];
    let mut state = seed;

    for chunk in data.chunks_mut(8) {
        // Simple LCG for deterministic data
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let bytes = state.to_le_bytes();
        for (i, byte) in chunk.iter_mut().enumerate() {
            *byte = bytes[i % 8];
        }
    }

    Bytes::from(data)
}

/// Compute SHA-256 hash of data as hex string.
#[allow(dead_code)]
pub fn sha256_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    result.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Build a tar.gz archive from `(path, content)` pairs.
#[allow(dead_code)]
pub fn tar_gz(entries: &[(String, Bytes)]) -> Bytes {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (path, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(1_700_000_000);
        header.set_cksum();
        builder
            .append_data(&mut header, path, data.as_ref())
            .expect("Failed to append tar entry");
    }
    let encoder = builder.into_inner().expect("Failed to finish tar");
    Bytes::from(encoder.finish().expect("Failed to finish gzip"))
}

/// A quiz archive in the layout the archive worker produces.
///
/// Each attempt gets a directory `attempts/attempt-<id>/` with a multi-KB
/// report and an attachment; course-level files sit beside it.
#[allow(dead_code)]
pub fn quiz_archive(attempt_ids: &[u64]) -> Bytes {
    let mut entries = vec![
        ("README.txt".to_string(), Bytes::from_static(b"quiz archive")),
        ("course/backup.mbz".to_string(), seeded_bytes(1, 2048)),
    ];
    for id in attempt_ids {
        entries.push((
            format!("attempts/attempt-{id}/report.html"),
            seeded_bytes(*id, 4096),
        ));
        entries.push((
            format!("attempts/attempt-{id}/attachments/answer.txt"),
            seeded_bytes(id + 1, 512),
        ));
    }
    tar_gz(&entries)
}

/// The default quiz archive, holding [`PRESENT_ATTEMPT_ID`] and two others.
#[allow(dead_code)]
pub fn reference_archive() -> Bytes {
    quiz_archive(&[42, PRESENT_ATTEMPT_ID, 1337])
}

/// Entry paths of a tar.gz archive, in archive order.
#[allow(dead_code)]
pub fn entry_names(archive: &[u8]) -> Vec<String> {
    let mut archive = tar::Archive::new(GzDecoder::new(archive));
    archive
        .entries()
        .expect("Failed to read archive")
        .map(|entry| {
            entry
                .expect("Failed to read entry")
                .path()
                .expect("Invalid entry path")
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}
