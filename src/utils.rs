use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::fs::Metadata;
use std::path::Path;
use std::time::SystemTime;

const SHORT_ID_ALPHABET: &[u8] = b"23456789abcdefghijkmnpqrstuvwxyz";
const SOURCE_ID_TOKEN_LEN: usize = 10;

pub fn system_time_to_datetime(time: SystemTime) -> Option<DateTime<Utc>> {
    Some(DateTime::<Utc>::from(time))
}

/// Stable fingerprint for a source workbook: path, size and mtime feed a
/// SHA-256 digest whose leading bits become a short base32 token. Re-running
/// over an unchanged download yields the same id.
pub fn hash_path_metadata(path: &Path, metadata: &Metadata) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    hasher.update(metadata.len().to_le_bytes());
    if let Ok(modified) = metadata.modified()
        && let Some(dt) = system_time_to_datetime(modified)
    {
        hasher.update(dt.to_rfc3339_opts(SecondsFormat::Micros, true).as_bytes());
    }
    let digest: [u8; 32] = hasher.finalize().into();

    let mut leading = [0u8; 8];
    leading.copy_from_slice(&digest[..8]);
    let mut value = u64::from_be_bytes(leading);

    let mut token = String::with_capacity(SOURCE_ID_TOKEN_LEN);
    for _ in 0..SOURCE_ID_TOKEN_LEN {
        // top five bits per base32 character
        token.push(SHORT_ID_ALPHABET[(value >> 59) as usize] as char);
        value <<= 5;
    }
    format!("src-{}", token)
}

pub fn column_number_to_name(column: u32) -> String {
    let mut column = column;
    let mut reversed = Vec::new();
    while column > 0 {
        reversed.push(b'A' + ((column - 1) % 26) as u8);
        column = (column - 1) / 26;
    }
    reversed.iter().rev().map(|b| *b as char).collect()
}

pub fn column_name_to_number(name: &str) -> Option<u32> {
    let mut column = 0u32;
    for ch in name.chars() {
        let upper = ch.to_ascii_uppercase();
        if !upper.is_ascii_uppercase() {
            return None;
        }
        column = column
            .checked_mul(26)?
            .checked_add(upper as u32 - 'A' as u32 + 1)?;
    }
    if column == 0 { None } else { Some(column) }
}

pub fn cell_address(column: u32, row: u32) -> String {
    format!("{}{}", column_number_to_name(column), row)
}

pub fn path_to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

pub fn make_short_random_id(prefix: &str, len: usize) -> String {
    let mut rng = rand::thread_rng();
    let token: String = (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..SHORT_ID_ALPHABET.len());
            SHORT_ID_ALPHABET[idx] as char
        })
        .collect();

    if prefix.is_empty() {
        token
    } else {
        format!("{}-{}", prefix, token)
    }
}
