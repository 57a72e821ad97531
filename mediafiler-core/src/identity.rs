//! Short, deterministic file identifiers.
//!
//! Every path is hashed with SHA-224 and rendered in lowercase base-32. A scan
//! then truncates all digests to the shortest common length that keeps them
//! pairwise distinct, so identifiers stay short for small libraries and grow
//! only when the file set demands it.

use std::{collections::HashSet, path::Path};

use data_encoding::BASE32_NOPAD;
use sha2::{Digest, Sha224};

use crate::types::FileEntry;

/// Length of an untruncated identifier: 224 bits in 5-bit symbols.
pub const DIGEST_LEN: usize = 45;

/// Full-length identifier for `path`.
pub fn path_digest(path: &Path) -> String {
    let mut hasher = Sha224::new();
    hasher.update(path.as_os_str().as_encoded_bytes());
    BASE32_NOPAD
        .encode(&hasher.finalize())
        .to_ascii_lowercase()
}

/// True if `id` could have been produced by [`path_digest`] plus truncation.
pub fn is_well_formed_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= DIGEST_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || (b'2'..=b'7').contains(&b))
}

/// Smallest `n >= 1` such that the first `n` characters of every id are
/// pairwise distinct. Falls back to [`DIGEST_LEN`] when no shorter prefix
/// disambiguates the set.
pub fn min_unique_prefix<'a, I>(ids: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
    I::IntoIter: Clone,
{
    let ids = ids.into_iter();
    'lengths: for n in 1..DIGEST_LEN {
        let mut seen = HashSet::new();
        for id in ids.clone() {
            let prefix = id.get(..n).unwrap_or(id);
            if !seen.insert(prefix) {
                continue 'lengths;
            }
        }
        return n;
    }
    DIGEST_LEN
}

/// Recompute every entry's identifier from its path and truncate all of them
/// to the minimum unique prefix, in place.
pub fn assign_short_ids(entries: &mut [FileEntry]) {
    for entry in entries.iter_mut() {
        entry.id = path_digest(&entry.path);
    }

    let n = min_unique_prefix(entries.iter().map(|e| e.id.as_str()));
    for entry in entries.iter_mut() {
        entry.id.truncate(n);
    }
}
