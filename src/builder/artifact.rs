//! Intermediate object file naming.
//!
//! Every object lands flat in the build directory as
//! `{stem}-{hash8}.o`, where `hash8` comes from the source's full resolved
//! path string. Two `main.c` files in different directories therefore never
//! collide, and the same source always maps to the same object.

use std::path::{Path, PathBuf};

use crate::util::hash::short_hash;

/// Number of hex characters of the path hash kept in object names.
pub const HASH_LEN: usize = 8;

/// Object file extension.
pub const OBJECT_EXT: &str = "o";

/// Object file name for `source`, e.g. `main-1a2b3c4d.o`.
///
/// The stem is the file name up to its first `.`.
pub fn object_name(source: &Path) -> String {
    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name.split('.').next().unwrap_or_default();
    let hash = short_hash(&source.to_string_lossy(), HASH_LEN);

    format!("{}-{}.{}", stem, hash, OBJECT_EXT)
}

/// Full object path for `source` inside `build_dir`.
pub fn object_path(build_dir: &Path, source: &Path) -> PathBuf {
    build_dir.join(object_name(source))
}
