use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};

const ALLOWED_EXTENSIONS: &[&str] = &["txt", "pdf", "png", "jpg", "jpeg", "gif"];
const SALT_LEN: usize = 16;

/// The suffix after the last `.` is the only content-type gate; there
/// is no magic-byte sniffing.
pub fn is_allowed_extension(filename: &str) -> bool {
    match split_extension(filename) {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

/// Derives the public storage name: the original stem plus a random
/// salt, hashed to a fixed-length hex digest, with the original
/// extension reappended. The output never contains path separators or
/// a leading dot, whatever the input looked like.
pub fn generate_storage_filename(original: &str) -> Result<String> {
    // Strip any directory components before the name is used anywhere.
    let sanitized = Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let (stem, ext) = split_extension(sanitized)
        .ok_or_else(|| AppError::BadUpload("invalid filename".to_string()))?;

    let salt: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LEN)
        .map(char::from)
        .collect();

    let digest = hex::encode(Sha256::digest(format!("{stem}{salt}").as_bytes()));

    Ok(format!("{}.{}", digest, ext.to_ascii_lowercase()))
}

/// Writes the file with create-exclusive semantics: a name collision
/// fails loudly instead of overwriting.
pub async fn store(data: &[u8], storage_filename: &str, destination_dir: &str) -> Result<PathBuf> {
    fs::create_dir_all(destination_dir).await?;

    let path = Path::new(destination_dir).join(storage_filename);
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
        .map_err(|e| AppError::Storage(format!("create {}: {}", path.display(), e)))?;

    file.write_all(data)
        .await
        .map_err(|e| AppError::Storage(format!("write {}: {}", path.display(), e)))?;
    file.flush()
        .await
        .map_err(|e| AppError::Storage(format!("flush {}: {}", path.display(), e)))?;

    Ok(path)
}

/// Splits into (stem, extension), requiring a dot with a non-empty
/// stem on both sides. `.gitignore`-style names have no extension.
fn split_extension(filename: &str) -> Option<(&str, &str)> {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some((stem, ext)),
        _ => None,
    }
}
