//! Image files of a folder, annotated with their file-name timestamps.

use bytesize::ByteSize;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::timestamp::extract_timestamp;

pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "tif", "tiff"];

/// Folders with fewer images than this cannot produce a collage.
pub const MIN_CATALOG_IMAGES: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub path: PathBuf,
    pub file_name: String,
    pub size: ByteSize,
    pub timestamp: String,
}

impl CatalogEntry {
    pub fn display_line(&self) -> String {
        format!("{} ({}) | Date and time: {}", self.file_name, self.size, self.timestamp)
    }
}

pub fn is_supported_image(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(OsStr::to_str) else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    SUPPORTED_EXTENSIONS.contains(&ext.as_str())
}

/// Lists the supported image files directly inside `folder`, sorted by file name.
pub fn list_images(folder: &Path) -> io::Result<Vec<CatalogEntry>> {
    let mut entries = Vec::new();
    for dir_entry in fs::read_dir(folder)? {
        let dir_entry = dir_entry?;
        let path = dir_entry.path();
        if !is_supported_image(&path) {
            continue;
        }
        let Ok(metadata) = fs::metadata(&path) else {
            debug!(path = %path.display(), "skipping unreadable entry");
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let file_name = dir_entry.file_name().to_string_lossy().into_owned();
        entries.push(CatalogEntry {
            timestamp: extract_timestamp(&file_name),
            size: ByteSize::b(metadata.len()),
            file_name,
            path,
        });
    }
    entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(entries)
}
