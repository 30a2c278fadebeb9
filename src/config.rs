//! Web front end settings, loadable from a JSON file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::{Path, PathBuf};

use crate::collage::CollageOptions;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_BODY_LIMIT: usize = 64 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind: SocketAddr,
    /// Staging folder for uploaded images. Shared by all requests.
    pub upload_dir: PathBuf,
    pub result_dir: PathBuf,
    /// File name of the collage inside `result_dir`; later uploads overwrite it.
    pub result_file: String,
    /// Maximum accepted request body in bytes.
    pub body_limit: usize,
    pub collage: CollageOptions,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            upload_dir: PathBuf::from("uploads"),
            result_dir: PathBuf::from("results"),
            result_file: "collage.jpg".to_string(),
            body_limit: DEFAULT_BODY_LIMIT,
            collage: CollageOptions::default(),
        }
    }
}

impl WebConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn result_path(&self) -> PathBuf {
        self.result_dir.join(&self.result_file)
    }

    /// URL path under which the result directory is served.
    pub fn result_url(&self) -> String {
        format!("/results/{}", self.result_file)
    }

    pub fn ensure_dirs(&self) -> io::Result<()> {
        fs::create_dir_all(&self.upload_dir)?;
        fs::create_dir_all(&self.result_dir)
    }
}
