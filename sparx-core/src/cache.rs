// Version-scoped global cache layout

use std::fs;
use std::path::{Path, PathBuf};

use crate::env::EmberEnv;
use crate::error::Result;
use crate::manifest::PackageId;

/// Directory under a version install holding every installed spark.
pub const CACHE_DIR_NAME: &str = "SparxGlobalCache";

/// The global cache of the active engine version.
///
/// Each installed package occupies exactly one directory directly under
/// the cache root; the directory's `.spark` manifest describes the
/// artifact present there. The cache is a plain, unsynchronized
/// filesystem tree: a single active invocation is assumed.
#[derive(Debug, Clone)]
pub struct GlobalCache {
    root: PathBuf,
}

impl GlobalCache {
    /// Open the cache of the currently selected engine version, creating
    /// the cache directory if needed.
    pub fn open(env: &EmberEnv) -> Result<Self> {
        let version = env.active_version()?;
        let root = env.version_install_dir(&version).join(CACHE_DIR_NAME);
        Self::at_root(root)
    }

    /// Open a cache at an explicit root.
    pub fn at_root(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Cache directory a package identifier installs to.
    pub fn package_dir(&self, id: &PackageId) -> PathBuf {
        self.root.join(id.dir_name())
    }

    pub fn has_package(&self, id: &PackageId) -> bool {
        self.package_dir(id).is_dir()
    }

    /// Recursive sum of file sizes in bytes.
    pub fn dir_size(path: &Path) -> Result<u64> {
        let mut total = 0u64;

        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let metadata = entry.metadata()?;

            if metadata.is_file() {
                total += metadata.len();
            } else if metadata.is_dir() {
                total += Self::dir_size(&entry.path())?;
            }
        }

        Ok(total)
    }
}

/// Convert a byte count to megabytes for display.
pub fn size_in_mb(bytes: u64) -> f64 {
    bytes as f64 / 1_048_576.0
}
