// Ember installation environment

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Name of the single-line file selecting the active engine version.
pub const VERSION_POINTER_FILE: &str = ".sparxversion";

/// Directory under the engine root holding one subdirectory per
/// installed engine version.
pub const VERSIONS_DIR: &str = "Versions";

/// Resolved Ember environment: engine root and scratch directory.
///
/// Built once at the process edge (the CLI owns the environment-variable
/// discovery) and passed into every component, so the library itself never
/// reads ambient environment state.
#[derive(Debug, Clone)]
pub struct EmberEnv {
    ember_root: PathBuf,
    temp_dir: PathBuf,
}

impl EmberEnv {
    pub fn new(ember_root: PathBuf, temp_dir: PathBuf) -> Self {
        Self {
            ember_root,
            temp_dir,
        }
    }

    pub fn ember_root(&self) -> &Path {
        &self.ember_root
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    pub fn version_pointer_path(&self) -> PathBuf {
        self.ember_root.join(VERSION_POINTER_FILE)
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.ember_root.join(VERSIONS_DIR)
    }

    /// Install directory of a specific engine version.
    pub fn version_install_dir(&self, version: &str) -> PathBuf {
        self.versions_dir().join(version)
    }

    /// Read the active engine version from the pointer file.
    pub fn active_version(&self) -> Result<String> {
        let pointer = self.version_pointer_path();
        let content = fs::read_to_string(&pointer).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                Error::VersionNotSet
            } else {
                Error::Io(err)
            }
        })?;

        let version = content.trim();
        if version.is_empty() {
            return Err(Error::VersionNotSet);
        }

        Ok(version.to_string())
    }

    /// Select the active engine version. The version must already be
    /// installed under `Versions/`; the pointer file is created on first
    /// use and overwritten afterwards.
    pub fn set_active_version(&self, version: &str) -> Result<()> {
        if !self.version_install_dir(version).is_dir() {
            return Err(Error::UnknownVersion(version.to_string()));
        }

        fs::write(self.version_pointer_path(), version)?;
        Ok(())
    }
}
