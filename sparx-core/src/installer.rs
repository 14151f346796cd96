// Archive extraction into the global cache, with staged confirmation

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::cache::{size_in_mb, GlobalCache};
use crate::error::{Error, Result};
use crate::manifest::{SparkManifest, MANIFEST_FILE};

/// An extracted-but-unconfirmed install.
///
/// The extracted state *is* the installed state: accepting is a no-op,
/// rejecting removes the whole directory. The decision is a plain bool so
/// any caller (interactive shell, tests) can drive it.
#[derive(Debug)]
pub struct PendingInstall {
    manifest: SparkManifest,
    install_dir: PathBuf,
    size_bytes: u64,
}

/// A finalized install, as reported to the caller.
#[derive(Debug, Clone)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
    pub install_dir: PathBuf,
}

impl PendingInstall {
    pub fn manifest(&self) -> &SparkManifest {
        &self.manifest
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// On-disk size of the extracted package in megabytes.
    pub fn size_mb(&self) -> f64 {
        size_in_mb(self.size_bytes)
    }

    /// Finalize or roll back the staged install.
    pub fn confirm(self, accepted: bool) -> Result<Option<InstalledPackage>> {
        if !accepted {
            fs::remove_dir_all(&self.install_dir)?;
            return Ok(None);
        }

        Ok(Some(InstalledPackage {
            name: self.manifest.name,
            version: self.manifest.version,
            install_dir: self.install_dir,
        }))
    }
}

/// Extract `archive` into the cache and load its manifest.
///
/// The target directory is named after the archive file stem. A
/// pre-existing directory at that path is not an error: re-installing
/// replaces it wholesale, so no stale files from a prior install with a
/// different file set survive. Manifest problems are `InvalidPackage`;
/// the extracted files stay on disk for inspection.
pub fn stage(archive: &Path, cache: &GlobalCache) -> Result<PendingInstall> {
    let stem = archive
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| Error::InvalidPackage {
            dir: archive.to_path_buf(),
            reason: "archive has no usable file name".to_string(),
        })?;

    let install_dir = cache.root().join(stem);
    if install_dir.exists() {
        fs::remove_dir_all(&install_dir)?;
    }
    fs::create_dir_all(&install_dir)?;

    info!("extracting {} to {}", archive.display(), install_dir.display());
    let file = fs::File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file).map_err(|err| Error::InvalidPackage {
        dir: install_dir.clone(),
        reason: err.to_string(),
    })?;
    zip.extract(&install_dir).map_err(|err| Error::InvalidPackage {
        dir: install_dir.clone(),
        reason: err.to_string(),
    })?;

    let manifest = load_package_manifest(&install_dir)?;
    let size_bytes = GlobalCache::dir_size(&install_dir)?;

    Ok(PendingInstall {
        manifest,
        install_dir,
        size_bytes,
    })
}

fn load_package_manifest(install_dir: &Path) -> Result<SparkManifest> {
    let path = install_dir.join(MANIFEST_FILE);

    let content = fs::read_to_string(&path).map_err(|err| Error::InvalidPackage {
        dir: install_dir.to_path_buf(),
        reason: format!("missing {} manifest: {}", MANIFEST_FILE, err),
    })?;

    let manifest = SparkManifest::from_str(&content).map_err(|err| Error::InvalidPackage {
        dir: install_dir.to_path_buf(),
        reason: format!("corrupt {} manifest: {}", MANIFEST_FILE, err),
    })?;

    if manifest.name.is_empty() || manifest.version.is_empty() {
        return Err(Error::InvalidPackage {
            dir: install_dir.to_path_buf(),
            reason: "manifest is missing a package name or version".to_string(),
        });
    }

    Ok(manifest)
}
