// Project linking: declared dependencies -> build descriptor references

use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::GlobalCache;
use crate::descriptor::BuildDescriptor;
use crate::error::{Error, Result};
use crate::manifest::{PackageId, ProjectConfig, SparkManifest, MANIFEST_FILE};

/// Project-local directory whose artifacts are referenced without a
/// manifest.
pub const LIB_DIR: &str = "lib";

/// Build the descriptor for a project against the global cache.
///
/// References appear in declared dependency order, then `lib/` artifacts
/// in lexical filename order, so generation is deterministic for
/// unchanged inputs. Every unresolvable dependency is collected before
/// failing; nothing is emitted on error.
pub fn generate_descriptor(
    config: &ProjectConfig,
    cache: &GlobalCache,
    project_dir: &Path,
) -> Result<BuildDescriptor> {
    let mut descriptor = BuildDescriptor::new();
    let mut unresolved = Vec::new();

    for spark in &config.sparks {
        match resolve_dependency(spark, cache) {
            Ok((include, hint_path)) => descriptor.push_reference(include, hint_path),
            Err(_) => unresolved.push(spark.clone()),
        }
    }

    if !unresolved.is_empty() {
        return Err(Error::UnresolvedDependency(unresolved));
    }

    for artifact in library_artifacts(project_dir)? {
        descriptor.push_reference(file_stem_of(&artifact), artifact);
    }

    Ok(descriptor)
}

/// Resolve one declared identifier to its reference name and the
/// artifact path the package's manifest declares.
fn resolve_dependency(spark: &str, cache: &GlobalCache) -> Result<(String, PathBuf)> {
    let id = PackageId::parse(spark)?;
    let package_dir = cache.package_dir(&id);
    let manifest = SparkManifest::from_file(package_dir.join(MANIFEST_FILE))?;

    // The manifest's declared artifact path is authoritative; a custom
    // layout inside the package is respected as-is.
    let artifact = package_dir.join(&manifest.library_dll);
    Ok((file_stem_of(&artifact), artifact))
}

/// Files in the project-local `lib/` directory, lexically ordered. A
/// missing directory contributes nothing.
fn library_artifacts(project_dir: &Path) -> Result<Vec<PathBuf>> {
    let lib_dir = project_dir.join(LIB_DIR);
    if !lib_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut artifacts = Vec::new();
    for entry in fs::read_dir(&lib_dir)? {
        let entry = entry?;
        if entry.path().is_file() {
            artifacts.push(entry.path());
        }
    }

    artifacts.sort();
    Ok(artifacts)
}

fn file_stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
