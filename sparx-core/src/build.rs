// Build invocation: descriptor emission, emberc lookup, asset staging

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{info, warn};

use crate::cache::GlobalCache;
use crate::error::{Error, Result};
use crate::linker::generate_descriptor;
use crate::manifest::ProjectConfig;

/// Fixed binary name of the external build tool.
pub const BUILD_TOOL: &str = "emberc";

/// Canonical descriptor filename the build tool is invoked against.
pub const DESCRIPTOR_FILE: &str = "SparxProject.eproj";

/// Extension of the intermediate, project-named descriptor file.
pub const DESCRIPTOR_EXT: &str = "eproj";

/// Build output directory assets are staged into.
pub const OUTPUT_DIR: &str = "bin/ember-2.0";

const ASSETS_DIR: &str = "Assets";

/// What a completed build produced.
#[derive(Debug)]
pub struct BuildOutcome {
    pub descriptor_path: PathBuf,
    pub assets_staged: bool,
}

/// Generate the descriptor and run the external build tool on it.
///
/// The descriptor is first written under the project's own name, then
/// renamed to the canonical filename just before invocation. A failed
/// build leaves the renamed descriptor in place for inspection.
pub fn run_build(
    config: &ProjectConfig,
    cache: &GlobalCache,
    project_dir: &Path,
) -> Result<BuildOutcome> {
    let canonical = project_dir.join(DESCRIPTOR_FILE);
    if canonical.exists() {
        fs::remove_file(&canonical)?;
    }

    let descriptor = generate_descriptor(config, cache, project_dir)?;
    let named = project_dir.join(format!("{}.{}", config.name, DESCRIPTOR_EXT));
    descriptor.write_to(&named)?;
    fs::rename(&named, &canonical)?;

    let tool = which::which(BUILD_TOOL)
        .map_err(|_| Error::BuildToolMissing(BUILD_TOOL.to_string()))?;

    info!("running {} build {}", tool.display(), DESCRIPTOR_FILE);
    let status = Command::new(&tool)
        .arg("build")
        .arg(DESCRIPTOR_FILE)
        .current_dir(project_dir)
        .status()?;

    if !status.success() {
        return Err(Error::BuildFailed {
            status: status.code().unwrap_or(-1),
        });
    }

    let assets_staged = stage_assets(project_dir);

    Ok(BuildOutcome {
        descriptor_path: canonical,
        assets_staged,
    })
}

/// Copy the sibling `Assets` tree into the build output directory,
/// overwriting same-named files. Best-effort: failures are logged and
/// never fail the build.
fn stage_assets(project_dir: &Path) -> bool {
    let parent = match project_dir.parent() {
        Some(parent) => parent,
        None => return false,
    };

    let assets = parent.join(ASSETS_DIR);
    if !assets.is_dir() {
        return false;
    }

    let output = project_dir.join(OUTPUT_DIR);
    match copy_tree(&assets, &output) {
        Ok(()) => true,
        Err(err) => {
            warn!("failed to stage assets from {}: {}", assets.display(), err);
            false
        }
    }
}

fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.path().is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::sync::Mutex;

    // The executable search path is process-global state; tests that
    // touch it take this lock and restore the old value on drop.
    static PATH_LOCK: Mutex<()> = Mutex::new(());

    struct PathOverride {
        saved: Option<OsString>,
    }

    impl PathOverride {
        fn to(dir: &Path) -> Self {
            let saved = std::env::var_os("PATH");
            std::env::set_var("PATH", dir);
            Self { saved }
        }
    }

    impl Drop for PathOverride {
        fn drop(&mut self) {
            match &self.saved {
                Some(original) => std::env::set_var("PATH", original),
                None => std::env::remove_var("PATH"),
            }
        }
    }

    #[cfg(unix)]
    fn write_fake_tool(dir: &Path, exit_code: i32) {
        use std::os::unix::fs::PermissionsExt;

        let tool = dir.join(BUILD_TOOL);
        fs::write(&tool, format!("#!/bin/sh\nexit {}\n", exit_code)).unwrap();
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn demo_config() -> ProjectConfig {
        ProjectConfig {
            name: "demo".to_string(),
            author: "someone".to_string(),
            version: "0.1.0".to_string(),
            sparks: Vec::new(),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_run_build_invokes_tool_and_leaves_canonical_descriptor() {
        let _lock = PATH_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        fs::create_dir_all(&bin).unwrap();
        write_fake_tool(&bin, 0);
        let _path = PathOverride::to(&bin);

        let project_dir = dir.path().join("project");
        fs::create_dir_all(&project_dir).unwrap();
        let cache = GlobalCache::at_root(dir.path().join("cache")).unwrap();

        let outcome = run_build(&demo_config(), &cache, &project_dir).unwrap();
        assert_eq!(outcome.descriptor_path, project_dir.join(DESCRIPTOR_FILE));
        assert!(outcome.descriptor_path.is_file());
        // The intermediate project-named file was renamed away.
        assert!(!project_dir.join("demo.eproj").exists());
        assert!(!outcome.assets_staged);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_build_propagates_nonzero_exit() {
        let _lock = PATH_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        fs::create_dir_all(&bin).unwrap();
        write_fake_tool(&bin, 7);
        let _path = PathOverride::to(&bin);

        let project_dir = dir.path().join("project");
        fs::create_dir_all(&project_dir).unwrap();
        let cache = GlobalCache::at_root(dir.path().join("cache")).unwrap();

        let err = run_build(&demo_config(), &cache, &project_dir).unwrap_err();
        assert!(matches!(err, Error::BuildFailed { status: 7 }));
        // The renamed descriptor stays in place for inspection.
        assert!(project_dir.join(DESCRIPTOR_FILE).is_file());
    }

    #[test]
    fn test_missing_build_tool_aborts_before_invocation() {
        let _lock = PATH_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty");
        fs::create_dir_all(&empty).unwrap();
        let _path = PathOverride::to(&empty);

        let project_dir = dir.path().join("project");
        fs::create_dir_all(&project_dir).unwrap();
        let cache = GlobalCache::at_root(dir.path().join("cache")).unwrap();

        let err = run_build(&demo_config(), &cache, &project_dir).unwrap_err();
        assert!(matches!(err, Error::BuildToolMissing(name) if name == BUILD_TOOL));
    }

    #[test]
    fn test_copy_tree_overwrites_same_named_files() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("a.txt"), b"new").unwrap();
        fs::write(src.join("nested").join("b.txt"), b"deep").unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(dst.join("a.txt"), b"old").unwrap();

        copy_tree(&src, &dst).unwrap();

        assert_eq!(fs::read(dst.join("a.txt")).unwrap(), b"new");
        assert_eq!(fs::read(dst.join("nested").join("b.txt")).unwrap(), b"deep");
    }

    #[test]
    fn test_stage_assets_without_sibling_directory() {
        let dir = tempfile::tempdir().unwrap();
        let project_dir = dir.path().join("project");
        fs::create_dir_all(&project_dir).unwrap();

        assert!(!stage_assets(&project_dir));
        assert!(!project_dir.join(OUTPUT_DIR).exists());
    }

    #[test]
    fn test_stage_assets_copies_into_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let project_dir = dir.path().join("project");
        fs::create_dir_all(&project_dir).unwrap();
        let assets = dir.path().join(ASSETS_DIR);
        fs::create_dir_all(&assets).unwrap();
        fs::write(assets.join("logo.png"), b"png").unwrap();

        assert!(stage_assets(&project_dir));
        assert_eq!(
            fs::read(project_dir.join(OUTPUT_DIR).join("logo.png")).unwrap(),
            b"png"
        );
    }
}
