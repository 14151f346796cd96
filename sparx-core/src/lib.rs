// sparx-core - package management for the Ember engine toolchain

pub mod build;
pub mod cache;
pub mod descriptor;
pub mod env;
pub mod error;
pub mod installer;
pub mod linker;
pub mod manifest;
pub mod source;

pub use build::{run_build, BuildOutcome, BUILD_TOOL, DESCRIPTOR_FILE};
pub use cache::{size_in_mb, GlobalCache, CACHE_DIR_NAME};
pub use descriptor::{BuildDescriptor, Reference};
pub use env::EmberEnv;
pub use error::{Error, Result};
pub use installer::{stage, InstalledPackage, PendingInstall};
pub use linker::generate_descriptor;
pub use manifest::{PackageId, ProjectConfig, SparkManifest, MANIFEST_FILE};
pub use source::{
    resolve, GithubFeed, Release, ReleaseAsset, ReleaseFeed, ResolvedArchive, SPARK_ARCHIVE_EXT,
};

/// Package manager version
pub const VERSION: &str = "0.1.0";
