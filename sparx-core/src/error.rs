// Error taxonomy shared by every sparx component

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The hosted release feed could not be queried at all.
    #[error("failed to reach the release feed ({0}); check your internet connection and try again")]
    SourceUnavailable(String),

    /// No release matched the requested tag, or the matching release
    /// carried no `.spkg` asset.
    #[error("no .spkg release found for {repo} at tag {tag}")]
    PackageNotFound { repo: String, tag: String },

    /// The extracted archive did not contain a usable manifest. The
    /// extracted files are left on disk for inspection.
    #[error("invalid spark package at {}: {reason}", .dir.display())]
    InvalidPackage { dir: PathBuf, reason: String },

    /// One or more declared dependencies are missing from the global cache.
    #[error("unresolved dependencies: {}; install them with `sparx add`", .0.join(", "))]
    UnresolvedDependency(Vec<String>),

    #[error("could not find the `{0}` build tool on the executable search path; is the Ember toolchain installed?")]
    BuildToolMissing(String),

    #[error("the build tool exited with status {status}")]
    BuildFailed { status: i32 },

    #[error("no active Ember version is selected; run `sparx emberversion <version>` first")]
    VersionNotSet,

    #[error("Ember version {0} is not installed; are you sure you installed it?")]
    UnknownVersion(String),

    #[error("invalid package identifier `{0}`; expected creator/package")]
    InvalidPackageId(String),

    #[error("a release tag is required to install {0} from the feed")]
    TagRequired(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
