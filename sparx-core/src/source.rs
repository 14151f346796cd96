// Package source resolution: local archives and the hosted release feed

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};
use serde::Deserialize;

use crate::env::EmberEnv;
use crate::error::{Error, Result};
use crate::manifest::PackageId;

/// Extension of installable spark archives.
pub const SPARK_ARCHIVE_EXT: &str = ".spkg";

/// Hosted release feed endpoint, templated with `owner/repository`.
pub const FEED_URL: &str = "https://api.github.com/repos";

const USER_AGENT: &str = "sparx/1";
const FEED_TIMEOUT: Duration = Duration::from_secs(30);

/// One release in the feed, with its downloadable assets.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: String,

    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub browser_download_url: String,
}

impl ReleaseAsset {
    /// File name of the asset, taken from the last URL segment.
    pub fn filename(&self) -> &str {
        self.browser_download_url
            .rsplit('/')
            .next()
            .unwrap_or(&self.browser_download_url)
    }
}

/// Capability interface over the hosted release feed, so resolution can
/// be driven without network access.
pub trait ReleaseFeed {
    /// List all releases of `owner/repository`.
    fn releases(&self, repo: &str) -> Result<Vec<Release>>;

    /// Download an asset URL to `dest`.
    fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Production feed implementation over the hosted releases API.
pub struct GithubFeed {
    client: reqwest::blocking::Client,
}

impl GithubFeed {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FEED_TIMEOUT)
            .build()
            .map_err(|err| Error::SourceUnavailable(err.to_string()))?;

        Ok(Self { client })
    }
}

impl ReleaseFeed for GithubFeed {
    fn releases(&self, repo: &str) -> Result<Vec<Release>> {
        let url = format!("{}/{}/releases", FEED_URL, repo);
        debug!("querying release feed: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| Error::SourceUnavailable(err.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::SourceUnavailable(format!(
                "feed returned HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .map_err(|err| Error::SourceUnavailable(err.to_string()))
    }

    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let mut response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|err| Error::SourceUnavailable(err.to_string()))?;

        let mut file = fs::File::create(dest)?;
        std::io::copy(&mut response, &mut file)?;
        Ok(())
    }
}

/// An archive ready for installation. Archives downloaded from the feed
/// are deleted when the value is dropped; local archives are left alone.
#[derive(Debug)]
pub struct ResolvedArchive {
    path: PathBuf,
    temporary: bool,
}

impl ResolvedArchive {
    fn local(path: PathBuf) -> Self {
        Self {
            path,
            temporary: false,
        }
    }

    fn downloaded(path: PathBuf) -> Self {
        Self {
            path,
            temporary: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ResolvedArchive {
    fn drop(&mut self) {
        if self.temporary {
            if let Err(err) = fs::remove_file(&self.path) {
                warn!(
                    "failed to remove downloaded archive {}: {}",
                    self.path.display(),
                    err
                );
            }
        }
    }
}

/// Resolve an install target to an archive on the local filesystem.
///
/// An existing file path is used directly. Anything else is treated as a
/// `creator/package` feed identifier: the release whose tag equals `tag`
/// is located and its first `.spkg` asset is downloaded to the temp
/// directory.
pub fn resolve(
    target: &str,
    tag: Option<&str>,
    feed: &dyn ReleaseFeed,
    env: &EmberEnv,
) -> Result<ResolvedArchive> {
    let path = Path::new(target);
    if path.is_file() {
        return Ok(ResolvedArchive::local(path.to_path_buf()));
    }

    let id = PackageId::parse(target)?;
    let tag = tag.ok_or_else(|| Error::TagRequired(target.to_string()))?;

    let releases = feed.releases(target)?;
    let release = releases
        .iter()
        .find(|release| release.tag_name == tag)
        .ok_or_else(|| Error::PackageNotFound {
            repo: target.to_string(),
            tag: tag.to_string(),
        })?;

    let asset = release
        .assets
        .iter()
        .find(|asset| asset.filename().ends_with(SPARK_ARCHIVE_EXT))
        .ok_or_else(|| Error::PackageNotFound {
            repo: target.to_string(),
            tag: tag.to_string(),
        })?;

    let dest = env
        .temp_dir()
        .join(format!("{}{}", id.dir_name(), SPARK_ARCHIVE_EXT));

    info!("downloading {}", asset.browser_download_url);
    feed.download(&asset.browser_download_url, &dest)?;

    Ok(ResolvedArchive::downloaded(dest))
}
