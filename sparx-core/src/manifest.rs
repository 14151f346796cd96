// Manifest and project configuration model (.spark files)

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File name of both the package manifest (at an extracted archive root)
/// and the project configuration (at the project root).
pub const MANIFEST_FILE: &str = ".spark";

/// Identifier of a spark: `creator/package`.
///
/// The cache directory name joins the two halves with `-`, so every
/// identifier maps to exactly one directory under the global cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageId {
    creator: String,
    name: String,
}

impl PackageId {
    pub fn parse(raw: &str) -> Result<Self> {
        let (creator, name) = raw
            .split_once('/')
            .ok_or_else(|| Error::InvalidPackageId(raw.to_string()))?;

        if creator.is_empty() || name.is_empty() || name.contains('/') {
            return Err(Error::InvalidPackageId(raw.to_string()));
        }

        Ok(Self {
            creator: creator.to_string(),
            name: name.to_string(),
        })
    }

    pub fn creator(&self) -> &str {
        &self.creator
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path-safe cache directory name for this identifier.
    pub fn dir_name(&self) -> String {
        format!("{}-{}", self.creator, self.name)
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.creator, self.name)
    }
}

/// Manifest found at the root of an extracted spark package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparkManifest {
    pub name: String,
    pub author: String,
    pub version: String,

    /// Dependencies of the spark itself, as `creator/package` identifiers.
    #[serde(default)]
    pub sparks: Vec<String>,

    /// Primary compiled artifact, relative to the package root.
    #[serde(rename = "libraryDll")]
    pub library_dll: String,

    #[serde(rename = "mainNamespace", default, skip_serializing_if = "Option::is_none")]
    pub main_namespace: Option<String>,
}

impl SparkManifest {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        Self::from_str(&content)
    }

    pub fn from_str(content: &str) -> Result<Self> {
        let manifest: SparkManifest = serde_json::from_str(content)?;
        Ok(manifest)
    }
}

/// Project configuration at the project root: the single source of
/// project state, rewritten wholesale on every mutating command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub author: String,
    pub version: String,

    /// Declared dependencies in declaration order. Duplicates are
    /// permitted and preserved.
    #[serde(default)]
    pub sparks: Vec<String>,
}

impl ProjectConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let config: ProjectConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Load the `.spark` configuration from a project directory.
    pub fn load(project_dir: &Path) -> Result<Self> {
        Self::from_file(project_dir.join(MANIFEST_FILE))
    }

    /// Rewrite the `.spark` configuration in a project directory.
    pub fn store(&self, project_dir: &Path) -> Result<()> {
        self.to_file(project_dir.join(MANIFEST_FILE))
    }

    /// Append a dependency declaration.
    pub fn add_spark(&mut self, id: &PackageId) {
        self.sparks.push(id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_package_id() {
        let id = PackageId::parse("acme/widget").unwrap();
        assert_eq!(id.creator(), "acme");
        assert_eq!(id.name(), "widget");
        assert_eq!(id.dir_name(), "acme-widget");
        assert_eq!(id.to_string(), "acme/widget");
    }

    #[test]
    fn test_reject_malformed_package_id() {
        assert!(PackageId::parse("widget").is_err());
        assert!(PackageId::parse("/widget").is_err());
        assert!(PackageId::parse("acme/").is_err());
        assert!(PackageId::parse("acme/widget/extra").is_err());
    }

    #[test]
    fn test_parse_spark_manifest() {
        let json = r#"{
            "name": "widget",
            "author": "acme",
            "version": "1.2.0",
            "libraryDll": "widget.dll",
            "mainNamespace": "Acme.Widget",
            "sparks": ["acme/gadget"]
        }"#;

        let manifest = SparkManifest::from_str(json).unwrap();
        assert_eq!(manifest.name, "widget");
        assert_eq!(manifest.library_dll, "widget.dll");
        assert_eq!(manifest.main_namespace.as_deref(), Some("Acme.Widget"));
        assert_eq!(manifest.sparks, vec!["acme/gadget"]);
    }

    #[test]
    fn test_config_roundtrip_appends_one_entry() {
        let dir = tempfile::tempdir().unwrap();
        let original = ProjectConfig {
            name: "demo".to_string(),
            author: "someone".to_string(),
            version: "0.1.0".to_string(),
            sparks: vec!["acme/widget".to_string()],
        };
        original.store(dir.path()).unwrap();

        let mut reloaded = ProjectConfig::load(dir.path()).unwrap();
        assert_eq!(reloaded, original);

        reloaded.add_spark(&PackageId::parse("acme/gadget").unwrap());
        reloaded.store(dir.path()).unwrap();

        let after = ProjectConfig::load(dir.path()).unwrap();
        assert_eq!(after.sparks, vec!["acme/widget", "acme/gadget"]);
    }

    #[test]
    fn test_duplicate_sparks_preserved() {
        let mut config = ProjectConfig {
            name: "demo".to_string(),
            author: "someone".to_string(),
            version: "0.1.0".to_string(),
            sparks: vec!["acme/widget".to_string()],
        };

        config.add_spark(&PackageId::parse("acme/widget").unwrap());
        assert_eq!(config.sparks.len(), 2);
    }
}
