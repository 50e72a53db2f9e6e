use std::fs;
use std::path::Path;

use log::{info, warn};

/// Class ordering the current model artifact was trained with. Must stay in
/// sync with the output layer; the manifest next to the artifact is the
/// authoritative copy.
pub const DEFAULT_LABELS: [&str; 4] = ["glioma", "meningioma", "notumor", "pituitary"];

/// Ordered list of class names. The index used by the inference engine's
/// output vector corresponds positionally to this sequence, so every
/// surface must share one catalog instance built at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelCatalog {
    labels: Vec<String>,
}

impl LabelCatalog {
    /// The hardcoded fallback catalog.
    pub fn builtin() -> Self {
        Self {
            labels: DEFAULT_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Loads the ordered label list persisted next to the model artifact
    /// (a JSON array of strings).
    pub fn from_manifest(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let raw = fs::read_to_string(path)?;
        let labels: Vec<String> = serde_json::from_str(&raw)?;
        if labels.is_empty() {
            return Err(format!("label manifest {} is empty", path.display()).into());
        }
        Ok(Self { labels })
    }

    /// Derives the catalog from the training-data layout: one sub-directory
    /// per class, ordered lexicographically. Must reproduce the ordering
    /// the output layer was trained with.
    pub fn from_training_dir(dir: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let mut labels = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                labels.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        if labels.is_empty() {
            return Err(format!("no class directories under {}", dir.display()).into());
        }
        labels.sort();
        Ok(Self { labels })
    }

    /// Builds the catalog once at startup: manifest first, then the
    /// training directory, then the builtin list.
    pub fn resolve(manifest: &Path, training_dir: Option<&Path>) -> Self {
        match Self::from_manifest(manifest) {
            Ok(catalog) => {
                info!(
                    "Loaded label catalog from {}: {:?}",
                    manifest.display(),
                    catalog.labels
                );
                return catalog;
            }
            Err(e) => warn!("No label manifest at {}: {}", manifest.display(), e),
        }
        if let Some(dir) = training_dir {
            match Self::from_training_dir(dir) {
                Ok(catalog) => {
                    info!(
                        "Derived label catalog from {}: {:?}",
                        dir.display(),
                        catalog.labels
                    );
                    return catalog;
                }
                Err(e) => warn!("Cannot list training dir {}: {}", dir.display(), e),
            }
        }
        info!("Using builtin label catalog: {:?}", DEFAULT_LABELS);
        Self::builtin()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_matches_training_order() {
        let catalog = LabelCatalog::builtin();
        assert_eq!(
            catalog.labels(),
            &["glioma", "meningioma", "notumor", "pituitary"]
        );
    }

    #[test]
    fn manifest_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        fs::write(&path, r#"["glioma","meningioma","notumor","pituitary"]"#).unwrap();
        let catalog = LabelCatalog::from_manifest(&path).unwrap();
        assert_eq!(catalog, LabelCatalog::builtin());
    }

    #[test]
    fn empty_manifest_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        fs::write(&path, "[]").unwrap();
        assert!(LabelCatalog::from_manifest(&path).is_err());
    }

    #[test]
    fn training_dir_listing_is_sorted_and_skips_files() {
        let dir = tempfile::tempdir().unwrap();
        // created out of order on purpose
        fs::create_dir(dir.path().join("pituitary")).unwrap();
        fs::create_dir(dir.path().join("glioma")).unwrap();
        fs::create_dir(dir.path().join("notumor")).unwrap();
        fs::create_dir(dir.path().join("meningioma")).unwrap();
        fs::write(dir.path().join("README.txt"), "not a class").unwrap();

        let catalog = LabelCatalog::from_training_dir(dir.path()).unwrap();
        assert_eq!(catalog, LabelCatalog::builtin());
    }

    #[test]
    fn resolve_falls_back_to_builtin() {
        let catalog = LabelCatalog::resolve(Path::new("missing/labels.json"), None);
        assert_eq!(catalog, LabelCatalog::builtin());
    }

    #[test]
    fn resolve_prefers_manifest_over_training_dir() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("labels.json");
        fs::write(&manifest, r#"["a","b"]"#).unwrap();
        let training = dir.path().join("Training");
        fs::create_dir_all(training.join("zzz")).unwrap();

        let catalog = LabelCatalog::resolve(&manifest, Some(&training));
        assert_eq!(catalog.labels(), &["a", "b"]);
    }
}
