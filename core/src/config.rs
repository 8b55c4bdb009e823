use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ClassifierError, Result};
use crate::tokenizer::AnalyzerOptions;
use crate::vectorizer::Weighting;
use crate::vocabulary::DEFAULT_CARDINALITY;

/// Optional manifest inside a model directory.
pub const MANIFEST_FILE: &str = "classifier.json";

/// Where the model artifacts live and how documents are analyzed for them.
///
/// Relative artifact paths are resolved against the model directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub model: PathBuf,
    pub label_index: PathBuf,
    pub dictionary: PathBuf,
    pub frequencies: PathBuf,
    pub analyzer: AnalyzerOptions,
    pub weighting: Weighting,
    pub cardinality: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model: PathBuf::from("model.bin"),
            label_index: PathBuf::from("labelindex.json"),
            dictionary: PathBuf::from("dictionary.bin"),
            frequencies: PathBuf::from("df-count.bin"),
            analyzer: AnalyzerOptions::default(),
            weighting: Weighting::default(),
            cardinality: DEFAULT_CARDINALITY,
        }
    }
}

impl ClassifierConfig {
    /// Load from a model directory or from a manifest file.
    ///
    /// A directory without a manifest uses the default artifact names.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let (base, manifest) = if path.is_dir() {
            (path.to_path_buf(), path.join(MANIFEST_FILE))
        } else if path.is_file() {
            (path.parent().map(Path::to_path_buf).unwrap_or_default(), path.to_path_buf())
        } else {
            return Err(ClassifierError::load(format!("model path {} does not exist", path.display())));
        };

        let mut config = if manifest.is_file() {
            let text = fs::read_to_string(&manifest)
                .map_err(|e| ClassifierError::load(format!("{}: {e}", manifest.display())))?;
            serde_json::from_str(&text)
                .map_err(|e| ClassifierError::load(format!("{}: {e}", manifest.display())))?
        } else {
            Self::default()
        };
        config.resolve(&base);
        tracing::debug!(manifest = %manifest.display(), "resolved classifier config");
        Ok(config)
    }

    /// Make relative artifact paths relative to `base`.
    pub fn resolve(&mut self, base: &Path) {
        for p in [&mut self.model, &mut self.label_index, &mut self.dictionary, &mut self.frequencies] {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
    }

    pub fn save_manifest<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        fs::create_dir_all(dir.as_ref())?;
        let json = serde_json::to_string_pretty(self)?;
        fs::write(dir.as_ref().join(MANIFEST_FILE), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn directory_without_manifest_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = ClassifierConfig::load(dir.path()).unwrap();
        assert_eq!(config.model, dir.path().join("model.bin"));
        assert_eq!(config.weighting, Weighting::Classic);
        assert_eq!(config.cardinality, DEFAULT_CARDINALITY);
    }

    #[test]
    fn manifest_overrides_are_resolved() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(MANIFEST_FILE),
            r#"{"dictionary": "vectors/dictionary.file-0", "weighting": "raw", "analyzer": {"stem": true}}"#,
        )
        .unwrap();
        let config = ClassifierConfig::load(dir.path().join(MANIFEST_FILE)).unwrap();
        assert_eq!(config.dictionary, dir.path().join("vectors/dictionary.file-0"));
        assert_eq!(config.label_index, dir.path().join("labelindex.json"));
        assert_eq!(config.weighting, Weighting::Raw);
        assert!(config.analyzer.stem);
        assert!(config.analyzer.stopwords);
    }

    #[test]
    fn missing_path_is_a_load_error() {
        let dir = tempdir().unwrap();
        let err = ClassifierConfig::load(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, ClassifierError::Load(_)));
    }

    #[test]
    fn malformed_manifest_is_a_load_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), "{ not json").unwrap();
        assert!(ClassifierConfig::load(dir.path()).unwrap_err().is_load_error());
    }
}
