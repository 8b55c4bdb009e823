use crate::config::ClassifierConfig;
use crate::error::{ClassifierError, Result};
use crate::scorer::NaiveBayesModel;
use crate::vocabulary::{FeatureIndex, Vocabulary};
use crate::LabelId;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    let mut f = File::open(path).map_err(|e| ClassifierError::load(format!("{}: {e}", path.display())))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)
        .map_err(|e| ClassifierError::load(format!("{}: {e}", path.display())))?;
    Ok(buf)
}

fn read_bincode<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let buf = read_bytes(path)?;
    bincode::deserialize(&buf).map_err(|e| ClassifierError::load(format!("{}: {e}", path.display())))
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    let mut f = File::create(path)?;
    f.write_all(bytes)?;
    Ok(())
}

pub fn save_dictionary(path: &Path, dict: &HashMap<String, FeatureIndex>) -> Result<()> {
    let bytes = bincode::serialize(dict)?;
    write_bytes(path, &bytes)
}

pub fn load_dictionary(path: &Path) -> Result<HashMap<String, FeatureIndex>> {
    read_bincode(path)
}

/// Frequencies are stored as `(key, count)` pairs including the total-documents entry.
pub fn save_frequencies(path: &Path, table: &[(i64, u64)]) -> Result<()> {
    let bytes = bincode::serialize(table)?;
    write_bytes(path, &bytes)
}

pub fn load_frequencies(path: &Path) -> Result<Vec<(i64, u64)>> {
    read_bincode(path)
}

pub fn save_label_index(path: &Path, labels: &BTreeMap<LabelId, String>) -> Result<()> {
    let json = serde_json::to_string_pretty(labels)?;
    write_bytes(path, json.as_bytes())
}

pub fn load_label_index(path: &Path) -> Result<BTreeMap<LabelId, String>> {
    let buf = read_bytes(path)?;
    serde_json::from_slice(&buf).map_err(|e| ClassifierError::load(format!("{}: {e}", path.display())))
}

pub fn save_model(path: &Path, model: &NaiveBayesModel) -> Result<()> {
    let bytes = bincode::serialize(model)?;
    write_bytes(path, &bytes)
}

pub fn load_model(path: &Path) -> Result<NaiveBayesModel> {
    let model: NaiveBayesModel = read_bincode(path)?;
    model.validate()?;
    Ok(model)
}

pub fn load_vocabulary(config: &ClassifierConfig) -> Result<Vocabulary> {
    let dictionary = load_dictionary(&config.dictionary)?;
    let table = load_frequencies(&config.frequencies)?;
    Vocabulary::from_frequency_table(dictionary, table, config.cardinality)
}

/// Where an artifact lands inside an export directory.
///
/// Paths that would leave the directory (absolute, or climbing with `..`), as held by a
/// config returned from [`ClassifierConfig::load`], keep only their file name.
fn export_path(path: &Path, fallback: &Path) -> PathBuf {
    let escapes = path.components().any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if !escapes {
        return path.to_path_buf();
    }
    path.file_name().map(PathBuf::from).unwrap_or_else(|| fallback.to_path_buf())
}

/// Write every artifact plus the manifest into `dir`, using the file names in `config`.
///
/// The written manifest always holds paths relative to `dir`, so the export can be moved.
pub fn save_artifacts(
    dir: &Path,
    config: &ClassifierConfig,
    vocabulary: &Vocabulary,
    labels: &BTreeMap<LabelId, String>,
    model: &NaiveBayesModel,
) -> Result<()> {
    create_dir_all(dir)?;
    let defaults = ClassifierConfig::default();
    let export = ClassifierConfig {
        model: export_path(&config.model, &defaults.model),
        label_index: export_path(&config.label_index, &defaults.label_index),
        dictionary: export_path(&config.dictionary, &defaults.dictionary),
        frequencies: export_path(&config.frequencies, &defaults.frequencies),
        ..config.clone()
    };
    let dictionary: HashMap<String, FeatureIndex> = vocabulary.terms().map(|(t, i)| (t.to_string(), i)).collect();
    save_dictionary(&dir.join(&export.dictionary), &dictionary)?;
    save_frequencies(&dir.join(&export.frequencies), &vocabulary.frequency_table())?;
    save_label_index(&dir.join(&export.label_index), labels)?;
    save_model(&dir.join(&export.model), model)?;
    export.save_manifest(dir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_paths_stay_inside_the_directory() {
        let fallback = Path::new("model.bin");
        assert_eq!(export_path(Path::new("vectors/dictionary.bin"), fallback), PathBuf::from("vectors/dictionary.bin"));
        assert_eq!(export_path(Path::new("/srv/models/spam/model.bin"), fallback), PathBuf::from("model.bin"));
        assert_eq!(export_path(Path::new("../other/df-count.bin"), fallback), PathBuf::from("df-count.bin"));
        assert_eq!(export_path(Path::new(".."), fallback), PathBuf::from("model.bin"));
    }
}
