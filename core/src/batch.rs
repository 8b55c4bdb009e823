//! Classify many files with one shared classifier.

use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::classifier::Classifier;
use crate::error::{ClassifierError, Result};
use crate::scorer::{Scores, ScoringModel};

/// Outcome for a single file: its label and per-label scores, or why it failed.
#[derive(Debug)]
pub struct FileOutcome<L> {
    pub path: PathBuf,
    pub outcome: Result<(L, Scores)>,
}

impl<L> FileOutcome<L> {
    pub fn label(&self) -> Option<&L> {
        self.outcome.as_ref().ok().map(|(l, _)| l)
    }
}

/// Read a document as UTF-8, replacing invalid sequences.
pub fn read_document<P: AsRef<Path>>(path: P) -> Result<String> {
    let bytes = std::fs::read(path.as_ref())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// All regular files under `dir`, recursively, sorted by path.
pub fn collect_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(ClassifierError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} is not a directory", dir.display()),
        )));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| ClassifierError::Io(e.into()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Classify each path in parallel. Results keep the order of `paths`.
pub fn classify_paths<L, M>(classifier: &Classifier<L, M>, paths: &[PathBuf]) -> Vec<FileOutcome<L>>
where
    L: Clone + Send + Sync + fmt::Display,
    M: ScoringModel,
{
    paths
        .par_iter()
        .map(|path| {
            let outcome = read_document(path).and_then(|text| classifier.classify_with_scores(&text));
            match &outcome {
                Ok((label, _)) => tracing::info!(%label, path = %path.display()),
                Err(e) => tracing::warn!(error = %e, path = %path.display(), "failed to classify"),
            }
            FileOutcome { path: path.clone(), outcome }
        })
        .collect()
}

/// Recursively classify every file under `dir`.
pub fn classify_dir<L, M, P>(classifier: &Classifier<L, M>, dir: P) -> Result<Vec<FileOutcome<L>>>
where
    L: Clone + Send + Sync + fmt::Display,
    M: ScoringModel,
    P: AsRef<Path>,
{
    tracing::info!(dir = %dir.as_ref().display(), "classifying dir");
    let files = collect_files(dir)?;
    Ok(classify_paths(classifier, &files))
}
