use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use ndarray::Array1;
use tracing::{info, warn};
use walkdir::WalkDir;
use zip::ZipArchive;

use super::features;
use super::label::Emotion;

/// Parallel feature/label collections; grows only through `push`, so the
/// two sides cannot drift out of step.
#[derive(Debug, Default)]
pub struct Dataset {
    features: Vec<Array1<f32>>,
    labels: Vec<Emotion>,
}

impl Dataset {
    pub fn push(&mut self, feature: Array1<f32>, label: Emotion) {
        self.features.push(feature);
        self.labels.push(label);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[Array1<f32>] {
        &self.features
    }

    pub fn labels(&self) -> &[Emotion] {
        &self.labels
    }
}

/// Per-run corpus accounting; `skipped` counts files dropped because
/// feature extraction failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub accepted: usize,
    pub skipped: usize,
}

/// Extract the dataset archive into `target` unless that directory already
/// exists. Returns whether an extraction actually happened.
///
/// Only existence is checked: an interrupted extraction leaves a partial
/// directory that later runs will not repair.
pub fn materialize_archive(archive: &Path, target: &Path) -> Result<bool> {
    if target.exists() {
        info!(target = %target.display(), "dataset already materialized");
        return Ok(false);
    }
    let file = File::open(archive)
        .with_context(|| format!("dataset archive not found at {}", archive.display()))?;
    let mut zip = ZipArchive::new(file)
        .with_context(|| format!("failed to read dataset archive {}", archive.display()))?;
    zip.extract(target).with_context(|| {
        format!("failed to extract dataset archive into {}", target.display())
    })?;
    info!(
        archive = %archive.display(),
        target = %target.display(),
        entries = zip.len(),
        "dataset extracted"
    );
    Ok(true)
}

/// Walk `root` recursively and build the dataset from every `.wav` file
/// under it. Files whose features cannot be extracted are skipped with a
/// warning and counted in the summary.
pub fn load_corpus(root: &Path) -> Result<(Dataset, LoadSummary)> {
    let mut dataset = Dataset::default();
    let mut summary = LoadSummary::default();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() || !has_wav_extension(entry.path()) {
            continue;
        }
        match features::file_features(entry.path()) {
            Ok(feature) => {
                let name = entry.file_name().to_string_lossy();
                dataset.push(feature, Emotion::parse_filename(&name));
                summary.accepted += 1;
            }
            Err(err) => {
                warn!(
                    path = %entry.path().display(),
                    error = %err,
                    "skipping unreadable audio file"
                );
                summary.skipped += 1;
            }
        }
    }
    Ok((dataset, summary))
}

fn has_wav_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("wav"))
        .unwrap_or(false)
}
