use std::path::PathBuf;
use std::time::Duration;

/// Fixed configuration of a pipeline run.
///
/// The pipeline takes no flags, environment variables, or config files;
/// these constants are the entire surface.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Zip archive holding the labeled corpus.
    pub archive_path: PathBuf,
    /// Directory the archive is extracted into (and scanned from).
    pub dataset_dir: PathBuf,
    /// Length of the live microphone capture.
    pub capture_duration: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            archive_path: PathBuf::from("Emotion_1.zip"),
            dataset_dir: PathBuf::from("Emotion_1"),
            capture_duration: Duration::from_secs(3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PipelineConfig;

    #[test]
    fn defaults_point_at_the_corpus_archive() {
        let config = PipelineConfig::default();
        assert!(config.archive_path.ends_with("Emotion_1.zip"));
        assert_eq!(config.capture_duration.as_secs(), 3);
    }
}
