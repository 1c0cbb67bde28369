use emosense::emotion::dataset::Dataset;
use emosense::emotion::model::{split_indices, train, TrainerConfig};
use emosense::emotion::Emotion;
use ndarray::Array1;

/// Two well-separated clusters in feature space, one per label.
fn clustered_dataset(per_class: usize) -> Dataset {
    let mut dataset = Dataset::default();
    for i in 0..per_class {
        let jitter = i as f32 * 1e-3;
        dataset.push(Array1::from_elem(40, 1.0 + jitter), Emotion::Happy);
        dataset.push(Array1::from_elem(40, -1.0 - jitter), Emotion::Sad);
    }
    dataset
}

#[test]
fn training_separates_synthetic_clusters() {
    let dataset = clustered_dataset(10);
    let config = TrainerConfig {
        hidden_units: 16,
        max_iter: 200,
        ..TrainerConfig::default()
    };
    let report = train(&dataset, &config).expect("training succeeds");

    assert_eq!(report.train_size + report.test_size, dataset.len());
    assert_eq!(report.test_size, 4); // round(0.2 * 20)
    assert!(report.accuracy >= 0.5, "accuracy was {}", report.accuracy);

    let happy = report
        .model
        .predict(&Array1::from_elem(40, 1.0))
        .expect("predict");
    let sad = report
        .model
        .predict(&Array1::from_elem(40, -1.0))
        .expect("predict");
    assert_eq!(happy, Emotion::Happy);
    assert_eq!(sad, Emotion::Sad);
}

#[test]
fn split_is_reproducible_across_runs() {
    let first = split_indices(50, 0.2, 42);
    let second = split_indices(50, 0.2, 42);
    assert_eq!(first, second);
    assert_eq!(first.1.len(), 10);
    assert_eq!(first.0.len(), 40);
}

#[test]
fn empty_dataset_is_rejected() {
    let err = train(&Dataset::default(), &TrainerConfig::default()).unwrap_err();
    assert!(err.to_string().contains("empty"));
}

#[test]
fn mismatched_feature_width_is_rejected_at_predict_time() {
    let dataset = clustered_dataset(5);
    let config = TrainerConfig {
        hidden_units: 8,
        max_iter: 20,
        ..TrainerConfig::default()
    };
    let report = train(&dataset, &config).expect("training succeeds");
    assert!(report.model.predict(&Array1::zeros(10)).is_err());
}
