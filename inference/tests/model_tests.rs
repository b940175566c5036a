mod common;

use common::*;
use serde_json::json;
use sentimen_inference::{
    InferenceError, KerasSequenceModel, PaddedSequence, SentimentInference, SentimentLabel, SequenceClassifier,
};

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[test]
fn test_uniform_model_ties_resolve_to_negative() {
    let dir = tempfile::tempdir().unwrap();
    let model = KerasSequenceModel::load(&write_uniform_model(dir.path())).unwrap();

    let probabilities = model.score(&PaddedSequence::from_ids(vec![2, 3, 4])).unwrap();
    for &p in probabilities.as_array() {
        assert!((p - 1.0 / 3.0).abs() < 1e-6);
    }

    let config = config_for(dir.path(), write_uniform_model(dir.path()));
    let inference = SentimentInference::load(&config).unwrap();
    let result = inference.predict("bagus sekali");

    assert_eq!(result.label, SentimentLabel::Negative);
    assert!((result.confidence - 100.0 / 3.0).abs() < 1e-3);
}

#[test]
fn test_single_unit_lstm_matches_hand_computation() {
    let dir = tempfile::tempdir().unwrap();
    let architecture = sequential(vec![
        json!({"class_name": "Embedding", "config": {"name": "embedding", "input_dim": 3, "output_dim": 1, "mask_zero": true}}),
        json!({"class_name": "LSTM", "config": {"name": "lstm", "units": 1}}),
        json!({"class_name": "Dense", "config": {"name": "dense", "units": 3, "activation": "linear"}}),
    ]);
    let weights = vec![
        weight("embedding/embeddings", &[3, 1], vec![0.0, 1.0, 2.0]),
        weight("lstm/kernel", &[1, 4], vec![1.0; 4]),
        weight("lstm/recurrent_kernel", &[1, 4], vec![0.0; 4]),
        weight("lstm/bias", &[4], vec![0.0; 4]),
        weight("dense/kernel", &[1, 3], vec![1.0, 0.0, -1.0]),
        weight("dense/bias", &[3], vec![0.0; 3]),
    ];
    let path = dir.path().join("lstm.safetensors");
    write_model(&path, &architecture, &weights, true);

    let model = KerasSequenceModel::load(&path).unwrap();
    let probabilities = model.score(&PaddedSequence::from_ids(vec![1, 2])).unwrap();

    // padded steps are masked, so only x = 1 then x = 2 reach the cell
    let c1 = sigmoid(1.0) * 1.0_f32.tanh();
    let c2 = sigmoid(2.0) * c1 + sigmoid(2.0) * 2.0_f32.tanh();
    let h = (sigmoid(2.0) * c2.tanh()) as f64;

    // linear output is passed through softmax
    let total = h.exp() + 1.0 + (-h).exp();
    let expected = [h.exp() / total, 1.0 / total, (-h).exp() / total];
    for (actual, expected) in probabilities.as_array().iter().zip(expected) {
        assert!((actual - expected).abs() < 1e-5, "{} vs {}", actual, expected);
    }
    assert_eq!(probabilities.argmax(), 0);
}

#[test]
fn test_bidirectional_merge_modes_load_and_score() {
    let dir = tempfile::tempdir().unwrap();
    let input = PaddedSequence::from_ids(vec![2, 3, 9, 4]);

    for return_sequences in [true, false] {
        let mut scores = Vec::new();
        for mode in ["concat", "sum", "ave", "mul"] {
            let path = write_bidirectional_model(dir.path(), mode, return_sequences, None);
            let model = KerasSequenceModel::load(&path).unwrap();

            let probabilities = model.score(&input).unwrap();
            assert!(probabilities.is_distribution(1e-3), "{} / {}", mode, return_sequences);
            scores.push(probabilities);
        }

        // ave halves the sum logits, so even those two must differ
        assert_ne!(scores[1], scores[2]);
        assert_ne!(scores[1], scores[3]);
        assert_ne!(scores[0], scores[1]);
    }
}

#[test]
fn test_non_concat_merge_keeps_unit_width() {
    let dir = tempfile::tempdir().unwrap();

    for mode in ["sum", "ave", "mul"] {
        let doubled = write_bidirectional_model(dir.path(), mode, false, Some(4));
        let err = KerasSequenceModel::load(&doubled).err().unwrap();
        assert!(err.is_load_error(), "{}", mode);
    }

    let concat_halved = write_bidirectional_model(dir.path(), "concat", false, Some(2));
    assert!(KerasSequenceModel::load(&concat_halved).err().unwrap().is_load_error());
}

#[test]
fn test_bilstm_with_newer_schema_loads_through_migration() {
    let dir = tempfile::tempdir().unwrap();
    let model = KerasSequenceModel::load(&write_bilstm_model(dir.path())).unwrap();

    let input = PaddedSequence::from_ids(vec![2, 3, 4, 5, 1, 7]);
    let first = model.score(&input).unwrap();
    let second = model.score(&input).unwrap();

    assert_eq!(first, second);
    assert!(first.is_distribution(1e-3));
    assert_eq!(model.name(), "sentiment_model");
}

#[test]
fn test_architecture_read_from_sidecar_file() {
    let dir = tempfile::tempdir().unwrap();
    let architecture = sequential(vec![
        json!({"class_name": "Embedding", "config": {"name": "embedding", "input_dim": 4, "output_dim": 2}}),
        json!({"class_name": "GlobalAveragePooling1D", "config": {"name": "pool"}}),
        json!({"class_name": "Dense", "config": {"name": "dense", "units": 3, "activation": "softmax", "use_bias": false}}),
    ]);
    let weights = vec![
        weight("embedding/embeddings", &[4, 2], pattern(8, 0.0)),
        weight("dense/kernel", &[2, 3], pattern(6, 1.0)),
    ];
    let path = dir.path().join("model.safetensors");
    write_model(&path, &architecture, &weights, false);

    let err = KerasSequenceModel::load(&path).err().unwrap();
    assert!(matches!(err, InferenceError::ModelLoad(_)));

    std::fs::write(dir.path().join("model_config.json"), architecture.to_string()).unwrap();
    let model = KerasSequenceModel::load(&path).unwrap();
    assert!(model.score(&PaddedSequence::zeros()).unwrap().is_distribution(1e-3));
}

#[test]
fn test_unsupported_layer_is_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let architecture = sequential(vec![
        json!({"class_name": "Embedding", "config": {"name": "embedding", "input_dim": 4, "output_dim": 2}}),
        json!({"class_name": "Conv1D", "config": {"name": "conv", "filters": 3, "kernel_size": 2}}),
    ]);
    let path = dir.path().join("conv.safetensors");
    write_model(&path, &architecture, &[weight("embedding/embeddings", &[4, 2], pattern(8, 0.0))], true);

    let err = KerasSequenceModel::load(&path).err().unwrap();
    assert!(matches!(err, InferenceError::ModelLoad(_)));
}

#[test]
fn test_mismatched_weights_are_load_errors() {
    let dir = tempfile::tempdir().unwrap();
    let architecture = sequential(vec![
        json!({"class_name": "Embedding", "config": {"name": "embedding", "input_dim": 4, "output_dim": 2}}),
        json!({"class_name": "GlobalAveragePooling1D", "config": {"name": "pool"}}),
        json!({"class_name": "Dense", "config": {"name": "dense", "units": 3}}),
    ]);

    let wrong_shape = dir.path().join("wrong_shape.safetensors");
    write_model(
        &wrong_shape,
        &architecture,
        &[
            weight("embedding/embeddings", &[4, 2], pattern(8, 0.0)),
            weight("dense/kernel", &[3, 3], pattern(9, 0.0)),
            weight("dense/bias", &[3], vec![0.0; 3]),
        ],
        true,
    );
    assert!(KerasSequenceModel::load(&wrong_shape).err().unwrap().is_load_error());

    let missing_bias = dir.path().join("missing_bias.safetensors");
    write_model(
        &missing_bias,
        &architecture,
        &[
            weight("embedding/embeddings", &[4, 2], pattern(8, 0.0)),
            weight("dense/kernel", &[2, 3], pattern(6, 0.0)),
        ],
        true,
    );
    assert!(KerasSequenceModel::load(&missing_bias).err().unwrap().is_load_error());
}

#[test]
fn test_model_must_output_three_classes() {
    let dir = tempfile::tempdir().unwrap();
    let architecture = sequential(vec![
        json!({"class_name": "Embedding", "config": {"name": "embedding", "input_dim": 4, "output_dim": 2}}),
        json!({"class_name": "GlobalMaxPooling1D", "config": {"name": "pool"}}),
        json!({"class_name": "Dense", "config": {"name": "dense", "units": 2, "activation": "softmax"}}),
    ]);
    let path = dir.path().join("binary.safetensors");
    write_model(
        &path,
        &architecture,
        &[
            weight("embedding/embeddings", &[4, 2], pattern(8, 0.0)),
            weight("dense/kernel", &[2, 2], pattern(4, 0.0)),
            weight("dense/bias", &[2], vec![0.0; 2]),
        ],
        true,
    );

    assert!(matches!(
        KerasSequenceModel::load(&path).err().unwrap(),
        InferenceError::ModelLoad(_)
    ));
}

#[test]
fn test_missing_model_file_is_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = KerasSequenceModel::load(&dir.path().join("absent.safetensors")).err().unwrap();
    assert!(matches!(err, InferenceError::ModelLoad(_)));
}
