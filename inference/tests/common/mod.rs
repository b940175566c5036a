#![allow(dead_code)]

use safetensors::tensor::{Dtype, TensorView};
use sentimen_inference::SentimentConfig;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const WORDS: &[&str] = &[
    "tidak", "setuju", "sama", "pemotongan", "anggaran", "pendidikan", "bagus", "jelek", "mantap", "kecewa",
];

/// Keras `Tokenizer.to_json()` output, dumped twice the way the
/// training notebook saved it. Index 1 is the OOV token.
pub fn write_vocabulary(dir: &Path) -> PathBuf {
    let mut word_index = serde_json::Map::new();
    word_index.insert("<OOV>".to_string(), json!(1));
    for (idx, word) in WORDS.iter().enumerate() {
        word_index.insert(word.to_string(), json!(idx + 2));
    }

    let tokenizer = json!({
        "class_name": "Tokenizer",
        "config": {
            "num_words": null,
            "filters": "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n",
            "lower": true,
            "split": " ",
            "char_level": false,
            "oov_token": "<OOV>",
            "word_index": Value::Object(word_index).to_string(),
        }
    });

    let path = dir.join("tokenizer_sentiment.json");
    std::fs::write(&path, serde_json::to_string(&tokenizer.to_string()).unwrap()).unwrap();
    path
}

pub fn vocabulary_size() -> usize {
    WORDS.len() + 2
}

pub struct Weight {
    pub name: String,
    pub shape: Vec<usize>,
    pub values: Vec<f32>,
}

pub fn weight(name: &str, shape: &[usize], values: Vec<f32>) -> Weight {
    assert_eq!(shape.iter().product::<usize>(), values.len(), "bad fixture for {}", name);
    Weight {
        name: name.to_string(),
        shape: shape.to_vec(),
        values,
    }
}

/// Deterministic small values, distinct per position.
pub fn pattern(len: usize, seed: f32) -> Vec<f32> {
    (0..len).map(|i| ((i as f32 + seed) * 0.37).sin() * 0.5).collect()
}

pub fn sequential(layers: Vec<Value>) -> Value {
    json!({
        "class_name": "Sequential",
        "config": {"name": "sentiment_model", "layers": layers}
    })
}

/// Writes a safetensors artifact; the architecture goes into the header
/// metadata unless `embed_architecture` is false.
pub fn write_model(path: &Path, architecture: &Value, weights: &[Weight], embed_architecture: bool) {
    let bytes: Vec<Vec<u8>> = weights
        .iter()
        .map(|w| w.values.iter().flat_map(|v| v.to_le_bytes()).collect())
        .collect();
    let views: Vec<(String, TensorView<'_>)> = weights
        .iter()
        .zip(bytes.iter())
        .map(|(w, data)| (w.name.clone(), TensorView::new(Dtype::F32, w.shape.clone(), data).unwrap()))
        .collect();

    let metadata = embed_architecture.then(|| {
        let mut entries = HashMap::new();
        entries.insert("model_config".to_string(), architecture.to_string());
        entries
    });

    let serialized = safetensors::tensor::serialize(views, &metadata).unwrap();
    std::fs::write(path, serialized).unwrap();
}

/// Embedding → GlobalAveragePooling1D → Dense(3, softmax) with an all-zero
/// dense layer: every input scores exactly one third per class.
pub fn write_uniform_model(dir: &Path) -> PathBuf {
    let vocab = vocabulary_size();
    let architecture = sequential(vec![
        json!({"class_name": "Embedding", "config": {"name": "embedding", "input_dim": vocab, "output_dim": 4, "mask_zero": true}}),
        json!({"class_name": "GlobalAveragePooling1D", "config": {"name": "pool"}}),
        json!({"class_name": "Dense", "config": {"name": "dense", "units": 3, "activation": "softmax"}}),
    ]);
    let weights = vec![
        weight("embedding/embeddings", &[vocab, 4], pattern(vocab * 4, 1.0)),
        weight("dense/kernel", &[4, 3], vec![0.0; 12]),
        weight("dense/bias", &[3], vec![0.0; 3]),
    ];

    let path = dir.join("uniform.safetensors");
    write_model(&path, &architecture, &weights, true);
    path
}

/// Embedding → SpatialDropout1D → Bidirectional(LSTM) → GlobalMaxPooling1D
/// → Dropout → Dense(3, softmax), saved with the newer config schema.
pub fn write_bilstm_model(dir: &Path) -> PathBuf {
    let vocab = vocabulary_size();
    let (embed, units) = (4, 3);
    let policy = json!({"module": "keras", "class_name": "DTypePolicy", "config": {"name": "float32"}});

    let architecture = sequential(vec![
        json!({"class_name": "InputLayer", "config": {"name": "input", "batch_shape": [null, 100], "dtype": policy}}),
        json!({"class_name": "Embedding", "config": {"name": "embedding", "input_dim": vocab, "output_dim": embed, "mask_zero": true, "dtype": policy}}),
        json!({"class_name": "SpatialDropout1D", "config": {"name": "spatial_dropout", "rate": 0.2, "dtype": policy}}),
        json!({"class_name": "Bidirectional", "config": {
            "name": "bidirectional",
            "merge_mode": "concat",
            "dtype": policy,
            "layer": {"module": "keras.layers", "class_name": "LSTM", "config": {
                "name": "lstm", "units": units, "return_sequences": true, "dtype": policy,
                "activation": "tanh", "recurrent_activation": "sigmoid", "use_bias": true
            }}
        }}),
        json!({"class_name": "GlobalMaxPooling1D", "config": {"name": "pool", "dtype": policy}}),
        json!({"class_name": "Dropout", "config": {"name": "dropout", "rate": 0.5, "dtype": policy}}),
        json!({"class_name": "Dense", "config": {"name": "dense", "units": 3, "activation": "softmax", "dtype": policy}}),
    ]);

    let mut weights = vec![weight("embedding/embeddings", &[vocab, embed], pattern(vocab * embed, 0.5))];
    for (direction, seed) in [("forward", 2.0), ("backward", 3.0)] {
        let prefix = format!("bidirectional/{}", direction);
        weights.push(weight(&format!("{}/kernel", prefix), &[embed, 4 * units], pattern(embed * 4 * units, seed)));
        weights.push(weight(
            &format!("{}/recurrent_kernel", prefix),
            &[units, 4 * units],
            pattern(units * 4 * units, seed + 0.25),
        ));
        weights.push(weight(&format!("{}/bias", prefix), &[4 * units], pattern(4 * units, seed + 0.5)));
    }
    weights.push(weight("dense/kernel", &[2 * units, 3], pattern(2 * units * 3, 4.0)));
    weights.push(weight("dense/bias", &[3], vec![0.1, 0.0, -0.1]));

    let path = dir.join("Model_Sentiment_BiLSTM.safetensors");
    write_model(&path, &architecture, &weights, true);
    path
}

/// Embedding → Bidirectional(LSTM) [→ GlobalAveragePooling1D] → Dense(3, linear).
/// `dense_inputs` overrides the Dense kernel's row count.
pub fn write_bidirectional_model(
    dir: &Path,
    merge_mode: &str,
    return_sequences: bool,
    dense_inputs: Option<usize>,
) -> PathBuf {
    let vocab = vocabulary_size();
    let (embed, units) = (3, 2);

    let mut layers = vec![
        json!({"class_name": "Embedding", "config": {"name": "embedding", "input_dim": vocab, "output_dim": embed, "mask_zero": true}}),
        json!({"class_name": "Bidirectional", "config": {
            "name": "bidirectional",
            "merge_mode": merge_mode,
            "layer": {"class_name": "LSTM", "config": {"name": "lstm", "units": units, "return_sequences": return_sequences}}
        }}),
    ];
    if return_sequences {
        layers.push(json!({"class_name": "GlobalAveragePooling1D", "config": {"name": "pool"}}));
    }
    layers.push(json!({"class_name": "Dense", "config": {"name": "dense", "units": 3, "activation": "linear"}}));

    let merged = if merge_mode == "concat" { 2 * units } else { units };
    let dense_inputs = dense_inputs.unwrap_or(merged);

    let mut weights = vec![weight("embedding/embeddings", &[vocab, embed], pattern(vocab * embed, 1.5))];
    for (direction, seed) in [("forward", 5.0), ("backward", 7.0)] {
        let prefix = format!("bidirectional/{}", direction);
        weights.push(weight(&format!("{}/kernel", prefix), &[embed, 4 * units], pattern(embed * 4 * units, seed)));
        weights.push(weight(
            &format!("{}/recurrent_kernel", prefix),
            &[units, 4 * units],
            pattern(units * 4 * units, seed + 0.25),
        ));
        weights.push(weight(&format!("{}/bias", prefix), &[4 * units], pattern(4 * units, seed + 0.5)));
    }
    weights.push(weight("dense/kernel", &[dense_inputs, 3], pattern(dense_inputs * 3, 9.0)));
    weights.push(weight("dense/bias", &[3], vec![0.0; 3]));

    let path = dir.join(format!("bidirectional_{}_{}.safetensors", merge_mode, return_sequences));
    write_model(&path, &sequential(layers), &weights, true);
    path
}

pub fn config_for(dir: &Path, model_path: PathBuf) -> SentimentConfig {
    SentimentConfig {
        model_path,
        vocabulary_path: write_vocabulary(dir),
        fallback_vocabulary_path: dir.join("tokenizer.json"),
        ..SentimentConfig::default()
    }
}
