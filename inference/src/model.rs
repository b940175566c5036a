use crate::migration::migrate_model_config;
use crate::{InferenceError, PaddedSequence, ProbabilityVector, Result, NUM_CLASSES};
use ndarray::{concatenate, s, Array1, Array2, Axis};
use safetensors::tensor::{Dtype, SafeTensors, TensorView};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// Metadata key holding the Keras architecture JSON inside the artifact.
pub const MODEL_CONFIG_KEY: &str = "model_config";
/// Sidecar file read when the artifact carries no architecture metadata.
pub const MODEL_CONFIG_FILE: &str = "model_config.json";

/// Scores a padded id sequence into a class distribution.
///
/// Implementations hold immutable weights and may be shared across threads.
pub trait SequenceClassifier: Send + Sync {
    fn score(&self, input: &PaddedSequence) -> Result<ProbabilityVector>;

    fn name(&self) -> &str {
        "sequence-classifier"
    }
}

// Saved architecture schema (the subset of Keras layers the runtime evaluates)

#[derive(Debug, Clone, Deserialize)]
pub struct ModelArchitecture {
    pub class_name: String,
    pub config: SequentialConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SequentialConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub layers: Vec<LayerSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LayerCommon {
    pub name: String,
    #[serde(default)]
    pub dtype: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "class_name", content = "config")]
pub enum LayerSpec {
    InputLayer(InputLayerConfig),
    Embedding(EmbeddingConfig),
    SpatialDropout1D(DropoutConfig),
    Dropout(DropoutConfig),
    #[serde(rename = "LSTM")]
    Lstm(LstmConfig),
    Bidirectional(BidirectionalConfig),
    GlobalMaxPooling1D(PoolingConfig),
    GlobalAveragePooling1D(PoolingConfig),
    Dense(DenseConfig),
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputLayerConfig {
    #[serde(flatten)]
    pub common: LayerCommon,
    pub batch_input_shape: Vec<Option<usize>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(flatten)]
    pub common: LayerCommon,
    pub input_dim: usize,
    pub output_dim: usize,
    #[serde(default)]
    pub mask_zero: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DropoutConfig {
    #[serde(flatten)]
    pub common: LayerCommon,
    #[serde(default)]
    pub rate: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LstmConfig {
    #[serde(flatten)]
    pub common: LayerCommon,
    pub units: usize,
    #[serde(default = "default_tanh")]
    pub activation: Activation,
    #[serde(default = "default_sigmoid")]
    pub recurrent_activation: Activation,
    #[serde(default = "default_true")]
    pub use_bias: bool,
    #[serde(default)]
    pub return_sequences: bool,
    #[serde(default)]
    pub go_backwards: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WrappedLayer {
    pub class_name: String,
    pub config: LstmConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BidirectionalConfig {
    #[serde(flatten)]
    pub common: LayerCommon,
    pub layer: WrappedLayer,
    #[serde(default = "default_merge_mode")]
    pub merge_mode: Option<MergeMode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolingConfig {
    #[serde(flatten)]
    pub common: LayerCommon,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DenseConfig {
    #[serde(flatten)]
    pub common: LayerCommon,
    pub units: usize,
    #[serde(default = "default_linear")]
    pub activation: Activation,
    #[serde(default = "default_true")]
    pub use_bias: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Linear,
    Relu,
    Tanh,
    Sigmoid,
    HardSigmoid,
    Softmax,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    Concat,
    Sum,
    Ave,
    Mul,
}

fn default_tanh() -> Activation {
    Activation::Tanh
}

fn default_sigmoid() -> Activation {
    Activation::Sigmoid
}

fn default_linear() -> Activation {
    Activation::Linear
}

fn default_true() -> bool {
    true
}

fn default_merge_mode() -> Option<MergeMode> {
    Some(MergeMode::Concat)
}

/// Parses the saved architecture, retrying once through the schema
/// migration when the raw config does not match the current layout.
pub fn parse_architecture(raw: &str) -> Result<ModelArchitecture> {
    match serde_json::from_str::<ModelArchitecture>(raw) {
        Ok(architecture) => Ok(architecture),
        Err(direct) => {
            tracing::debug!("Direct architecture parse failed ({}), applying schema migration", direct);
            let value: Value = serde_json::from_str(raw)
                .map_err(|e| InferenceError::ModelLoad(format!("Model config is not valid JSON: {}", e)))?;
            serde_json::from_value(migrate_model_config(value)).map_err(|e| {
                InferenceError::ModelLoad(format!(
                    "Model config unreadable after migration: {} (direct parse: {})",
                    e, direct
                ))
            })
        }
    }
}

impl Activation {
    fn apply(self, values: Array1<f32>) -> Array1<f32> {
        match self {
            Activation::Linear => values,
            Activation::Relu => values.mapv(|v| v.max(0.0)),
            Activation::Tanh => values.mapv(f32::tanh),
            Activation::Sigmoid => values.mapv(sigmoid),
            Activation::HardSigmoid => values.mapv(|v| (0.2 * v + 0.5).clamp(0.0, 1.0)),
            Activation::Softmax => softmax(&values),
        }
    }
}

fn sigmoid(value: f32) -> f32 {
    1.0 / (1.0 + (-value).exp())
}

fn softmax(logits: &Array1<f32>) -> Array1<f32> {
    let max_logit = logits.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let exp_logits = logits.mapv(|x| (x - max_logit).exp());
    let sum_exp = exp_logits.sum();
    exp_logits / sum_exp
}

// Runtime layers

enum Activations {
    Sequence { values: Array2<f32>, mask: Option<Vec<bool>> },
    Vector(Array1<f32>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Sequence(usize),
    Vector(usize),
}

struct EmbeddingLayer {
    table: Array2<f32>,
    mask_zero: bool,
}

impl EmbeddingLayer {
    fn lookup(&self, ids: &[i64]) -> Result<Activations> {
        let rows = self.table.nrows();
        let mut values = Array2::zeros((ids.len(), self.table.ncols()));

        for (step, &id) in ids.iter().enumerate() {
            let row = usize::try_from(id)
                .ok()
                .filter(|&row| row < rows)
                .ok_or_else(|| {
                    InferenceError::Runtime(format!("Token id {} outside embedding table of {} rows", id, rows))
                })?;
            values.row_mut(step).assign(&self.table.row(row));
        }

        let mask = self.mask_zero.then(|| ids.iter().map(|&id| id != 0).collect());
        Ok(Activations::Sequence { values, mask })
    }
}

struct LstmLayer {
    kernel: Array2<f32>,
    recurrent_kernel: Array2<f32>,
    bias: Option<Array1<f32>>,
    units: usize,
    activation: Activation,
    recurrent_activation: Activation,
    go_backwards: bool,
}

impl LstmLayer {
    /// Returns the per-step outputs in processing order and the final state.
    fn run(&self, values: &Array2<f32>, mask: Option<&[bool]>, zero_output_for_mask: bool) -> (Vec<Array1<f32>>, Array1<f32>) {
        let units = self.units;
        let steps = values.nrows();
        let projected = values.dot(&self.kernel);

        let mut h = Array1::<f32>::zeros(units);
        let mut c = Array1::<f32>::zeros(units);
        let mut outputs = Vec::with_capacity(steps);

        let order: Vec<usize> = if self.go_backwards {
            (0..steps).rev().collect()
        } else {
            (0..steps).collect()
        };

        for t in order {
            if mask.is_some_and(|mask| !mask[t]) {
                outputs.push(if zero_output_for_mask { Array1::zeros(units) } else { h.clone() });
                continue;
            }

            let mut z = &projected.row(t) + &h.dot(&self.recurrent_kernel);
            if let Some(bias) = &self.bias {
                z += bias;
            }

            // Keras gate order: input, forget, cell, output
            let input_gate = self.recurrent_activation.apply(z.slice(s![..units]).to_owned());
            let forget_gate = self.recurrent_activation.apply(z.slice(s![units..2 * units]).to_owned());
            let candidate = self.activation.apply(z.slice(s![2 * units..3 * units]).to_owned());
            let output_gate = self.recurrent_activation.apply(z.slice(s![3 * units..]).to_owned());

            c = &forget_gate * &c + &input_gate * &candidate;
            h = &output_gate * &self.activation.apply(c.clone());
            outputs.push(h.clone());
        }

        (outputs, h)
    }
}

fn stack_steps(outputs: Vec<Array1<f32>>, units: usize) -> Result<Array2<f32>> {
    let steps = outputs.len();
    let flat: Vec<f32> = outputs.iter().flat_map(|step| step.iter().copied()).collect();
    Array2::from_shape_vec((steps, units), flat)
        .map_err(|e| InferenceError::Runtime(format!("Failed to stack recurrent outputs: {}", e)))
}

enum Layer {
    Lstm {
        cell: LstmLayer,
        return_sequences: bool,
    },
    Bidirectional {
        forward: LstmLayer,
        backward: LstmLayer,
        merge: MergeMode,
        return_sequences: bool,
    },
    GlobalMaxPooling,
    GlobalAveragePooling,
    Dense {
        kernel: Array2<f32>,
        bias: Option<Array1<f32>>,
        activation: Activation,
    },
}

impl Layer {
    fn forward(&self, input: Activations) -> Result<Activations> {
        match (self, input) {
            (Layer::Lstm { cell, return_sequences }, Activations::Sequence { values, mask }) => {
                let (outputs, last) = cell.run(&values, mask.as_deref(), false);
                if *return_sequences {
                    Ok(Activations::Sequence { values: stack_steps(outputs, cell.units)?, mask })
                } else {
                    Ok(Activations::Vector(last))
                }
            }
            (
                Layer::Bidirectional { forward, backward, merge, return_sequences },
                Activations::Sequence { values, mask },
            ) => {
                let (forward_steps, forward_last) = forward.run(&values, mask.as_deref(), *return_sequences);
                let (mut backward_steps, backward_last) = backward.run(&values, mask.as_deref(), *return_sequences);

                if *return_sequences {
                    // realign the backward pass with input time order
                    backward_steps.reverse();
                    let forward_values = stack_steps(forward_steps, forward.units)?;
                    let backward_values = stack_steps(backward_steps, backward.units)?;
                    let values = merge_outputs(*merge, forward_values, backward_values, Axis(1))?;
                    Ok(Activations::Sequence { values, mask })
                } else {
                    let forward_last = forward_last.insert_axis(Axis(0));
                    let backward_last = backward_last.insert_axis(Axis(0));
                    let merged = merge_outputs(*merge, forward_last, backward_last, Axis(1))?;
                    Ok(Activations::Vector(merged.row(0).to_owned()))
                }
            }
            (Layer::GlobalMaxPooling, Activations::Sequence { values, mask }) => {
                let pooled = pool(
                    &values,
                    mask.as_deref(),
                    |acc, row| acc.zip_mut_with(&row, |a, &b| *a = a.max(b)),
                    f32::NEG_INFINITY,
                    false,
                );
                Ok(Activations::Vector(pooled))
            }
            (Layer::GlobalAveragePooling, Activations::Sequence { values, mask }) => {
                Ok(Activations::Vector(pool(&values, mask.as_deref(), |acc, row| *acc += &row, 0.0, true)))
            }
            (Layer::Dense { kernel, bias, activation }, Activations::Vector(values)) => {
                let mut out = values.dot(kernel);
                if let Some(bias) = bias {
                    out += bias;
                }
                Ok(Activations::Vector(activation.apply(out)))
            }
            _ => Err(InferenceError::Runtime(
                "Layer received activations of the wrong rank".to_string(),
            )),
        }
    }
}

fn merge_outputs(mode: MergeMode, forward: Array2<f32>, backward: Array2<f32>, axis: Axis) -> Result<Array2<f32>> {
    match mode {
        MergeMode::Concat => concatenate(axis, &[forward.view(), backward.view()])
            .map_err(|e| InferenceError::Runtime(format!("Failed to merge directions: {}", e))),
        MergeMode::Sum => Ok(forward + backward),
        MergeMode::Ave => Ok((forward + backward) * 0.5),
        MergeMode::Mul => Ok(forward * backward),
    }
}

fn pool<F>(values: &Array2<f32>, mask: Option<&[bool]>, mut combine: F, init: f32, average: bool) -> Array1<f32>
where
    F: FnMut(&mut Array1<f32>, ndarray::ArrayView1<f32>),
{
    let mut acc = Array1::from_elem(values.ncols(), init);
    let mut active = 0usize;

    for (step, row) in values.axis_iter(Axis(0)).enumerate() {
        if mask.is_some_and(|mask| !mask[step]) {
            continue;
        }
        combine(&mut acc, row);
        active += 1;
    }

    if active == 0 {
        return Array1::zeros(values.ncols());
    }
    if average {
        acc /= active as f32;
    }
    acc
}

// Weight access

struct WeightStore<'data> {
    tensors: SafeTensors<'data>,
}

impl<'data> WeightStore<'data> {
    fn tensor(&self, name: &str) -> Result<TensorView<'data>> {
        self.tensors
            .tensor(name)
            .map_err(|e| InferenceError::ModelLoad(format!("Missing weight tensor {}: {}", name, e)))
    }

    fn read_f32(view: &TensorView<'_>, name: &str) -> Result<Vec<f32>> {
        if view.dtype() != Dtype::F32 {
            return Err(InferenceError::ModelLoad(format!(
                "Weight tensor {} has dtype {:?}, expected F32",
                name,
                view.dtype()
            )));
        }
        Ok(view
            .data()
            .chunks_exact(4)
            .map(|bytes| f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            .collect())
    }

    fn matrix(&self, name: &str, rows: usize, cols: usize) -> Result<Array2<f32>> {
        let view = self.tensor(name)?;
        if view.shape() != [rows, cols] {
            return Err(InferenceError::ModelLoad(format!(
                "Weight tensor {} has shape {:?}, expected [{}, {}]",
                name,
                view.shape(),
                rows,
                cols
            )));
        }
        Array2::from_shape_vec((rows, cols), Self::read_f32(&view, name)?)
            .map_err(|e| InferenceError::ModelLoad(format!("Weight tensor {}: {}", name, e)))
    }

    fn vector(&self, name: &str, len: usize) -> Result<Array1<f32>> {
        let view = self.tensor(name)?;
        if view.shape() != [len] {
            return Err(InferenceError::ModelLoad(format!(
                "Weight tensor {} has shape {:?}, expected [{}]",
                name,
                view.shape(),
                len
            )));
        }
        Ok(Array1::from_vec(Self::read_f32(&view, name)?))
    }

    fn lstm(&self, prefix: &str, config: &LstmConfig, input_dim: usize, go_backwards: bool) -> Result<LstmLayer> {
        let gates = 4 * config.units;
        let bias = if config.use_bias {
            Some(self.vector(&format!("{}/bias", prefix), gates)?)
        } else {
            None
        };

        Ok(LstmLayer {
            kernel: self.matrix(&format!("{}/kernel", prefix), input_dim, gates)?,
            recurrent_kernel: self.matrix(&format!("{}/recurrent_kernel", prefix), config.units, gates)?,
            bias,
            units: config.units,
            activation: config.activation,
            recurrent_activation: config.recurrent_activation,
            go_backwards,
        })
    }
}

/// Keras sequential classifier evaluated in-process.
///
/// The artifact is a safetensors file whose metadata carries the Keras
/// architecture JSON under [`MODEL_CONFIG_KEY`]; weights are stored per
/// layer as `{layer}/{weight}` (bidirectional halves under
/// `{layer}/forward/…` and `{layer}/backward/…`).
pub struct KerasSequenceModel {
    name: String,
    embedding: EmbeddingLayer,
    layers: Vec<Layer>,
    outputs_distribution: bool,
}

impl KerasSequenceModel {
    pub fn load(model_path: &Path) -> Result<Self> {
        tracing::info!("Loading sentiment model from: {:?}", model_path);

        if !model_path.is_file() {
            return Err(InferenceError::ModelLoad(format!(
                "Model file not found: {:?}",
                model_path
            )));
        }

        let bytes = std::fs::read(model_path)
            .map_err(|e| InferenceError::ModelLoad(format!("Failed to read model file: {}", e)))?;
        let raw_config = Self::read_architecture(model_path, &bytes)?;
        let architecture = parse_architecture(&raw_config)?;
        let tensors = SafeTensors::deserialize(&bytes)
            .map_err(|e| InferenceError::ModelLoad(format!("Failed to read weights: {}", e)))?;

        let model = Self::build(&architecture, &WeightStore { tensors })?;
        tracing::info!("Successfully loaded sentiment model {}", model.name);
        Ok(model)
    }

    fn read_architecture(model_path: &Path, bytes: &[u8]) -> Result<String> {
        let (_, metadata) = SafeTensors::read_metadata(bytes)
            .map_err(|e| InferenceError::ModelLoad(format!("Failed to read model header: {}", e)))?;

        if let Some(raw) = metadata
            .metadata()
            .as_ref()
            .and_then(|entries| entries.get(MODEL_CONFIG_KEY))
        {
            return Ok(raw.clone());
        }

        let sidecar = model_path.with_file_name(MODEL_CONFIG_FILE);
        tracing::debug!("No embedded architecture, reading {:?}", sidecar);
        std::fs::read_to_string(&sidecar).map_err(|e| {
            InferenceError::ModelLoad(format!(
                "Model has no {} metadata and {:?} is unreadable: {}",
                MODEL_CONFIG_KEY, sidecar, e
            ))
        })
    }

    fn build(architecture: &ModelArchitecture, weights: &WeightStore<'_>) -> Result<Self> {
        if architecture.class_name != "Sequential" {
            return Err(InferenceError::ModelLoad(format!(
                "Unsupported model class {}, expected Sequential",
                architecture.class_name
            )));
        }

        let mut embedding = None;
        let mut layers = Vec::new();
        let mut shape: Option<Shape> = None;
        let mut outputs_distribution = false;

        for spec in &architecture.config.layers {
            match spec {
                LayerSpec::InputLayer(config) => {
                    if let Some(Some(length)) = config.batch_input_shape.get(1) {
                        if *length != crate::MAX_SEQUENCE_LENGTH {
                            tracing::warn!(
                                "Model declares input length {}, sequences are padded to {}",
                                length,
                                crate::MAX_SEQUENCE_LENGTH
                            );
                        }
                    }
                }
                // identity at inference time
                LayerSpec::SpatialDropout1D(_) | LayerSpec::Dropout(_) => {}
                LayerSpec::Embedding(config) => {
                    if embedding.is_some() || shape.is_some() {
                        return Err(InferenceError::ModelLoad(
                            "Embedding must be the first computing layer".to_string(),
                        ));
                    }
                    let table = weights.matrix(
                        &format!("{}/embeddings", config.common.name),
                        config.input_dim,
                        config.output_dim,
                    )?;
                    embedding = Some(EmbeddingLayer { table, mask_zero: config.mask_zero });
                    shape = Some(Shape::Sequence(config.output_dim));
                }
                LayerSpec::Lstm(config) => {
                    let input_dim = expect_sequence(shape, &config.common.name)?;
                    let cell = weights.lstm(&config.common.name, config, input_dim, config.go_backwards)?;
                    shape = Some(if config.return_sequences {
                        Shape::Sequence(config.units)
                    } else {
                        Shape::Vector(config.units)
                    });
                    layers.push(Layer::Lstm { cell, return_sequences: config.return_sequences });
                }
                LayerSpec::Bidirectional(config) => {
                    let input_dim = expect_sequence(shape, &config.common.name)?;
                    if config.layer.class_name != "LSTM" {
                        return Err(InferenceError::ModelLoad(format!(
                            "Bidirectional wrapper around {} is not supported",
                            config.layer.class_name
                        )));
                    }
                    let merge = config.merge_mode.ok_or_else(|| {
                        InferenceError::ModelLoad("Bidirectional merge_mode null is not supported".to_string())
                    })?;

                    let inner = &config.layer.config;
                    let prefix = &config.common.name;
                    let forward = weights.lstm(&format!("{}/forward", prefix), inner, input_dim, inner.go_backwards)?;
                    let backward = weights.lstm(&format!("{}/backward", prefix), inner, input_dim, !inner.go_backwards)?;

                    let units = match merge {
                        MergeMode::Concat => 2 * inner.units,
                        _ => inner.units,
                    };
                    shape = Some(if inner.return_sequences {
                        Shape::Sequence(units)
                    } else {
                        Shape::Vector(units)
                    });
                    layers.push(Layer::Bidirectional {
                        forward,
                        backward,
                        merge,
                        return_sequences: inner.return_sequences,
                    });
                }
                LayerSpec::GlobalMaxPooling1D(config) | LayerSpec::GlobalAveragePooling1D(config) => {
                    let dim = expect_sequence(shape, &config.common.name)?;
                    shape = Some(Shape::Vector(dim));
                    layers.push(match spec {
                        LayerSpec::GlobalMaxPooling1D(_) => Layer::GlobalMaxPooling,
                        _ => Layer::GlobalAveragePooling,
                    });
                }
                LayerSpec::Dense(config) => {
                    let input_dim = match shape {
                        Some(Shape::Vector(dim)) => dim,
                        _ => {
                            return Err(InferenceError::ModelLoad(format!(
                                "Dense layer {} needs a pooled vector input",
                                config.common.name
                            )))
                        }
                    };
                    let name = &config.common.name;
                    let kernel = weights.matrix(&format!("{}/kernel", name), input_dim, config.units)?;
                    let bias = if config.use_bias {
                        Some(weights.vector(&format!("{}/bias", name), config.units)?)
                    } else {
                        None
                    };
                    shape = Some(Shape::Vector(config.units));
                    layers.push(Layer::Dense { kernel, bias, activation: config.activation });
                }
            }

            outputs_distribution = matches!(
                spec,
                LayerSpec::Dense(DenseConfig { activation: Activation::Softmax, .. })
            ) || (outputs_distribution
                && matches!(spec, LayerSpec::Dropout(_) | LayerSpec::SpatialDropout1D(_)));
        }

        let embedding = embedding
            .ok_or_else(|| InferenceError::ModelLoad("Model has no Embedding layer".to_string()))?;
        if shape != Some(Shape::Vector(NUM_CLASSES)) {
            return Err(InferenceError::ModelLoad(format!(
                "Model must output {} class scores, final shape is {:?}",
                NUM_CLASSES, shape
            )));
        }

        Ok(Self {
            name: architecture
                .config
                .name
                .clone()
                .unwrap_or_else(|| "sequential".to_string()),
            embedding,
            layers,
            outputs_distribution,
        })
    }

    fn forward(&self, input: &PaddedSequence) -> Result<Array1<f32>> {
        let mut activations = self.embedding.lookup(input.ids())?;
        for layer in &self.layers {
            activations = layer.forward(activations)?;
        }

        match activations {
            Activations::Vector(values) => Ok(values),
            Activations::Sequence { .. } => Err(InferenceError::Runtime(
                "Model produced a sequence instead of class scores".to_string(),
            )),
        }
    }
}

fn expect_sequence(shape: Option<Shape>, layer: &str) -> Result<usize> {
    match shape {
        Some(Shape::Sequence(dim)) => Ok(dim),
        other => Err(InferenceError::ModelLoad(format!(
            "Layer {} needs a sequence input, got {:?}",
            layer, other
        ))),
    }
}

impl SequenceClassifier for KerasSequenceModel {
    fn score(&self, input: &PaddedSequence) -> Result<ProbabilityVector> {
        let mut scores = self.forward(input)?;
        if !self.outputs_distribution {
            scores = softmax(&scores);
        }

        let probabilities: Vec<f64> = scores.iter().map(|&p| p as f64).collect();
        ProbabilityVector::from_slice(&probabilities)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
