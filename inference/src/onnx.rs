use crate::model::SequenceClassifier;
use crate::{InferenceError, PaddedSequence, ProbabilityVector, Result, SentimentConfig};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;

/// Classifier exported to ONNX, fed the padded ids as a `[1, 100]` float tensor.
pub struct OnnxSequenceModel {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxSequenceModel {
    pub fn load(model_path: &Path, config: &SentimentConfig) -> Result<Self> {
        tracing::info!("Loading ONNX sentiment model from: {:?}", model_path);

        if !model_path.exists() {
            return Err(InferenceError::ModelLoad(format!(
                "Model file not found: {:?}",
                model_path
            )));
        }

        let session = Session::builder()
            .map_err(|e| InferenceError::ModelLoad(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::ModelLoad(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(1)
            .map_err(|e| InferenceError::ModelLoad(format!("Failed to set thread count: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| InferenceError::ModelLoad(format!("Failed to load model: {}", e)))?;

        tracing::info!("Successfully loaded ONNX sentiment model");
        Ok(Self {
            session: Mutex::new(session),
            input_name: config.onnx_input_name.clone(),
            output_name: config.onnx_output_name.clone(),
        })
    }

    fn run_inference(&self, ids: &[i64]) -> Result<Vec<f64>> {
        let values: Vec<f32> = ids.iter().map(|&id| id as f32).collect();
        let input = ndarray::Array2::from_shape_vec((1, values.len()), values)
            .map_err(|e| InferenceError::Runtime(format!("Failed to create input array: {}", e)))?;
        let input_tensor = Tensor::from_array(input)
            .map_err(|e| InferenceError::Runtime(format!("Failed to create input tensor: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| InferenceError::Runtime("ONNX session lock poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| InferenceError::Runtime(format!("Inference failed: {}", e)))?;

        let (_shape, data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Runtime(format!("Failed to extract {}: {}", self.output_name, e)))?;

        Ok(data.iter().map(|&x| x as f64).collect())
    }
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max_logit = logits.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let exp_logits: Vec<f64> = logits.iter().map(|&x| (x - max_logit).exp()).collect();
    let sum_exp: f64 = exp_logits.iter().sum();

    exp_logits.iter().map(|&x| x / sum_exp).collect()
}

impl SequenceClassifier for OnnxSequenceModel {
    fn score(&self, input: &PaddedSequence) -> Result<ProbabilityVector> {
        let scores = self.run_inference(input.ids())?;
        let probabilities = ProbabilityVector::from_slice(&scores)?;

        if probabilities.is_distribution(1e-3) {
            Ok(probabilities)
        } else {
            ProbabilityVector::from_slice(&softmax(&scores))
        }
    }

    fn name(&self) -> &str {
        "onnx"
    }
}
