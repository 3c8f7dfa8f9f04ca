//! Classifier loading and the classification operation.

use crate::error::InferenceError;
use crate::preprocess::{IMAGE_SIZE, load_pixels};
use agroguard_core::DiseaseClass;
use log::{debug, info};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tract_onnx::prelude::*;

/// Optimized, runnable model plan.
type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// One classification outcome with all display fields resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Winning catalog class.
    pub class: DiseaseClass,
    /// Machine-readable class key.
    pub label: String,
    /// Human-readable class name.
    pub display_label: String,
    /// Probability the model assigned to the winning class.
    pub confidence: f32,
    /// Static treatment advisory for the class.
    pub treatment: String,
    /// Static medicine advisory for the class.
    pub medicine: String,
}

/// A loaded model instance; read-only once constructed.
pub struct Classifier {
    plan: Plan,
}

impl Classifier {
    /// Load and optimize the model artifact.
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        if !path.exists() {
            return Err(InferenceError::ModelUnavailable(format!(
                "model file not found at {}",
                path.display()
            )));
        }
        info!("loading model (path={})", path.display());
        let size = IMAGE_SIZE as i64;
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, size, size, 3]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|err| InferenceError::ModelUnavailable(err.to_string()))?;
        info!("model loaded (path={})", path.display());
        Ok(Self { plan })
    }

    /// Classify a single image file.
    pub fn classify(&self, image_path: &Path) -> Result<Classification, InferenceError> {
        let pixels = load_pixels(image_path)?;
        let shape = (1, IMAGE_SIZE as usize, IMAGE_SIZE as usize, 3);
        let input: Tensor = tract_ndarray::Array4::from_shape_vec(shape, pixels)
            .map_err(|err| InferenceError::Forward(err.to_string()))?
            .into();
        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|err| InferenceError::Forward(err.to_string()))?;
        let probabilities = outputs[0]
            .to_array_view::<f32>()
            .map_err(|err| InferenceError::Forward(err.to_string()))?;
        let probabilities: Vec<f32> = probabilities.iter().copied().collect();

        let index = argmax(&probabilities)
            .ok_or_else(|| InferenceError::Forward("empty output vector".to_string()))?;
        let class = DiseaseClass::from_index(index).ok_or_else(|| {
            InferenceError::Forward(format!("unexpected class index: {index}"))
        })?;
        let confidence = probabilities[index];
        let advisory = class.advisory();
        debug!(
            "classified image (path={}, class={}, confidence={:.4})",
            image_path.display(),
            class.key(),
            confidence
        );
        Ok(Classification {
            class,
            label: class.key().to_string(),
            display_label: class.display_name().to_string(),
            confidence,
            treatment: advisory.treatment.to_string(),
            medicine: advisory.medicine.to_string(),
        })
    }
}

/// Index of the maximum probability; ties break to the lowest index.
fn argmax(probabilities: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, probability) in probabilities.iter().copied().enumerate() {
        match best {
            Some((_, top)) if probability <= top => {}
            _ => best = Some((index, probability)),
        }
    }
    best.map(|(index, _)| index)
}

/// Process-wide classifier with lazy, idempotent loading.
///
/// The first `classify` call loads the model; the load is serialized so
/// concurrent first access performs exactly one load, and later calls share
/// the same read-only instance. A failed load leaves the handle unloaded so
/// the next call retries.
pub struct ClassifierHandle {
    model_path: PathBuf,
    loaded: Mutex<Option<Arc<Classifier>>>,
}

impl ClassifierHandle {
    /// Create an unloaded handle over a model artifact path.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            loaded: Mutex::new(None),
        }
    }

    /// Path of the model artifact this handle loads.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Classify an image, loading the model first if needed.
    pub fn classify(&self, image_path: &Path) -> Result<Classification, InferenceError> {
        let classifier = self.instance()?;
        classifier.classify(image_path)
    }

    /// Whether the model has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.loaded.lock().is_some()
    }

    fn instance(&self) -> Result<Arc<Classifier>, InferenceError> {
        let mut slot = self.loaded.lock();
        if let Some(classifier) = slot.as_ref() {
            return Ok(classifier.clone());
        }
        let classifier = Arc::new(Classifier::load(&self.model_path)?);
        *slot = Some(classifier.clone());
        Ok(classifier)
    }
}

#[cfg(test)]
mod tests {
    use super::{ClassifierHandle, argmax};
    use crate::error::InferenceError;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn argmax_picks_highest() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[0.9]), Some(0));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn argmax_ties_break_to_lowest_index() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), Some(1));
        assert_eq!(argmax(&[0.5, 0.5, 0.5]), Some(0));
    }

    #[test]
    fn missing_model_is_unavailable_and_stays_unloaded() {
        let temp = tempdir().expect("tempdir");
        let handle = ClassifierHandle::new(temp.path().join("absent.onnx"));
        let err = handle.classify(&temp.path().join("leaf.jpg")).unwrap_err();
        assert!(matches!(err, InferenceError::ModelUnavailable(_)));
        assert!(!handle.is_loaded());
    }

    #[test]
    fn unparsable_model_is_unavailable() {
        let temp = tempdir().expect("tempdir");
        let model_path = temp.path().join("model.onnx");
        std::fs::write(&model_path, b"not an onnx graph").expect("write");
        let handle = ClassifierHandle::new(&model_path);
        let err = handle.classify(&temp.path().join("leaf.jpg")).unwrap_err();
        assert!(matches!(err, InferenceError::ModelUnavailable(_)));
    }
}
