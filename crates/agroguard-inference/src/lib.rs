//! Inference adapter around the pre-trained leaf classifier.
//!
//! The model artifact is an ONNX export of the trained network: a 224x224
//! RGB float tensor in, fifteen class probabilities out. The adapter owns
//! lazy loading, image preprocessing, and the mapping from the winning
//! output index to a catalog class with its advisory.

mod classifier;
mod error;
mod preprocess;

pub use classifier::{Classification, Classifier, ClassifierHandle};
pub use error::InferenceError;
pub use preprocess::{IMAGE_SIZE, load_pixels};
