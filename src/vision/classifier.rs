//! Frame classification against a loaded inference model.
//!
//! Preprocessing follows the model's declared geometry: resize to the
//! input shape read at load time, scale pixel values by the configured
//! normalization factor, run inference, argmax, then map the winning index
//! through the configured [`LabelMap`].
//!
//! Classification is deliberately infallible at the call site: any
//! preprocessing or inference fault collapses to `Label::Other` so a model
//! hiccup never blocks the rest of the scan pipeline.

use image::imageops::{self, FilterType};
use log::warn;

use crate::config::LabelMap;
use crate::error::ModelError;
use crate::session::Label;
use crate::vision::frame::Frame;

// ---------------------------------------------------------------------------
// Model contract
// ---------------------------------------------------------------------------

/// A loaded inference model. The concrete binding (TFLite, ONNX runtime,
/// remote service) is an adapter concern; the classifier only needs the
/// declared geometry and a score vector.
pub trait InferenceModel {
    /// Declared spatial input shape as `(height, width)`, read once at
    /// model load time.
    fn input_shape(&self) -> (u32, u32);

    /// Run inference over an interleaved-RGB `f32` tensor of
    /// `height * width * 3` values. Returns one score per class.
    fn invoke(&mut self, input: &[f32]) -> Result<Vec<f32>, ModelError>;
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

pub struct Classifier<M> {
    model: M,
    label_map: LabelMap,
    pixel_norm: f32,
}

impl<M: InferenceModel> Classifier<M> {
    pub fn new(model: M, label_map: LabelMap, pixel_norm: f32) -> Self {
        Self {
            model,
            label_map,
            pixel_norm,
        }
    }

    /// Classify one frame. Faults are logged and collapse to `Other`.
    pub fn predict(&mut self, frame: &Frame) -> Label {
        match self.run(frame) {
            Ok(label) => label,
            Err(e) => {
                warn!("classification fault ({e}), defaulting to Other");
                Label::Other
            }
        }
    }

    fn run(&mut self, frame: &Frame) -> Result<Label, ModelError> {
        let (height, width) = self.model.input_shape();
        if height == 0 || width == 0 {
            return Err(ModelError::BadInput("model declares an empty input shape"));
        }

        let resized = imageops::resize(frame.as_image(), width, height, FilterType::Triangle);
        let tensor: Vec<f32> = resized
            .as_raw()
            .iter()
            .map(|&p| f32::from(p) * self.pixel_norm)
            .collect();

        let scores = self.model.invoke(&tensor)?;
        let winner = argmax(&scores).ok_or(ModelError::BadInput("empty score vector"))?;
        Ok(self.label_map.label_for(winner))
    }
}

/// Index of the maximum score. NaN entries never win; an all-NaN or empty
/// vector yields `None`.
fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &s) in scores.iter().enumerate() {
        match best {
            Some((_, b)) if !(s > b) => {}
            _ if s.is_nan() => {}
            _ => best = Some((i, s)),
        }
    }
    best.map(|(i, _)| i)
}
