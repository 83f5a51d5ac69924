//! Action policies for the vector brain.
//!
//! A policy maps the feature vector, the memory context, and the drive
//! state to a distribution over the nine actions. Two implementations:
//!
//! - [`ModelPolicy`]: evaluates a loaded [`PolicyModel`]. Output must be at
//!   least 12 values: nine action scores followed by three emotion values.
//! - [`HeuristicPolicy`]: a fixed need-driven distribution, used whenever
//!   no model is configured or the configured one cannot be loaded.
//!
//! The choice is made once, in [`select_policy`], and holds for the
//! brain's lifetime.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::action::{ACTION_COUNT, ActionKind};
use crate::config::NeuralConfig;
use crate::error::{BrainzError, Result};
use crate::needs::Needs;

/// Values a model must emit: nine action scores plus three emotion axes.
pub const MODEL_OUTPUT_LEN: usize = ACTION_COUNT + 3;

// ---------------------------------------------------------------------------
// Distribution helpers
// ---------------------------------------------------------------------------

/// Uniform distribution over every action.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn uniform() -> [f32; ACTION_COUNT] {
    [1.0 / ACTION_COUNT as f32; ACTION_COUNT]
}

/// Floor negative and NaN entries at 0 and rescale to sum to 1. A zero or
/// non-finite total falls back to uniform.
#[allow(clippy::cast_precision_loss)]
pub fn normalize(probs: &mut [f32]) {
    for p in probs.iter_mut() {
        if p.is_nan() || *p < 0.0 {
            *p = 0.0;
        }
    }
    let sum: f32 = probs.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        for p in probs.iter_mut() {
            *p /= sum;
        }
    } else if !probs.is_empty() {
        let u = 1.0 / probs.len() as f32;
        probs.fill(u);
    }
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

/// A loaded inference model.
pub trait PolicyModel: Send + Sync {
    /// Evaluate the model on the feature vector and memory context.
    ///
    /// # Errors
    ///
    /// Returns [`BrainzError::ModelShape`] if the inputs do not match the
    /// model, or [`BrainzError::Inference`] if evaluation fails.
    fn evaluate(&self, features: &[f32], context: &[f32]) -> Result<Vec<f32>>;

    /// Human-readable model name.
    fn model_name(&self) -> &str;
}

/// A single dense layer over the concatenated `features ++ context` input,
/// stored as JSON:
///
/// ```json
/// { "name": "policy-v1", "input_dim": 1620,
///   "weights": [[...], ...], "bias": [...] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearPolicyModel {
    /// Model name.
    #[serde(default = "default_model_name")]
    pub name: String,
    /// Expected input length.
    pub input_dim: usize,
    /// One row of `input_dim` weights per output.
    pub weights: Vec<Vec<f32>>,
    /// One bias per output.
    pub bias: Vec<f32>,
}

fn default_model_name() -> String {
    "linear".to_string()
}

impl LinearPolicyModel {
    /// Parse and validate a model document.
    ///
    /// # Errors
    ///
    /// Returns [`BrainzError::BackendUnavailable`] if the document is not a
    /// valid model, or [`BrainzError::ModelShape`] if its dimensions are
    /// inconsistent.
    pub fn from_json(json: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(json)
            .map_err(|e| BrainzError::BackendUnavailable(format!("invalid model document: {e}")))?;
        model.validate()?;
        Ok(model)
    }

    /// Load a model from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`BrainzError::BackendUnavailable`] if the file cannot be read
    /// or parsed, or [`BrainzError::ModelShape`] if it is inconsistent.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            BrainzError::BackendUnavailable(format!("{}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<()> {
        if self.bias.len() != self.weights.len() {
            return Err(BrainzError::ModelShape {
                expected: self.weights.len(),
                actual: self.bias.len(),
            });
        }
        if let Some(row) = self.weights.iter().find(|r| r.len() != self.input_dim) {
            return Err(BrainzError::ModelShape {
                expected: self.input_dim,
                actual: row.len(),
            });
        }
        Ok(())
    }
}

impl PolicyModel for LinearPolicyModel {
    fn evaluate(&self, features: &[f32], context: &[f32]) -> Result<Vec<f32>> {
        let actual = features.len() + context.len();
        if actual != self.input_dim {
            return Err(BrainzError::ModelShape {
                expected: self.input_dim,
                actual,
            });
        }
        let out = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| {
                let dot: f32 = row
                    .iter()
                    .zip(features.iter().chain(context))
                    .map(|(w, x)| w * x)
                    .sum();
                dot + b
            })
            .collect::<Vec<f32>>();
        if out.iter().any(|v| !v.is_finite()) {
            return Err(BrainzError::Inference("non-finite model output".to_string()));
        }
        Ok(out)
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// What a policy proposes for one decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyOutput {
    /// Distribution over actions in [`ActionKind`] index order; sums to 1.
    pub probabilities: [f32; ACTION_COUNT],
    /// Emotional state predicted by the model, if any.
    pub emotion: Option<[f32; 3]>,
}

/// Strategy that proposes an action distribution.
pub trait ActionPolicy: Send + Sync {
    /// Propose a distribution. Never fails; policies degrade internally.
    fn propose(&self, features: &[f32], context: &[f32], needs: &Needs) -> PolicyOutput;

    /// Short name for logs and debug views.
    fn name(&self) -> &str;
}

/// Fixed need-driven fallback policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPolicy;

/// Floor probability for every action in the heuristic distribution.
const HEURISTIC_BASE: f32 = 0.05;

impl ActionPolicy for HeuristicPolicy {
    fn propose(&self, _features: &[f32], _context: &[f32], needs: &Needs) -> PolicyOutput {
        let mut probs = [HEURISTIC_BASE; ACTION_COUNT];
        let (kind, weight) = if needs.hunger > 0.7 {
            (ActionKind::Forage, 0.5)
        } else if needs.energy > 0.7 {
            (ActionKind::Rest, 0.5)
        } else if needs.social > 0.7 {
            (ActionKind::Socialize, 0.4)
        } else if needs.curiosity > 0.6 {
            (ActionKind::Explore, 0.3)
        } else {
            (ActionKind::Idle, 0.3)
        };
        probs[kind.index()] = weight;
        normalize(&mut probs);
        PolicyOutput {
            probabilities: probs,
            emotion: None,
        }
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

/// Policy backed by a loaded model.
pub struct ModelPolicy {
    model: Box<dyn PolicyModel>,
}

impl std::fmt::Debug for ModelPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelPolicy")
            .field("model", &self.model.model_name())
            .finish()
    }
}

impl ModelPolicy {
    /// Wrap a model.
    #[must_use]
    pub fn new(model: Box<dyn PolicyModel>) -> Self {
        Self { model }
    }
}

impl ActionPolicy for ModelPolicy {
    fn propose(&self, features: &[f32], context: &[f32], _needs: &Needs) -> PolicyOutput {
        match self.model.evaluate(features, context) {
            Ok(out) if out.len() >= MODEL_OUTPUT_LEN => {
                let mut probs = [0.0; ACTION_COUNT];
                probs.copy_from_slice(&out[..ACTION_COUNT]);
                normalize(&mut probs);
                PolicyOutput {
                    probabilities: probs,
                    emotion: Some([
                        out[ACTION_COUNT],
                        out[ACTION_COUNT + 1],
                        out[ACTION_COUNT + 2],
                    ]),
                }
            }
            Ok(out) => {
                warn!(
                    model = self.model.model_name(),
                    len = out.len(),
                    "model output too short, using uniform distribution"
                );
                PolicyOutput {
                    probabilities: uniform(),
                    emotion: None,
                }
            }
            Err(e) => {
                warn!(model = self.model.model_name(), error = %e, "inference failed, using uniform distribution");
                PolicyOutput {
                    probabilities: uniform(),
                    emotion: None,
                }
            }
        }
    }

    fn name(&self) -> &str {
        self.model.model_name()
    }
}

/// Pick the policy for a new brain: the configured model if it loads,
/// otherwise the heuristic.
#[must_use]
pub fn select_policy(config: &NeuralConfig) -> Box<dyn ActionPolicy> {
    let Some(path) = config.model_path.as_deref() else {
        debug!("no policy model configured, using heuristic policy");
        return Box::new(HeuristicPolicy);
    };
    match LinearPolicyModel::from_file(path) {
        Ok(model) => {
            info!(path = %path.display(), model = %model.name, "policy model loaded");
            Box::new(ModelPolicy::new(Box::new(model)))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "policy model unavailable, using heuristic policy");
            Box::new(HeuristicPolicy)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedModel(Vec<f32>);

    impl PolicyModel for FixedModel {
        fn evaluate(&self, _features: &[f32], _context: &[f32]) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingModel;

    impl PolicyModel for FailingModel {
        fn evaluate(&self, _features: &[f32], _context: &[f32]) -> Result<Vec<f32>> {
            Err(BrainzError::Inference("boom".to_string()))
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    fn assert_distribution(p: &[f32; ACTION_COUNT]) {
        let sum: f32 = p.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5, "sum was {sum}");
        assert!(p.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn normalize_handles_degenerate_input() {
        let mut p = [0.0; ACTION_COUNT];
        normalize(&mut p);
        assert_eq!(p, uniform());
        let mut q = [-1.0, 2.0, f32::NAN, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        normalize(&mut q);
        assert_distribution(&q);
        assert!((q[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn heuristic_prefers_forage_when_hungry() {
        let needs = Needs::new(0.9, 0.9, 0.9, 0.9, 0.5);
        let out = HeuristicPolicy.propose(&[], &[], &needs);
        assert_distribution(&out.probabilities);
        let forage = out.probabilities[ActionKind::Forage.index()];
        assert!((forage - 0.5 / 0.9).abs() < 1e-5);
        assert!(out.emotion.is_none());
    }

    #[test]
    fn heuristic_idles_when_content() {
        let needs = Needs::new(0.1, 0.1, 0.1, 0.1, 0.9);
        let out = HeuristicPolicy.propose(&[], &[], &needs);
        let best = out
            .probabilities
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(best, Some(ActionKind::Idle.index()));
    }

    #[test]
    fn model_output_splits_actions_and_emotion() {
        let mut raw = vec![0.0; ACTION_COUNT];
        raw[ActionKind::Eat.index()] = 3.0;
        raw[ActionKind::Rest.index()] = 1.0;
        raw.extend([0.5, -0.25, 0.1]);
        let policy = ModelPolicy::new(Box::new(FixedModel(raw)));
        let out = policy.propose(&[], &[], &Needs::default());
        assert_distribution(&out.probabilities);
        assert!((out.probabilities[ActionKind::Eat.index()] - 0.75).abs() < 1e-6);
        assert_eq!(out.emotion, Some([0.5, -0.25, 0.1]));
    }

    #[test]
    fn short_or_failed_model_output_is_uniform() {
        let short = ModelPolicy::new(Box::new(FixedModel(vec![1.0; 11])));
        assert_eq!(short.propose(&[], &[], &Needs::default()).probabilities, uniform());
        let failing = ModelPolicy::new(Box::new(FailingModel));
        let out = failing.propose(&[], &[], &Needs::default());
        assert_eq!(out.probabilities, uniform());
        assert!(out.emotion.is_none());
    }

    #[test]
    fn linear_model_validates_shape() {
        let ok = r#"{"input_dim": 2, "weights": [[1.0, 0.0], [0.0, 2.0]], "bias": [0.5, 0.0]}"#;
        let model = LinearPolicyModel::from_json(ok).expect("valid model");
        let out = model.evaluate(&[1.0], &[3.0]).expect("evaluates");
        assert_eq!(out, vec![1.5, 6.0]);
        assert!(matches!(
            model.evaluate(&[1.0], &[]),
            Err(BrainzError::ModelShape { expected: 2, actual: 1 })
        ));

        let ragged = r#"{"input_dim": 2, "weights": [[1.0]], "bias": [0.0]}"#;
        assert!(matches!(
            LinearPolicyModel::from_json(ragged),
            Err(BrainzError::ModelShape { .. })
        ));
        assert!(matches!(
            LinearPolicyModel::from_json("not json"),
            Err(BrainzError::BackendUnavailable(_))
        ));
    }

    #[test]
    fn missing_model_file_falls_back_to_heuristic() {
        let config = NeuralConfig {
            model_path: Some("/nonexistent/brainz/policy.json".into()),
            ..NeuralConfig::default()
        };
        assert_eq!(select_policy(&config).name(), "heuristic");
        assert_eq!(select_policy(&NeuralConfig::default()).name(), "heuristic");
    }
}
