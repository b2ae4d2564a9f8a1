//! Output evaluation interface

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::Payload;

/// Dimension an output is scored on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationCriterion {
    Accuracy,
    Consistency,
    EthicalCompliance,
    Performance,
}

impl EvaluationCriterion {
    pub const ALL: [EvaluationCriterion; 4] = [
        EvaluationCriterion::Accuracy,
        EvaluationCriterion::Consistency,
        EvaluationCriterion::EthicalCompliance,
        EvaluationCriterion::Performance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationCriterion::Accuracy => "accuracy",
            EvaluationCriterion::Consistency => "consistency",
            EvaluationCriterion::EthicalCompliance => "ethical_compliance",
            EvaluationCriterion::Performance => "performance",
        }
    }
}

impl fmt::Display for EvaluationCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scores in `0.0..=1.0` per criterion
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EvaluationScores {
    pub accuracy: f64,
    pub consistency: f64,
    pub ethical_compliance: f64,
    pub performance: f64,
}

impl EvaluationScores {
    pub fn get(&self, criterion: EvaluationCriterion) -> f64 {
        match criterion {
            EvaluationCriterion::Accuracy => self.accuracy,
            EvaluationCriterion::Consistency => self.consistency,
            EvaluationCriterion::EthicalCompliance => self.ethical_compliance,
            EvaluationCriterion::Performance => self.performance,
        }
    }

    /// `(criterion, score)` pairs in [`EvaluationCriterion::ALL`] order
    pub fn iter(&self) -> impl Iterator<Item = (EvaluationCriterion, f64)> + '_ {
        EvaluationCriterion::ALL.into_iter().map(|c| (c, self.get(c)))
    }
}

#[derive(Debug, Clone, Error)]
pub enum EvaluationError {
    #[error("evaluation service unavailable: {0}")]
    Unavailable(String),

    #[error("output could not be evaluated: {0}")]
    InvalidOutput(String),
}

/// Pure scoring call; the runtime assumes no side effects.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(
        &self,
        output: &serde_json::Value,
        criteria: &[EvaluationCriterion],
        context: &Payload,
    ) -> Result<EvaluationScores, EvaluationError>;
}
