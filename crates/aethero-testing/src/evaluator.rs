//! # Static Evaluator
//!
//! An [`Evaluator`] returning fixed scores, with an optional failure, and a
//! record of every output it was asked to score.

use aethero_core::{EvaluationCriterion, EvaluationError, EvaluationScores, Evaluator, Payload};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Evaluator that always answers with the same scores
#[derive(Debug, Clone)]
pub struct StaticEvaluator {
    response: Result<EvaluationScores, EvaluationError>,
    call_history: Arc<Mutex<Vec<(Value, Vec<EvaluationCriterion>)>>>,
}

impl StaticEvaluator {
    /// Answer every request with `scores`
    pub fn new(scores: EvaluationScores) -> Self {
        Self {
            response: Ok(scores),
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Same score for every criterion
    pub fn uniform(score: f64) -> Self {
        Self::new(EvaluationScores {
            accuracy: score,
            consistency: score,
            ethical_compliance: score,
            performance: score,
        })
    }

    /// Fail every request with `error`
    pub fn failing(error: EvaluationError) -> Self {
        Self {
            response: Err(error),
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_history.lock().unwrap().len()
    }

    /// Outputs and criteria passed to `evaluate`, in order
    pub fn call_history(&self) -> Vec<(Value, Vec<EvaluationCriterion>)> {
        self.call_history.lock().unwrap().clone()
    }
}

#[async_trait]
impl Evaluator for StaticEvaluator {
    async fn evaluate(
        &self,
        output: &Value,
        criteria: &[EvaluationCriterion],
        _context: &Payload,
    ) -> Result<EvaluationScores, EvaluationError> {
        self.call_history
            .lock()
            .unwrap()
            .push((output.clone(), criteria.to_vec()));
        self.response.clone()
    }
}
