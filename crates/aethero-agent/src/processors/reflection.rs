use aethero_core::{
    EvaluationCriterion, EvaluationError, EvaluationScores, Evaluator, MemoryStore, Payload,
    RecordId, TaskFailure,
};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::info;

use super::{required_str, to_payload, type_name};
use crate::processor::TaskProcessor;

/// Every considered score at or above this passes
pub const PASS_THRESHOLD: f64 = 0.8;
/// Any considered score below this fails
pub const FAIL_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Passed,
    Failed,
    Warning,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Passed => "passed",
            ValidationStatus::Failed => "failed",
            ValidationStatus::Warning => "warning",
        }
    }

    /// Status of a set of scores
    pub fn from_scores(scores: impl IntoIterator<Item = f64>) -> Self {
        let mut status = ValidationStatus::Passed;
        for score in scores {
            if score < FAIL_THRESHOLD {
                return ValidationStatus::Failed;
            }
            if score < PASS_THRESHOLD {
                status = ValidationStatus::Warning;
            }
        }
        status
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict on one evaluated output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub status: ValidationStatus,
    pub metrics: EvaluationScores,
    pub findings: Vec<String>,
    pub suggestions: Vec<String>,
}

impl ValidationResult {
    pub fn from_scores(scores: EvaluationScores, criteria: &[EvaluationCriterion]) -> Self {
        let considered: Vec<(EvaluationCriterion, f64)> = scores
            .iter()
            .filter(|(criterion, _)| criteria.contains(criterion))
            .collect();

        let mut findings = Vec::new();
        let mut suggestions = Vec::new();
        for (criterion, score) in &considered {
            if *score < FAIL_THRESHOLD {
                findings.push(format!("{criterion} score {score:.2} is critically low"));
            } else if *score < PASS_THRESHOLD {
                findings.push(format!("{criterion} score {score:.2} is below target"));
            } else {
                continue;
            }
            suggestions.push(suggestion_for(*criterion).to_string());
        }

        Self {
            status: ValidationStatus::from_scores(considered.iter().map(|(_, s)| *s)),
            metrics: scores,
            findings,
            suggestions,
        }
    }
}

fn suggestion_for(criterion: EvaluationCriterion) -> &'static str {
    match criterion {
        EvaluationCriterion::Accuracy => "Verify results against the source data before publishing",
        EvaluationCriterion::Consistency => {
            "Align output structure and terminology with earlier results"
        }
        EvaluationCriterion::EthicalCompliance => "Review the output against the ethical guidelines",
        EvaluationCriterion::Performance => "Reduce processing time or resource usage for this task",
    }
}

/// Scores another agent's output and stores the reflection.
///
/// Task fields: `agent_id` (whose output is judged), `output` (any JSON),
/// optional `context` object; the caller's annotations are used when it is
/// absent. The result carries the [`ValidationResult`] plus `record_id`.
pub struct ReflectionProcessor {
    evaluator: Arc<dyn Evaluator>,
    store: Arc<dyn MemoryStore>,
    criteria: Vec<EvaluationCriterion>,
}

impl std::fmt::Debug for ReflectionProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReflectionProcessor")
            .field("criteria", &self.criteria)
            .finish()
    }
}

impl ReflectionProcessor {
    pub fn new(evaluator: Arc<dyn Evaluator>, store: Arc<dyn MemoryStore>) -> Self {
        Self {
            evaluator,
            store,
            criteria: EvaluationCriterion::ALL.to_vec(),
        }
    }

    /// Restrict evaluation to `criteria`; an empty list keeps all of them
    pub fn with_criteria(mut self, criteria: impl Into<Vec<EvaluationCriterion>>) -> Self {
        let criteria = criteria.into();
        if !criteria.is_empty() {
            self.criteria = criteria;
        }
        self
    }

    pub fn criteria(&self) -> &[EvaluationCriterion] {
        &self.criteria
    }

    async fn persist(&self, agent_id: &str, result: &ValidationResult) -> Result<RecordId, TaskFailure> {
        let mut record = to_payload(result)?;
        record.insert("kind".into(), "reflection".into());
        record.insert("agent_id".into(), agent_id.into());
        record.insert("timestamp".into(), Utc::now().to_rfc3339().into());

        self.store
            .put(record)
            .await
            .map_err(|e| TaskFailure::external(format!("failed to store reflection: {e}")))
    }
}

#[async_trait]
impl TaskProcessor for ReflectionProcessor {
    async fn process_task(&self, task: &Payload, annotations: &Payload) -> Result<Payload, TaskFailure> {
        let agent_id = required_str(task, "agent_id")?;
        let output = task
            .get("output")
            .ok_or_else(|| TaskFailure::validation("missing field 'output'"))?;
        let context = match task.get("context") {
            Some(Value::Object(context)) => context,
            Some(other) => {
                return Err(TaskFailure::validation(format!(
                    "field 'context' must be an object, got {}",
                    type_name(other)
                )));
            }
            None => annotations,
        };

        let scores = self
            .evaluator
            .evaluate(output, &self.criteria, context)
            .await
            .map_err(|e| match e {
                EvaluationError::Unavailable(_) => TaskFailure::external(e.to_string()),
                EvaluationError::InvalidOutput(_) => TaskFailure::validation(e.to_string()),
            })?;

        let result = ValidationResult::from_scores(scores, &self.criteria);
        let record_id = self.persist(agent_id, &result).await?;

        info!(
            reviewed_agent = agent_id,
            status = %result.status,
            record_id = %record_id,
            findings = result.findings.len(),
            "Stored reflection"
        );

        let mut payload = to_payload(&result)?;
        payload.insert("record_id".into(), record_id.to_string().into());
        Ok(payload)
    }

    fn name(&self) -> &str {
        "reflection"
    }
}
