use aethero_core::{Payload, TaskFailure};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{to_payload, type_name};
use crate::processor::TaskProcessor;

const HIGH_COGNITIVE_LOAD: f64 = 0.7;
const LOW_CERTAINTY: f64 = 0.4;

/// One memory record of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryEntry {
    pub statement: String,
    pub mental_state: String,
    pub certainty_level: f64,
    pub cognitive_load: f64,
}

impl Default for MemoryEntry {
    fn default() -> Self {
        Self {
            statement: String::new(),
            mental_state: "neutral".to_string(),
            certainty_level: 0.5,
            cognitive_load: 0.5,
        }
    }
}

/// Diagnostics produced for one [`MemoryEntry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryDiagnostic {
    pub highlighted: String,
    pub diagnostic: String,
    pub proposed_tags: Vec<String>,
    pub reflection_score: f64,
}

impl MemoryDiagnostic {
    pub fn analyze(entry: &MemoryEntry) -> Self {
        let mut notes = Vec::new();
        let mut proposed_tags = Vec::new();

        if entry.cognitive_load > HIGH_COGNITIVE_LOAD {
            notes.push("High cognitive load.");
            proposed_tags.push("uncertainty_cycle".to_string());
        }
        if entry.certainty_level < LOW_CERTAINTY {
            notes.push("Low certainty.");
            proposed_tags.push("residual_noise".to_string());
        }
        if entry.mental_state == "reflective" {
            notes.push("Reflective mental state.");
            proposed_tags.push("insight_node".to_string());
        }

        Self {
            highlighted: entry.statement.clone(),
            diagnostic: notes.join(" "),
            proposed_tags,
            reflection_score: round2(entry.cognitive_load * entry.certainty_level),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Diagnoses a `memory_batch` of [`MemoryEntry`] records.
///
/// Missing entry fields take their defaults; a batch that is not an array of
/// objects is a validation failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntrospectionProcessor;

impl IntrospectionProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(entries: &[MemoryEntry]) -> Vec<MemoryDiagnostic> {
        entries.iter().map(MemoryDiagnostic::analyze).collect()
    }

    fn entries(task: &Payload) -> Result<Vec<MemoryEntry>, TaskFailure> {
        let batch = match task.get("memory_batch") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(TaskFailure::validation(format!(
                    "field 'memory_batch' must be an array, got {}",
                    type_name(other)
                )));
            }
            None => return Err(TaskFailure::validation("missing field 'memory_batch'")),
        };

        batch
            .iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value(item.clone()).map_err(|e| {
                    TaskFailure::validation(format!("invalid memory entry {index}: {e}"))
                        .with_detail("index", index)
                })
            })
            .collect()
    }
}

#[async_trait]
impl TaskProcessor for IntrospectionProcessor {
    async fn process_task(&self, task: &Payload, _annotations: &Payload) -> Result<Payload, TaskFailure> {
        let entries = Self::entries(task)?;
        let results = Self::analyze(&entries);

        let flagged = results.iter().filter(|r| !r.proposed_tags.is_empty()).count();
        let mut payload = Payload::new();
        payload.insert("entries_analyzed".into(), results.len().into());
        payload.insert("entries_flagged".into(), flagged.into());
        payload.insert(
            "results".into(),
            Value::Array(
                results
                    .iter()
                    .map(|r| to_payload(r).map(Value::Object))
                    .collect::<Result<_, _>>()?,
            ),
        );
        Ok(payload)
    }

    fn name(&self) -> &str {
        "introspection"
    }
}
