//! Plan Recorder
//!
//! Holds the most recent successfully answered question for the debug
//! endpoint. Starts empty, is overwritten after each successful answer and
//! is only read by the debug path.

use crate::answer::AnswerPayload;
use crate::intent::QuestionIntent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

pub const NO_PLAN_NOTE: &str = "No plan recorded yet.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSnapshot {
    pub id: Uuid,
    pub question: String,
    pub intent: QuestionIntent,
    pub answer: AnswerPayload,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct PlanRecorder {
    latest: Arc<RwLock<Option<PlanSnapshot>>>,
}

impl PlanRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, question: &str, intent: QuestionIntent, answer: AnswerPayload) {
        let snapshot = PlanSnapshot {
            id: Uuid::new_v4(),
            question: question.to_string(),
            intent,
            answer,
            recorded_at: Utc::now(),
        };
        if let Ok(mut latest) = self.latest.write() {
            *latest = Some(snapshot);
        }
    }

    pub fn latest(&self) -> Option<PlanSnapshot> {
        if let Ok(latest) = self.latest.read() {
            latest.clone()
        } else {
            None
        }
    }

    /// JSON for the debug endpoint: the latest snapshot or a placeholder note
    pub fn debug_view(&self) -> Value {
        match self.latest() {
            Some(snapshot) => serde_json::to_value(snapshot).unwrap_or_else(|e| json!({ "error": e.to_string() })),
            None => json!({ "note": NO_PLAN_NOTE }),
        }
    }
}
