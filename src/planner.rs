//! Question planner
//!
//! Wires the pieces together for one question: load the manifest, open the
//! dataset views, parse the question, dispatch to the matching executor and
//! record the result for the debug endpoint. Source data is only read.

use crate::answer::AnswerPayload;
use crate::config::PlannerConfig;
use crate::datasets::DatasetCatalog;
use crate::error::Result;
use crate::executors::{dispatch, QueryContext};
use crate::intent::{matching_template, parse_question};
use crate::manifest::Manifest;
use crate::recorder::PlanRecorder;
use std::time::Instant;
use tracing::{error, info};

#[derive(Clone)]
pub struct Planner {
    config: PlannerConfig,
    recorder: PlanRecorder,
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config,
            recorder: PlanRecorder::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(PlannerConfig::from_env())
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn recorder(&self) -> &PlanRecorder {
        &self.recorder
    }

    /// Answer a question. Missing data yields an explanatory answer; only
    /// faults reading the manifest or the datasets come back as `Err`.
    pub fn answer(&self, question: &str) -> Result<AnswerPayload> {
        let start = Instant::now();
        let manifest = Manifest::load(&self.config.manifest_path)?;
        let catalog = DatasetCatalog::open(&self.config.clean_dir)?;

        let intent = parse_question(question);
        info!(
            "Question {:?} -> {} (template: {})",
            question,
            intent.kind(),
            matching_template(question).unwrap_or("none")
        );

        let ctx = QueryContext::new(&catalog, &manifest);
        let payload = dispatch(&intent, &ctx)?;
        info!(
            "Answered with {} table(s) in {}ms",
            payload.tables.len(),
            start.elapsed().as_millis()
        );

        self.recorder.record(question, intent, payload.clone());
        Ok(payload)
    }

    /// [`Self::answer`], with any fault turned into an `Error: ...` answer
    pub fn answer_or_degrade(&self, question: &str) -> AnswerPayload {
        match self.answer(question) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to answer {:?}: {}", question, e);
                AnswerPayload::error(e)
            }
        }
    }
}
