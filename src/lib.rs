pub mod answer;
pub mod citations;
pub mod config;
pub mod crops;
pub mod datasets;
pub mod error;
pub mod executors;
pub mod frame;
pub mod intent;
pub mod manifest;
pub mod normalize;
pub mod planner;
pub mod recorder;

pub use answer::{AnswerPayload, AnswerTable, Citation};
pub use config::PlannerConfig;
pub use error::{PlannerError, Result};
pub use intent::{parse_question, ExtremeMode, QuestionIntent};
pub use planner::Planner;
