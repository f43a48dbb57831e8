use serde::{Deserialize, Serialize};

/// Every question carries exactly this many answer options.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// One multiple-choice question inside a test's `questions` JSONB column.
/// The `id` is stable for the lifetime of the test and is what submitted
/// answers are matched against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default)]
    pub id: i32,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    /// Per-question allotment in minutes.
    pub time_limit: i32,
}

impl Question {
    pub fn time_limit_seconds(&self) -> u32 {
        (self.time_limit.max(0) as u32) * 60
    }
}
