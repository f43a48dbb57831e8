use crate::models::question::{Question, OPTIONS_PER_QUESTION};
use serde_json::Value as JsonValue;

/// Result of turning a sheet of extracted rows into questions. Malformed rows
/// are skipped, not fatal, so one bad line never sinks a whole upload.
#[derive(Debug)]
pub struct ImportOutcome {
    pub questions: Vec<Question>,
    /// Sum of per-question allotments, in minutes.
    pub total_time_limit: i32,
    pub skipped_rows: usize,
}

pub struct ImportService;

impl ImportService {
    /// Builds the question list from pre-extracted spreadsheet rows (JSON
    /// objects keyed by the sheet's column headers). Question ids are
    /// assigned sequentially over the rows that survive validation.
    pub fn build_questions(rows: &[JsonValue]) -> ImportOutcome {
        let mut questions: Vec<Question> = Vec::new();
        let mut total_time_limit = 0;
        let mut skipped_rows = 0;

        for (idx, row) in rows.iter().enumerate() {
            match parse_row(row) {
                Ok(mut question) => {
                    question.id = questions.len() as i32 + 1;
                    total_time_limit += question.time_limit;
                    questions.push(question);
                }
                Err(reason) => {
                    tracing::warn!(row = idx + 1, reason = %reason, "Skipping malformed import row");
                    skipped_rows += 1;
                }
            }
        }

        ImportOutcome {
            questions,
            total_time_limit,
            skipped_rows,
        }
    }
}

fn parse_row(row: &JsonValue) -> std::result::Result<Question, String> {
    let question_text = required_field(row, "QuestionText")?;
    let mut options = Vec::with_capacity(OPTIONS_PER_QUESTION);
    for n in 1..=OPTIONS_PER_QUESTION {
        options.push(required_field(row, &format!("Option{}", n))?);
    }
    let correct_answer = required_field(row, "CorrectAnswer")?;
    let raw_limit = required_field(row, "TimeLimit")?;
    let time_limit: i32 = raw_limit
        .parse()
        .map_err(|_| format!("Invalid TimeLimit: {}", raw_limit))?;
    if time_limit <= 0 {
        return Err(format!("Invalid TimeLimit: {}", raw_limit));
    }

    Ok(Question {
        id: 0,
        question_text,
        options,
        correct_answer,
        time_limit,
    })
}

fn required_field(row: &JsonValue, name: &str) -> std::result::Result<String, String> {
    let value = match row.get(name) {
        Some(JsonValue::String(s)) => s.trim().to_string(),
        Some(JsonValue::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    if value.is_empty() {
        return Err(format!("Missing required field: {}", name));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(text: &str, limit: JsonValue) -> JsonValue {
        json!({
            "QuestionText": text,
            "Option1": "a",
            "Option2": "b",
            "Option3": "c",
            "Option4": "d",
            "CorrectAnswer": "a",
            "TimeLimit": limit,
        })
    }

    #[test]
    fn valid_rows_become_sequential_questions() {
        let rows = vec![row("q1", json!(1)), row("q2", json!("2"))];
        let outcome = ImportService::build_questions(&rows);
        assert_eq!(outcome.questions.len(), 2);
        assert_eq!(outcome.skipped_rows, 0);
        assert_eq!(outcome.questions[0].id, 1);
        assert_eq!(outcome.questions[1].id, 2);
        assert_eq!(outcome.total_time_limit, 3);
    }

    #[test]
    fn rows_with_missing_columns_are_skipped() {
        let mut bad = row("q2", json!(2));
        bad.as_object_mut().unwrap().remove("Option3");
        let rows = vec![row("q1", json!(1)), bad, row("q3", json!(4))];
        let outcome = ImportService::build_questions(&rows);
        assert_eq!(outcome.questions.len(), 2);
        assert_eq!(outcome.skipped_rows, 1);
        // Surviving questions stay densely numbered.
        assert_eq!(outcome.questions[1].id, 2);
        assert_eq!(outcome.total_time_limit, 5);
    }

    #[test]
    fn unparseable_or_nonpositive_time_limits_are_rejected() {
        let rows = vec![
            row("q1", json!("soon")),
            row("q2", json!(0)),
            row("q3", json!(-5)),
        ];
        let outcome = ImportService::build_questions(&rows);
        assert!(outcome.questions.is_empty());
        assert_eq!(outcome.skipped_rows, 3);
    }

    #[test]
    fn empty_sheet_yields_empty_outcome() {
        let outcome = ImportService::build_questions(&[]);
        assert!(outcome.questions.is_empty());
        assert_eq!(outcome.total_time_limit, 0);
    }
}
