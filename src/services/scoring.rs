use crate::dto::student_dto::SubmittedAnswer;
use crate::models::question::Question;
use crate::models::submission::GradedAnswer;

pub struct ScoringEngine;

impl ScoringEngine {
    /// Grades a submission against a test definition. Pure and deterministic:
    /// no clock, no randomness, no I/O.
    ///
    /// Each submitted entry is matched to a question by its stable id. An
    /// entry matching nothing is scored incorrect with no correct-answer
    /// reference rather than raising an error. The breakdown preserves the
    /// submitted order, and the score is the count of correct entries, so
    /// `0 <= score <= answers.len()`.
    pub fn score(questions: &[Question], answers: &[SubmittedAnswer]) -> (i32, Vec<GradedAnswer>) {
        let mut score = 0;
        let graded = answers
            .iter()
            .map(|entry| {
                let matched = questions.iter().find(|q| q.id == entry.question_id);
                let correct = matched
                    .map(|q| q.correct_answer == entry.given_answer)
                    .unwrap_or(false);
                if correct {
                    score += 1;
                }
                GradedAnswer {
                    question_id: entry.question_id,
                    question_text: entry.question_text.clone(),
                    given_answer: entry.given_answer.clone(),
                    correct_answer: matched.map(|q| q.correct_answer.clone()),
                    correct,
                }
            })
            .collect();
        (score, graded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper() -> Vec<Question> {
        vec![
            Question {
                id: 1,
                question_text: "2+2=?".into(),
                options: vec!["3".into(), "4".into(), "5".into(), "6".into()],
                correct_answer: "4".into(),
                time_limit: 1,
            },
            Question {
                id: 2,
                question_text: "Capital of France?".into(),
                options: vec!["Paris".into(), "Lyon".into(), "Nice".into(), "Tours".into()],
                correct_answer: "Paris".into(),
                time_limit: 1,
            },
        ]
    }

    fn entry(question_id: i32, text: &str, given: &str) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id,
            question_text: text.into(),
            given_answer: given.into(),
            time_taken: 0.5,
        }
    }

    #[test]
    fn mixed_submission_scores_one_of_two() {
        let answers = vec![
            entry(1, "2+2=?", "4"),
            entry(2, "Capital of France?", "Lyon"),
        ];
        let (score, breakdown) = ScoringEngine::score(&paper(), &answers);
        assert_eq!(score, 1);
        assert_eq!(breakdown.len(), 2);
        assert!(breakdown[0].correct);
        assert_eq!(breakdown[0].correct_answer.as_deref(), Some("4"));
        assert!(!breakdown[1].correct);
        assert_eq!(breakdown[1].correct_answer.as_deref(), Some("Paris"));
    }

    #[test]
    fn unmatched_question_id_is_incorrect_with_no_reference() {
        let answers = vec![entry(99, "Phantom question", "anything")];
        let (score, breakdown) = ScoringEngine::score(&paper(), &answers);
        assert_eq!(score, 0);
        assert!(!breakdown[0].correct);
        assert_eq!(breakdown[0].correct_answer, None);
    }

    #[test]
    fn empty_answers_count_as_incorrect() {
        let answers = vec![entry(1, "2+2=?", ""), entry(2, "Capital of France?", "")];
        let (score, breakdown) = ScoringEngine::score(&paper(), &answers);
        assert_eq!(score, 0);
        assert_eq!(breakdown.len(), 2);
    }

    #[test]
    fn matching_is_case_sensitive_exact_equality() {
        let answers = vec![entry(2, "Capital of France?", "paris")];
        let (score, _) = ScoringEngine::score(&paper(), &answers);
        assert_eq!(score, 0);
    }

    #[test]
    fn score_never_exceeds_entry_count() {
        let answers = vec![
            entry(1, "2+2=?", "4"),
            entry(2, "Capital of France?", "Paris"),
        ];
        let (score, breakdown) = ScoringEngine::score(&paper(), &answers);
        assert_eq!(score, 2);
        assert!(score as usize <= breakdown.len());
    }

    #[test]
    fn scoring_is_deterministic() {
        let answers = vec![
            entry(1, "2+2=?", "4"),
            entry(2, "Capital of France?", "Nice"),
        ];
        let first = ScoringEngine::score(&paper(), &answers);
        let second = ScoringEngine::score(&paper(), &answers);
        assert_eq!(first.0, second.0);
        assert_eq!(first.1, second.1);
    }

    #[test]
    fn breakdown_preserves_submitted_order() {
        let answers = vec![
            entry(2, "Capital of France?", "Paris"),
            entry(1, "2+2=?", "6"),
        ];
        let (score, breakdown) = ScoringEngine::score(&paper(), &answers);
        assert_eq!(score, 1);
        assert_eq!(breakdown[0].question_id, 2);
        assert_eq!(breakdown[1].question_id, 1);
    }
}
