//! End-to-end walk of the client engine and the scoring engine, no server
//! required: a runner drives a two-question paper, the payload it produces is
//! graded, and the wire shapes are checked against what the API expects.

use testbook_backend::models::question::Question;
use testbook_backend::quiz::runner::{QuizRunner, QuizState, RunnerEvent};
use testbook_backend::services::scoring::ScoringEngine;
use uuid::Uuid;

fn sample_paper() -> Vec<Question> {
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

#[test]
fn answered_attempt_is_graded_one_of_two() {
    let mut quiz = QuizRunner::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        "Sample Paper",
        sample_paper(),
    )
    .unwrap();

    quiz.select_option("4").unwrap();
    quiz.advance().unwrap();
    quiz.select_option("Lyon").unwrap();
    let payload = quiz.submit().unwrap();

    let (score, breakdown) = ScoringEngine::score(&sample_paper(), &payload.answers);
    assert_eq!(score, 1);
    assert_eq!(breakdown.len(), 2);
    assert!(breakdown[0].correct);
    assert!(!breakdown[1].correct);
    assert_eq!(breakdown[1].correct_answer.as_deref(), Some("Paris"));
}

#[test]
fn walked_away_attempt_submits_itself_and_scores_zero() {
    let mut quiz = QuizRunner::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        "Sample Paper",
        sample_paper(),
    )
    .unwrap();

    // The student never touches anything; both timers run out.
    let mut payload = None;
    for _ in 0..120 {
        if let Some(RunnerEvent::Completed(p)) = quiz.tick() {
            payload = Some(p);
        }
    }
    let payload = payload.expect("second expiry forces submission");
    assert_eq!(quiz.state(), QuizState::Submitted);
    assert_eq!(payload.answers.len(), 2);
    assert!(payload.answers.iter().all(|a| a.given_answer.is_empty()));
    // Both questions are charged their full one-minute allotment.
    assert!((payload.total_time_taken - 2.0).abs() < 1e-9);

    let (score, breakdown) = ScoringEngine::score(&sample_paper(), &payload.answers);
    assert_eq!(score, 0);
    assert_eq!(breakdown.len(), payload.answers.len());
    assert!(breakdown.iter().all(|g| !g.correct));
}

#[test]
fn score_stays_within_bounds_for_any_selection_pattern() {
    for options in [["4", "Paris"], ["3", "Paris"], ["4", "Tours"], ["6", "Nice"]] {
        let mut quiz = QuizRunner::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Sample Paper",
            sample_paper(),
        )
        .unwrap();
        quiz.select_option(options[0]).unwrap();
        quiz.advance().unwrap();
        quiz.select_option(options[1]).unwrap();
        let payload = quiz.submit().unwrap();
        let (score, _) = ScoringEngine::score(&sample_paper(), &payload.answers);
        assert!((0..=2).contains(&score));
    }
}

#[test]
fn payload_serializes_with_the_wire_field_names() {
    let mut quiz = QuizRunner::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        "Sample Paper",
        sample_paper(),
    )
    .unwrap();
    quiz.select_option("4").unwrap();
    quiz.advance().unwrap();
    quiz.select_option("Paris").unwrap();
    let payload = quiz.submit().unwrap();

    let wire = serde_json::to_value(&payload).unwrap();
    assert!(wire.get("testId").is_some());
    assert!(wire.get("testName").is_some());
    assert!(wire.get("totalTimeTaken").is_some());
    let first = &wire["answers"][0];
    assert!(first.get("questionId").is_some());
    assert!(first.get("questionText").is_some());
    assert!(first.get("givenAnswer").is_some());
    assert!(first.get("timeTaken").is_some());
}

#[test]
fn grading_a_payload_twice_gives_identical_results() {
    let mut quiz = QuizRunner::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        "Sample Paper",
        sample_paper(),
    )
    .unwrap();
    quiz.select_option("4").unwrap();
    quiz.advance().unwrap();
    quiz.select_option("Nice").unwrap();
    let payload = quiz.submit().unwrap();

    let first = ScoringEngine::score(&sample_paper(), &payload.answers);
    let second = ScoringEngine::score(&sample_paper(), &payload.answers);
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
}
