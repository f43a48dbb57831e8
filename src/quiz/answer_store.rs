use crate::dto::student_dto::SubmittedAnswer;
use crate::models::question::Question;

#[derive(Debug, Clone, Default)]
struct Slot {
    selection: Option<String>,
    /// Set only by an active student choice. A timeout-forced empty entry
    /// stores a value without ever marking the slot answered.
    answered: bool,
    time_spent_secs: u32,
}

/// The in-progress answer sheet for one attempt. Holds one slot per question
/// index; discarded wholesale if the student never submits.
#[derive(Debug, Default)]
pub struct AnswerStore {
    slots: Vec<Slot>,
}

impl AnswerStore {
    pub fn new(question_count: usize) -> Self {
        Self {
            slots: vec![Slot::default(); question_count],
        }
    }

    /// Stores or overwrites the student's selection and marks the index as
    /// actively answered.
    pub fn record_answer(&mut self, index: usize, option: &str) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.selection = Some(option.to_string());
            slot.answered = true;
        }
    }

    /// Ensures a stored value exists for a timed-out question without
    /// touching the answered flag.
    pub fn record_forced(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.selection.get_or_insert_with(String::new);
        }
    }

    pub fn record_time_spent(&mut self, index: usize, seconds: u32) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.time_spent_secs = seconds;
        }
    }

    /// True iff the student actively selected an option for this index.
    pub fn is_answered(&self, index: usize) -> bool {
        self.slots.get(index).map(|s| s.answered).unwrap_or(false)
    }

    pub fn selection(&self, index: usize) -> Option<&str> {
        self.slots
            .get(index)
            .and_then(|s| s.selection.as_deref())
    }

    pub fn time_spent_secs(&self, index: usize) -> u32 {
        self.slots
            .get(index)
            .map(|s| s.time_spent_secs)
            .unwrap_or(0)
    }

    pub fn total_time_secs(&self) -> u32 {
        self.slots.iter().map(|s| s.time_spent_secs).sum()
    }

    /// True once anything has been selected; drives the navigation-away
    /// warning.
    pub fn has_any_selection(&self) -> bool {
        self.slots.iter().any(|s| s.selection.is_some())
    }

    /// Projects the sheet into the ordered wire-format list, substituting the
    /// empty string for every question the student never actively answered.
    pub fn to_submission_list(&self, questions: &[Question]) -> Vec<SubmittedAnswer> {
        questions
            .iter()
            .enumerate()
            .map(|(i, q)| SubmittedAnswer {
                question_id: q.id,
                question_text: q.question_text.clone(),
                given_answer: self
                    .slots
                    .get(i)
                    .and_then(|s| s.selection.clone())
                    .unwrap_or_default(),
                time_taken: self.time_spent_secs(i) as f64 / 60.0,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions() -> Vec<Question> {
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
    fn active_answers_can_be_changed_before_advancing() {
        let mut store = AnswerStore::new(2);
        store.record_answer(0, "3");
        store.record_answer(0, "4");
        assert_eq!(store.selection(0), Some("4"));
        assert!(store.is_answered(0));
    }

    #[test]
    fn forced_entries_store_a_value_but_stay_unanswered() {
        let mut store = AnswerStore::new(2);
        store.record_forced(0);
        assert_eq!(store.selection(0), Some(""));
        assert!(!store.is_answered(0));
    }

    #[test]
    fn forcing_does_not_clobber_an_existing_selection() {
        let mut store = AnswerStore::new(2);
        store.record_answer(1, "Lyon");
        store.record_forced(1);
        assert_eq!(store.selection(1), Some("Lyon"));
    }

    #[test]
    fn projection_substitutes_empty_for_skipped_questions() {
        let mut store = AnswerStore::new(2);
        store.record_answer(0, "4");
        store.record_time_spent(0, 30);
        let list = store.to_submission_list(&questions());
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].given_answer, "4");
        assert!((list[0].time_taken - 0.5).abs() < f64::EPSILON);
        assert_eq!(list[1].given_answer, "");
        assert_eq!(list[1].question_id, 2);
    }

    #[test]
    fn total_time_sums_per_question_times() {
        let mut store = AnswerStore::new(2);
        store.record_time_spent(0, 42);
        store.record_time_spent(1, 18);
        assert_eq!(store.total_time_secs(), 60);
    }
}
