use uuid::Uuid;

use crate::dto::student_dto::SubmitTestRequest;
use crate::models::question::Question;
use crate::quiz::answer_store::AnswerStore;
use crate::quiz::timer::{QuestionTimer, TimerEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    /// Question `i` is on screen and its timer is counting.
    Presenting(usize),
    /// Terminal. Reached by manual submit on the last question or by its
    /// timer expiring; the network outcome of the submission does not undo it.
    Submitted,
}

#[derive(Debug, PartialEq)]
pub enum RunnerEvent {
    /// Advisory: the current question has under ten seconds left.
    LowTime,
    /// The machine moved to the next question.
    Advanced { next_index: usize },
    /// The attempt finished and this payload is ready to send.
    Completed(SubmitTestRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    /// The hard gate: a question cannot be left voluntarily unanswered.
    #[error("select an option before proceeding")]
    AnswerRequired,
    #[error("the attempt has already been submitted")]
    AlreadySubmitted,
    /// Manual advance past the last question; submission is the only exit.
    #[error("no further question to advance to")]
    NoNextQuestion,
    #[error("submission is only possible from the last question")]
    NotOnLastQuestion,
}

/// Sequences one student's pass through a test: binds the countdown to the
/// answer sheet, enforces the answer-before-advance gate, forces advancement
/// on expiry and assembles the wire payload at the end.
///
/// The caller drives it with user actions (`select_option`, `advance`,
/// `submit`) and a one-second `tick`. Each transition that moves to a new
/// question restarts the shared timer in the same step that leaves the old
/// one, so exactly one countdown is ever live.
#[derive(Debug)]
pub struct QuizRunner {
    student_ref: Uuid,
    test_id: Uuid,
    test_name: String,
    questions: Vec<Question>,
    state: QuizState,
    timer: QuestionTimer,
    store: AnswerStore,
}

impl QuizRunner {
    /// Begins the attempt at the first question. Empty tests are not
    /// presentable and yield no runner.
    pub fn new(
        student_ref: Uuid,
        test_id: Uuid,
        test_name: impl Into<String>,
        questions: Vec<Question>,
    ) -> Option<Self> {
        if questions.is_empty() {
            return None;
        }
        let mut timer = QuestionTimer::new();
        timer.restart(questions[0].time_limit_seconds());
        Some(Self {
            student_ref,
            test_id,
            test_name: test_name.into(),
            store: AnswerStore::new(questions.len()),
            questions,
            state: QuizState::Presenting(0),
            timer,
        })
    }

    pub fn state(&self) -> QuizState {
        self.state
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            QuizState::Presenting(i) => self.questions.get(i),
            QuizState::Submitted => None,
        }
    }

    pub fn remaining_secs(&self) -> u32 {
        self.timer.remaining_secs()
    }

    pub fn is_answered(&self, index: usize) -> bool {
        self.store.is_answered(index)
    }

    /// The navigation-away advisory: progress exists that a reload would lose.
    pub fn has_unsaved_progress(&self) -> bool {
        self.state != QuizState::Submitted && self.store.has_any_selection()
    }

    /// Records (or changes) the selection for the question on screen. No
    /// state transition; the student may still reconsider until advancing.
    pub fn select_option(&mut self, option: &str) -> Result<(), QuizError> {
        match self.state {
            QuizState::Presenting(i) => {
                self.store.record_answer(i, option);
                Ok(())
            }
            QuizState::Submitted => Err(QuizError::AlreadySubmitted),
        }
    }

    /// Manual "Next". Rejected while the current question is unanswered, and
    /// on the last question, where submit is the only way out.
    pub fn advance(&mut self) -> Result<usize, QuizError> {
        let i = match self.state {
            QuizState::Presenting(i) => i,
            QuizState::Submitted => return Err(QuizError::AlreadySubmitted),
        };
        if i + 1 >= self.questions.len() {
            return Err(QuizError::NoNextQuestion);
        }
        if !self.store.is_answered(i) {
            return Err(QuizError::AnswerRequired);
        }
        let elapsed = self.elapsed_secs(i);
        self.store.record_time_spent(i, elapsed);
        self.enter(i + 1);
        Ok(i + 1)
    }

    /// Manual "Submit", valid only on the last question.
    pub fn submit(&mut self) -> Result<SubmitTestRequest, QuizError> {
        let i = match self.state {
            QuizState::Presenting(i) => i,
            QuizState::Submitted => return Err(QuizError::AlreadySubmitted),
        };
        if i + 1 != self.questions.len() {
            return Err(QuizError::NotOnLastQuestion);
        }
        let elapsed = self.elapsed_secs(i);
        self.store.record_time_spent(i, elapsed);
        self.timer.stop();
        self.state = QuizState::Submitted;
        Ok(self.build_payload())
    }

    /// One cooperative second. Expiry forces advancement regardless of the
    /// answered gate: the stored (possibly empty) selection stands, the full
    /// allotment is charged, and on the last question the attempt submits
    /// itself with whatever was recorded.
    pub fn tick(&mut self) -> Option<RunnerEvent> {
        let i = match self.state {
            QuizState::Presenting(i) => i,
            QuizState::Submitted => return None,
        };
        match self.timer.tick()? {
            TimerEvent::LowTime => Some(RunnerEvent::LowTime),
            TimerEvent::Expired => {
                self.store.record_forced(i);
                self.store
                    .record_time_spent(i, self.questions[i].time_limit_seconds());
                if i + 1 < self.questions.len() {
                    self.enter(i + 1);
                    Some(RunnerEvent::Advanced { next_index: i + 1 })
                } else {
                    self.state = QuizState::Submitted;
                    Some(RunnerEvent::Completed(self.build_payload()))
                }
            }
        }
    }

    /// Leaving the old question and arming the next countdown is one step.
    fn enter(&mut self, index: usize) {
        self.state = QuizState::Presenting(index);
        self.timer.restart(self.questions[index].time_limit_seconds());
    }

    fn elapsed_secs(&self, index: usize) -> u32 {
        self.questions[index]
            .time_limit_seconds()
            .saturating_sub(self.timer.remaining_secs())
    }

    fn build_payload(&self) -> SubmitTestRequest {
        SubmitTestRequest {
            id: self.student_ref,
            test_id: self.test_id,
            test_name: self.test_name.clone(),
            answers: self.store.to_submission_list(&self.questions),
            total_time_taken: self.store.total_time_secs() as f64 / 60.0,
            idempotency_key: Some(Uuid::new_v4()),
        }
    }
}
