//! The assessment session state machine.
//!
//! `ExamSession` ties the question bank, answer store, and countdown timer
//! together and is the single entry/exit point for the hosting page. A
//! session is `InProgress` from construction until `submit` or timer expiry
//! flips it to `Submitted`, exactly once; `Submitted` is terminal.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use futures::FutureExt;
use uuid::Uuid;

use crate::answers::AnswerStore;
use crate::error::SessionError;
use crate::model::{AnswerValue, Question, QuestionBank, Submission};
use crate::timer::CountdownTimer;
use crate::traits::{Clock, SubmissionSink, SystemClock};

/// Whether a session enforces a time limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Untimed,
    Timed { limit_secs: u32 },
}

impl SessionMode {
    /// The mode a bank suggests for itself: `Timed` when it declares a
    /// positive time limit.
    pub fn for_bank(bank: &QuestionBank) -> Self {
        match bank.time_limit_secs {
            Some(limit_secs) if limit_secs > 0 => SessionMode::Timed { limit_secs },
            _ => SessionMode::Untimed,
        }
    }
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    InProgress,
    Submitted,
}

/// Mutable session state, shared between the controller and the timer's
/// expiry callback. The callback reads it only through this handle, at the
/// instant of expiry.
struct SessionState {
    bank: Arc<QuestionBank>,
    answers: AnswerStore,
    cursor: usize,
    status: SessionStatus,
    submission: Option<Submission>,
}

impl SessionState {
    /// The one place the `InProgress -> Submitted` transition happens.
    /// First caller wins; everyone else gets `InvalidState` and the prior
    /// submission stays untouched.
    fn finalize(
        &mut self,
        session_id: Uuid,
        completed_at: DateTime<Utc>,
        elapsed_secs: u64,
        forced: bool,
        operation: &'static str,
    ) -> Result<Submission, SessionError> {
        if self.status != SessionStatus::InProgress {
            return Err(SessionError::InvalidState { operation });
        }
        let submission = Submission {
            session_id,
            bank_id: self.bank.id.clone(),
            answers: self.answers.snapshot(),
            completed_at,
            elapsed_secs,
            forced,
        };
        self.status = SessionStatus::Submitted;
        self.submission = Some(submission.clone());
        Ok(submission)
    }
}

/// A running assessment session.
pub struct ExamSession {
    session_id: Uuid,
    mode: SessionMode,
    started_at: DateTime<Utc>,
    state: Arc<Mutex<SessionState>>,
    timer: CountdownTimer,
    sink: Arc<dyn SubmissionSink>,
    clock: Arc<dyn Clock>,
}

impl ExamSession {
    /// Start a session over `bank` with the system clock.
    ///
    /// Fails with `EmptyQuestionBank` when the bank holds no questions.
    /// The hosting page must treat that as an external data error, not as a
    /// valid zero-question session.
    pub fn new(
        bank: QuestionBank,
        mode: SessionMode,
        sink: Arc<dyn SubmissionSink>,
    ) -> Result<Self, SessionError> {
        Self::with_clock(bank, mode, sink, Arc::new(SystemClock))
    }

    /// Start a session with an explicit clock source.
    pub fn with_clock(
        bank: QuestionBank,
        mode: SessionMode,
        sink: Arc<dyn SubmissionSink>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SessionError> {
        bank.validate()?;
        if bank.is_empty() {
            return Err(SessionError::EmptyQuestionBank {
                bank_id: bank.id.clone(),
            });
        }

        let session_id = Uuid::new_v4();
        let started_at = clock.now();
        let state = Arc::new(Mutex::new(SessionState {
            bank: Arc::new(bank),
            answers: AnswerStore::new(),
            cursor: 0,
            status: SessionStatus::InProgress,
            submission: None,
        }));

        let mut timer = CountdownTimer::new();
        if let SessionMode::Timed { limit_secs } = mode {
            let state_handle = Arc::clone(&state);
            let sink_handle = Arc::clone(&sink);
            let clock_handle = Arc::clone(&clock);
            timer.start(limit_secs, move || {
                async move {
                    let outcome = {
                        let mut state = state_handle.lock().unwrap();
                        state.finalize(
                            session_id,
                            clock_handle.now(),
                            u64::from(limit_secs),
                            true,
                            "forced submit",
                        )
                    };
                    match outcome {
                        Ok(submission) => {
                            tracing::debug!(%session_id, "countdown expired, session force-submitted");
                            if let Err(e) = sink_handle.deliver(&submission).await {
                                tracing::error!(
                                    %session_id,
                                    "submission delivery failed: {e:#}"
                                );
                            }
                        }
                        // Lost the race against a manual submit; swallow.
                        Err(_) => {
                            tracing::debug!(%session_id, "countdown expired after submit, ignoring");
                        }
                    }
                }
                .boxed()
            });
        }

        tracing::debug!(%session_id, ?mode, "session started");
        Ok(Self {
            session_id,
            mode,
            started_at,
            state,
            timer,
            sink,
            clock,
        })
    }

    /// Produce the submission record and hand it to the sink.
    ///
    /// At most one call succeeds per session; later calls (including a call
    /// that lost the race against timer expiry) fail with `InvalidState`
    /// and leave the prior submission unchanged. Sink failure is logged,
    /// never retried, and does not undo the terminal transition.
    pub async fn submit(&mut self) -> Result<Submission, SessionError> {
        let now = self.clock.now();
        let elapsed_secs = match self.mode {
            SessionMode::Timed { limit_secs } => {
                let remaining = self.timer.remaining_secs().unwrap_or(0);
                u64::from(limit_secs.saturating_sub(remaining))
            }
            SessionMode::Untimed => (now - self.started_at).num_seconds().max(0) as u64,
        };
        // Stop the countdown before finalizing so expiry cannot fire
        // against a session that is mid-submit.
        self.timer.stop();

        let submission = {
            let mut state = self.state.lock().unwrap();
            state.finalize(self.session_id, now, elapsed_secs, false, "submit")?
        };
        tracing::debug!(session_id = %self.session_id, elapsed_secs, "session submitted");

        if let Err(e) = self.sink.deliver(&submission).await {
            tracing::error!(session_id = %self.session_id, "submission delivery failed: {e:#}");
        }
        Ok(submission)
    }

    /// Record or overwrite an answer. The store is permissive about value
    /// shape; scoring decides what counts.
    pub fn record_answer(
        &self,
        question_id: impl Into<String>,
        value: AnswerValue,
    ) -> Result<(), SessionError> {
        let mut state = self.state.lock().unwrap();
        if state.status != SessionStatus::InProgress {
            return Err(SessionError::InvalidState {
                operation: "record_answer",
            });
        }
        state.answers.set(question_id, value);
        Ok(())
    }

    /// Advance the cursor. A no-op at the last question: the cursor does
    /// not wrap and does not error.
    pub fn go_next(&self) -> Result<usize, SessionError> {
        self.navigate("go_next", |cursor, len| {
            if cursor + 1 < len {
                cursor + 1
            } else {
                cursor
            }
        })
    }

    /// Step the cursor back. A no-op at the first question.
    pub fn go_previous(&self) -> Result<usize, SessionError> {
        self.navigate("go_previous", |cursor, _| cursor.saturating_sub(1))
    }

    /// Jump to a question. Out-of-range indices leave the cursor unchanged;
    /// navigation is wired to UI clicks that must be robust to stale
    /// indices.
    pub fn go_to(&self, index: usize) -> Result<usize, SessionError> {
        self.navigate("go_to", move |cursor, len| {
            if index < len {
                index
            } else {
                cursor
            }
        })
    }

    fn navigate(
        &self,
        operation: &'static str,
        next: impl FnOnce(usize, usize) -> usize,
    ) -> Result<usize, SessionError> {
        let mut state = self.state.lock().unwrap();
        if state.status != SessionStatus::InProgress {
            return Err(SessionError::InvalidState { operation });
        }
        let len = state.bank.len();
        state.cursor = next(state.cursor, len);
        Ok(state.cursor)
    }

    pub fn id(&self) -> Uuid {
        self.session_id
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn status(&self) -> SessionStatus {
        self.state.lock().unwrap().status
    }

    pub fn cursor(&self) -> usize {
        self.state.lock().unwrap().cursor
    }

    /// The question under the cursor.
    pub fn current_question(&self) -> Question {
        let state = self.state.lock().unwrap();
        state.bank.questions[state.cursor].clone()
    }

    pub fn question_count(&self) -> usize {
        self.state.lock().unwrap().bank.len()
    }

    pub fn answered_count(&self) -> usize {
        self.state.lock().unwrap().answers.len()
    }

    pub fn answer(&self, question_id: &str) -> Option<AnswerValue> {
        self.state.lock().unwrap().answers.get(question_id).cloned()
    }

    pub fn is_answered(&self, question_id: &str) -> bool {
        self.state.lock().unwrap().answers.is_answered(question_id)
    }

    /// Seconds left on the countdown; `None` on an untimed session.
    pub fn remaining_secs(&self) -> Option<u32> {
        match self.mode {
            SessionMode::Timed { .. } => self.timer.remaining_secs(),
            SessionMode::Untimed => None,
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// The already-produced submission, if the session has ended.
    pub fn submission(&self) -> Option<Submission> {
        self.state.lock().unwrap().submission.clone()
    }

    /// The bank this session runs against.
    pub fn bank(&self) -> Arc<QuestionBank> {
        Arc::clone(&self.state.lock().unwrap().bank)
    }
}
