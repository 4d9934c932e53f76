//! Collaborator trait definitions for the session core.
//!
//! The hosting application supplies question banks, receives submissions,
//! and provides wall-clock time through these seams. The core makes no
//! assumption about a collaborator's latency or failure modes and never
//! retries on its behalf.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::model::{QuestionBank, Submission};

// ---------------------------------------------------------------------------
// Question bank supplier
// ---------------------------------------------------------------------------

/// Supplies a question bank, possibly asynchronously (a loading indicator
/// while this resolves is the hosting page's concern).
#[async_trait]
pub trait BankSource: Send + Sync {
    async fn load(&self) -> anyhow::Result<QuestionBank>;
}

/// A bank source over an already-built bank, for hosts that assemble
/// questions in memory.
pub struct InMemoryBankSource {
    bank: QuestionBank,
}

impl InMemoryBankSource {
    pub fn new(bank: QuestionBank) -> Self {
        Self { bank }
    }
}

#[async_trait]
impl BankSource for InMemoryBankSource {
    async fn load(&self) -> anyhow::Result<QuestionBank> {
        Ok(self.bank.clone())
    }
}

// ---------------------------------------------------------------------------
// Submission sink
// ---------------------------------------------------------------------------

/// Receives the submission record produced by a session, exactly once.
///
/// Persistence, network transmission, grading pipelines, and retry logic all
/// live behind this trait.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn deliver(&self, submission: &Submission) -> anyhow::Result<()>;
}

/// Discards submissions. Useful for hosts that only consume the value
/// returned by `submit`.
pub struct NoopSink;

#[async_trait]
impl SubmissionSink for NoopSink {
    async fn deliver(&self, _submission: &Submission) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Records every delivered submission in memory, for tests.
#[derive(Default)]
pub struct MemorySink {
    delivered: Mutex<Vec<Submission>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of submissions delivered so far.
    pub fn count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }

    /// Copies of every delivered submission, in delivery order.
    pub fn delivered(&self) -> Vec<Submission> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmissionSink for MemorySink {
    async fn deliver(&self, submission: &Submission) -> anyhow::Result<()> {
        self.delivered.lock().unwrap().push(submission.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Clock source
// ---------------------------------------------------------------------------

/// Wall-clock source for `started_at`/`completed_at` timestamps. Assumed
/// monotonic enough for second-granularity countdowns.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The production clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
