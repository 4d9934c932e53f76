//! Core data model types for proctor.
//!
//! These are the fundamental types that the entire proctor system uses to
//! represent questions, question banks, answers, and submissions.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;

/// A single question presented to a test-taker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Opaque stable identifier, unique within a bank.
    pub id: String,
    /// Display text shown to the test-taker.
    pub prompt: String,
    /// Points awarded if answered correctly. Non-negative and finite.
    #[serde(default = "default_points")]
    pub points: f64,
    /// Kind-specific payload.
    #[serde(flatten)]
    pub kind: QuestionKind,
}

fn default_points() -> f64 {
    1.0
}

/// Kind-specific question payload.
///
/// Modeled as a tagged union so that choice-only fields cannot exist on a
/// free-text or attachment question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum QuestionKind {
    /// Multiple choice with exactly one correct option.
    Choice {
        /// Ordered option strings. At least 2 entries.
        choices: Vec<String>,
        /// Index into `choices` of the correct option.
        correct_index: usize,
    },
    /// Free-form text response.
    FreeText,
    /// An uploaded file, referenced opaquely.
    Attachment,
}

impl Question {
    /// Check the construction-time invariants for this question.
    pub fn validate(&self) -> Result<(), SessionError> {
        if !self.points.is_finite() || self.points < 0.0 {
            return Err(SessionError::InvalidQuestion {
                id: self.id.clone(),
                reason: format!("points must be non-negative and finite, got {}", self.points),
            });
        }
        if let QuestionKind::Choice {
            choices,
            correct_index,
        } = &self.kind
        {
            if choices.len() < 2 {
                return Err(SessionError::InvalidQuestion {
                    id: self.id.clone(),
                    reason: format!("choice question needs at least 2 options, got {}", choices.len()),
                });
            }
            if *correct_index >= choices.len() {
                return Err(SessionError::InvalidQuestion {
                    id: self.id.clone(),
                    reason: format!(
                        "correct_index {} out of range for {} options",
                        correct_index,
                        choices.len()
                    ),
                });
            }
        }
        Ok(())
    }

    /// The kind tag as it appears in bank files ("choice", "free-text", "attachment").
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            QuestionKind::Choice { .. } => "choice",
            QuestionKind::FreeText => "free-text",
            QuestionKind::Attachment => "attachment",
        }
    }
}

/// A test-taker's answer to one question.
///
/// Serialized with an explicit tag so a selected index of `0` is always an
/// explicit value, distinguishable from "unanswered".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum AnswerValue {
    /// Selected option index for a choice question.
    Choice(usize),
    /// Free-form text.
    Text(String),
    /// Opaque reference to an uploaded attachment.
    Attachment(String),
}

impl AnswerValue {
    /// Whether this answer carries no content.
    ///
    /// A selected index is never empty, even index 0.
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Choice(_) => false,
            AnswerValue::Text(text) => text.is_empty(),
            AnswerValue::Attachment(reference) => reference.is_empty(),
        }
    }
}

/// An ordered collection of questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBank {
    /// Unique identifier for this bank.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description of this bank.
    #[serde(default)]
    pub description: String,
    /// The questions, in presentation order.
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Suggested time limit for sessions over this bank, in seconds.
    #[serde(default)]
    pub time_limit_secs: Option<u32>,
}

impl QuestionBank {
    /// Build a bank, checking every question's invariants.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, SessionError> {
        let bank = Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            questions,
            time_limit_secs: None,
        };
        bank.validate()?;
        Ok(bank)
    }

    /// Set the suggested time limit.
    pub fn with_time_limit(mut self, limit_secs: u32) -> Self {
        self.time_limit_secs = Some(limit_secs);
        self
    }

    /// Check every question's construction-time invariants.
    pub fn validate(&self) -> Result<(), SessionError> {
        for question in &self.questions {
            question.validate()?;
        }
        Ok(())
    }

    /// Look up a question by id.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Number of questions in the bank.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the bank holds no questions.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Sum of all question point values.
    pub fn total_points(&self) -> f64 {
        self.questions.iter().map(|q| q.points).sum()
    }
}

/// The output record of a completed session. Created exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// The session that produced this record.
    pub session_id: Uuid,
    /// The bank the session ran against.
    pub bank_id: String,
    /// Snapshot of the answer store at submit time.
    pub answers: HashMap<String, AnswerValue>,
    /// When the submission was produced.
    pub completed_at: DateTime<Utc>,
    /// Wall-clock seconds consumed by the session.
    pub elapsed_secs: u64,
    /// Whether timer expiry forced the submission.
    pub forced: bool,
}
