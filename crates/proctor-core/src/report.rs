//! Graded session reports with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{QuestionBank, Submission};
use crate::scoring::{score_submission, ScoreCard};

/// A graded session: the submission, its score card, and bank metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the bank (without the full question definitions).
    pub bank: BankSummary,
    /// The submission being graded.
    pub submission: Submission,
    /// The graded result.
    pub score: ScoreCard,
}

/// Summary of a question bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankSummary {
    pub id: String,
    pub name: String,
    pub question_count: usize,
}

impl SessionReport {
    /// Grade a submission and wrap it in a report.
    pub fn new(bank: &QuestionBank, submission: Submission) -> Self {
        let score = score_submission(&submission, bank);
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            bank: BankSummary {
                id: bank.id.clone(),
                name: bank.name.clone(),
                question_count: bank.len(),
            },
            submission,
            score,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: SessionReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerValue, Question, QuestionKind};

    use std::collections::HashMap;

    fn bank() -> QuestionBank {
        QuestionBank::new(
            "quiz",
            "Quiz",
            vec![Question {
                id: "q1".into(),
                prompt: "pick b".into(),
                points: 5.0,
                kind: QuestionKind::Choice {
                    choices: vec!["a".into(), "b".into()],
                    correct_index: 1,
                },
            }],
        )
        .unwrap()
    }

    fn submission() -> Submission {
        let mut answers = HashMap::new();
        answers.insert("q1".to_string(), AnswerValue::Choice(1));
        Submission {
            session_id: Uuid::nil(),
            bank_id: "quiz".into(),
            answers,
            completed_at: Utc::now(),
            elapsed_secs: 42,
            forced: false,
        }
    }

    #[test]
    fn report_grades_on_construction() {
        let report = SessionReport::new(&bank(), submission());
        assert_eq!(report.bank.question_count, 1);
        assert!((report.score.total - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn json_roundtrip() {
        let report = SessionReport::new(&bank(), submission());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("session.json");

        report.save_json(&path).unwrap();
        let loaded = SessionReport::load_json(&path).unwrap();

        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.bank.id, "quiz");
        assert_eq!(loaded.submission.elapsed_secs, 42);
        assert!((loaded.score.total - 5.0).abs() < f64::EPSILON);
    }
}
