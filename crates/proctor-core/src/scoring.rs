//! Pure scoring over submissions, plus class-level aggregate statistics.
//!
//! Scoring is a deterministic function of a submission and its bank; it can
//! be re-run against the same submission for auditing and always yields the
//! same card.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{AnswerValue, QuestionBank, QuestionKind, Submission};

/// Score for a single question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionScore {
    /// Question identifier.
    pub question_id: String,
    /// Points awarded.
    pub awarded: f64,
    /// Points available.
    pub possible: f64,
    /// Whether any answer was stored for this question.
    pub answered: bool,
    /// Whether the stored answer earned the points.
    pub correct: bool,
}

/// The graded result of one submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreCard {
    /// The bank the submission was graded against.
    pub bank_id: String,
    /// Per-question scores, in bank order.
    pub entries: Vec<QuestionScore>,
    /// Total points awarded.
    pub total: f64,
    /// Total points available.
    pub possible: f64,
}

impl ScoreCard {
    /// Awarded points as a fraction of available points, in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.possible > 0.0 {
            self.total / self.possible
        } else {
            0.0
        }
    }
}

/// Grade a submission against its bank.
///
/// A choice question earns its points iff the stored answer is the correct
/// option index. Free-text and attachment questions earn their points iff
/// an answer is present and non-empty. Unanswered questions and answers of
/// the wrong shape earn 0. Answers for ids not in the bank are ignored.
pub fn score_submission(submission: &Submission, bank: &QuestionBank) -> ScoreCard {
    let mut entries = Vec::with_capacity(bank.len());
    let mut total = 0.0;
    let mut possible = 0.0;

    for question in &bank.questions {
        let answer = submission.answers.get(&question.id);
        let answered = answer.is_some();
        let correct = match (&question.kind, answer) {
            (
                QuestionKind::Choice { correct_index, .. },
                Some(AnswerValue::Choice(selected)),
            ) => selected == correct_index,
            (QuestionKind::Choice { .. }, _) => false,
            (_, Some(value)) => !value.is_empty(),
            (_, None) => false,
        };
        let awarded = if correct { question.points } else { 0.0 };

        total += awarded;
        possible += question.points;
        entries.push(QuestionScore {
            question_id: question.id.clone(),
            awarded,
            possible: question.points,
            answered,
            correct,
        });
    }

    ScoreCard {
        bank_id: bank.id.clone(),
        entries,
        total,
        possible,
    }
}

/// Per-question rates across a set of graded submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionStats {
    /// Question identifier.
    pub question_id: String,
    /// Fraction of submissions that answered this question.
    pub answer_rate: f64,
    /// Fraction of submissions that earned the points.
    pub correct_rate: f64,
}

/// Class-level rollup over many score cards for the same bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankStats {
    /// Number of graded submissions.
    pub submission_count: usize,
    /// Mean total across submissions.
    pub mean_total: f64,
    /// Lowest total.
    pub min_total: f64,
    /// Highest total.
    pub max_total: f64,
    /// Points available per submission.
    pub possible: f64,
    /// Per-question rates.
    pub per_question: HashMap<String, QuestionStats>,
}

/// Aggregate score cards into class-level statistics.
pub fn compute_bank_stats(cards: &[ScoreCard]) -> BankStats {
    if cards.is_empty() {
        return BankStats {
            submission_count: 0,
            mean_total: 0.0,
            min_total: 0.0,
            max_total: 0.0,
            possible: 0.0,
            per_question: HashMap::new(),
        };
    }

    let n = cards.len() as f64;
    let totals: Vec<f64> = cards.iter().map(|c| c.total).collect();
    let mean_total = totals.iter().sum::<f64>() / n;
    let min_total = totals.iter().copied().fold(f64::INFINITY, f64::min);
    let max_total = totals.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut answered: HashMap<&str, usize> = HashMap::new();
    let mut correct: HashMap<&str, usize> = HashMap::new();
    for card in cards {
        for entry in &card.entries {
            if entry.answered {
                *answered.entry(entry.question_id.as_str()).or_default() += 1;
            }
            if entry.correct {
                *correct.entry(entry.question_id.as_str()).or_default() += 1;
            }
        }
    }

    let mut per_question = HashMap::new();
    for entry in &cards[0].entries {
        let id = entry.question_id.as_str();
        per_question.insert(
            id.to_string(),
            QuestionStats {
                question_id: id.to_string(),
                answer_rate: answered.get(id).copied().unwrap_or(0) as f64 / n,
                correct_rate: correct.get(id).copied().unwrap_or(0) as f64 / n,
            },
        );
    }

    BankStats {
        submission_count: cards.len(),
        mean_total,
        min_total,
        max_total,
        possible: cards[0].possible,
        per_question,
    }
}
