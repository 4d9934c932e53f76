//! TOML question-bank parser.
//!
//! Loads question banks from TOML files and directories, and validates them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::model::{Question, QuestionBank, QuestionKind};
use crate::traits::BankSource;

/// Intermediate TOML structure for parsing bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    bank: TomlBankHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    time_limit_secs: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    prompt: String,
    #[serde(default = "default_kind")]
    kind: String,
    #[serde(default)]
    choices: Vec<String>,
    #[serde(default)]
    correct_index: Option<usize>,
    #[serde(default = "default_points")]
    points: f64,
}

fn default_kind() -> String {
    "choice".to_string()
}

fn default_points() -> f64 {
    1.0
}

/// Parse a single TOML file into a `QuestionBank`.
pub fn parse_bank(path: &Path) -> Result<QuestionBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bank file: {}", path.display()))?;

    parse_bank_str(&content, path)
}

/// Parse a TOML string into a `QuestionBank` (useful for testing).
pub fn parse_bank_str(content: &str, source_path: &Path) -> Result<QuestionBank> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let kind = match q.kind.to_lowercase().as_str() {
                "choice" => {
                    let correct_index = q.correct_index.with_context(|| {
                        format!("question '{}': choice question needs correct_index", q.id)
                    })?;
                    QuestionKind::Choice {
                        choices: q.choices,
                        correct_index,
                    }
                }
                "free-text" | "text" => QuestionKind::FreeText,
                "attachment" | "upload" => QuestionKind::Attachment,
                other => anyhow::bail!("question '{}': unknown kind: {other}", q.id),
            };
            Ok(Question {
                id: q.id,
                prompt: q.prompt,
                points: q.points,
                kind,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut bank = QuestionBank::new(parsed.bank.id, parsed.bank.name, questions)
        .with_context(|| format!("invalid bank: {}", source_path.display()))?;
    bank.description = parsed.bank.description;
    bank.time_limit_secs = parsed.bank.time_limit_secs;
    Ok(bank)
}

/// Recursively load all `.toml` bank files from a directory.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<QuestionBank>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            banks.extend(load_bank_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_bank(&path) {
                Ok(bank) => banks.push(bank),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(banks)
}

/// A warning from bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a bank for common issues that are not hard invariant violations.
pub fn validate_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if bank.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "bank contains no questions; a session cannot start on it".into(),
        });
    }

    if bank.time_limit_secs == Some(0) {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "time_limit_secs is 0; the bank will run untimed".into(),
        });
    }

    // Check for duplicate question IDs
    let mut seen_ids = std::collections::HashSet::new();
    for question in &bank.questions {
        if !seen_ids.insert(&question.id) {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: format!("duplicate question ID: {}", question.id),
            });
        }
    }

    // Check for empty prompts
    for question in &bank.questions {
        if question.prompt.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: "prompt is empty".into(),
            });
        }
    }

    // Check for questions that cannot award points
    for question in &bank.questions {
        if question.points == 0.0 {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: "points is 0; answering this question never changes the score".into(),
            });
        }
    }

    warnings
}

/// A `BankSource` over a TOML bank file on disk.
pub struct TomlBankSource {
    path: PathBuf,
}

impl TomlBankSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl BankSource for TomlBankSource {
    async fn load(&self) -> Result<QuestionBank> {
        parse_bank(&self.path)
    }
}
