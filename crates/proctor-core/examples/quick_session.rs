//! Quick session example — minimal programmatic usage of proctor.
//!
//! Builds a small question bank in memory, runs an untimed session against
//! it, grades the submission, and saves a JSON report.
//!
//! ```bash
//! cargo run --example quick_session
//! ```

use std::sync::Arc;

use proctor_core::model::{AnswerValue, Question, QuestionBank, QuestionKind};
use proctor_core::report::SessionReport;
use proctor_core::session::{ExamSession, SessionMode};
use proctor_core::traits::NoopSink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("proctor=debug".parse().unwrap()),
        )
        .init();

    let bank = QuestionBank::new(
        "demo-quiz",
        "Demo Quiz",
        vec![
            Question {
                id: "transport".into(),
                prompt: "Which layer owns retransmission?".into(),
                points: 5.0,
                kind: QuestionKind::Choice {
                    choices: vec!["application".into(), "transport".into(), "link".into()],
                    correct_index: 1,
                },
            },
            Question {
                id: "hol".into(),
                prompt: "Explain head-of-line blocking.".into(),
                points: 10.0,
                kind: QuestionKind::FreeText,
            },
        ],
    )?;
    println!("Loaded bank: {} ({} questions)", bank.name, bank.len());

    let mut session = ExamSession::new(bank.clone(), SessionMode::Untimed, Arc::new(NoopSink))?;

    // Walk the questions and answer them.
    println!("Q1: {}", session.current_question().prompt);
    session.record_answer("transport", AnswerValue::Choice(1))?;
    session.go_next()?;

    println!("Q2: {}", session.current_question().prompt);
    session.record_answer(
        "hol",
        AnswerValue::Text("A stalled packet at the queue head delays everything behind it.".into()),
    )?;

    let submission = session.submit().await?;
    println!(
        "\nSubmitted {} answers in {}s",
        submission.answers.len(),
        submission.elapsed_secs
    );

    let report = SessionReport::new(&bank, submission);
    println!(
        "Score: {}/{} ({:.0}%)",
        report.score.total,
        report.score.possible,
        report.score.fraction() * 100.0
    );

    report.save_json("quick_session_report.json".as_ref())?;
    println!("Report saved to quick_session_report.json");

    Ok(())
}
