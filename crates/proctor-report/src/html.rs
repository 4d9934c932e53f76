//! HTML grade-sheet generator.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use std::path::Path;

use anyhow::Result;

use proctor_core::report::SessionReport;
use proctor_core::scoring::compute_bank_stats;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate a grade sheet for a single graded session.
pub fn generate_html(report: &SessionReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>grade sheet — {}</title>\n",
        html_escape(&report.bank.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>Grade sheet</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Bank: <strong>{}</strong> | {} questions | session {} | {}</p>\n",
        html_escape(&report.bank.name),
        report.bank.question_count,
        report.submission.session_id,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str(&format!(
        "<p class=\"total\">{:.1} / {:.1} points ({:.0}%)</p>\n",
        report.score.total,
        report.score.possible,
        report.score.fraction() * 100.0
    ));
    if report.submission.forced {
        html.push_str("<p class=\"meta\">Submitted automatically when time ran out.</p>\n");
    }
    html.push_str(&format!(
        "<p class=\"meta\">Time taken: {}s</p>\n",
        report.submission.elapsed_secs
    ));
    html.push_str("</section>\n");

    // Per-question table
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Questions</h2>\n");
    html.push_str("<table class=\"results-table\">\n");
    html.push_str(
        "<thead><tr><th>Question</th><th>Answered</th><th>Correct</th><th>Points</th></tr></thead>\n",
    );
    html.push_str("<tbody>\n");

    for entry in &report.score.entries {
        let row_class = if entry.correct {
            "pass"
        } else if entry.answered {
            "fail"
        } else {
            "blank"
        };
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{:.1} / {:.1}</td></tr>\n",
            row_class,
            html_escape(&entry.question_id),
            if entry.answered { "yes" } else { "-" },
            if entry.correct { "yes" } else { "no" },
            entry.awarded,
            entry.possible,
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Generate a class summary across many graded sessions of the same bank.
pub fn generate_class_html(reports: &[SessionReport]) -> String {
    let cards: Vec<_> = reports.iter().map(|r| r.score.clone()).collect();
    let stats = compute_bank_stats(&cards);
    let bank_name = reports
        .first()
        .map(|r| r.bank.name.as_str())
        .unwrap_or("empty class");

    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>class summary — {}</title>\n",
        html_escape(bank_name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str("<h1>Class summary</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Bank: <strong>{}</strong> | {} submissions</p>\n",
        html_escape(bank_name),
        stats.submission_count
    ));
    html.push_str("</header>\n");

    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Totals</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Mean</th><th>Min</th><th>Max</th><th>Possible</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td></tr></tbody>\n",
        stats.mean_total, stats.min_total, stats.max_total, stats.possible
    ));
    html.push_str("</table>\n");
    html.push_str("</section>\n");

    // Per-question correct rates, in bank order, with inline bars.
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Questions</h2>\n");
    html.push_str("<table class=\"results-table\">\n");
    html.push_str(
        "<thead><tr><th>Question</th><th>Answered</th><th>Correct</th><th></th></tr></thead>\n",
    );
    html.push_str("<tbody>\n");

    let order: Vec<&str> = reports
        .first()
        .map(|r| {
            r.score
                .entries
                .iter()
                .map(|e| e.question_id.as_str())
                .collect()
        })
        .unwrap_or_default();

    for id in order {
        let Some(question) = stats.per_question.get(id) else {
            continue;
        };
        let width = (question.correct_rate * 100.0).round() as u32;
        let color = if question.correct_rate >= 0.8 {
            "#22c55e"
        } else if question.correct_rate >= 0.5 {
            "#eab308"
        } else {
            "#ef4444"
        };
        html.push_str(&format!(
            "<tr><td>{}</td><td>{:.0}%</td><td>{:.0}%</td><td><div class=\"bar\" style=\"width:{}px;background:{}\"></div></td></tr>\n",
            html_escape(id),
            question.answer_rate * 100.0,
            question.correct_rate * 100.0,
            width * 3,
            color,
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(html: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.total { font-size: 1.5rem; font-weight: bold; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.blank { color: #6b7280; }
.bar { height: 14px; border-radius: 4px; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use proctor_core::model::{AnswerValue, Question, QuestionBank, QuestionKind, Submission};

    use std::collections::HashMap;

    fn make_bank() -> QuestionBank {
        QuestionBank::new(
            "quiz",
            "Quiz <1>",
            vec![
                Question {
                    id: "pick".into(),
                    prompt: "pick b".into(),
                    points: 5.0,
                    kind: QuestionKind::Choice {
                        choices: vec!["a".into(), "b".into()],
                        correct_index: 1,
                    },
                },
                Question {
                    id: "essay".into(),
                    prompt: "explain".into(),
                    points: 10.0,
                    kind: QuestionKind::FreeText,
                },
            ],
        )
        .unwrap()
    }

    fn make_report(answers: Vec<(&str, AnswerValue)>, forced: bool) -> SessionReport {
        let bank = make_bank();
        let submission = Submission {
            session_id: uuid::Uuid::nil(),
            bank_id: bank.id.clone(),
            answers: answers
                .into_iter()
                .map(|(id, v)| (id.to_string(), v))
                .collect::<HashMap<_, _>>(),
            completed_at: chrono::Utc::now(),
            elapsed_secs: 61,
            forced,
        };
        SessionReport::new(&bank, submission)
    }

    #[test]
    fn grade_sheet_contains_summary_and_rows() {
        let report = make_report(vec![("pick", AnswerValue::Choice(1))], false);
        let html = generate_html(&report);

        assert!(html.contains("Grade sheet"));
        assert!(html.contains("5.0 / 15.0"));
        assert!(html.contains("pick"));
        assert!(html.contains("essay"));
        assert!(!html.contains("time ran out"));
    }

    #[test]
    fn forced_submission_is_called_out() {
        let report = make_report(vec![], true);
        let html = generate_html(&report);
        assert!(html.contains("time ran out"));
    }

    #[test]
    fn bank_name_is_escaped() {
        let report = make_report(vec![], false);
        let html = generate_html(&report);
        assert!(html.contains("Quiz &lt;1&gt;"));
        assert!(!html.contains("Quiz <1>"));
    }

    #[test]
    fn class_summary_rolls_up() {
        let reports = vec![
            make_report(
                vec![
                    ("pick", AnswerValue::Choice(1)),
                    ("essay", AnswerValue::Text("because".into())),
                ],
                false,
            ),
            make_report(vec![("pick", AnswerValue::Choice(0))], false),
        ];
        let html = generate_class_html(&reports);

        assert!(html.contains("Class summary"));
        assert!(html.contains("2 submissions"));
        assert!(html.contains("pick"));
    }

    #[test]
    fn class_summary_handles_empty_input() {
        let html = generate_class_html(&[]);
        assert!(html.contains("0 submissions"));
    }

    #[test]
    fn write_html_creates_parents() {
        let report = make_report(vec![], false);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("grade.html");

        write_html_report(&generate_html(&report), &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("<!DOCTYPE html>"));
    }
}
