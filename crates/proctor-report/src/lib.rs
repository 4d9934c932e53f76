//! proctor-report — HTML rendering for graded sessions.
//!
//! Produces self-contained HTML files (all CSS inlined): a per-session
//! grade sheet, and a class summary across many sessions.

mod html;

pub use html::{generate_class_html, generate_html, write_html_report};
