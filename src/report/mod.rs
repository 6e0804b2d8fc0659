//! Report rendering.
//!
//! Turns a compiled [`Report`](crate::models::Report) into plain text,
//! Markdown or JSON.

pub mod generator;

pub use generator::{
    generate_json_report, generate_markdown_report, generate_text_report, write_report,
    FormatConfig,
};
