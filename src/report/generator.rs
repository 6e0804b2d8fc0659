//! Report generation.
//!
//! Every section of the report is first laid out as a [`Table`] of display
//! strings and then rendered as aligned plain text or as Markdown. Rounding
//! of money and percentages happens here and nowhere earlier.

use crate::models::{
    round_for_display, DemographicRow, GroupPurchasing, ItemRow, Report, ReportMetadata,
};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::fmt;
use std::path::Path;

/// Presentation settings passed to every renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatConfig {
    /// Symbol placed in front of monetary values.
    pub currency_symbol: String,
    /// Decimal places for money and percentages.
    pub decimal_places: u32,
    /// Width of the dashed rule around text section titles.
    pub rule_width: usize,
    /// List age buckets that have no players.
    pub show_empty_age_buckets: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            decimal_places: 2,
            rule_width: 26,
            show_empty_age_buckets: true,
        }
    }
}

impl From<&crate::config::ReportConfig> for FormatConfig {
    fn from(config: &crate::config::ReportConfig) -> Self {
        Self {
            currency_symbol: config.currency_symbol.clone(),
            decimal_places: config.decimal_places,
            rule_width: config.rule_width,
            show_empty_age_buckets: config.show_empty_age_buckets,
        }
    }
}

impl FormatConfig {
    /// Format a monetary value, e.g. `$8.33`.
    pub fn currency(&self, value: Decimal) -> String {
        format!("{}{}", self.currency_symbol, self.fixed(value))
    }

    /// Format a percentage, e.g. `50.00%`.
    pub fn percentage(&self, value: Decimal) -> String {
        format!("{}%", self.fixed(value))
    }

    fn fixed(&self, value: Decimal) -> String {
        let dp = self.decimal_places as usize;
        format!("{:.*}", dp, round_for_display(value, self.decimal_places))
    }
}

/// One report section laid out as display strings.
#[derive(Debug, Clone, PartialEq)]
struct Table {
    title: &'static str,
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

/// Lay out every report section in presentation order.
fn report_tables(report: &Report, fmt: &FormatConfig) -> Vec<Table> {
    let age_demographics: Vec<_> = report
        .age_demographics
        .iter()
        .filter(|row| fmt.show_empty_age_buckets || row.count > 0)
        .collect();

    vec![
        Table {
            title: "Player Count",
            headers: vec!["Total Players"],
            rows: vec![vec![report.player_count.to_string()]],
        },
        Table {
            title: "Purchasing Analysis (Total)",
            headers: vec![
                "Number of Unique Items",
                "Average Purchase Price",
                "Number of Purchases",
                "Total Revenue",
            ],
            rows: vec![vec![
                report.purchasing.distinct_item_count.to_string(),
                fmt.currency(report.purchasing.average_price),
                report.purchasing.purchase_count.to_string(),
                fmt.currency(report.purchasing.total_revenue),
            ]],
        },
        demographics_table("Gender Demographics", "Gender", &report.gender_demographics, fmt),
        purchasing_table("Purchasing Analysis (Gender)", "Gender", &report.gender_purchasing, fmt),
        demographics_table("Age Demographics", "Age Range", age_demographics, fmt),
        purchasing_table("Purchasing Analysis (Age)", "Age Range", &report.age_purchasing, fmt),
        Table {
            title: "Top Spenders",
            headers: vec![
                "SN",
                "Purchase Count",
                "Average Purchase Price",
                "Total Purchase Value",
            ],
            rows: report
                .top_spenders
                .iter()
                .map(|s| {
                    vec![
                        s.player_handle.clone(),
                        s.purchase_count.to_string(),
                        fmt.currency(s.average_price),
                        fmt.currency(s.total_purchase_value),
                    ]
                })
                .collect(),
        },
        items_table("Most Popular Items", &report.most_popular_items, fmt),
        items_table("Most Profitable Items", &report.most_profitable_items, fmt),
    ]
}

fn demographics_table<'a, K, I>(
    title: &'static str,
    key: &'static str,
    rows: I,
    fmt: &FormatConfig,
) -> Table
where
    K: fmt::Display + 'a,
    I: IntoIterator<Item = &'a DemographicRow<K>>,
{
    Table {
        title,
        headers: vec![key, "Total Count", "Percentage of Players"],
        rows: rows
            .into_iter()
            .map(|r| {
                vec![
                    r.group.to_string(),
                    r.count.to_string(),
                    fmt.percentage(r.percentage),
                ]
            })
            .collect(),
    }
}

fn purchasing_table<K: fmt::Display>(
    title: &'static str,
    key: &'static str,
    rows: &[GroupPurchasing<K>],
    fmt: &FormatConfig,
) -> Table {
    Table {
        title,
        headers: vec![
            key,
            "Purchase Count",
            "Average Purchase Price",
            "Total Purchase Value",
            "Avg Total Purchase per Person",
        ],
        rows: rows
            .iter()
            .map(|r| {
                vec![
                    r.group.to_string(),
                    r.purchase_count.to_string(),
                    fmt.currency(r.average_price),
                    fmt.currency(r.total_purchase_value),
                    fmt.currency(r.average_per_person),
                ]
            })
            .collect(),
    }
}

fn items_table(title: &'static str, items: &[ItemRow], fmt: &FormatConfig) -> Table {
    Table {
        title,
        headers: vec![
            "Item ID",
            "Item Name",
            "Purchase Count",
            "Item Price",
            "Total Purchase Value",
        ],
        rows: items
            .iter()
            .map(|i| {
                vec![
                    i.item_id.to_string(),
                    i.item_name.clone(),
                    i.purchase_count.to_string(),
                    fmt.currency(i.item_price),
                    fmt.currency(i.total_purchase_value),
                ]
            })
            .collect(),
    }
}

/// Generate the plain text report printed to the terminal.
pub fn generate_text_report(report: &Report, fmt: &FormatConfig) -> String {
    let rule = "-".repeat(fmt.rule_width);
    let mut output = String::new();

    for table in report_tables(report, fmt) {
        output.push_str(&format!("{}\n{}\n{}\n", rule, table.title, rule));
        output.push_str(&render_text_table(&table));
        output.push('\n');
    }

    output
}

/// Render a table with padded columns; the first column is left-aligned.
fn render_text_table(table: &Table) -> String {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render_line = |cells: Vec<&str>| -> String {
        let line = cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(col, (cell, width))| {
                if col == 0 {
                    format!("{:<width$}", cell, width = *width)
                } else {
                    format!("{:>width$}", cell, width = *width)
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        format!("{}\n", line.trim_end())
    };

    let mut section = render_line(table.headers.clone());
    for row in &table.rows {
        section.push_str(&render_line(row.iter().map(String::as_str).collect()));
    }

    section
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, fmt: &FormatConfig) -> String {
    let mut output = String::new();

    output.push_str("# Purchase Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));

    for table in report_tables(report, fmt) {
        output.push_str(&format!("## {}\n\n", table.title));
        output.push_str(&render_markdown_table(&table));
        output.push('\n');
    }

    output.push_str("---\n\n");
    output.push_str("*Report generated by pymoli*\n");

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Purchases:** {}\n", metadata.record_count));
    section.push('\n');

    section
}

fn render_markdown_table(table: &Table) -> String {
    let mut section = String::new();

    section.push_str(&format!("| {} |\n", table.headers.join(" | ")));
    let align: Vec<&str> = (0..table.headers.len())
        .map(|col| if col == 0 { ":---" } else { "---:" })
        .collect();
    section.push_str(&format!("|{}|\n", align.join("|")));

    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(|c| c.replace('|', "\\|")).collect();
        section.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    section
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
