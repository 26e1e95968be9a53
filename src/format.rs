//! Output formatting utilities for markdown and JSON.

use crate::db::outbox::OutboxMessage;
use crate::store::Trigger;
use crate::types::Row;

/// Output format for CLI listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    #[default]
    Markdown,
}

/// Pick the singular or plural form for a count.
pub fn format_plural<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Format sheet rows as a markdown table. The first row is the header.
pub fn format_sheet_markdown(name: &str, rows: &[Row]) -> String {
    let mut md = format!("# {}\n\n", name);
    let Some((header, data)) = rows.split_first() else {
        md.push_str("_empty sheet_\n");
        return md;
    };

    let width = rows.iter().map(Vec::len).max().unwrap_or(0).max(1);
    let render = |row: &Row| -> String {
        let cells: Vec<String> = (0..width)
            .map(|i| row.get(i).map(|c| escape_cell(&c.to_string())).unwrap_or_default())
            .collect();
        format!("| # | {} |\n", cells.join(" | "))
    };

    md.push_str(&render(header));
    md.push_str(&format!("|---|{}\n", "---|".repeat(width)));
    for (index, row) in data.iter().enumerate() {
        let line = render(row);
        md.push_str(&line.replacen("| # |", &format!("| {} |", index), 1));
    }
    md
}

/// Format triggers as a markdown list.
pub fn format_triggers_markdown(triggers: &[Trigger]) -> String {
    let mut md = format!("# Triggers ({})\n\n", triggers.len());
    for trigger in triggers {
        md.push_str(&format!(
            "- `{}` daily at {:02}:00 (last fired: {})\n",
            trigger.operation,
            trigger.hour,
            trigger.last_fired.as_deref().unwrap_or("never")
        ));
    }
    md
}

/// Format outbox messages as markdown.
pub fn format_outbox_markdown(messages: &[OutboxMessage]) -> String {
    let mut md = format!("# Outbox ({})\n", messages.len());
    for message in messages {
        md.push_str(&format!(
            "\n## {}: {}\n\n{}\n",
            message.recipient, message.subject, message.body
        ));
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;

    #[test]
    fn plural_forms() {
        assert_eq!(format_plural(1, "task", "tasks"), "task");
        assert_eq!(format_plural(0, "task", "tasks"), "tasks");
        assert_eq!(format_plural(2, "task", "tasks"), "tasks");
    }

    #[test]
    fn sheet_table_numbers_data_rows_from_zero() {
        let rows = vec![
            vec![Cell::from_input("Key"), Cell::from_input("Value")],
            vec![Cell::from_input("sender_name"), Cell::from_input("A|B")],
        ];
        let md = format_sheet_markdown("Config", &rows);
        assert!(md.contains("| # | Key | Value |"));
        assert!(md.contains("| 0 | sender_name | A\\|B |"));
    }

    #[test]
    fn empty_sheet() {
        assert!(format_sheet_markdown("Queue", &[]).contains("_empty sheet_"));
    }
}
