//! Core types for the daily task sheets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the sheet listing team members.
pub const TEAM_SHEET: &str = "Team";
/// Name of the sheet holding the active task list.
pub const TASKS_SHEET: &str = "Tasks";
/// Name of the sheet holding tasks scheduled for a later day.
pub const QUEUE_SHEET: &str = "Queue";
/// Name of the sheet receiving completed tasks.
pub const ARCHIVE_SHEET: &str = "Archive";
/// Name of the key/value configuration sheet.
pub const CONFIG_SHEET: &str = "Config";

/// Every sheet the application expects, with its header row.
pub const SHEET_LAYOUT: [(&str, &[&str]); 5] = [
    (TEAM_SHEET, &["Name", "First Name", "Designation", "Email"]),
    (TASKS_SHEET, &TASK_HEADERS),
    (QUEUE_SHEET, &TASK_HEADERS),
    (ARCHIVE_SHEET, &TASK_HEADERS),
    (CONFIG_SHEET, &["Key", "Value"]),
];

const TASK_HEADERS: [&str; 5] = ["Date", "Task", "Project", "Assigned To", "Status"];

/// Column positions in the Tasks, Queue and Archive sheets.
pub mod task_col {
    pub const DATE: usize = 0;
    pub const DESCRIPTION: usize = 1;
    pub const PROJECT: usize = 2;
    pub const ASSIGNEE: usize = 3;
    pub const STATUS: usize = 4;
}

/// Column positions in the Team sheet.
pub mod team_col {
    pub const NAME: usize = 0;
    pub const FIRST_NAME: usize = 1;
    pub const DESIGNATION: usize = 2;
    pub const EMAIL: usize = 3;
}

/// Status value marking a task as finished.
pub const STATUS_DONE: &str = "Done";

/// A single sheet cell.
///
/// Serialized as the matching JSON scalar, so a row is stored as a plain
/// JSON array such as `["2024-05-01", "Write report", null, "alice", ""]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Cell {
    /// Build a cell from user input: blank input becomes an empty cell.
    pub fn from_input(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }

    /// True for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Bool(_) | Cell::Number(_) => false,
        }
    }

    /// Cell contents as text with surrounding whitespace removed.
    pub fn trimmed(&self) -> String {
        self.to_string().trim().to_string()
    }

    /// Interpret the cell as a flag.
    pub fn is_truthy(&self) -> bool {
        match self {
            Cell::Empty => false,
            Cell::Bool(b) => *b,
            Cell::Number(n) => *n != 0.0,
            Cell::Text(s) => {
                let s = s.trim().to_ascii_lowercase();
                !(s.is_empty() || s == "0" || s == "false" || s == "no")
            }
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::from_input(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// A sheet row.
pub type Row = Vec<Cell>;

/// Cell at `col`, treating missing trailing cells as empty.
pub fn cell_at(row: &[Cell], col: usize) -> &Cell {
    const EMPTY: &Cell = &Cell::Empty;
    row.get(col).unwrap_or(EMPTY)
}

/// True when every cell in the row is blank.
pub fn is_blank_row(row: &[Cell]) -> bool {
    row.iter().all(Cell::is_blank)
}

/// A member of the team, read from the Team sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub first_name: String,
    pub designation: String,
    pub email: String,
}

impl TeamMember {
    /// Parse a Team row. Rows with a blank name yield `None`.
    pub fn from_row(row: &[Cell]) -> Option<Self> {
        let name = cell_at(row, team_col::NAME).to_string();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name,
            first_name: cell_at(row, team_col::FIRST_NAME).to_string(),
            designation: cell_at(row, team_col::DESIGNATION).to_string(),
            email: cell_at(row, team_col::EMAIL).trimmed(),
        })
    }
}

/// Parse the Team sheet, keeping the first definition of each name.
pub fn parse_team(rows: &[Row]) -> Vec<TeamMember> {
    let mut members: Vec<TeamMember> = Vec::new();
    for member in rows.iter().filter_map(|row| TeamMember::from_row(row)) {
        if members.iter().any(|m| m.name == member.name) {
            tracing::warn!(name = %member.name, "Duplicate team member ignored");
            continue;
        }
        members.push(member);
    }
    members
}
