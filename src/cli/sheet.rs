//! Sheet subcommands: show, append and set-cell.

use crate::format::OutputFormat;
use crate::types::Cell;
use clap::Args;

/// Arguments for the show subcommand
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Sheet to print (Team, Tasks, Queue, Archive or Config)
    pub sheet: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

/// Arguments for the append subcommand
#[derive(Args, Debug)]
pub struct AppendArgs {
    /// Sheet to append to
    pub sheet: String,

    /// Cell values, left to right. Empty strings leave the cell blank.
    #[arg(required = true, num_args = 1..)]
    pub values: Vec<String>,
}

impl AppendArgs {
    /// The values as typed cells.
    pub fn cells(&self) -> Vec<Cell> {
        self.values.iter().map(|v| Cell::from_input(v)).collect()
    }
}

/// Arguments for the set-cell subcommand
#[derive(Args, Debug)]
pub struct SetCellArgs {
    /// Sheet to edit
    pub sheet: String,

    /// Data row index as printed by `show` (0 is the first row below the header)
    pub row: usize,

    /// Column header name or 1-based column number
    pub column: String,

    /// New value; omit to clear the cell
    pub value: Option<String>,
}

impl SetCellArgs {
    /// Resolve the column against the sheet's header row.
    pub fn column_index(&self, header: &[Cell]) -> Option<usize> {
        if let Ok(number) = self.column.parse::<usize>() {
            return number.checked_sub(1);
        }
        let wanted = self.column.trim();
        header
            .iter()
            .position(|cell| cell.trimmed().eq_ignore_ascii_case(wanted))
    }

    pub fn cell(&self) -> Cell {
        self.value.as_deref().map_or(Cell::Empty, Cell::from_input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_cell(column: &str) -> SetCellArgs {
        SetCellArgs {
            sheet: "Tasks".to_string(),
            row: 0,
            column: column.to_string(),
            value: None,
        }
    }

    #[test]
    fn test_column_by_name_or_number() {
        let header: Vec<Cell> = ["Date", "Description", "Project", "Assigned To", "Status"]
            .into_iter()
            .map(Cell::from)
            .collect();

        assert_eq!(set_cell("status").column_index(&header), Some(4));
        assert_eq!(set_cell("Assigned To").column_index(&header), Some(3));
        assert_eq!(set_cell("2").column_index(&header), Some(1));
        assert_eq!(set_cell("0").column_index(&header), None);
        assert_eq!(set_cell("Owner").column_index(&header), None);
    }

    #[test]
    fn test_missing_value_clears() {
        assert_eq!(set_cell("Status").cell(), Cell::Empty);
    }
}
