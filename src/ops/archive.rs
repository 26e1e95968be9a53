//! Archival of finished tasks.

use crate::context::RunContext;
use crate::engine::archivable_rows;
use crate::types::{ARCHIVE_SHEET, TASKS_SHEET, task_col};
use anyhow::Result;
use tracing::info;

/// Move every `Done` task dated before today from Tasks to the end of
/// Archive, then sort both sheets by date. Returns the number of rows moved.
pub fn archive_tasks(ctx: &RunContext<'_>) -> Result<usize> {
    let store = ctx.store();
    let snapshot = ctx.rows(TASKS_SHEET)?;
    let indices = archivable_rows(&snapshot, ctx.today(), ctx.time_zone());

    let moved = store.relocate_rows(TASKS_SHEET, &indices, ARCHIVE_SHEET)?;
    store.sort_sheet(TASKS_SHEET, task_col::DATE)?;
    store.sort_sheet(ARCHIVE_SHEET, task_col::DATE)?;

    info!(at = %ctx.now(), moved, "Archived tasks");
    Ok(moved)
}
