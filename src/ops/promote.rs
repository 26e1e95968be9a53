//! Promotion of queued tasks into the active list.

use crate::context::RunContext;
use crate::engine::rows_dated;
use crate::types::{QUEUE_SHEET, TASKS_SHEET, task_col};
use anyhow::Result;
use tracing::info;

/// Move every Queue row dated today to the end of Tasks, then sort both
/// sheets by date. Returns the number of rows moved.
pub fn add_queued_tasks(ctx: &RunContext<'_>) -> Result<usize> {
    let store = ctx.store();
    let snapshot = ctx.rows(QUEUE_SHEET)?;
    let indices = rows_dated(&snapshot, ctx.today(), ctx.time_zone());

    let moved = store.relocate_rows(QUEUE_SHEET, &indices, TASKS_SHEET)?;
    store.sort_sheet(TASKS_SHEET, task_col::DATE)?;
    store.sort_sheet(QUEUE_SHEET, task_col::DATE)?;

    info!(at = %ctx.now(), moved, "Added queued tasks");
    Ok(moved)
}
