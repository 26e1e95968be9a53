//! Trigger setup from the Config sheet.

use crate::context::RunContext;
use crate::settings::{ADD_QUEUED_TASKS_TIME, ARCHIVE_TASKS_TIME, SEND_EMAILS_TIME};
use crate::store::{Operation, Trigger, TriggerRegistry};
use anyhow::Result;
use tracing::{debug, info};

/// Property remembering which store the triggers belong to.
pub const SHEET_ID_PROPERTY: &str = "sheet_id";

/// Replace every trigger with the schedule configured in the Config sheet.
///
/// All hours are read before anything is deleted, so an invalid Config
/// sheet leaves the existing triggers untouched.
pub fn save_config(
    ctx: &mut RunContext<'_>,
    registry: &dyn TriggerRegistry,
) -> Result<Vec<Trigger>> {
    let schedule: Vec<(Operation, Vec<u8>)> = {
        let settings = ctx.settings()?;
        vec![
            (
                Operation::AddQueuedTasks,
                settings.hours(ADD_QUEUED_TASKS_TIME)?,
            ),
            (Operation::ArchiveTasks, settings.hours(ARCHIVE_TASKS_TIME)?),
            (Operation::SendReminders, settings.hours(SEND_EMAILS_TIME)?),
        ]
    };

    registry.set_property(SHEET_ID_PROPERTY, &ctx.store().identifier())?;

    let flat: Vec<(Operation, u8)> = schedule
        .into_iter()
        .flat_map(|(operation, hours)| hours.into_iter().map(move |hour| (operation, hour)))
        .collect();
    let created = registry.replace_triggers(&flat)?;
    for trigger in &created {
        debug!(id = trigger.id, operation = %trigger.operation, hour = trigger.hour, "Registered trigger");
    }

    info!(at = %ctx.now(), triggers = created.len(), "Saved configuration");
    Ok(created)
}
