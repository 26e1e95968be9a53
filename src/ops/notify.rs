//! Daily reminders for pending tasks.

use crate::context::RunContext;
use crate::engine::pending_by_assignee;
use crate::format::format_plural;
use crate::mail::{MailMessage, Mailer};
use crate::settings::{EXCLUDE_WEEKENDS, SENDER_DESIGNATION, SENDER_NAME};
use crate::types::{Row, TASKS_SHEET, TEAM_SHEET, TeamMember, cell_at, parse_team, task_col};
use anyhow::Result;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

/// Placeholder in the sheet link template replaced by the store id.
pub const SHEET_ID_PLACEHOLDER: &str = "{sheet_id}";

/// Outcome of a reminder run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NotifyReport {
    /// True when the run was skipped because it is a weekend.
    pub skipped: bool,
    /// Recipients, in Team order.
    pub recipients: Vec<String>,
}

impl NotifyReport {
    pub fn sent(&self) -> usize {
        self.recipients.len()
    }
}

/// Build the link to the shared task sheet.
pub fn sheet_link(template: &str, sheet_id: &str) -> String {
    template.replace(SHEET_ID_PLACEHOLDER, &urlencoding::encode(sheet_id))
}

struct Signature {
    name: String,
    designation: String,
}

/// Send one reminder to every team member with tasks pending today.
pub fn send_reminders(
    ctx: &mut RunContext<'_>,
    mailer: &dyn Mailer,
    link: &str,
) -> Result<NotifyReport> {
    let (exclude_weekends, signature) = {
        let settings = ctx.settings()?;
        let signature = Signature {
            name: settings.text(SENDER_NAME).unwrap_or_default(),
            designation: settings.text(SENDER_DESIGNATION).unwrap_or_default(),
        };
        (settings.is_enabled(EXCLUDE_WEEKENDS), signature)
    };
    if exclude_weekends && ctx.is_weekend() {
        info!(weekday = %ctx.weekday(), "Weekend, reminders skipped");
        return Ok(NotifyReport {
            skipped: true,
            recipients: Vec::new(),
        });
    }

    let team = parse_team(&ctx.rows(TEAM_SHEET)?);
    let tasks = ctx.rows(TASKS_SHEET)?;
    let known: HashSet<&str> = team.iter().map(|m| m.name.as_str()).collect();
    let pending = pending_by_assignee(&tasks, &known, ctx.today(), ctx.time_zone());

    let mut report = NotifyReport::default();
    for member in &team {
        let Some(indices) = pending.get(&member.name) else {
            continue;
        };
        let rows: Vec<&Row> = indices.iter().map(|&i| &tasks[i]).collect();
        let message = compose_reminder(member, &rows, ctx.today(), link, &signature);
        mailer.send(&message)?;
        debug!(to = %message.to, tasks = rows.len(), "Sent reminder");
        report.recipients.push(member.email.clone());
    }

    info!(at = %ctx.now(), sent = report.sent(), "Sent emails");
    Ok(report)
}

fn compose_reminder(
    member: &TeamMember,
    tasks: &[&Row],
    today: &str,
    link: &str,
    signature: &Signature,
) -> MailMessage {
    let count = tasks.len();
    let mut body = format!(
        "Dear {},\n\n\
         You have {} {} left to be done today.\n\n\
         Please check \n\n{}\n\n\
         to see the list of all tasks and mark finished tasks as 'Done'.\n\n\
         The following {} for today\n\n",
        member.first_name,
        count,
        format_plural(count, "task that is", "tasks that are"),
        link,
        format_plural(count, "is the pending task", "are the pending tasks"),
    );

    for (number, row) in tasks.iter().enumerate() {
        body.push_str(&format!(
            "{}. {}",
            number + 1,
            cell_at(row, task_col::DESCRIPTION)
        ));
        let project = cell_at(row, task_col::PROJECT);
        if !project.is_blank() {
            body.push_str(&format!(" (Project: {})", project));
        }
        body.push('\n');
    }

    body.push_str(&format!(
        "\nRemember to complete {} before EOD today.\n\n\
         Best Regards\n\n{}\n{}\n",
        format_plural(count, "this task", "these tasks"),
        signature.name,
        signature.designation,
    ));

    MailMessage {
        to: member.email.clone(),
        subject: format!(
            "High priority tasks for {} ({} pending {})",
            today,
            count,
            format_plural(count, "task", "tasks")
        ),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;

    fn member() -> TeamMember {
        TeamMember {
            name: "alice".to_string(),
            first_name: "Alice".to_string(),
            designation: "Engineer".to_string(),
            email: "a@x.com".to_string(),
        }
    }

    fn task(description: &str, project: &str) -> Row {
        vec![
            Cell::from_input("2024-05-01"),
            Cell::from_input(description),
            Cell::from_input(project),
            Cell::from_input("alice"),
            Cell::Empty,
        ]
    }

    fn signature() -> Signature {
        Signature {
            name: "Ops Desk".to_string(),
            designation: "Coordinator".to_string(),
        }
    }

    #[test]
    fn single_task_reminder() {
        let row = task("Write report", "");
        let message = compose_reminder(
            &member(),
            &[&row],
            "2024-05-01",
            "https://sheets/abc",
            &signature(),
        );

        assert_eq!(message.to, "a@x.com");
        assert_eq!(
            message.subject,
            "High priority tasks for 2024-05-01 (1 pending task)"
        );
        assert!(message.body.starts_with("Dear Alice,\n\n"));
        assert!(message.body.contains("You have 1 task that is left to be done today."));
        assert!(message.body.contains("https://sheets/abc"));
        assert!(message.body.contains("The following is the pending task for today"));
        assert!(message.body.contains("1. Write report\n"));
        assert!(message.body.contains("Remember to complete this task before EOD today."));
        assert!(message.body.ends_with("Best Regards\n\nOps Desk\nCoordinator\n"));
    }

    #[test]
    fn several_tasks_with_projects() {
        let first = task("Write report", "Apollo");
        let second = task("Review PR", "");
        let message = compose_reminder(
            &member(),
            &[&first, &second],
            "2024-05-01",
            "link",
            &signature(),
        );

        assert!(message.subject.ends_with("(2 pending tasks)"));
        assert!(message.body.contains("You have 2 tasks that are left"));
        assert!(message.body.contains("1. Write report (Project: Apollo)\n2. Review PR\n"));
        assert!(message.body.contains("complete these tasks"));
    }

    #[test]
    fn link_substitutes_encoded_sheet_id() {
        assert_eq!(
            sheet_link("https://x/ccc?key={sheet_id}#gid=0", "/srv/tasks db"),
            "https://x/ccc?key=%2Fsrv%2Ftasks%20db#gid=0"
        );
        assert_eq!(sheet_link("static", "id"), "static");
    }
}
