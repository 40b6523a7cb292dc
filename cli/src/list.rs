use chrono::NaiveDate;
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};
use zentask_core::Task;

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Done")]
    done: &'static str,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Title")]
    title: String,
}

impl TaskRow {
    fn from_task(task: &Task, today: NaiveDate) -> Self {
        let due = match task.due_date {
            Some(d) if task.is_overdue(today) => format!("{} !", d.format("%Y-%m-%d")),
            Some(d) => d.format("%Y-%m-%d").to_string(),
            None => "-".to_string(),
        };
        Self {
            id: task.short_id(),
            done: if task.completed { "x" } else { "" },
            priority: task.priority.to_string(),
            due,
            title: task.title.clone(),
        }
    }
}

pub fn render_tasks(tasks: &[&Task], today: NaiveDate) -> String {
    let rows: Vec<TaskRow> = tasks.iter().map(|t| TaskRow::from_task(t, today)).collect();

    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use zentask_core::{Priority, TaskDraft};

    #[test]
    fn test_render_marks_completed_and_overdue() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let mut done = Task::from_draft(TaskDraft::new("Done thing").with_priority(Priority::Low));
        done.completed = true;
        let late = Task::from_draft(
            TaskDraft::new("Late thing").with_due_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
        );

        let out = render_tasks(&[&done, &late], today);

        assert!(out.contains("Done thing"));
        assert!(out.contains("Low"));
        assert!(out.contains("2025-01-01 !"));
        assert!(out.contains(&late.short_id()));
    }
}
