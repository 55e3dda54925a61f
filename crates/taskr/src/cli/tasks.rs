/*
[INPUT]:  Task commands for the logged-in user
[OUTPUT]: Printed task lists and server-side task changes
[POS]:    CLI layer - task commands on top of TaskService
[UPDATE]: When task commands or list layout change
*/

use anyhow::Result;
use console::{Style, style};
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use std::io::IsTerminal;
use taskr::{TaskBoard, TaskService, UndoOutcome};
use taskr_client::{NewTask, Priority, Task, TaskEdit, TaskrClient, TaskrError};
use tokio::sync::oneshot;

use super::AppContext;

pub async fn list(ctx: &AppContext) -> Result<()> {
    let service = load(ctx).await?;
    print_active(service.board(), ctx.prefs.is_dark_mode().await);
    Ok(())
}

pub async fn completed(ctx: &AppContext) -> Result<()> {
    let service = load(ctx).await?;
    let done = service.board().completed();
    if done.is_empty() {
        println!("{}", style("No completed tasks.").dim());
        return Ok(());
    }

    println!("{}", style("Completed").bold().underlined());
    for task in done {
        let when = task.completed_at.as_deref().unwrap_or("-");
        println!(
            "  {} {}  {}",
            style(format!("#{:<4}", task.id)).dim(),
            task.title,
            style(when).dim()
        );
    }
    Ok(())
}

pub async fn add(
    ctx: &AppContext,
    title: String,
    description: Option<String>,
    priority: Priority,
    due: Option<String>,
) -> Result<()> {
    let mut service = online(ctx).await?;
    let mut task = NewTask::new(title, priority);
    task.description = description;
    task.due_date = due;

    service.add(task).await?;
    println!("{}", style("Task added.").green());
    print_active(service.board(), ctx.prefs.is_dark_mode().await);
    Ok(())
}

pub async fn edit(
    ctx: &AppContext,
    id: i64,
    title: Option<String>,
    description: Option<String>,
    priority: Option<Priority>,
) -> Result<()> {
    let mut service = online(ctx).await?;
    let current = existing(service.board(), id)?;

    let edit = if title.is_none() && description.is_none() && priority.is_none() {
        prompt_edit(&current)?
    } else {
        edit_from_flags(&current, title, description, priority)
    };

    service.edit(id, edit).await?;
    println!("{}", style("Task updated.").green());
    Ok(())
}

pub async fn complete(ctx: &AppContext, id: i64, no_undo: bool) -> Result<()> {
    let mut service = online(ctx).await?;
    let title = existing(service.board(), id)?.title;

    let ticket = service.complete(id).await?;
    println!("{} {}", style("Completed").green(), style(&title).bold());

    if no_undo || !std::io::stdin().is_terminal() {
        service.undo_window().dismiss();
        return Ok(());
    }

    let secs = service.undo_window().duration().as_secs();
    println!(
        "{}",
        style(format!("Press Enter within {secs}s to undo.")).dim()
    );

    // plain thread: a pending stdin read must not hold up runtime shutdown
    let (enter_tx, enter_rx) = oneshot::channel();
    std::thread::spawn(move || {
        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_ok_and(|read| read > 0) {
            let _ = enter_tx.send(());
        }
    });

    let outcome = tokio::select! {
        outcome = ticket.wait() => outcome,
        Ok(()) = enter_rx => UndoOutcome::Cancelled,
    };

    if outcome == UndoOutcome::Cancelled && service.undo_complete().await?.is_some() {
        println!("{} {}", style("Restored").yellow(), style(&title).bold());
    }
    Ok(())
}

pub async fn reopen(ctx: &AppContext, id: i64) -> Result<()> {
    let mut service = online(ctx).await?;
    service.reopen(id).await?;
    println!("{}", style("Task moved back to the list.").green());
    Ok(())
}

pub async fn delete(ctx: &AppContext, id: i64, yes: bool) -> Result<()> {
    let mut service = online(ctx).await?;
    let task = existing(service.board(), id)?;

    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete '{}'?", task.title))
            .default(false)
            .interact()?;
        if !confirmed {
            return Ok(());
        }
    }

    service.delete(id).await?;
    println!("{}", style("Task deleted.").green());
    Ok(())
}

pub async fn reorder(ctx: &AppContext, id: i64, position: usize) -> Result<()> {
    let mut service = load(ctx).await?;
    let changes = service.reorder(id, position.saturating_sub(1))?;
    tracing::debug!(task_id = id, changed = changes.len(), "order saved locally");
    print_active(service.board(), ctx.prefs.is_dark_mode().await);
    Ok(())
}

/// Service with a fresh server snapshot; no offline fallback
async fn online(ctx: &AppContext) -> Result<TaskService<TaskrClient>> {
    let session = ctx.prefs.require_session().await?;
    let mut service = ctx.service(&session)?;
    service.refresh().await?;
    Ok(service)
}

/// Service for read-only views; falls back to the offline copy when the
/// server cannot be reached
async fn load(ctx: &AppContext) -> Result<TaskService<TaskrClient>> {
    let session = ctx.prefs.require_session().await?;
    let mut service = ctx.service(&session)?;

    match service.refresh().await {
        Ok(()) => Ok(service),
        Err(err) if is_network(&err) && ctx.config.offline.enabled => {
            let count = service.load_offline()?;
            println!(
                "{}",
                style(format!("Server unreachable, showing offline copy ({count} tasks).")).yellow()
            );
            Ok(service)
        }
        Err(err) => Err(err),
    }
}

fn is_network(err: &anyhow::Error) -> bool {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<TaskrError>())
        .is_some_and(TaskrError::is_network)
}

fn existing(board: &TaskBoard, id: i64) -> Result<Task> {
    board
        .get(id)
        .cloned()
        .ok_or_else(|| TaskrError::NotFound { task_id: id }.into())
}

/// Fields not given keep their current value. An empty `--description`
/// clears the description once normalised.
fn edit_from_flags(
    current: &Task,
    title: Option<String>,
    description: Option<String>,
    priority: Option<Priority>,
) -> TaskEdit {
    TaskEdit {
        title: title.unwrap_or_else(|| current.title.clone()),
        description: description.or_else(|| current.description.clone()),
        priority: priority.unwrap_or(current.priority),
    }
}

fn prompt_edit(current: &Task) -> Result<TaskEdit> {
    let theme = ColorfulTheme::default();
    let title: String = Input::with_theme(&theme)
        .with_prompt("Title")
        .default(current.title.clone())
        .interact_text()?;
    let description: String = Input::with_theme(&theme)
        .with_prompt("Description")
        .default(current.description.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    let labels: Vec<&str> = Priority::ALL.iter().map(|priority| priority.heading()).collect();
    let selected = Select::with_theme(&theme)
        .with_prompt("Priority")
        .items(&labels)
        .default(
            Priority::ALL
                .iter()
                .position(|priority| *priority == current.priority)
                .unwrap_or(1),
        )
        .interact()?;

    Ok(TaskEdit {
        title,
        description: Some(description),
        priority: Priority::ALL[selected],
    })
}

/// Group heading colour; dark mode uses the bright variants
fn heading_style(priority: Priority, dark_mode: bool) -> Style {
    let style = match priority {
        Priority::High => Style::new().red(),
        Priority::Medium => Style::new().yellow(),
        Priority::Low => Style::new().green(),
    };
    if dark_mode { style.bright().bold() } else { style.bold() }
}

fn print_active(board: &TaskBoard, dark_mode: bool) {
    let groups = board.active();
    if groups.is_empty() {
        println!("{}", style("No tasks. Add one with `taskr add`.").dim());
        return;
    }

    for group in groups {
        let heading = heading_style(group.priority, dark_mode).apply_to(group.priority.heading());
        println!("{heading}");
        for (position, task) in group.tasks.iter().enumerate() {
            print_task(position + 1, task);
        }
    }
}

fn print_task(position: usize, task: &Task) {
    let mut line = format!(
        "  {}. {} {}",
        position,
        task.title,
        style(format!("#{}", task.id)).dim()
    );
    if let Some(due) = &task.due_date {
        line.push_str(&format!(" {}", style(format!("due {due}")).cyan()));
    }
    println!("{line}");
    if let Some(description) = &task.description {
        println!("     {}", style(description).dim());
    }
}
