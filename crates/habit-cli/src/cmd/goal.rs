use crate::output::{print_json, print_table};
use anyhow::{bail, Context};
use chrono::Utc;
use clap::Subcommand;
use habit_core::{chat::ChatMessage, timeline::Goal, types::GoalStatus};
use std::path::Path;

#[derive(Subcommand)]
pub enum GoalSubcommand {
    /// Set the active goal, archiving any current one as dropped
    Set { title: String },

    /// Archive the active goal as completed
    Complete,

    /// Archive the active goal as dropped
    Drop,

    /// Show the active goal
    Show,

    /// List all goals, newest first
    History,
}

pub fn run(root: &Path, subcommand: GoalSubcommand, json: bool) -> anyhow::Result<()> {
    match subcommand {
        GoalSubcommand::Set { title } => set(root, &title),
        GoalSubcommand::Complete => archive(root, GoalStatus::Completed),
        GoalSubcommand::Drop => archive(root, GoalStatus::Dropped),
        GoalSubcommand::Show => show(root, json),
        GoalSubcommand::History => history(root, json),
    }
}

fn set(root: &Path, title: &str) -> anyhow::Result<()> {
    let title = title.trim();
    if title.is_empty() {
        bail!("goal title cannot be empty");
    }

    let now = Utc::now();
    let store = super::open_store(root)?;
    let ledger = store.ledger();
    let mut timeline = store.timeline(now);

    match timeline.active_goal() {
        Some(active) if active.title.trim().eq_ignore_ascii_case(title) => {
            println!("Goal already active: {}", active.title);
            return Ok(());
        }
        Some(active) => {
            let previous = active.title.clone();
            let streak = ledger.streak(now.date_naive());
            timeline.transition_goal(title, GoalStatus::Dropped.as_str(), streak, now);
            println!("Archived: {previous} (dropped, streak {streak})");
        }
        None => {
            timeline.start_new_goal(title, now);
        }
    }

    store
        .save_timeline(&timeline)
        .context("failed to save goal history")?;
    store
        .append_chat(&[ChatMessage::restart_marker(title, now)])
        .context("failed to record journey restart")?;

    println!("Goal set: {title}");
    Ok(())
}

fn archive(root: &Path, status: GoalStatus) -> anyhow::Result<()> {
    let now = Utc::now();
    let store = super::open_store(root)?;
    let ledger = store.ledger();
    let mut timeline = store.timeline(now);

    let Some(active) = timeline.active_goal() else {
        bail!("no active goal to archive");
    };
    let title = active.title.clone();

    timeline.archive_active_goal(status, &ledger, now);
    store
        .save_timeline(&timeline)
        .context("failed to save goal history")?;

    let archived = &timeline.history()[0];
    println!(
        "Goal {}: {title} (final streak {})",
        status, archived.final_streak
    );
    Ok(())
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let now = Utc::now();
    let today = now.date_naive();
    let store = super::open_store(root)?;
    let timeline = store.timeline(now);
    let ledger = store.ledger();

    let Some(active) = timeline.active_goal() else {
        if json {
            return print_json(&serde_json::json!({ "active": null }));
        }
        println!("No active goal. Set one: tinyhabit goal set \"...\"");
        return Ok(());
    };

    if json {
        #[derive(serde::Serialize)]
        struct ShowOutput<'a> {
            active: &'a Goal,
            streak: u32,
            done_today: bool,
        }
        return print_json(&ShowOutput {
            active,
            streak: ledger.streak(today),
            done_today: ledger.is_done(today),
        });
    }

    println!("Goal: {}", active.title);
    println!("Started: {}", active.start_date.date_naive());
    println!("Streak: {} day(s)", ledger.streak(today));
    println!(
        "Today: {}",
        if ledger.is_done(today) { "done" } else { "not done" }
    );
    Ok(())
}

fn history(root: &Path, json: bool) -> anyhow::Result<()> {
    let now = Utc::now();
    let store = super::open_store(root)?;
    let timeline = store.timeline(now);

    if json {
        return print_json(&timeline.history());
    }

    if timeline.is_empty() {
        println!("No goals yet.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = timeline
        .history()
        .iter()
        .map(|g| {
            vec![
                g.title.clone(),
                g.status.to_string(),
                g.start_date.date_naive().to_string(),
                g.end_date
                    .map(|d| d.date_naive().to_string())
                    .unwrap_or_default(),
                g.final_streak.to_string(),
            ]
        })
        .collect();
    print_table(&["TITLE", "STATUS", "STARTED", "ENDED", "STREAK"], &rows);
    Ok(())
}
