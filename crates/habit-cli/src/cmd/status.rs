use crate::output::print_json;
use chrono::Utc;
use habit_core::ledger::{self, DayCompletion};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let now = Utc::now();
    let today = now.date_naive();
    let store = super::open_store(root)?;
    let timeline = store.timeline(now);
    let ledger = store.ledger();

    let window = ledger.trailing_window(today, ledger::DEFAULT_WINDOW_DAYS);
    let rate = ledger::consistency_rate(&window);

    if json {
        #[derive(serde::Serialize)]
        struct StatusOutput<'a> {
            goal: Option<&'a str>,
            done_today: bool,
            streak: u32,
            window: &'a [DayCompletion],
            consistency: f64,
        }
        return print_json(&StatusOutput {
            goal: timeline.active_goal().map(|g| g.title.as_str()),
            done_today: ledger.is_done(today),
            streak: ledger.streak(today),
            window: &window,
            consistency: rate,
        });
    }

    match timeline.active_goal() {
        Some(goal) => println!("Goal: {}", goal.title),
        None => println!("Goal: (none)"),
    }
    println!(
        "Today: {}",
        if ledger.is_done(today) { "done" } else { "not done" }
    );
    println!("Streak: {} day(s)", ledger.streak(today));
    println!("Last {} days: {} ({:.0}%)", window.len(), sparkline(&window), rate);
    Ok(())
}

fn sparkline(window: &[DayCompletion]) -> String {
    window
        .iter()
        .map(|d| if d.done { '#' } else { '.' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn sparkline_marks_done_days() {
        let day = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        let window = vec![
            DayCompletion { day, done: true },
            DayCompletion { day, done: false },
            DayCompletion { day, done: true },
        ];
        assert_eq!(sparkline(&window), "#.#");
    }
}
