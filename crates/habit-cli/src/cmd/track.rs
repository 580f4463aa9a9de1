use crate::output::print_json;
use anyhow::{bail, Context};
use chrono::{NaiveDate, Utc};
use std::path::Path;

/// Mark or unmark a day in the completion ledger.
pub fn run(root: &Path, date: Option<&str>, done: bool, json: bool) -> anyhow::Result<()> {
    let today = Utc::now().date_naive();
    let day = match date {
        Some(raw) => parse_day(raw)?,
        None => today,
    };

    let store = super::open_store(root)?;
    if done {
        store.mark_done(day).context("failed to update ledger")?;
    } else {
        store.mark_not_done(day).context("failed to update ledger")?;
    }

    let streak = store.ledger().streak(today);
    if json {
        return print_json(&serde_json::json!({
            "day": day.to_string(),
            "done": done,
            "streak": streak,
        }));
    }

    if done {
        println!("Marked done: {day}");
    } else {
        println!("Unmarked: {day}");
    }
    println!("Streak: {streak} day(s)");
    Ok(())
}

fn parse_day(raw: &str) -> anyhow::Result<NaiveDate> {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(day) => Ok(day),
        Err(_) => bail!("invalid day '{raw}': expected YYYY-MM-DD"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_days() {
        assert_eq!(
            parse_day("2026-08-24").unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 24).unwrap()
        );
    }

    #[test]
    fn rejects_other_formats() {
        assert!(parse_day("24/08/2026").is_err());
        assert!(parse_day("yesterday").is_err());
    }
}
