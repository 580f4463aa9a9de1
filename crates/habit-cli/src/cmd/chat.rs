use crate::output::print_json;
use anyhow::Context;
use chrono::Utc;
use habit_core::session::Session;
use std::path::Path;

pub fn run(root: &Path, message: &str, json: bool) -> anyhow::Result<()> {
    super::open_store(root)?;
    let mut session = Session::open(root).context("failed to open chat session")?;
    let outcome = session.send_message(message, Utc::now())?;

    if json {
        #[derive(serde::Serialize)]
        struct ChatOutput<'a> {
            reply: &'a str,
            deal: Option<&'a habit_core::deal::DealCandidate>,
            completion_claim: bool,
            offline: bool,
        }
        return print_json(&ChatOutput {
            reply: &outcome.reply,
            deal: outcome.deal.as_ref(),
            completion_claim: outcome.completion_claim,
            offline: outcome.offline,
        });
    }

    if outcome.offline {
        tracing::warn!("coach unreachable, using offline reply");
    }
    println!("{}", outcome.reply);

    if let Some(deal) = &outcome.deal {
        println!("\nDeal on the table: {}", deal.label);
        println!("Finish it, then mark the day: tinyhabit done");
    }
    if outcome.completion_claim {
        println!("\nSounds like today's goal is done. Record it: tinyhabit done");
    }
    Ok(())
}
