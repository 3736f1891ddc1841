use clap::Parser;
use std::process::ExitCode;

use leetcard_sync::cli::Cli;
use leetcard_sync::SyncOutcome;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match leetcard_sync::run(cli).await {
        Ok(report) => {
            let summary = match &report.outcome {
                SyncOutcome::Created { card_id } => format!("created card {}", card_id),
                SyncOutcome::Updated {
                    card_id,
                    fields_changed,
                    tags_added,
                    tags_removed,
                } => format!(
                    "updated card {} ({} fields, +{} / -{} tags)",
                    card_id,
                    fields_changed.len(),
                    tags_added.len(),
                    tags_removed.len()
                ),
                SyncOutcome::Unchanged { card_id } => format!("card {} unchanged", card_id),
                SyncOutcome::Skipped { reason } => format!("skipped: {}", reason),
                SyncOutcome::DryRun {
                    would_create,
                    fields,
                    ..
                } => format!(
                    "dry run: would {} {} fields",
                    if *would_create { "create a card with" } else { "update" },
                    fields.len()
                ),
            };
            println!("{}. {}: {}", report.number, report.title, summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
