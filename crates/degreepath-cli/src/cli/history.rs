//! History display and deletion commands.

use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use console::style;

use degreepath_client::TutorClient;
use degreepath_core::transport::TutorTransport;
use degreepath_types::error::TutorError;

/// Show the persisted conversation history for a student.
pub async fn show_history(
    client: &TutorClient,
    student_id: &str,
    json: bool,
) -> anyhow::Result<()> {
    let history = match client.fetch_history(student_id).await {
        Ok(history) => history,
        Err(TutorError::StudentNotFound) => {
            eprintln!(
                "\n  {} No student with id '{}'.",
                style("!").red().bold(),
                style(student_id).yellow()
            );
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    if history.messages.is_empty() {
        println!(
            "\n  {} No conversation history for {student_id}.\n",
            style("·").dim()
        );
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Role", "Time", "Message"]);

    for wire in &history.messages {
        let time = wire
            .timestamp
            .as_deref()
            .and_then(degreepath_types::chat::parse_instant)
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(&wire.role),
            Cell::new(time),
            Cell::new(&wire.content),
        ]);
    }

    println!();
    println!("{table}");
    println!(
        "  {}",
        style(format!("{} messages", history.total_messages)).dim()
    );
    println!();
    Ok(())
}

/// Delete the conversation history for a student.
pub async fn clear_history(
    client: &TutorClient,
    student_id: &str,
    force: bool,
    json: bool,
) -> anyhow::Result<()> {
    if !force {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Delete all conversation history for {student_id}?"))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("  {}", style("Aborted.").dim());
            return Ok(());
        }
    }

    match client.clear_history(student_id).await {
        Ok(receipt) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&receipt)?);
            } else {
                println!(
                    "\n  {} History cleared for {}.\n",
                    style("✓").green().bold(),
                    style(&receipt.student_id).bold()
                );
            }
        }
        Err(TutorError::StudentNotFound) => {
            eprintln!(
                "\n  {} No student with id '{}'.",
                style("!").red().bold(),
                style(student_id).yellow()
            );
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}
