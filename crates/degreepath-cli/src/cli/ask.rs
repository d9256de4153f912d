//! One-shot question command over the buffered chat endpoint.
//!
//! Unlike `dpath chat`, this waits for the complete answer in a single
//! response -- useful for scripting and for terminals where streaming
//! output is unwanted.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use degreepath_client::TutorClient;
use degreepath_types::chat::TurnRequest;
use degreepath_types::error::TutorError;

use super::chat::renderer::ChatRenderer;

/// Ask a single question and print the tutor's buffered reply.
pub async fn ask(
    client: &TutorClient,
    student_id: &str,
    message: &str,
    json: bool,
) -> anyhow::Result<()> {
    let message = message.trim();
    if message.is_empty() {
        eprintln!("\n  {} Message is empty.", style("!").red().bold());
        return Ok(());
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("static spinner template"),
    );
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));

    let request = TurnRequest {
        student_id: student_id.to_string(),
        message: message.to_string(),
    };
    let result = client.chat(&request).await;
    spinner.finish_and_clear();

    match result {
        Ok(reply) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&reply)?);
            } else {
                let renderer = ChatRenderer::new();
                println!();
                println!(
                    "  {} {}",
                    style("Tutor").cyan().bold(),
                    renderer.render_final(&reply.response).trim()
                );
                println!();
            }
        }
        Err(TutorError::StudentNotFound) => {
            eprintln!(
                "\n  {} No student with id '{}'. Try `dpath students list`.",
                style("!").red().bold(),
                style(student_id).yellow()
            );
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}
