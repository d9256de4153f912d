//! Main chat loop orchestration.
//!
//! Coordinates the conversation lifecycle: student resolution, history
//! load and replay, the input loop with streaming responses, slash
//! commands, cancellation, and the failure notification path.

use std::io::Write;
use std::time::Instant;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::info;

use degreepath_client::TutorClient;
use degreepath_core::chat::ChatSession;
use degreepath_types::chat::{Message, MessageRole};
use degreepath_types::error::TutorError;
use degreepath_types::student::StudentProfile;

use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::ChatRenderer;

/// How many history messages to replay when the session opens.
const HISTORY_REPLAY_LIMIT: usize = 10;

/// Run the interactive chat loop for a student.
pub async fn run_chat_loop(client: &TutorClient, student_id: &str) -> anyhow::Result<()> {
    // Resolve the student up front so a typo fails before the first turn.
    let student = match client.get_student(student_id).await {
        Ok(student) => student,
        Err(TutorError::StudentNotFound) => {
            eprintln!(
                "\n  {} No student with id '{}'. Try `dpath students list`.",
                style("!").red().bold(),
                style(student_id).yellow()
            );
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    let mut session = ChatSession::new(student_id);
    // Best-effort: a failed fetch just starts the session empty.
    session.load_history(client).await?;

    print_welcome_banner(&student, session.transcript().len(), client.base_url());

    let renderer = ChatRenderer::new();
    let replay_from = session.transcript().len().saturating_sub(HISTORY_REPLAY_LIMIT);
    for message in &session.transcript().messages()[replay_from..] {
        print_message(&renderer, message);
    }

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        let event = chat_input.read_line().await;
        match event {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!(
                    "\n  {}",
                    style("Press Ctrl+D to exit, or keep chatting.").dim()
                );
                continue;
            }
            InputEvent::Message(text) => {
                if text.is_empty() {
                    continue;
                }

                // Slash commands
                if let Some(cmd) = commands::parse(&text) {
                    match cmd {
                        ChatCommand::Help => commands::print_help(),
                        ChatCommand::History => {
                            println!();
                            for message in session.transcript().messages() {
                                print_message(&renderer, message);
                            }
                            println!();
                        }
                        ChatCommand::Clear => match session.clear_history(client).await {
                            Ok(()) => println!(
                                "\n  {} Conversation history cleared.\n",
                                style("*").cyan().bold()
                            ),
                            Err(err) => println!(
                                "\n  {} Could not clear history: {err}\n",
                                style("!").red().bold()
                            ),
                        },
                        ChatCommand::Exit => {
                            println!("\n  {}", style("Session ended.").dim());
                            break;
                        }
                        ChatCommand::Unknown(cmd_name) => {
                            println!(
                                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                                style("?").yellow().bold(),
                                style(cmd_name).dim()
                            );
                        }
                    }
                    continue;
                }

                // One streaming turn, cancellable with Ctrl+C.
                let spinner = ProgressBar::new_spinner();
                spinner.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.cyan} {msg}")
                        .expect("static spinner template"),
                );
                spinner.set_message("thinking...");
                spinner.enable_steady_tick(std::time::Duration::from_millis(80));

                let cancel = CancellationToken::new();
                let cancel_on_ctrl_c = cancel.clone();
                let signal_task = tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        cancel_on_ctrl_c.cancel();
                    }
                });

                let start_time = Instant::now();
                let mut first_token_received = false;
                let result = session
                    .send_turn(client, &text, &cancel, |fragment| {
                        if !first_token_received {
                            spinner.finish_and_clear();
                            first_token_received = true;
                            print!("\n  {} ", style("Tutor").cyan().bold());
                            let _ = std::io::stdout().flush();
                        }
                        renderer.print_streaming_token(fragment);
                    })
                    .await;
                signal_task.abort();
                if !first_token_received {
                    spinner.finish_and_clear();
                }

                match result {
                    Ok(receipt) => {
                        let response_ms = start_time.elapsed().as_millis();
                        info!(
                            response_ms,
                            skipped = receipt.skipped_records,
                            "turn completed"
                        );
                        println!();
                        println!(
                            "  {}",
                            style(format!("{response_ms} ms")).dim()
                        );
                        println!();
                    }
                    Err(TutorError::Cancelled) => {
                        println!(
                            "\n  {} Answer cancelled -- your message was not saved.\n",
                            style("!").yellow().bold()
                        );
                    }
                    Err(err) => {
                        eprintln!(
                            "\n  {} The tutor couldn't answer: {err}",
                            style("!").red().bold()
                        );
                        if err.rolled_back() {
                            eprintln!(
                                "  {}\n",
                                style("Your message was not saved -- send it again to retry.")
                                    .dim()
                            );
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

/// Print the session banner: who is chatting and where.
fn print_welcome_banner(student: &StudentProfile, history_len: usize, base_url: &str) {
    println!();
    println!(
        "  {} Chatting as {} ({})",
        style("◆").cyan().bold(),
        style(&student.name).bold(),
        style(&student.student_id).dim()
    );
    println!("  {}", style(&student.degree).dim());
    if let Some(major) = &student.major {
        println!("  {}", style(format!("Major: {major}")).dim());
    }
    if history_len > 0 {
        println!(
            "  {}",
            style(format!("{history_len} earlier messages loaded")).dim()
        );
    }
    println!("  {}", style(format!("Connected to {base_url}")).dim());
    println!("  {}", style("Type /help for commands.").dim());
    println!();
}

/// Print one committed transcript message.
fn print_message(renderer: &ChatRenderer, message: &Message) {
    match message.role {
        MessageRole::Student => {
            println!("  {} {}", style("You >").green().bold(), message.content);
        }
        MessageRole::Tutor => {
            let rendered = renderer.render_final(&message.content);
            println!("  {} {}", style("Tutor").cyan().bold(), rendered.trim());
        }
    }
}
