//! DegreePath Tutor CLI entry point.
//!
//! Binary name: `dpath`
//!
//! Parses CLI arguments, resolves the client configuration, then
//! dispatches to the appropriate command handler.

mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use degreepath_client::TutorClient;
use degreepath_client::config::{default_config_dir, load_client_config};

use cli::{Cli, Commands, StudentCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,degreepath=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    // Resolve configuration: config.toml, then the --base-url/env override.
    let mut config = match default_config_dir() {
        Some(dir) => load_client_config(&dir).await,
        None => Default::default(),
    };
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    let client = TutorClient::new(&config);

    match cli.command {
        Commands::Chat { student_id } => {
            cli::chat::run_chat_loop(&client, &student_id).await?;
        }

        Commands::Ask {
            student_id,
            message,
        } => {
            cli::ask::ask(&client, &student_id, &message, cli.json).await?;
        }

        Commands::History { student_id } => {
            cli::history::show_history(&client, &student_id, cli.json).await?;
        }

        Commands::Clear { student_id, force } => {
            cli::history::clear_history(&client, &student_id, force, cli.json).await?;
        }

        Commands::Students { action } => match action {
            StudentCommand::List => {
                cli::student::list_students(&client, cli.json).await?;
            }
            StudentCommand::Show { student_id } => {
                cli::student::show_student(&client, &student_id, cli.json).await?;
            }
            StudentCommand::Create {
                student_id,
                name,
                degree,
                major,
                completed,
                enrolled,
            } => {
                cli::student::create_student(
                    &client, student_id, name, degree, major, completed, enrolled, cli.json,
                )
                .await?;
            }
        },

        Commands::Status => {
            cli::status::status(&client, cli.json).await?;
        }
    }

    Ok(())
}
