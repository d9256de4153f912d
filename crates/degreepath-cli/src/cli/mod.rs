//! CLI command definitions and dispatch for the `dpath` binary.
//!
//! Uses clap derive macros for argument parsing. Chat is the primary
//! command; history, clear, students, and status wrap the buffered
//! endpoints.

pub mod ask;
pub mod chat;
pub mod history;
pub mod status;
pub mod student;

use clap::{Parser, Subcommand};

/// Talk to your academic tutor from the terminal.
#[derive(Parser)]
#[command(name = "dpath", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Tutor Service base URL (overrides config.toml).
    #[arg(long, global = true, env = "DPATH_BASE_URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat session with the tutor.
    Chat {
        /// Student to chat as.
        student_id: String,
    },

    /// Ask one question and wait for the complete (non-streaming) answer.
    Ask {
        /// Student to ask as.
        student_id: String,

        /// The question text.
        message: String,
    },

    /// Show the persisted conversation history for a student.
    History {
        /// Student whose history to show.
        student_id: String,
    },

    /// Delete the conversation history for a student.
    #[command(alias = "rm")]
    Clear {
        /// Student whose history to delete.
        student_id: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Manage student profiles.
    Students {
        #[command(subcommand)]
        action: StudentCommand,
    },

    /// Tutor Service health summary.
    Status,
}

#[derive(Subcommand)]
pub enum StudentCommand {
    /// List all known students.
    #[command(alias = "ls")]
    List,

    /// Show one student profile.
    Show {
        /// Student ID to display.
        student_id: String,
    },

    /// Register a new student profile.
    Create {
        /// Student ID (e.g., demo001).
        #[arg(long = "id")]
        student_id: String,

        /// Full name.
        #[arg(long)]
        name: String,

        /// Degree title.
        #[arg(long)]
        degree: String,

        /// Major, if declared.
        #[arg(long)]
        major: Option<String>,

        /// Completed unit codes (comma separated).
        #[arg(long, value_delimiter = ',')]
        completed: Vec<String>,

        /// Currently enrolled unit codes (comma separated).
        #[arg(long, value_delimiter = ',')]
        enrolled: Vec<String>,
    },
}
