//! Command-line surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use parley::llm::Provider;

pub mod history;
pub mod repl;

#[derive(Parser)]
#[command(name = "parley", version, about = "Chat with hosted LLMs from the terminal")]
pub struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true, default_value = "parley.yaml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start an interactive chat
    Chat {
        /// Model to use (chatgpt, claude, deepseek)
        #[arg(short, long)]
        model: Option<String>,

        /// Continue a stored conversation
        #[arg(short, long, value_name = "CONVERSATION_ID")]
        resume: Option<String>,
    },

    /// Send a single message and print the reply
    Ask {
        /// Model to use (chatgpt, claude, deepseek)
        #[arg(short, long)]
        model: Option<String>,

        /// The message to send
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
    },

    /// List stored conversations, newest first
    History {
        /// Keep printing the list as it changes
        #[arg(short, long)]
        follow: bool,
    },

    /// Print a stored conversation
    Show {
        #[arg(value_name = "CONVERSATION_ID")]
        id: String,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Unknown models are allowed through; the adapter answers them with a sentinel.
pub fn warn_if_unknown(model: &str) {
    if model.parse::<Provider>().is_err() {
        eprintln!(
            "warning: '{model}' is not a supported model ({}); replies will be \"Unknown model\"",
            supported_models()
        );
    }
}

pub fn supported_models() -> String {
    Provider::ALL
        .iter()
        .map(Provider::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
