//! Interactive chat loop.

use anyhow::Result;
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};

use parley::chat::ChatSession;
use parley::llm::Role;

use super::{history, supported_models, warn_if_unknown};

const HELP: &str = "\
Commands:
  /model [ID]   show or switch the model
  /new          start a new conversation
  /history      list stored conversations
  /help         show this help
  /quit         exit (or Ctrl-D)";

/// A line typed at the prompt.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Message(&'a str),
    Model(Option<&'a str>),
    New,
    History,
    Help,
    Quit,
    Unknown(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix('/') else {
        return Input::Message(line);
    };

    let (name, args) = command
        .split_once(char::is_whitespace)
        .map(|(n, a)| (n, a.trim()))
        .unwrap_or((command, ""));

    match name {
        "model" => Input::Model((!args.is_empty()).then_some(args)),
        "new" => Input::New,
        "history" => Input::History,
        "help" => Input::Help,
        "quit" | "exit" => Input::Quit,
        _ => Input::Unknown(name),
    }
}

pub async fn run(session: &mut ChatSession) -> Result<()> {
    let mut line_editor = Reedline::create();

    println!(
        "Chatting as {} with {}. Type /help for commands.",
        session.user(),
        session.model()
    );
    for message in session.transcript() {
        let speaker = match message.role {
            Role::User => "you",
            Role::Assistant => "assistant",
        };
        println!("{speaker}> {}\n", message.content);
    }

    loop {
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic(session.model().to_string()),
            DefaultPromptSegment::Empty,
        );

        let line = match line_editor.read_line(&prompt)? {
            Signal::Success(line) => line,
            Signal::CtrlD => break,
            _ => continue,
        };

        if line.trim().is_empty() {
            continue;
        }

        match parse_input(&line) {
            Input::Message(content) => {
                let reply = session.send(content).await?;
                println!("{}> {}\n", session.model(), reply);
            }
            Input::Model(None) => {
                println!("model: {} (available: {})", session.model(), supported_models());
            }
            Input::Model(Some(model)) => {
                warn_if_unknown(model);
                session.set_model(model);
            }
            Input::New => {
                session.reset();
                println!("Started a new conversation.");
            }
            Input::History => {
                print!("{}", history::listing(session.store(), session.user()).await);
            }
            Input::Help => println!("{HELP}"),
            Input::Quit => break,
            Input::Unknown(name) => println!("Unknown command '/{name}'. Type /help."),
        }
    }

    Ok(())
}
