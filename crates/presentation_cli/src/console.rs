//! Console transport
//!
//! Plays the part of the chat front end for a single identity: each stdin
//! line becomes an inbound event, and the replies the engine queued for it
//! are rendered to stdout.

use std::io::Write as _;

use application::{ConversationEngine, InboundEvent, Reply};
use domain::Identity;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc::UnboundedReceiver,
};
use tracing::{debug, warn};

use crate::render::render;

const HELP: &str = "Commands: /start, /lang <ro|ru>, /children <n>, /date <YYYY-MM-DD HH:MM>, \
                    /tap <button payload> (e.g. /tap date_2024-12-25_1000), /quit. \
                    Anything else is sent as text.";

/// What a console line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    /// Deliver an event to the engine
    Event(InboundEvent),
    /// Print usage
    Help,
    /// Leave the chat
    Quit,
    /// A command with missing or malformed arguments
    Unrecognized(String),
}

/// Map one console line to an input
pub fn parse_line(line: &str) -> ConsoleInput {
    let trimmed = line.trim();
    let (command, argument) = match trimmed.split_once(char::is_whitespace) {
        Some((command, argument)) => (command, argument.trim()),
        None => (trimmed, ""),
    };

    match command {
        "/start" => ConsoleInput::Event(InboundEvent::Start),
        "/help" => ConsoleInput::Help,
        "/quit" | "/exit" => ConsoleInput::Quit,
        "/lang" if !argument.is_empty() => {
            ConsoleInput::Event(InboundEvent::LanguageSelected(argument.to_string()))
        },
        "/children" => argument.parse::<u8>().map_or_else(
            |_| ConsoleInput::Unrecognized(trimmed.to_string()),
            |count| ConsoleInput::Event(InboundEvent::ChildCountSelected(count)),
        ),
        "/date" if !argument.is_empty() => {
            ConsoleInput::Event(InboundEvent::DateSelected(argument.to_string()))
        },
        "/tap" => InboundEvent::from_callback(argument).map_or_else(
            || ConsoleInput::Unrecognized(trimmed.to_string()),
            ConsoleInput::Event,
        ),
        "/lang" | "/date" => ConsoleInput::Unrecognized(trimmed.to_string()),
        _ => ConsoleInput::Event(InboundEvent::Text(line.to_string())),
    }
}

/// Run an interactive chat for `identity` until stdin closes or `/quit`
pub async fn run_chat(
    engine: &ConversationEngine,
    identity: &Identity,
    replies: &mut UnboundedReceiver<Reply>,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();

    writeln!(stdout, "Chatting as {identity}. {HELP}")?;

    while let Some(line) = lines.next_line().await? {
        let event = match parse_line(&line) {
            ConsoleInput::Event(event) => event,
            ConsoleInput::Help => {
                writeln!(stdout, "{HELP}")?;
                continue;
            },
            ConsoleInput::Quit => break,
            ConsoleInput::Unrecognized(input) => {
                writeln!(stdout, "Unrecognized command: {input}")?;
                continue;
            },
        };

        debug!(event = event.name(), "Console event");
        if let Err(e) = engine.handle(identity, event).await {
            warn!(error = %e, "Event could not be processed");
            writeln!(stdout, "! {e}")?;
        }

        while let Ok(reply) = replies.try_recv() {
            writeln!(stdout, "{}\n", render(&reply))?;
        }
        stdout.flush()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_commands() {
        assert_eq!(parse_line("/start"), ConsoleInput::Event(InboundEvent::Start));
        assert_eq!(
            parse_line("/lang ru"),
            ConsoleInput::Event(InboundEvent::LanguageSelected("ru".to_string()))
        );
        assert_eq!(
            parse_line("/children 3"),
            ConsoleInput::Event(InboundEvent::ChildCountSelected(3))
        );
        assert_eq!(
            parse_line("/date 2024-12-25 10:00"),
            ConsoleInput::Event(InboundEvent::DateSelected("2024-12-25 10:00".to_string()))
        );
        assert_eq!(parse_line("/quit"), ConsoleInput::Quit);
    }

    #[test]
    fn button_payloads() {
        assert_eq!(
            parse_line("/tap children_2"),
            ConsoleInput::Event(InboundEvent::ChildCountSelected(2))
        );
        assert_eq!(
            parse_line("/tap ro"),
            ConsoleInput::Event(InboundEvent::LanguageSelected("ro".to_string()))
        );
        assert!(matches!(parse_line("/tap"), ConsoleInput::Unrecognized(_)));
        assert!(matches!(parse_line("/tap nonsense"), ConsoleInput::Unrecognized(_)));
    }

    #[test]
    fn text_shaped_like_a_payload_stays_text() {
        assert_eq!(
            parse_line("Ro"),
            ConsoleInput::Event(InboundEvent::Text("Ro".to_string()))
        );
        assert_eq!(
            parse_line("ro"),
            ConsoleInput::Event(InboundEvent::Text("ro".to_string()))
        );
        assert_eq!(
            parse_line("children_2"),
            ConsoleInput::Event(InboundEvent::Text("children_2".to_string()))
        );
    }

    #[test]
    fn free_text_is_passed_through() {
        assert_eq!(
            parse_line("Chisinau, str. Test 5"),
            ConsoleInput::Event(InboundEvent::Text("Chisinau, str. Test 5".to_string()))
        );
    }

    #[test]
    fn malformed_commands() {
        assert!(matches!(parse_line("/children many"), ConsoleInput::Unrecognized(_)));
        assert!(matches!(parse_line("/lang"), ConsoleInput::Unrecognized(_)));
    }
}
