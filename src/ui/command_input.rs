//! Parsing of console input lines into commands.

use thiserror::Error;

use crate::domain::target::DispatchTarget;

pub const HELP_TEXT: &str = "\
commands:
  /user NAME TEXT     send TEXT to user NAME
  /group NAME TEXT    send TEXT to group NAME
  /broadcast TEXT     send TEXT to everyone
  /help               show this help
  /quit               leave the chat";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Send {
        target: DispatchTarget,
        content: String,
    },
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("unknown command '{0}', try /help")]
    UnknownCommand(String),
    #[error("messages need a target, try /help")]
    MissingTarget,
    #[error("/{0} needs a name")]
    MissingName(&'static str),
    #[error("nothing to send")]
    MissingContent,
}

pub fn parse_line(line: &str) -> Result<ConsoleCommand, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ConsoleCommand::Empty);
    }

    let Some(command_line) = line.strip_prefix('/') else {
        return Err(InputError::MissingTarget);
    };
    let (command, rest) = split_word(command_line);

    match command {
        "user" => addressed(rest, "user", |name| DispatchTarget::user(name)),
        "group" => addressed(rest, "group", |name| DispatchTarget::group(name)),
        "broadcast" => Ok(ConsoleCommand::Send {
            target: DispatchTarget::broadcast(),
            content: content(rest)?,
        }),
        "help" => Ok(ConsoleCommand::Help),
        "quit" | "exit" => Ok(ConsoleCommand::Quit),
        other => Err(InputError::UnknownCommand(other.to_owned())),
    }
}

fn addressed(
    rest: &str,
    command: &'static str,
    target: impl FnOnce(&str) -> DispatchTarget,
) -> Result<ConsoleCommand, InputError> {
    let (name, text) = split_word(rest);
    if name.is_empty() {
        return Err(InputError::MissingName(command));
    }

    Ok(ConsoleCommand::Send {
        target: target(name),
        content: content(text)?,
    })
}

fn content(text: &str) -> Result<String, InputError> {
    if text.is_empty() {
        return Err(InputError::MissingContent);
    }
    Ok(text.to_owned())
}

/// Splits off the first whitespace-delimited word; the remainder is trimmed.
fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}
