use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::usecases::{
    contracts::PresentationSink, dispatch::DispatchRequest, receive::ReceiveSummary,
    session::ChatSession,
};

use super::command_input::{parse_line, ConsoleCommand, HELP_TEXT};

const SHELL_STARTED: &str = "SHELL_STARTED";
const SHELL_CHANNEL_LOST: &str = "SHELL_CHANNEL_LOST";
const SHELL_STOPPED: &str = "SHELL_STOPPED";

/// What the shell leaves behind once the chat ends.
#[derive(Debug)]
pub struct ShellOutcome<S> {
    pub sink: S,
    pub summary: ReceiveSummary,
}

/// Runs the interactive chat for `username`.
///
/// Incoming messages are rendered into `sink` by a background task while
/// `input` lines are turned into dispatches. Feedback goes to `out`. The chat
/// ends on `/quit`, end of input, or when the server drops the channel.
pub async fn start<R, W, S>(
    session: &mut ChatSession,
    username: &str,
    input: R,
    mut out: W,
    sink: S,
) -> Result<ShellOutcome<S>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    S: PresentationSink + 'static,
{
    let frames = session.connect(username).await?;
    tracing::info!(code = SHELL_STARTED, username, "chat shell started");
    writeln!(out, "connected as {username}, /help lists commands")?;

    let receiver = session.receiver();
    let mut receive_task = tokio::spawn(async move {
        let mut sink = sink;
        let summary = receiver.run(frames, &mut sink).await;
        (sink, summary)
    });

    let mut lines = input.lines();
    let mut finished = None;
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_line(session, username, &line, &mut out).await? {
                    break;
                }
            }
            joined = &mut receive_task => {
                tracing::warn!(
                    code = SHELL_CHANNEL_LOST,
                    username,
                    "chat channel closed by server"
                );
                writeln!(out, "! connection to chat server lost")?;
                finished = Some(joined?);
                break;
            }
        }
    }

    session.disconnect().await;
    let (sink, summary) = match finished {
        Some(finished) => finished,
        None => receive_task.await?,
    };
    tracing::info!(
        code = SHELL_STOPPED,
        presented = summary.presented,
        dropped = summary.dropped,
        "chat shell stopped"
    );

    Ok(ShellOutcome { sink, summary })
}

/// Handles one input line; returns `false` when the user asked to leave.
async fn handle_line<W: Write>(
    session: &ChatSession,
    username: &str,
    line: &str,
    out: &mut W,
) -> Result<bool> {
    match parse_line(line) {
        Ok(ConsoleCommand::Quit) => return Ok(false),
        Ok(ConsoleCommand::Empty) => {}
        Ok(ConsoleCommand::Help) => writeln!(out, "{HELP_TEXT}")?,
        Ok(ConsoleCommand::Send { target, content }) => {
            let request = DispatchRequest::new(username, content, target);
            if let Err(error) = session.dispatch(request).await {
                writeln!(out, "! {error}")?;
            }
        }
        Err(error) => writeln!(out, "! {error}")?,
    }

    Ok(true)
}
