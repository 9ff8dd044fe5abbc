//! Console rendering of presented messages.

use std::io::Write;

use crate::{domain::message::PresentedMessage, usecases::contracts::PresentationSink};

const CONSOLE_WRITE_FAILED: &str = "CONSOLE_WRITE_FAILED";

/// Presentation sink writing one line per message.
pub struct ConsoleSink<W> {
    out: W,
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> PresentationSink for ConsoleSink<W> {
    fn append(&mut self, message: PresentedMessage) {
        let written =
            writeln!(self.out, "{}", message.display_line()).and_then(|()| self.out.flush());
        if let Err(error) = written {
            tracing::warn!(
                code = CONSOLE_WRITE_FAILED,
                error = %error,
                "failed to write message to console"
            );
        }
    }
}
