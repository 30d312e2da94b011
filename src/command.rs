//! Line commands received over the serial link.

use crate::Store;
use crate::error::Error;
use crate::platform::Platform;
use core::fmt::Write;
#[cfg(feature = "defmt")]
use defmt::trace;
use strum::IntoEnumIterator;

/// Only the first `COMMAND_WINDOW` received bytes are looked at.
pub const COMMAND_WINDOW: usize = 5;

#[derive(strum::EnumIter, strum::AsRefStr, strum::Display, Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[strum(serialize_all = "lowercase")]
pub enum Command {
    /// Dump every valid log entry
    Read,
    /// Invalidate the whole log region
    Erase,
}

impl Command {
    /// Matches the start of the receive window against the known commands, so trailing line
    /// endings or garbage after the command don't matter.
    pub fn parse(input: &[u8]) -> Option<Self> {
        let window = &input[..input.len().min(COMMAND_WINDOW)];
        Command::iter().find(|command| {
            let name: &str = command.as_ref();
            window.starts_with(name.as_bytes())
        })
    }
}

impl<T: Platform> Store<T> {
    /// Runs `command`. `Read` writes one `Log <n>: <text>` line per valid slot to `out`, `Erase`
    /// writes nothing.
    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        trace!("execute: {}", command);

        match command {
            Command::Read => {
                for entry in self.read_logs()? {
                    writeln!(out, "{entry}").map_err(|_| Error::OutputError)?;
                }
                Ok(())
            }
            Command::Erase => self.erase_logs(),
        }
    }

    /// Parses and runs whatever arrived on the serial link. Unknown input is ignored and
    /// reported as `None`.
    pub fn handle_command<W: Write>(
        &mut self,
        input: &[u8],
        out: &mut W,
    ) -> Result<Option<Command>, Error> {
        let Some(command) = Command::parse(input) else {
            return Ok(None);
        };

        self.execute(command, out)?;
        Ok(Some(command))
    }
}
