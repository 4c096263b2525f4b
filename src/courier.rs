//! Alert and sanity letters
//!
//! Provides:
//! - Letter composition (plain text + HTML)
//! - The [`Dispatch`] seam with SMTP and dry-run implementations
//! - [`Notifier`], which addresses one letter per recipient

pub mod letter;
pub mod smtp;

pub use letter::Letter;
pub use smtp::SmtpDispatch;

use crate::error::Result;
use lettre::message::Mailbox;
use std::io::{self, Write};
use tracing::info;

/// Delivers a composed letter to exactly one recipient
pub trait Dispatch {
    fn dispatch(&self, from: &Mailbox, to: &Mailbox, letter: &Letter) -> Result<()>;
}

impl<D: Dispatch + ?Sized> Dispatch for Box<D> {
    fn dispatch(&self, from: &Mailbox, to: &Mailbox, letter: &Letter) -> Result<()> {
        (**self).dispatch(from, to, letter)
    }
}

/// Prints letters to stdout instead of sending them
#[derive(Debug, Default)]
pub struct DryRun;

impl Dispatch for DryRun {
    fn dispatch(&self, from: &Mailbox, to: &Mailbox, letter: &Letter) -> Result<()> {
        write_letter(&mut std::io::stdout().lock(), from, to, letter)?;
        Ok(())
    }
}

/// Render both parts of a letter as it would be sent
pub fn write_letter<W: Write>(out: &mut W, from: &Mailbox, to: &Mailbox, letter: &Letter) -> io::Result<()> {
    writeln!(out, "--- dry run: \"{}\" from {} to {}", letter.subject, from, to)?;
    writeln!(out, "--- text/plain")?;
    write!(out, "{}", letter.plain)?;
    writeln!(out, "--- text/html")?;
    write!(out, "{}", letter.html)?;
    writeln!(out, "---")?;
    Ok(())
}

/// Sends down alerts and sanity letters from a fixed sender
pub struct Notifier<D: Dispatch> {
    sender: Mailbox,
    dispatch: D,
}

impl<D: Dispatch> Notifier<D> {
    pub fn new(sender: Mailbox, dispatch: D) -> Self {
        Self { sender, dispatch }
    }

    /// Tell `recipient` that `url` is down
    ///
    /// A missing `error_code` means no HTTP response was received.
    pub fn send_down_alert(&self, url: &str, recipient: &Mailbox, error_code: Option<u16>) -> Result<()> {
        let code = error_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "Unknown Error".to_string());
        info!(recipient = %recipient, url, code = %code, "sending down alert");

        let letter = Letter::down_alert(url, &code);
        self.dispatch.dispatch(&self.sender, recipient, &letter)
    }

    /// Tell `recipient` the scheduled job is still running
    pub fn send_sanity_check(&self, recipient: &Mailbox) -> Result<()> {
        info!(recipient = %recipient, "sending sanity check");
        self.dispatch
            .dispatch(&self.sender, recipient, &Letter::sanity_check())
    }

    #[cfg(test)]
    pub fn dispatcher(&self) -> &D {
        &self.dispatch
    }
}
