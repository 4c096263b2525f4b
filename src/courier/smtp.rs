//! SMTP delivery over implicit TLS

use crate::courier::{Dispatch, Letter};
use crate::error::{Error, Result};
use crate::manifest::{Secret, SmtpConfig};
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{SmtpTransport, Transport};
use tracing::{debug, info};

/// Authenticated submission to a single SMTP relay
///
/// Each letter opens its own connection; nothing is pooled between sends.
pub struct SmtpDispatch {
    transport: SmtpTransport,
    host: String,
}

impl SmtpDispatch {
    /// Set up the relay; no connection is made until the first send
    pub fn new(smtp: &SmtpConfig, username: &str, password: &Secret) -> Result<Self> {
        let transport = SmtpTransport::relay(&smtp.host)
            .map_err(|source| Error::SmtpSetup {
                host: smtp.host.clone(),
                source,
            })?
            .port(smtp.port)
            .credentials(Credentials::new(
                username.to_string(),
                password.expose().to_string(),
            ))
            .timeout(Some(smtp.timeout))
            .build();

        Ok(Self {
            transport,
            host: format!("{}:{}", smtp.host, smtp.port),
        })
    }
}

impl Dispatch for SmtpDispatch {
    fn dispatch(&self, from: &Mailbox, to: &Mailbox, letter: &Letter) -> Result<()> {
        let message = letter.to_message(from, to)?;

        debug!(relay = %self.host, recipient = %to, subject = %letter.subject, "submitting letter");
        let response = self
            .transport
            .send(&message)
            .map_err(|source| Error::DeliveryFailed {
                recipient: to.to_string(),
                source,
            })?;

        info!(
            recipient = %to,
            subject = %letter.subject,
            code = %response.code(),
            "letter delivered"
        );
        Ok(())
    }
}
