//! Letter composition
//!
//! Every letter has a plain text body and an HTML body carrying the same
//! lines; they go out together as `multipart/alternative`.

use crate::error::Result;
use lettre::Message;
use lettre::message::{Mailbox, MultiPart};

pub const DOWN_ALERT_SUBJECT: &str = "Website Down Alert";
pub const SANITY_CHECK_SUBJECT: &str = "CRON Job Sanity Check";

/// Composed letter, not yet addressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Letter {
    pub subject: String,
    pub plain: String,
    pub html: String,
}

impl Letter {
    /// Alert for a target that failed its check
    ///
    /// `error_code` is the already-rendered code, e.g. `"503"` or `"Unknown Error"`.
    pub fn down_alert(url: &str, error_code: &str) -> Self {
        let lines = [
            "The website you are monitoring is down.".to_string(),
            format!("Website Address: {}", url),
            format!("Error Code: {}", error_code),
        ];
        Self::compose(DOWN_ALERT_SUBJECT, "Hi,", &lines)
    }

    /// Scheduled "still running" letter
    pub fn sanity_check() -> Self {
        let lines = ["The CRON Job is working fine. *^_^*".to_string()];
        Self::compose(SANITY_CHECK_SUBJECT, "Good Morning,", &lines)
    }

    fn compose(subject: &str, greeting: &str, lines: &[String]) -> Self {
        let mut plain = format!("{}\n", greeting);
        for line in lines {
            plain.push_str(line);
            plain.push('\n');
        }

        let escaped: Vec<String> = lines.iter().map(|l| escape_html(l)).collect();
        let html = format!(
            "<html>\n<body>\n<p>{}<br>\n{}\n</p>\n</body>\n</html>\n",
            escape_html(greeting),
            escaped.join("<br>\n")
        );

        Self {
            subject: subject.to_string(),
            plain,
            html,
        }
    }

    /// Build the wire message for a single recipient
    pub fn to_message(&self, from: &Mailbox, to: &Mailbox) -> Result<Message> {
        let message = Message::builder()
            .from(from.clone())
            .to(to.clone())
            .subject(self.subject.as_str())
            .multipart(MultiPart::alternative_plain_html(
                self.plain.clone(),
                self.html.clone(),
            ))?;
        Ok(message)
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
