//! Configuration loading for downwatch
//!
//! Settings come from an optional TOML file, a dotenv file and the process
//! environment, merged key by key with the environment winning. The merged
//! settings are validated once into a [`MonitorConfig`] before any network I/O.

use crate::error::{Error, Result};
use crate::reveille::SanityTrigger;
use lettre::message::Mailbox;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;
pub const DEFAULT_SMTP_TIMEOUT_SECS: u64 = 30;

/// Load and validate configuration
///
/// `lookup` resolves environment keys; pass `|k| std::env::var(k).ok()` for the
/// real process environment.
pub fn load<F>(config_path: Option<&Path>, lookup: F) -> Result<MonitorConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let base = match config_path {
        Some(path) => read_file(path)?.normalized(),
        None => RawSettings::default(),
    };
    let env = RawSettings::from_lookup(lookup)?;

    base.merge(env).validate()
}

/// Populate the process environment from a dotenv file
///
/// With no explicit path, `.env` is searched upward from the current directory
/// and its absence is not an error. Variables already set are left alone.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>> {
    match path {
        Some(path) => dotenv::from_path(path)
            .map(|_| Some(path.to_path_buf()))
            .map_err(|e| Error::EnvFile(format!("{}: {}", path.display(), e))),
        None => match dotenv::dotenv() {
            Ok(found) => Ok(Some(found)),
            Err(e) if e.not_found() => Ok(None),
            Err(e) => Err(Error::EnvFile(e.to_string())),
        },
    }
}

fn read_file(path: &Path) -> Result<RawSettings> {
    let content = fs::read_to_string(path).map_err(|e| Error::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(toml::from_str(&content)?)
}

/// Secret string that never shows up in debug output
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    #[cfg(test)]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Recipients as written in a config file: one joined string or a list
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RecipientList {
    Joined(String),
    List(Vec<String>),
}

impl RecipientList {
    fn entries(&self) -> Vec<&str> {
        match self {
            RecipientList::Joined(joined) => joined.split(',').collect(),
            RecipientList::List(list) => list.iter().map(String::as_str).collect(),
        }
    }
}

/// Unvalidated settings from a single source
#[derive(Debug, Default, Deserialize)]
pub struct RawSettings {
    pub url: Option<String>,
    pub sender_email: Option<String>,
    pub sender_password: Option<Secret>,
    pub receiver_emails: Option<RecipientList>,
    pub sanity_hour: Option<u32>,
    pub sanity_minute: Option<u32>,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_timeout_secs: Option<u64>,
}

impl RawSettings {
    /// Read settings from environment-style keys
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_blank(lookup(key));

        Ok(Self {
            url: get("url"),
            sender_email: get("sender_email"),
            sender_password: get("sender_password").map(Secret),
            receiver_emails: get("receiver_emails").map(RecipientList::Joined),
            sanity_hour: parse_number("sanity_hour", get("sanity_hour"))?,
            sanity_minute: parse_number("sanity_minute", get("sanity_minute"))?,
            smtp_host: get("smtp_host"),
            smtp_port: parse_number("smtp_port", get("smtp_port"))?,
            smtp_timeout_secs: parse_number("smtp_timeout_secs", get("smtp_timeout_secs"))?,
        })
    }

    /// Trim string values and treat blank ones as unset, as the environment does
    pub fn normalized(self) -> RawSettings {
        RawSettings {
            url: non_blank(self.url),
            sender_email: non_blank(self.sender_email),
            sender_password: non_blank(self.sender_password.map(|s| s.0)).map(Secret),
            receiver_emails: match self.receiver_emails {
                Some(RecipientList::Joined(joined)) => non_blank(Some(joined)).map(RecipientList::Joined),
                other => other,
            },
            smtp_host: non_blank(self.smtp_host),
            ..self
        }
    }

    /// Overlay `other` on top of `self`; keys set in `other` win
    pub fn merge(self, other: RawSettings) -> RawSettings {
        RawSettings {
            url: other.url.or(self.url),
            sender_email: other.sender_email.or(self.sender_email),
            sender_password: other.sender_password.or(self.sender_password),
            receiver_emails: other.receiver_emails.or(self.receiver_emails),
            sanity_hour: other.sanity_hour.or(self.sanity_hour),
            sanity_minute: other.sanity_minute.or(self.sanity_minute),
            smtp_host: other.smtp_host.or(self.smtp_host),
            smtp_port: other.smtp_port.or(self.smtp_port),
            smtp_timeout_secs: other.smtp_timeout_secs.or(self.smtp_timeout_secs),
        }
    }

    /// Validate into a typed configuration
    pub fn validate(self) -> Result<MonitorConfig> {
        let url = self.url.ok_or(Error::MissingConfig("url"))?;
        validate_url(&url)?;

        let sender_email = self.sender_email.ok_or(Error::MissingConfig("sender_email"))?;
        let sender = parse_mailbox(&sender_email)?;

        let password = self
            .sender_password
            .filter(|p| !p.expose().trim().is_empty())
            .ok_or(Error::MissingConfig("sender_password"))?;

        let recipients = self
            .receiver_emails
            .ok_or(Error::MissingConfig("receiver_emails"))?
            .entries()
            .into_iter()
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(parse_mailbox)
            .collect::<Result<Vec<_>>>()?;
        if recipients.is_empty() {
            return Err(Error::ConfigValidation(
                "receiver_emails contains no addresses".into(),
            ));
        }

        let sanity = match (self.sanity_hour, self.sanity_minute) {
            (Some(hour), Some(minute)) => Some(SanityTrigger::new(hour, minute)?),
            (None, None) => None,
            _ => {
                return Err(Error::ConfigValidation(
                    "sanity_hour and sanity_minute must be set together".into(),
                ));
            }
        };

        let timeout_secs = self.smtp_timeout_secs.unwrap_or(DEFAULT_SMTP_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::ConfigValidation(
                "smtp_timeout_secs must be greater than zero".into(),
            ));
        }

        let host = self.smtp_host.unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string());
        if host.trim().is_empty() {
            return Err(Error::ConfigValidation("smtp_host must not be blank".into()));
        }

        Ok(MonitorConfig {
            url,
            sender,
            password,
            recipients,
            sanity,
            smtp: SmtpConfig {
                host,
                port: self.smtp_port.unwrap_or(DEFAULT_SMTP_PORT),
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_number<T: std::str::FromStr>(key: &str, value: Option<String>) -> Result<Option<T>> {
    value
        .map(|v| {
            v.parse().map_err(|_| {
                Error::ConfigValidation(format!("{} must be a non-negative integer, got '{}'", key, v))
            })
        })
        .transpose()
}

fn validate_url(raw: &str) -> Result<()> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| Error::ConfigValidation(format!("url '{}' is not valid: {}", raw, e)))?;

    match parsed.scheme() {
        "http" | "https" if parsed.host().is_some() => Ok(()),
        "http" | "https" => Err(Error::ConfigValidation(format!("url '{}' has no host", raw))),
        other => Err(Error::ConfigValidation(format!(
            "url '{}' uses unsupported scheme '{}'",
            raw, other
        ))),
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address.parse().map_err(|source| Error::InvalidMailbox {
        address: address.to_string(),
        source,
    })
}

/// SMTP submission endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
}

/// Validated configuration, immutable for the rest of the run
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Target URL
    pub url: String,
    /// Sender mailbox, also the SMTP username
    pub sender: Mailbox,
    pub password: Secret,
    /// Each recipient gets a separate message
    pub recipients: Vec<Mailbox>,
    pub sanity: Option<SanityTrigger>,
    pub smtp: SmtpConfig,
}

impl MonitorConfig {
    /// Human-readable summary with the password redacted
    pub fn summary(&self) -> String {
        let recipients: Vec<String> = self.recipients.iter().map(|r| r.to_string()).collect();
        let sanity = self
            .sanity
            .map(|t| t.to_string())
            .unwrap_or_else(|| "disabled".to_string());

        format!(
            "Target:      {}\nSender:      {}\nPassword:    ***\nRecipients:  {}\nSanity time: {}\nSMTP:        {}:{} (timeout {}s)",
            self.url,
            self.sender,
            recipients.join(", "),
            sanity,
            self.smtp.host,
            self.smtp.port,
            self.smtp.timeout.as_secs()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn full_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("url", "https://example.com/health"),
            ("sender_email", "monitor@example.com"),
            ("sender_password", "hunter2"),
            ("receiver_emails", "ops@example.com,dev@example.com"),
        ]
    }

    #[test]
    fn test_load_from_env() {
        let config = load(None, env(&full_env())).unwrap();

        assert_eq!(config.url, "https://example.com/health");
        assert_eq!(config.sender.email.to_string(), "monitor@example.com");
        assert_eq!(config.password.expose(), "hunter2");
        assert_eq!(config.recipients.len(), 2);
        assert_eq!(config.recipients[1].email.to_string(), "dev@example.com");
        assert!(config.sanity.is_none());
        assert_eq!(config.smtp.host, DEFAULT_SMTP_HOST);
        assert_eq!(config.smtp.port, DEFAULT_SMTP_PORT);
        assert_eq!(config.smtp.timeout, Duration::from_secs(DEFAULT_SMTP_TIMEOUT_SECS));
    }

    #[test]
    fn test_recipients_trimmed_and_blank_entries_dropped() {
        let mut pairs = full_env();
        pairs[3] = ("receiver_emails", " ops@example.com , ,dev@example.com,");
        let config = load(None, env(&pairs)).unwrap();

        let addrs: Vec<String> = config.recipients.iter().map(|r| r.email.to_string()).collect();
        assert_eq!(addrs, vec!["ops@example.com", "dev@example.com"]);
    }

    #[test]
    fn test_missing_required_key() {
        let pairs: Vec<_> = full_env()
            .into_iter()
            .filter(|(k, _)| *k != "receiver_emails")
            .collect();
        let err = load(None, env(&pairs)).unwrap_err();
        assert!(matches!(err, Error::MissingConfig("receiver_emails")));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut pairs = full_env();
        pairs[2] = ("sender_password", "   ");
        let err = load(None, env(&pairs)).unwrap_err();
        assert!(matches!(err, Error::MissingConfig("sender_password")));
    }

    fn config_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_blank_file_password_counts_as_missing() {
        let file = config_file(
            r#"
url = "https://example.com"
sender_email = "monitor@example.com"
sender_password = "  "
receiver_emails = "ops@example.com"
smtp_host = ""
"#,
        );

        let err = load(Some(file.path()), |_: &str| None).unwrap_err();
        assert!(matches!(err, Error::MissingConfig("sender_password")));
    }

    #[test]
    fn test_blank_file_values_fall_back_like_env() {
        let file = config_file(
            r#"
url = " https://example.com "
sender_email = "monitor@example.com"
sender_password = "pw"
receiver_emails = "   "
smtp_host = "  "
"#,
        );

        let err = load(Some(file.path()), |_: &str| None).unwrap_err();
        assert!(matches!(err, Error::MissingConfig("receiver_emails")));

        let config = load(
            Some(file.path()),
            env(&[("receiver_emails", "ops@example.com")]),
        )
        .unwrap();
        assert_eq!(config.url, "https://example.com");
        assert_eq!(config.smtp.host, DEFAULT_SMTP_HOST);
    }

    #[test]
    fn test_blank_values_rejected_when_built_directly() {
        let raw = RawSettings {
            url: Some("https://example.com".into()),
            sender_email: Some("monitor@example.com".into()),
            sender_password: Some(Secret::new("pw")),
            receiver_emails: Some(RecipientList::Joined("ops@example.com".into())),
            smtp_host: Some(" ".into()),
            ..RawSettings::default()
        };
        assert!(matches!(raw.validate().unwrap_err(), Error::ConfigValidation(_)));

        let raw = RawSettings {
            url: Some("https://example.com".into()),
            sender_email: Some("monitor@example.com".into()),
            sender_password: Some(Secret::new(" ")),
            receiver_emails: Some(RecipientList::Joined("ops@example.com".into())),
            ..RawSettings::default()
        };
        assert!(matches!(
            raw.validate().unwrap_err(),
            Error::MissingConfig("sender_password")
        ));
    }

    #[test]
    fn test_empty_recipient_list_rejected() {
        let mut pairs = full_env();
        pairs[3] = ("receiver_emails", ", ,");
        let err = load(None, env(&pairs)).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation(_)));
    }

    #[test]
    fn test_invalid_recipient_rejected() {
        let mut pairs = full_env();
        pairs[3] = ("receiver_emails", "ops@example.com,not-an-address");
        let err = load(None, env(&pairs)).unwrap_err();
        match err {
            Error::InvalidMailbox { address, .. } => assert_eq!(address, "not-an-address"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_url_rejected() {
        for bad in ["not a url", "ftp://example.com", "mailto:ops@example.com"] {
            let mut pairs = full_env();
            pairs[0] = ("url", bad);
            assert!(load(None, env(&pairs)).is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn test_sanity_trigger_parsed() {
        let mut pairs = full_env();
        pairs.push(("sanity_hour", "22"));
        pairs.push(("sanity_minute", "30"));
        let config = load(None, env(&pairs)).unwrap();
        assert_eq!(config.sanity, Some(SanityTrigger::new(22, 30).unwrap()));
    }

    #[test]
    fn test_half_sanity_trigger_rejected() {
        let mut pairs = full_env();
        pairs.push(("sanity_hour", "22"));
        assert!(matches!(
            load(None, env(&pairs)).unwrap_err(),
            Error::ConfigValidation(_)
        ));
    }

    #[test]
    fn test_non_numeric_port_rejected() {
        let mut pairs = full_env();
        pairs.push(("smtp_port", "smtps"));
        let err = load(None, env(&pairs)).unwrap_err();
        assert!(err.to_string().contains("smtp_port"));
    }

    #[test]
    fn test_zero_smtp_timeout_rejected() {
        let mut pairs = full_env();
        pairs.push(("smtp_timeout_secs", "0"));
        assert!(load(None, env(&pairs)).is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
url = "https://file.example.com"
sender_email = "file@example.com"
sender_password = "from-file"
receiver_emails = ["a@example.com", "b@example.com"]
sanity_hour = 9
sanity_minute = 0
smtp_host = "smtp.example.com"
smtp_port = 2465
"#
        )
        .unwrap();

        let config = load(
            Some(file.path()),
            env(&[("url", "https://env.example.com"), ("smtp_port", "465")]),
        )
        .unwrap();

        assert_eq!(config.url, "https://env.example.com");
        assert_eq!(config.password.expose(), "from-file");
        assert_eq!(config.recipients.len(), 2);
        assert_eq!(config.sanity, Some(SanityTrigger::new(9, 0).unwrap()));
        assert_eq!(config.smtp.host, "smtp.example.com");
        assert_eq!(config.smtp.port, 465);
    }

    #[test]
    fn test_missing_config_file() {
        let err = load(Some(Path::new("/nonexistent/downwatch.toml")), env(&full_env())).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }

    #[test]
    fn test_password_redacted() {
        let config = load(None, env(&full_env())).unwrap();
        assert!(!format!("{:?}", config).contains("hunter2"));
        assert!(!config.summary().contains("hunter2"));
    }

    #[test]
    fn test_missing_explicit_env_file() {
        let err = load_env_file(Some(Path::new("/nonexistent/.env"))).unwrap_err();
        assert!(matches!(err, Error::EnvFile(_)));
    }
}
