use std::fs;
use std::path::Path;

use crawl_logging::crawl_info;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport as _};
use serde::Deserialize;

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct EmailCredentials {
    pub username: String,
    pub password: String,
    pub sender: String,
    pub recipient: String,
}

impl std::fmt::Debug for EmailCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .field("sender", &self.sender)
            .field("recipient", &self.recipient)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MailSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub subject: String,
    pub body: String,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            subject: "Updated jobs file".to_string(),
            body: "The updated job postings are attached.".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("cannot read attachment {path}: {source}")]
    Attachment {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("cannot build message: {0}")]
    Build(String),
    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Builds the handoff message with the output file attached under its own name.
pub fn build_message(
    path: &Path,
    credentials: &EmailCredentials,
    settings: &MailSettings,
) -> Result<Message, MailError> {
    let content = fs::read(path).map_err(|source| MailError::Attachment {
        path: path.display().to_string(),
        source,
    })?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "jobs.csv".to_string());
    let csv_type =
        ContentType::parse("text/csv").map_err(|err| MailError::Build(err.to_string()))?;

    Message::builder()
        .from(credentials.sender.parse::<Mailbox>()?)
        .to(credentials.recipient.parse::<Mailbox>()?)
        .subject(settings.subject.clone())
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(settings.body.clone()))
                .singlepart(Attachment::new(filename).body(content, csv_type)),
        )
        .map_err(|err| MailError::Build(err.to_string()))
}

/// Sends the output file over an authenticated STARTTLS submission channel.
#[derive(Debug, Clone, Default)]
pub struct SmtpMailer {
    settings: MailSettings,
}

impl SmtpMailer {
    pub fn new(settings: MailSettings) -> Self {
        Self { settings }
    }

    /// Blocking; call from a blocking context.
    pub fn send(&self, path: &Path, credentials: &EmailCredentials) -> Result<(), MailError> {
        let message = build_message(path, credentials, &self.settings)?;
        let transport = SmtpTransport::starttls_relay(&self.settings.smtp_host)?
            .port(self.settings.smtp_port)
            .credentials(Credentials::new(
                credentials.username.clone(),
                credentials.password.clone(),
            ))
            .build();
        transport.send(&message)?;
        crawl_info!("emailed {} to {}", path.display(), credentials.recipient);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{build_message, EmailCredentials, MailSettings};

    fn credentials() -> EmailCredentials {
        EmailCredentials {
            username: "crawler@example.com".to_string(),
            password: "hunter2".to_string(),
            sender: "crawler@example.com".to_string(),
            recipient: "me@example.com".to_string(),
        }
    }

    #[test]
    fn message_carries_the_csv_attachment() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("rust_jobs.csv");
        fs::write(&path, "JobTitle,Company\nDev,Acme\n").unwrap();

        let message = build_message(&path, &credentials(), &MailSettings::default()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: Updated jobs file"));
        assert!(raw.contains("rust_jobs.csv"));
        assert!(raw.contains("text/csv"));
        assert!(raw.contains("To: me@example.com"));
    }

    #[test]
    fn missing_file_is_an_attachment_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = build_message(
            &dir.path().join("missing.csv"),
            &credentials(),
            &MailSettings::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing.csv"));
    }

    #[test]
    fn bad_recipient_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("jobs.csv");
        fs::write(&path, "x").unwrap();
        let mut creds = credentials();
        creds.recipient = "not an address".to_string();
        assert!(build_message(&path, &creds, &MailSettings::default()).is_err());
    }

    #[test]
    fn debug_hides_password() {
        assert!(!format!("{:?}", credentials()).contains("hunter2"));
    }
}
