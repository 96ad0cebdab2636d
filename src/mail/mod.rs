//! Email composition and delivery.
//!
//! Builds the report email with the PDF attached and sends it over SMTP
//! using lettre.

use crate::error::ReportError;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::{Message, SmtpTransport, Transport};
use std::path::Path;
use tracing::{debug, info};

/// Default SMTP relay.
pub const DEFAULT_SMTP_HOST: &str = "localhost";

/// Default SMTP port.
pub const DEFAULT_SMTP_PORT: u16 = 25;

fn parse_mailbox(address: &str) -> Result<Mailbox, ReportError> {
    address
        .parse::<Mailbox>()
        .map_err(|source| ReportError::Address {
            address: address.to_string(),
            source,
        })
}

/// Guess an attachment MIME type from its file extension.
pub fn guess_content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("json") => "application/json",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Build an email with a plain-text body and one attachment.
pub fn generate(
    sender: &str,
    receiver: &str,
    subject: &str,
    body: &str,
    attachment_path: &Path,
) -> Result<Message, ReportError> {
    let attachment_error = |message: String| ReportError::Attachment {
        path: attachment_path.to_path_buf(),
        message,
    };

    let content =
        std::fs::read(attachment_path).map_err(|err| attachment_error(err.to_string()))?;
    let mime = guess_content_type(attachment_path);
    let content_type =
        ContentType::parse(mime).map_err(|err| attachment_error(err.to_string()))?;
    let filename = attachment_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| attachment_error("path has no file name".to_string()))?;

    debug!(
        "Attaching {} ({} bytes) as {}",
        filename,
        content.len(),
        mime
    );

    let message = Message::builder()
        .from(parse_mailbox(sender)?)
        .to(parse_mailbox(receiver)?)
        .subject(subject)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(body.to_string()))
                .singlepart(Attachment::new(filename).body(content, content_type)),
        )?;

    Ok(message)
}

/// Sends messages through an SMTP relay.
pub struct Mailer {
    transport: SmtpTransport,
    host: String,
    port: u16,
}

impl Mailer {
    /// Create a mailer for an unauthenticated, unencrypted relay.
    pub fn new(host: &str, port: u16) -> Self {
        let transport = SmtpTransport::builder_dangerous(host).port(port).build();
        Self {
            transport,
            host: host.to_string(),
            port,
        }
    }

    /// Deliver `message`. Failures are not retried.
    pub fn send(&self, message: &Message) -> Result<(), ReportError> {
        let receiver = message
            .envelope()
            .to()
            .iter()
            .map(|address| address.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        debug!("Connecting to SMTP relay {}:{}", self.host, self.port);
        self.transport
            .send(message)
            .map_err(|source| ReportError::Send {
                receiver: receiver.clone(),
                source,
            })?;

        info!("Report email sent to {}", receiver);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use tempfile::TempDir;

    fn write_attachment(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("cars.pdf");
        std::fs::write(&path, b"%PDF-1.3 test").unwrap();
        path
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type(Path::new("/tmp/cars.pdf")), "application/pdf");
        assert_eq!(guess_content_type(Path::new("REPORT.PDF")), "application/pdf");
        assert_eq!(
            guess_content_type(Path::new("data.bin")),
            "application/octet-stream"
        );
        assert_eq!(
            guess_content_type(Path::new("no_extension")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_generate_message() {
        let dir = TempDir::new().unwrap();
        let attachment = write_attachment(&dir);

        let message = generate(
            "automation@example.com",
            "student@example.com",
            "Sales summary for last month",
            "The most popular year was 2020 with 8 sales.",
            &attachment,
        )
        .unwrap();

        let envelope = message.envelope();
        assert_eq!(
            envelope.from().map(|a| a.to_string()),
            Some("automation@example.com".to_string())
        );
        assert_eq!(envelope.to()[0].to_string(), "student@example.com");

        let formatted = String::from_utf8_lossy(&message.formatted()).into_owned();
        assert!(formatted.contains("Subject: Sales summary for last month"));
        assert!(formatted.contains("multipart/mixed"));
        assert!(formatted.contains("application/pdf"));
        assert!(formatted.contains("cars.pdf"));
        assert!(formatted.contains("The most popular year was 2020 with 8 sales."));
    }

    #[test]
    fn test_generate_rejects_invalid_address() {
        let dir = TempDir::new().unwrap();
        let attachment = write_attachment(&dir);

        let err = generate("automation@example.com", "not an address", "s", "b", &attachment)
            .unwrap_err();
        match err {
            ReportError::Address { address, .. } => assert_eq!(address, "not an address"),
            other => panic!("expected address error, got {:?}", other),
        }
    }

    #[test]
    fn test_generate_missing_attachment() {
        let dir = TempDir::new().unwrap();
        let err = generate(
            "automation@example.com",
            "student@example.com",
            "s",
            "b",
            &dir.path().join("missing.pdf"),
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::Attachment { .. }));
    }

    #[test]
    fn test_send_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let attachment = write_attachment(&dir);
        let message = generate(
            "automation@example.com",
            "student@example.com",
            "s",
            "b",
            &attachment,
        )
        .unwrap();

        // Grab a free port, then close it so the connection is refused.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let mailer = Mailer::new("127.0.0.1", port);
        let err = mailer.send(&message).unwrap_err();
        match err {
            ReportError::Send { receiver, .. } => assert_eq!(receiver, "student@example.com"),
            other => panic!("expected send error, got {:?}", other),
        }
    }
}
