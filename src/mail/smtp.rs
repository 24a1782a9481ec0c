use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{EmailMessage, MailClient, MailError};

pub struct SmtpMailClient {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    from_raw: String,
}

impl SmtpMailClient {
    pub fn new(
        host: &str,
        port: Option<u16>,
        credentials: Option<(String, String)>,
        from: &str,
    ) -> Result<Self, MailError> {
        let from_mailbox: Mailbox = from
            .parse()
            .map_err(|e| MailError::Address(format!("{}: {}", from, e)))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| MailError::Transport(e.to_string()))?;
        if let Some(port) = port {
            builder = builder.port(port);
        }
        if let Some((username, password)) = credentials {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            transport: builder.build(),
            from: from_mailbox,
            from_raw: from.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl MailClient for SmtpMailClient {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| MailError::Address(format!("{}: {}", message.to, e)))?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&message.subject);

        let email = match (message.body_html, message.body_text) {
            (Some(html), Some(text)) => builder.multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html),
                    ),
            ),
            (Some(html), None) => builder.header(ContentType::TEXT_HTML).body(html),
            (None, Some(text)) => builder.header(ContentType::TEXT_PLAIN).body(text),
            (None, None) => {
                return Err(MailError::Build(
                    "Email must have either HTML or text body".to_string(),
                ))
            }
        }
        .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(())
    }

    fn sender(&self) -> &str {
        &self.from_raw
    }
}
