use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Mutex;
use std::time::Duration;
use tourbook_core::notify::{Mailbox, Message, Notifier};
use tourbook_core::BoxError;
use tourbook_shared::Masked;

/// SendGrid v3 mail client.
pub struct SendGridNotifier {
    client: Client,
    api_base: String,
    api_key: Masked<String>,
}

impl SendGridNotifier {
    pub fn new(api_base: &str, api_key: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: Masked::from(api_key),
        })
    }
}

fn address(mailbox: &Mailbox) -> Value {
    if mailbox.name.is_empty() {
        json!({ "email": mailbox.address })
    } else {
        json!({ "email": mailbox.address, "name": mailbox.name })
    }
}

/// Request body for `POST /v3/mail/send`.
fn mail_body(message: &Message) -> Value {
    let mut personalization = json!({ "to": [address(&message.to)] });
    if let Some(bcc) = &message.bcc {
        personalization["bcc"] = json!([address(bcc)]);
    }
    json!({
        "personalizations": [personalization],
        "from": address(&message.from),
        "subject": message.subject,
        "content": [{ "type": "text/plain", "value": message.body }],
    })
}

#[async_trait]
impl Notifier for SendGridNotifier {
    async fn send(&self, message: &Message) -> Result<(), BoxError> {
        let response = self
            .client
            .post(format!("{}/v3/mail/send", self.api_base))
            .bearer_auth(self.api_key.expose())
            .json(&mail_body(message))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(format!("SendGrid returned {}: {}", status, text).into());
        }
        Ok(())
    }
}

/// Writes mail to the trace log instead of sending it, and keeps an outbox.
#[derive(Default)]
pub struct LogNotifier {
    outbox: Mutex<Vec<Message>>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outbox(&self) -> Vec<Message> {
        self.outbox.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &Message) -> Result<(), BoxError> {
        tracing::info!(
            "Mail from {} to {} (bcc: {}): {}",
            message.from,
            message.to,
            message.bcc.as_ref().map(|b| b.to_string()).unwrap_or_default(),
            message.subject
        );
        tracing::debug!("Mail body:\n{}", message.body);
        self.outbox
            .lock()
            .map_err(|_| "outbox lock poisoned")?
            .push(message.clone());
        Ok(())
    }
}
