use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Mutex;
use std::time::Duration;
use tourbook_core::payment::{ChargeReceipt, ChargeRequest, PaymentError, PaymentGateway};
use tourbook_shared::Masked;

/// Stripe Charges API client.
pub struct StripeGateway {
    client: Client,
    api_base: String,
    secret_key: Masked<String>,
}

#[derive(Deserialize)]
struct StripeCharge {
    id: String,
    amount: u64,
    currency: String,
    created: i64,
}

#[derive(Deserialize)]
struct StripeErrorEnvelope {
    error: StripeError,
}

#[derive(Deserialize)]
struct StripeError {
    #[serde(rename = "type")]
    kind: String,
    message: Option<String>,
}

impl StripeGateway {
    pub fn new(api_base: &str, secret_key: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key: Masked::from(secret_key),
        })
    }
}

/// Maps a non-success Stripe reply onto the decline/error split.
fn classify_failure(status: StatusCode, body: &str) -> PaymentError {
    let parsed = serde_json::from_str::<StripeErrorEnvelope>(body).ok();
    let declined = status == StatusCode::PAYMENT_REQUIRED
        || parsed.as_ref().is_some_and(|e| e.error.kind == "card_error");

    if declined {
        let message = parsed
            .and_then(|e| e.error.message)
            .unwrap_or_else(|| "Your card was declined.".to_string());
        return PaymentError::Declined(message);
    }

    let detail = parsed
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| body.chars().take(200).collect());
    PaymentError::Gateway(format!("{}: {}", status, detail))
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt, PaymentError> {
        let params = [
            ("amount", request.amount_cents.to_string()),
            ("currency", request.currency.clone()),
            ("source", request.token.expose().clone()),
        ];

        let response = self
            .client
            .post(format!("{}/v1/charges", self.api_base))
            .bearer_auth(self.secret_key.expose())
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::Gateway(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::Gateway(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_failure(status, &body));
        }

        let charge: StripeCharge = serde_json::from_str(&body)
            .map_err(|e| PaymentError::Gateway(format!("Unreadable charge response: {}", e)))?;

        Ok(ChargeReceipt {
            id: charge.id,
            amount_cents: charge.amount,
            currency: charge.currency,
            created_at: DateTime::from_timestamp(charge.created, 0).unwrap_or_else(Utc::now),
        })
    }
}

pub const DECLINED_TOKEN: &str = "tok_chargeDeclined";
pub const GATEWAY_ERROR_TOKEN: &str = "tok_gatewayError";

/// Approves every charge except the two well-known test tokens. Keeps a ledger of
/// attempted amounts.
#[derive(Default)]
pub struct MockPaymentGateway {
    attempts: Mutex<Vec<u64>>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Amounts of every charge attempt, in order.
    pub fn attempts(&self) -> Vec<u64> {
        self.attempts.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt, PaymentError> {
        if let Ok(mut attempts) = self.attempts.lock() {
            attempts.push(request.amount_cents);
        }

        match request.token.expose().as_str() {
            DECLINED_TOKEN => Err(PaymentError::Declined("Your card was declined.".to_string())),
            GATEWAY_ERROR_TOKEN => Err(PaymentError::Gateway("Simulated Payment Gateway Failure".to_string())),
            _ => Ok(ChargeReceipt {
                id: format!("mock_ch_{}", uuid::Uuid::new_v4().simple()),
                amount_cents: request.amount_cents,
                currency: request.currency.clone(),
                created_at: Utc::now(),
            }),
        }
    }
}
