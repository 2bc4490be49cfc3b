use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use tourbook_shared::Masked;

#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub amount_cents: u64,
    pub currency: String,
    pub token: Masked<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeReceipt {
    pub id: String, // Provider's ID (e.g., ch_123)
    pub amount_cents: u64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// The card issuer refused; the message is safe to show the customer.
    #[error("Payment declined: {0}")]
    Declined(String),
    #[error("Payment gateway error: {0}")]
    Gateway(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charges the tokenized instrument exactly once. Implementations must not retry.
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt, PaymentError>;
}
