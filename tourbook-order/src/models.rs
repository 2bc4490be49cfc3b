use serde::Serialize;
use uuid::Uuid;
use tourbook_catalog::SubmittedRider;
use tourbook_core::{Contact, Rider, TourDetail, TourId};
use tourbook_shared::Masked;
use crate::warnings::WarningSet;

/// A decoded checkout form. Nothing here has been validated yet.
#[derive(Debug, Clone, Default)]
pub struct CheckoutRequest {
    pub tour_id: TourId,
    pub rider_count: i64,
    pub riders: Vec<SubmittedRider>,
    /// Total the client displayed, e.g. `"$27.14"`.
    pub quoted_total: String,
    pub payment_token: Masked<String>,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub hotel: String,
    pub misc: String,
}

/// Everything the confirmation view and the notifications need.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmationResult {
    pub order_id: Uuid,
    pub receipt_id: String,
    pub tour: TourDetail,
    pub rider_count: u32,
    pub riders: Vec<Rider>,
    pub riders_submitted: usize,
    pub total_cents: u64,
    pub display_total: String,
    pub contact: Contact,
    pub warnings: WarningSet,
    /// Why the customer email was not sent; empty when it was.
    pub email_skipped: String,
}

impl ConfirmationResult {
    pub fn warn(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// One-line request summary for the access log.
    pub fn summary(&self) -> String {
        format!(
            "tour:{} riders:{} {} '{}' <{}>",
            self.tour.id(),
            self.rider_count,
            self.display_total,
            self.contact.name,
            self.contact.email.hint()
        )
    }
}
