use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use tourbook_catalog::{
    parse_quoted_total, PricingError, PricingValidator, RiderError, RiderPolicy, RiderValidator,
};
use tourbook_core::notify::Notifier;
use tourbook_core::payment::{ChargeRequest, PaymentError, PaymentGateway};
use tourbook_core::repository::{NewOrder, OrderRepository, TourCatalog};
use tourbook_core::{Contact, TourId};
use crate::models::{CheckoutRequest, ConfirmationResult};
use crate::notification::{customer_message, operator_message, MailPolicy};
use crate::warnings::{Warning, WarningKind, WarningSet};

/// External collaborators, wired once at startup.
#[derive(Clone)]
pub struct ConfirmationDeps {
    pub catalog: Arc<dyn TourCatalog>,
    pub orders: Arc<dyn OrderRepository>,
    pub payments: Arc<dyn PaymentGateway>,
    pub notifier: Arc<dyn Notifier>,
}

#[derive(Debug, Clone)]
pub struct CheckoutPolicy {
    /// Capacity for tours that do not set their own.
    pub default_capacity: i32,
    pub currency: String,
    /// A blank email is fatal when set, a blocking warning otherwise.
    pub require_email: bool,
    pub riders: RiderPolicy,
    pub mail: MailPolicy,
}

/// Post-payment steps, run in this order. Each one is isolated: a failure is
/// recorded as a warning and the next step still runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FollowUp {
    RecordPayment,
    NotifyCustomer,
    RecordConfirmation,
    NotifyOperator,
}

const FOLLOW_UPS: [FollowUp; 4] = [
    FollowUp::RecordPayment,
    FollowUp::NotifyCustomer,
    FollowUp::RecordConfirmation,
    FollowUp::NotifyOperator,
];

/// Drives one checkout from form to confirmed order.
///
/// Stages run strictly in sequence: tour lookup, pricing, riders, persist, charge,
/// then the best-effort follow-ups. Anything before the charge can fail the request;
/// once the charge succeeds the request succeeds.
pub struct ConfirmationOrchestrator {
    deps: ConfirmationDeps,
    policy: CheckoutPolicy,
    riders: RiderValidator,
}

struct Booking {
    result: ConfirmationResult,
    customer_notified: bool,
}

impl ConfirmationOrchestrator {
    pub fn new(deps: ConfirmationDeps, policy: CheckoutPolicy) -> Self {
        let riders = RiderValidator::new(policy.riders);
        Self { deps, policy, riders }
    }

    pub async fn confirm(&self, request: CheckoutRequest) -> Result<ConfirmationResult, ConfirmError> {
        let mut warnings = WarningSet::new();

        // Tour state is re-read on every request; price and capacity are never cached.
        let detail = self
            .deps
            .catalog
            .lookup_tour_detail(request.tour_id, self.policy.default_capacity)
            .await
            .map_err(|e| ConfirmError::Catalog(e.to_string()))?
            .ok_or(ConfirmError::TourNotFound(request.tour_id))?;

        if detail.is_past(Utc::now()) {
            let local = detail.tour.time.with_timezone(&self.policy.mail.timezone);
            warnings.insert(Warning::with_detail(
                WarningKind::TourPast,
                local.format("%Y/%m/%d").to_string(),
            ));
        }
        if detail.tour.full {
            warnings.insert(WarningKind::TourFull);
        }
        if detail.tour.cancelled {
            warnings.insert(WarningKind::TourCancelled);
        }
        if detail.tour.deleted {
            warnings.insert(WarningKind::TourDeleted);
        }

        // A bad rider count is reported ahead of any pricing error.
        RiderValidator::rider_count(request.rider_count)?;
        let quoted = parse_quoted_total(&request.quoted_total)?;
        let priced = PricingValidator::validate(detail.price, request.rider_count, quoted)?;

        let check = self.riders.validate(
            request.rider_count,
            detail.spots_remaining,
            detail.tour.riders_require_height,
            &request.riders,
        )?;
        if let Some((requested, spots)) = check.oversubscribed {
            warnings.insert(Warning::with_detail(
                WarningKind::Oversubscribed,
                format!("riders({})>spots({})", requested, spots),
            ));
        }
        if check.invalid_heights {
            warnings.insert(WarningKind::InvalidHeights);
        }
        if check.unknown_heights {
            warnings.insert(WarningKind::UnknownHeights);
        }

        let contact = Contact::trimmed(
            &request.name,
            &request.email,
            &request.mobile,
            &request.hotel,
            &request.misc,
        );
        if contact.name.is_empty() {
            warnings.insert(WarningKind::NoName);
        }
        if contact.email.expose().is_empty() {
            if self.policy.require_email {
                return Err(ConfirmError::InvalidInput("Email is required".to_string()));
            }
            warnings.insert(WarningKind::NoEmail);
        }

        let new_order = NewOrder {
            tour_id: request.tour_id,
            rider_count: check.rider_count,
            riders: check.riders.clone(),
            total_cents: priced.actual_cents,
            contact: contact.clone(),
        };
        let order_id = self
            .deps
            .orders
            .create_order(&new_order)
            .await
            .map_err(|e| ConfirmError::Persist(e.to_string()))?;
        tracing::info!(
            "Order {} created for tour {} ({} riders, {} cents)",
            order_id,
            request.tour_id,
            check.rider_count,
            priced.actual_cents
        );

        // Charge the amount persisted above. One attempt only: a retry risks billing twice.
        let charge = ChargeRequest {
            amount_cents: new_order.total_cents,
            currency: self.policy.currency.clone(),
            token: request.payment_token.clone(),
        };
        let receipt = match self.deps.payments.charge(&charge).await {
            Ok(receipt) => receipt,
            Err(PaymentError::Declined(message)) => {
                tracing::warn!("Order {} left unpaid: charge declined: {}", order_id, message);
                return Err(ConfirmError::PaymentDeclined { order_id, message });
            }
            Err(PaymentError::Gateway(detail)) => {
                tracing::error!("Order {} left unpaid: gateway error: {}", order_id, detail);
                return Err(ConfirmError::PaymentFailed { order_id, detail });
            }
        };
        tracing::info!(
            "Order {} charged {} {} at {}, receipt {}",
            order_id,
            receipt.amount_cents,
            receipt.currency,
            receipt.created_at,
            receipt.id
        );
        if receipt.amount_cents != new_order.total_cents {
            tracing::error!(
                "Order {} receipt {} amount {} differs from order total {}",
                order_id,
                receipt.id,
                receipt.amount_cents,
                new_order.total_cents
            );
        }

        let mut booking = Booking {
            result: ConfirmationResult {
                order_id,
                receipt_id: receipt.id,
                tour: detail,
                rider_count: check.rider_count,
                riders: check.riders,
                riders_submitted: request.riders.len(),
                total_cents: priced.actual_cents,
                display_total: priced.display(),
                contact,
                warnings,
                email_skipped: String::new(),
            },
            customer_notified: false,
        };

        for step in FOLLOW_UPS {
            if let Err(warning) = self.follow_up(step, &mut booking).await {
                tracing::warn!("Order {} {:?} failed: {}", order_id, step, warning);
                booking.result.warnings.insert(warning);
            }
        }

        Ok(booking.result)
    }

    async fn follow_up(&self, step: FollowUp, booking: &mut Booking) -> Result<(), Warning> {
        let order_id = booking.result.order_id;
        match step {
            FollowUp::RecordPayment => self
                .deps
                .orders
                .mark_payment_recorded(order_id)
                .await
                .map_err(|e| Warning::with_detail(WarningKind::PaymentNotRecorded, e.to_string())),

            FollowUp::NotifyCustomer => {
                if let Some(reason) = self.customer_skip_reason(&booking.result) {
                    tracing::info!("Order {} customer email skipped: {}", order_id, reason);
                    booking.result.email_skipped = reason;
                    return Ok(());
                }
                let message = customer_message(&booking.result, &self.policy.mail);
                match self.deps.notifier.send(&message).await {
                    Ok(()) => {
                        booking.customer_notified = true;
                        Ok(())
                    }
                    Err(e) => {
                        booking.result.email_skipped = "customer email failed to send".to_string();
                        Err(Warning::with_detail(WarningKind::CustomerEmailFailed, e.to_string()))
                    }
                }
            }

            FollowUp::RecordConfirmation => {
                if !booking.customer_notified {
                    return Ok(());
                }
                self.deps
                    .orders
                    .mark_confirmation_sent(order_id)
                    .await
                    .map_err(|e| {
                        Warning::with_detail(WarningKind::ConfirmationNotRecorded, e.to_string())
                    })
            }

            FollowUp::NotifyOperator => {
                let teams = match self.deps.catalog.list_teams_for_tour(booking.result.tour.id()).await {
                    Ok(teams) => teams,
                    Err(e) => {
                        tracing::warn!("Order {} team lookup failed: {}", order_id, e);
                        booking
                            .result
                            .warnings
                            .insert(Warning::with_detail(WarningKind::TeamsLookupFailed, e.to_string()));
                        Vec::new()
                    }
                };
                let message = operator_message(
                    &booking.result,
                    &teams,
                    booking.customer_notified,
                    &self.policy.mail,
                );
                self.deps
                    .notifier
                    .send(&message)
                    .await
                    .map_err(|e| Warning::with_detail(WarningKind::OperatorEmailFailed, e.to_string()))
            }
        }
    }

    fn customer_skip_reason(&self, result: &ConfirmationResult) -> Option<String> {
        if !result.tour.tour.auto_confirm {
            return Some("tour does not auto-confirm".to_string());
        }
        if result.warnings.has_blocking() {
            let codes: Vec<&str> = result.warnings.blocking().map(|w| w.kind.code()).collect();
            return Some(format!("blocked by warnings: {}", codes.join(", ")));
        }
        None
    }
}

/// Fatal outcomes. Everything here ends the request with an error status.
#[derive(Debug, thiserror::Error)]
pub enum ConfirmError {
    #[error("Invalid request: {0}")]
    InvalidInput(String),

    #[error("Pricing mismatch: quoted={quoted_cents}, actual={actual_cents}")]
    PricingMismatch {
        quoted_cents: u64,
        actual_cents: u64,
    },

    #[error("Tour not found: {0}")]
    TourNotFound(TourId),

    #[error("Tour lookup failed: {0}")]
    Catalog(String),

    #[error("Order creation failed: {0}")]
    Persist(String),

    /// The order stays persisted and unpaid.
    #[error("Payment declined for order {order_id}: {message}")]
    PaymentDeclined { order_id: Uuid, message: String },

    /// The order stays persisted and unpaid.
    #[error("Payment failed for order {order_id}: {detail}")]
    PaymentFailed { order_id: Uuid, detail: String },
}

impl ConfirmError {
    /// Message safe to return to the caller. Internal detail stays in the log.
    pub fn public_message(&self) -> String {
        match self {
            ConfirmError::InvalidInput(msg) => msg.clone(),
            ConfirmError::PricingMismatch { .. } => "Pricing error".to_string(),
            ConfirmError::TourNotFound(id) => format!("Invalid tour ID {}", id),
            ConfirmError::PaymentDeclined { message, .. } => message.clone(),
            ConfirmError::Catalog(_) | ConfirmError::Persist(_) | ConfirmError::PaymentFailed { .. } => {
                "Server error".to_string()
            }
        }
    }
}

impl From<PricingError> for ConfirmError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::InvalidQuote(_) => ConfirmError::InvalidInput(err.to_string()),
            PricingError::Mismatch {
                quoted_cents,
                actual_cents,
            } => ConfirmError::PricingMismatch {
                quoted_cents,
                actual_cents,
            },
        }
    }
}

impl From<RiderError> for ConfirmError {
    fn from(err: RiderError) -> Self {
        ConfirmError::InvalidInput(err.to_string())
    }
}
