#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use tourbook_catalog::RiderPolicy;
use tourbook_core::notify::{Mailbox, Message, Notifier};
use tourbook_core::payment::{ChargeReceipt, ChargeRequest, PaymentError, PaymentGateway};
use tourbook_core::repository::{NewOrder, OrderRepository, TourCatalog};
use tourbook_core::{BoxError, Team, Tour, TourDetail, TourId};
use tourbook_order::{CheckoutPolicy, ConfirmationDeps, ConfirmationOrchestrator, MailPolicy};

pub const OPERATOR: &str = "ops@example.com";

pub fn tour_detail(price: f64, spots_remaining: i32) -> TourDetail {
    TourDetail {
        tour: Tour {
            id: 562,
            code: "C".to_string(),
            time: Utc::now() + Duration::days(14),
            auto_confirm: true,
            full: false,
            cancelled: false,
            deleted: false,
            riders_require_height: false,
            capacity: Some(12),
        },
        price,
        spots_remaining,
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    pub detail: Mutex<Option<TourDetail>>,
    pub fail_lookup: bool,
    pub fail_teams: bool,
}

#[async_trait]
impl TourCatalog for FakeCatalog {
    async fn lookup_tour_detail(
        &self,
        tour_id: TourId,
        _default_capacity: i32,
    ) -> Result<Option<TourDetail>, BoxError> {
        if self.fail_lookup {
            return Err("catalog unavailable".into());
        }
        let detail = self.detail.lock().unwrap().clone();
        Ok(detail.filter(|d| d.id() == tour_id))
    }

    async fn list_teams_for_tour(&self, _tour_id: TourId) -> Result<Vec<Team>, BoxError> {
        if self.fail_teams {
            return Err("teams table locked".into());
        }
        Ok(vec![Team {
            guide: "Bill".to_string(),
            sweep: "Dana".to_string(),
        }])
    }
}

#[derive(Default)]
pub struct FakeOrders {
    pub created: Mutex<Vec<(Uuid, NewOrder)>>,
    pub payment_recorded: Mutex<Vec<Uuid>>,
    pub confirmation_sent: Mutex<Vec<Uuid>>,
    pub fail_create: bool,
    pub fail_payment_recorded: bool,
    pub fail_confirmation_sent: bool,
}

#[async_trait]
impl OrderRepository for FakeOrders {
    async fn create_order(&self, order: &NewOrder) -> Result<Uuid, BoxError> {
        if self.fail_create {
            return Err("insert into orders: connection reset".into());
        }
        let id = Uuid::new_v4();
        self.created.lock().unwrap().push((id, order.clone()));
        Ok(id)
    }

    async fn mark_payment_recorded(&self, order_id: Uuid) -> Result<(), BoxError> {
        if self.fail_payment_recorded {
            return Err("update orders: deadlock".into());
        }
        self.payment_recorded.lock().unwrap().push(order_id);
        Ok(())
    }

    async fn mark_confirmation_sent(&self, order_id: Uuid) -> Result<(), BoxError> {
        if self.fail_confirmation_sent {
            return Err("update orders: deadlock".into());
        }
        self.confirmation_sent.lock().unwrap().push(order_id);
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub enum GatewayOutcome {
    #[default]
    Approve,
    Decline(String),
    Fail,
}

#[derive(Default)]
pub struct FakeGateway {
    pub outcome: GatewayOutcome,
    pub charges: Mutex<Vec<u64>>,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt, PaymentError> {
        self.charges.lock().unwrap().push(request.amount_cents);
        match &self.outcome {
            GatewayOutcome::Approve => Ok(ChargeReceipt {
                id: "ch_test".to_string(),
                amount_cents: request.amount_cents,
                currency: request.currency.clone(),
                created_at: Utc::now(),
            }),
            GatewayOutcome::Decline(msg) => Err(PaymentError::Declined(msg.clone())),
            GatewayOutcome::Fail => Err(PaymentError::Gateway("502 from upstream".to_string())),
        }
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    pub sent: Mutex<Vec<Message>>,
    /// Sends to this address fail.
    pub fail_to: Option<String>,
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send(&self, message: &Message) -> Result<(), BoxError> {
        if self.fail_to.as_deref() == Some(message.to.address.as_str()) {
            return Err("mail api returned 503".into());
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

impl FakeNotifier {
    pub fn sent_to(&self, address: &str) -> Vec<Message> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.to.address == address)
            .cloned()
            .collect()
    }
}

pub struct Harness {
    pub catalog: Arc<FakeCatalog>,
    pub orders: Arc<FakeOrders>,
    pub gateway: Arc<FakeGateway>,
    pub notifier: Arc<FakeNotifier>,
    pub require_email: bool,
}

impl Harness {
    pub fn new(detail: TourDetail) -> Self {
        let catalog = FakeCatalog::default();
        *catalog.detail.lock().unwrap() = Some(detail);
        Self {
            catalog: Arc::new(catalog),
            orders: Arc::new(FakeOrders::default()),
            gateway: Arc::new(FakeGateway::default()),
            notifier: Arc::new(FakeNotifier::default()),
            require_email: true,
        }
    }

    pub fn orchestrator(&self) -> ConfirmationOrchestrator {
        let deps = ConfirmationDeps {
            catalog: self.catalog.clone(),
            orders: self.orders.clone(),
            payments: self.gateway.clone(),
            notifier: self.notifier.clone(),
        };
        let policy = CheckoutPolicy {
            default_capacity: 15,
            currency: "usd".to_string(),
            require_email: self.require_email,
            riders: RiderPolicy::default(),
            mail: MailPolicy {
                from: Mailbox::new("Reservations", "reservations@example.com"),
                operator: Mailbox::new("Operator", OPERATOR),
                bcc_operator: true,
                timezone: chrono_tz::America::New_York,
            },
        };
        ConfirmationOrchestrator::new(deps, policy)
    }

    pub fn charges(&self) -> Vec<u64> {
        self.gateway.charges.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<(Uuid, NewOrder)> {
        self.orders.created.lock().unwrap().clone()
    }
}
