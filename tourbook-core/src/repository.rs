use async_trait::async_trait;
use uuid::Uuid;
use crate::{BoxError, Contact, Rider, Team, TourDetail, TourId};

/// Read-only access to tours.
#[async_trait]
pub trait TourCatalog: Send + Sync {
    /// Reads the tour fresh, with price and remaining spots derived now.
    /// `default_capacity` applies to tours that carry no capacity of their own.
    async fn lookup_tour_detail(
        &self,
        tour_id: TourId,
        default_capacity: i32,
    ) -> Result<Option<TourDetail>, BoxError>;

    /// Guide/sweep teams, latest assignment only.
    async fn list_teams_for_tour(&self, tour_id: TourId) -> Result<Vec<Team>, BoxError>;
}

/// Everything needed to persist one order and its line item.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub tour_id: TourId,
    pub rider_count: u32,
    pub riders: Vec<Rider>,
    pub total_cents: u64,
    pub contact: Contact,
}

/// Durable order storage.
///
/// `create_order` is all-or-nothing. The status updates are independent single-row
/// writes and may fail on their own.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create_order(&self, order: &NewOrder) -> Result<Uuid, BoxError>;

    async fn mark_payment_recorded(&self, order_id: Uuid) -> Result<(), BoxError>;

    async fn mark_confirmation_sent(&self, order_id: Uuid) -> Result<(), BoxError>;
}
