use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;
use uuid::Uuid;
use tourbook_core::repository::{NewOrder, OrderRepository, TourCatalog};
use tourbook_core::{BoxError, Team, Tour, TourDetail, TourId};
use crate::tour_repo::spots_remaining;

/// One tour in a seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedTour {
    #[serde(flatten)]
    pub tour: Tour,
    pub price: f64,
    #[serde(default)]
    pub teams: Vec<Team>,
}

#[derive(Debug, Clone)]
pub struct StoredOrder {
    pub id: Uuid,
    pub order: NewOrder,
    pub payment_recorded: bool,
    pub confirmation_sent: bool,
}

/// Process-local catalog and order store for development runs.
///
/// Tour details are still derived per lookup from the stored orders, so the
/// orchestrator sees the same freshness it gets from Postgres.
#[derive(Default)]
pub struct MemoryStore {
    tours: RwLock<HashMap<TourId, SeedTour>>,
    orders: RwLock<Vec<StoredOrder>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tours(tours: Vec<SeedTour>) -> Self {
        let tours = tours.into_iter().map(|t| (t.tour.id, t)).collect();
        Self {
            tours: RwLock::new(tours),
            orders: RwLock::new(Vec::new()),
        }
    }

    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, BoxError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let tours: Vec<SeedTour> = serde_json::from_str(&raw)?;
        tracing::info!("Seeded {} tours from {}", tours.len(), path.as_ref().display());
        Ok(Self::with_tours(tours))
    }

    pub async fn orders(&self) -> Vec<StoredOrder> {
        self.orders.read().await.clone()
    }

    async fn set_flag(
        &self,
        order_id: Uuid,
        apply: impl FnOnce(&mut StoredOrder),
    ) -> Result<(), BoxError> {
        let mut orders = self.orders.write().await;
        let order = orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| format!("Order {} not found", order_id))?;
        apply(order);
        Ok(())
    }
}

#[async_trait]
impl TourCatalog for MemoryStore {
    async fn lookup_tour_detail(
        &self,
        tour_id: TourId,
        default_capacity: i32,
    ) -> Result<Option<TourDetail>, BoxError> {
        let Some(seed) = self.tours.read().await.get(&tour_id).cloned() else {
            return Ok(None);
        };

        let booked: i64 = self
            .orders
            .read()
            .await
            .iter()
            .filter(|o| o.payment_recorded && o.order.tour_id == tour_id)
            .map(|o| i64::from(o.order.rider_count))
            .sum();

        Ok(Some(TourDetail {
            spots_remaining: spots_remaining(seed.tour.capacity, default_capacity, booked),
            price: seed.price,
            tour: seed.tour,
        }))
    }

    async fn list_teams_for_tour(&self, tour_id: TourId) -> Result<Vec<Team>, BoxError> {
        Ok(self
            .tours
            .read()
            .await
            .get(&tour_id)
            .map(|t| t.teams.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn create_order(&self, order: &NewOrder) -> Result<Uuid, BoxError> {
        let id = Uuid::new_v4();
        self.orders.write().await.push(StoredOrder {
            id,
            order: order.clone(),
            payment_recorded: false,
            confirmation_sent: false,
        });
        Ok(id)
    }

    async fn mark_payment_recorded(&self, order_id: Uuid) -> Result<(), BoxError> {
        self.set_flag(order_id, |o| o.payment_recorded = true).await
    }

    async fn mark_confirmation_sent(&self, order_id: Uuid) -> Result<(), BoxError> {
        self.set_flag(order_id, |o| o.confirmation_sent = true).await
    }
}
