use async_trait::async_trait;
use sqlx::PgPool;
use tourbook_core::repository::TourCatalog;
use tourbook_core::{BoxError, Team, Tour, TourDetail, TourId};

pub struct StoreTourCatalog {
    pool: PgPool,
}

impl StoreTourCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TourRow {
    id: i32,
    code: String,
    scheduled_at: chrono::DateTime<chrono::Utc>,
    price: f64,
    capacity: Option<i32>,
    auto_confirm: bool,
    is_full: bool,
    is_cancelled: bool,
    is_deleted: bool,
    riders_require_height: bool,
    booked: i64,
}

#[derive(sqlx::FromRow)]
struct TeamRow {
    guide: String,
    sweep: String,
}

/// Remaining spots. Only orders whose payment was recorded count as booked.
pub(crate) fn spots_remaining(capacity: Option<i32>, default_capacity: i32, booked: i64) -> i32 {
    let remaining = i64::from(capacity.unwrap_or(default_capacity)) - booked;
    remaining.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[async_trait]
impl TourCatalog for StoreTourCatalog {
    async fn lookup_tour_detail(
        &self,
        tour_id: TourId,
        default_capacity: i32,
    ) -> Result<Option<TourDetail>, BoxError> {
        // Not isolated from concurrent checkouts: the booked count can be stale by the
        // time the order is written.
        let row = sqlx::query_as::<_, TourRow>(
            r#"
            SELECT
                t.id, t.code, t.scheduled_at, t.price, t.capacity, t.auto_confirm,
                t.is_full, t.is_cancelled, t.is_deleted, t.riders_require_height,
                COALESCE((
                    SELECT SUM(oi.riders)
                    FROM order_items oi
                    JOIN orders o ON o.id = oi.order_id
                    WHERE oi.tour_id = t.id AND o.payment_recorded
                ), 0)::BIGINT AS booked
            FROM tours t
            WHERE t.id = $1
            "#,
        )
        .bind(tour_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| TourDetail {
            spots_remaining: spots_remaining(row.capacity, default_capacity, row.booked),
            price: row.price,
            tour: Tour {
                id: row.id,
                code: row.code,
                time: row.scheduled_at,
                auto_confirm: row.auto_confirm,
                full: row.is_full,
                cancelled: row.is_cancelled,
                deleted: row.is_deleted,
                riders_require_height: row.riders_require_height,
                capacity: row.capacity,
            },
        }))
    }

    async fn list_teams_for_tour(&self, tour_id: TourId) -> Result<Vec<Team>, BoxError> {
        let rows = sqlx::query_as::<_, TeamRow>(
            r#"
            SELECT guide, sweep
            FROM tour_teams
            WHERE tour_id = $1
              AND version = (SELECT MAX(version) FROM tour_teams WHERE tour_id = $1)
            ORDER BY id
            "#,
        )
        .bind(tour_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Team {
                guide: row.guide,
                sweep: row.sweep,
            })
            .collect())
    }
}
