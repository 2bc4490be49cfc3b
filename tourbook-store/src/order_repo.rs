use async_trait::async_trait;
use uuid::Uuid;
use sqlx::PgPool;
use tourbook_core::repository::{NewOrder, OrderRepository};
use tourbook_core::BoxError;

pub struct StoreOrderRepository {
    pool: PgPool,
}

impl StoreOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn set_flag(&self, order_id: Uuid, column: OrderFlag) -> Result<(), BoxError> {
        let sql = match column {
            OrderFlag::PaymentRecorded => "UPDATE orders SET payment_recorded = TRUE WHERE id = $1",
            OrderFlag::ConfirmationSent => "UPDATE orders SET confirmation_sent = TRUE WHERE id = $1",
        };
        let result = sqlx::query(sql).bind(order_id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(format!("Order {} not found", order_id).into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum OrderFlag {
    PaymentRecorded,
    ConfirmationSent,
}

#[async_trait]
impl OrderRepository for StoreOrderRepository {
    async fn create_order(&self, order: &NewOrder) -> Result<Uuid, BoxError> {
        let order_id = Uuid::new_v4();
        let total_cents = i64::try_from(order.total_cents)?;
        let riders = i32::try_from(order.rider_count)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_name, customer_email, mobile, hotel, misc, total_cents)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(order_id)
        .bind(&order.contact.name)
        .bind(order.contact.email.expose())
        .bind(&order.contact.mobile)
        .bind(&order.contact.hotel)
        .bind(&order.contact.misc)
        .bind(total_cents)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, item_num, tour_id, riders)
            VALUES ($1, 0, $2, $3)
            "#,
        )
        .bind(order_id)
        .bind(order.tour_id)
        .bind(riders)
        .execute(&mut *tx)
        .await?;

        for (i, rider) in order.riders.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_riders (order_id, rider_num, gender, height)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(order_id)
            .bind(i as i32)
            .bind(rider.gender.code())
            .bind(rider.height.map(i32::from))
            .execute(&mut *tx)
            .await?;
        }

        // Dropping the transaction on any early return above rolls it back.
        tx.commit().await?;

        Ok(order_id)
    }

    async fn mark_payment_recorded(&self, order_id: Uuid) -> Result<(), BoxError> {
        self.set_flag(order_id, OrderFlag::PaymentRecorded).await
    }

    async fn mark_confirmation_sent(&self, order_id: Uuid) -> Result<(), BoxError> {
        self.set_flag(order_id, OrderFlag::ConfirmationSent).await
    }
}
