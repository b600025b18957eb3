//! Orders Repository

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{Postgres, Transaction, query, types::Json};
use tally::{
    ids::OrderUuid,
    orders::{NewOrder, OrderLine},
};

use crate::database::{Db, StoreError, quantity_to_i32};

const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const CREATE_ORDER_LINE_SQL: &str = include_str!("sql/create_order_line.sql");

#[derive(Debug, Clone)]
pub struct PgOrdersRepository {
    db: Db,
}

impl PgOrdersRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    async fn insert_line(
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        position: usize,
        line: &OrderLine,
    ) -> Result<(), sqlx::Error> {
        let position = i32::try_from(position).map_err(|e| sqlx::Error::ColumnDecode {
            index: "position".to_string(),
            source: Box::new(e),
        })?;

        query(CREATE_ORDER_LINE_SQL)
            .bind(order.into_uuid())
            .bind(position)
            .bind(line.product.into_uuid())
            .bind(line.variant.map(|variant| variant.into_uuid()))
            .bind(&line.title)
            .bind(&line.slug)
            .bind(line.image.as_deref())
            .bind(line.variant_title.as_deref())
            .bind(line.sku.as_deref())
            .bind(Json(line.attributes.as_slice()))
            .bind(line.unit_price)
            .bind(line.original_unit_price)
            .bind(quantity_to_i32(line.quantity, "quantity")?)
            .bind(line.line_total)
            .bind(line.deal.as_ref().map(Json))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl OrdersRepository for PgOrdersRepository {
    async fn create_order(&self, order: NewOrder) -> Result<OrderUuid, StoreError> {
        let mut tx = self.db.begin().await?;

        query(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.payer.customer().map(|customer| customer.into_uuid()))
            .bind(order.payer.guest_email().map(|email| email.as_str().to_string()))
            .bind(Json(&order.address))
            .bind(order.payment_method.as_str())
            .bind(order.payment_status.as_str())
            .bind(order.order_status.as_str())
            .bind(order.is_paid)
            .bind(&order.currency.code)
            .bind(order.currency.exchange_rate)
            .bind(order.coupon.as_ref().map(|coupon| coupon.uuid.into_uuid()))
            .bind(order.coupon.as_ref().map(|coupon| coupon.code.clone()))
            .bind(order.promotion.as_ref().map(|promotion| promotion.uuid.into_uuid()))
            .bind(order.promotion.as_ref().map(|promotion| promotion.title.clone()))
            .bind(order.items_subtotal)
            .bind(order.coupon_discount_amount)
            .bind(order.promotion_discount_amount)
            .bind(order.discount_amount)
            .bind(order.shipping_amount)
            .bind(order.tax_amount)
            .bind(order.total_amount)
            .bind(&order.delivery_eta)
            .bind(SqlxTimestamp::from(order.created_at))
            .execute(&mut *tx)
            .await?;

        for (position, line) in order.lines.iter().enumerate() {
            Self::insert_line(&mut tx, order.uuid, position, line).await?;
        }

        tx.commit().await?;

        Ok(order.uuid)
    }
}

#[automock]
#[async_trait]
pub trait OrdersRepository: Send + Sync {
    /// Persist an order with its lines in one transaction.
    async fn create_order(&self, order: NewOrder) -> Result<OrderUuid, StoreError>;
}
