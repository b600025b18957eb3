//! Tally Domain Concerns

use std::sync::Arc;

use crate::database::Db;

pub mod catalog;
pub mod checkout;
pub mod coupons;
pub mod deals;
pub mod orders;
pub mod promotions;
pub mod quotes;
pub mod shipping;

pub(crate) mod terms;

/// The storage collaborators the quote and checkout services share.
#[derive(Clone)]
pub struct Stores {
    pub catalog: Arc<dyn catalog::CatalogRepository>,
    pub deals: Arc<dyn deals::DealsRepository>,
    pub coupons: Arc<dyn coupons::CouponsRepository>,
    pub promotions: Arc<dyn promotions::PromotionsRepository>,
    pub shipping: Arc<dyn shipping::ShippingSettingsRepository>,
    pub orders: Arc<dyn orders::OrdersRepository>,
}

impl Stores {
    /// Back every collaborator with `PostgreSQL`.
    #[must_use]
    pub fn postgres(db: &Db) -> Self {
        Self {
            catalog: Arc::new(catalog::PgCatalogRepository::new(db.clone())),
            deals: Arc::new(deals::PgDealsRepository::new(db.clone())),
            coupons: Arc::new(coupons::PgCouponsRepository::new(db.clone())),
            promotions: Arc::new(promotions::PgPromotionsRepository::new(db.clone())),
            shipping: Arc::new(shipping::PgShippingSettingsRepository::new(db.clone())),
            orders: Arc::new(orders::PgOrdersRepository::new(db.clone())),
        }
    }
}
