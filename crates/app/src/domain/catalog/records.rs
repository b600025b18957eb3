//! Catalog Records

use rust_decimal::Decimal;
use sqlx::{FromRow, Row, postgres::PgRow, types::Json};
use tally::{
    catalog::{CatalogProduct, CatalogVariant, VariantAttribute, VariantAttributes},
    ids::{CategoryUuid, ProductUuid, VariantUuid},
};

use crate::database::i32_to_quantity;

/// A `products` row.
#[derive(Debug, Clone)]
pub(crate) struct ProductRecord {
    pub uuid: ProductUuid,
    pub title: String,
    pub slug: String,
    pub image: Option<String>,
    pub price: Decimal,
    pub stock: u32,
    pub category: Option<CategoryUuid>,
    pub is_active: bool,
}

impl ProductRecord {
    pub(crate) fn with_variants(self, variants: Vec<VariantRecord>) -> CatalogProduct {
        CatalogProduct {
            uuid: self.uuid,
            title: self.title,
            slug: self.slug,
            image: self.image,
            price: self.price,
            stock: self.stock,
            category: self.category,
            is_active: self.is_active,
            variants: variants.into_iter().map(CatalogVariant::from).collect(),
        }
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            title: row.try_get("title")?,
            slug: row.try_get("slug")?,
            image: row.try_get("image")?,
            price: row.try_get("price")?,
            stock: i32_to_quantity(row.try_get("stock")?, "stock")?,
            category: row
                .try_get::<Option<uuid::Uuid>, _>("category_uuid")?
                .map(CategoryUuid::from_uuid),
            is_active: row.try_get("is_active")?,
        })
    }
}

/// A `product_variants` row.
#[derive(Debug, Clone)]
pub(crate) struct VariantRecord {
    pub uuid: VariantUuid,
    pub title: String,
    pub sku: Option<String>,
    pub price: Decimal,
    pub stock: u32,
    pub image: Option<String>,
    pub attributes: Vec<VariantAttribute>,
}

impl From<VariantRecord> for CatalogVariant {
    fn from(record: VariantRecord) -> Self {
        Self {
            uuid: record.uuid,
            title: record.title,
            sku: record.sku,
            price: record.price,
            stock: record.stock,
            image: record.image,
            attributes: VariantAttributes::from_vec(record.attributes),
        }
    }
}

impl<'r> FromRow<'r, PgRow> for VariantRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let Json(attributes) = row.try_get::<Json<Vec<VariantAttribute>>, _>("attributes")?;

        Ok(Self {
            uuid: VariantUuid::from_uuid(row.try_get("uuid")?),
            title: row.try_get("title")?,
            sku: row.try_get("sku")?,
            price: row.try_get("price")?,
            stock: i32_to_quantity(row.try_get("stock")?, "stock")?,
            image: row.try_get("image")?,
            attributes,
        })
    }
}
