//! Catalog Lookup
//!
//! Resolves a requested cart line against its product and variant records.
//! A variant, when requested, is authoritative for price, stock and image.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    cart::CartLine,
    ids::{CategoryUuid, ProductUuid, VariantUuid},
};

/// Message shown on a line whose product is missing or inactive.
pub const PRODUCT_NOT_FOUND: &str = "Product not found";

/// Message shown on a line whose requested variant does not exist.
pub const VARIANT_NOT_FOUND: &str = "Variant not found";

/// A named variant option such as `Size: L`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantAttribute {
    /// Option name.
    pub name: String,

    /// Selected value.
    pub value: String,
}

/// Variant attributes, usually only a handful.
pub type VariantAttributes = SmallVec<[VariantAttribute; 4]>;

/// A product variant as held by the catalog store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogVariant {
    /// Variant id.
    pub uuid: VariantUuid,

    /// Display title, e.g. "Large / Blue".
    pub title: String,

    /// Stock keeping unit.
    pub sku: Option<String>,

    /// Current price.
    pub price: Decimal,

    /// Units on hand.
    pub stock: u32,

    /// Variant image, falling back to the product image when absent.
    pub image: Option<String>,

    /// Option values.
    pub attributes: VariantAttributes,
}

/// A product as held by the catalog store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    /// Product id.
    pub uuid: ProductUuid,

    /// Display title.
    pub title: String,

    /// URL slug.
    pub slug: String,

    /// Primary image.
    pub image: Option<String>,

    /// Product-level price, used when no variant is requested.
    pub price: Decimal,

    /// Product-level stock, used when no variant is requested.
    pub stock: u32,

    /// Category used for coupon and promotion scoping.
    pub category: Option<CategoryUuid>,

    /// Inactive products behave as missing.
    pub is_active: bool,

    /// Purchasable variants.
    pub variants: Vec<CatalogVariant>,
}

impl CatalogProduct {
    /// Find one of this product's variants.
    #[must_use]
    pub fn variant(&self, variant: VariantUuid) -> Option<&CatalogVariant> {
        self.variants.iter().find(|v| v.uuid == variant)
    }
}

/// A cart line joined with its catalog record, before deals are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLine {
    /// The request this line answers.
    pub line: CartLine,

    /// Product title, empty when unavailable.
    pub title: String,

    /// Product slug, empty when unavailable.
    pub slug: String,

    /// Variant title, when a variant was resolved.
    pub variant_title: Option<String>,

    /// Variant sku, when a variant was resolved.
    pub sku: Option<String>,

    /// Image to display.
    pub image: Option<String>,

    /// Catalog price before any deal. Zero when unavailable.
    pub base_price: Decimal,

    /// Units on hand for the resolved record.
    pub available_stock: u32,

    /// Category of the product, if any.
    pub category: Option<CategoryUuid>,

    /// Variant option values.
    pub attributes: VariantAttributes,

    /// Why the record itself could not be resolved.
    pub unavailable_reason: Option<&'static str>,
}

impl ResolvedLine {
    /// Whether the catalog record was found at all.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.unavailable_reason.is_none()
    }

    /// Whether the line can be fulfilled from current stock.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.is_resolved() && self.available_stock >= self.line.quantity
    }

    fn unavailable(line: CartLine, reason: &'static str) -> Self {
        Self {
            line,
            title: String::new(),
            slug: String::new(),
            variant_title: None,
            sku: None,
            image: None,
            base_price: Decimal::ZERO,
            available_stock: 0,
            category: None,
            attributes: VariantAttributes::new(),
            unavailable_reason: Some(reason),
        }
    }
}

/// Resolve one line against its product record.
///
/// A missing or inactive product, or a requested variant the product does not
/// carry, yields an unavailable line priced at zero rather than an error, so
/// the rest of the cart can still be quoted.
#[must_use]
pub fn resolve_line(line: CartLine, product: Option<&CatalogProduct>) -> ResolvedLine {
    let Some(product) = product.filter(|p| p.is_active && p.uuid == line.product) else {
        return ResolvedLine::unavailable(line, PRODUCT_NOT_FOUND);
    };

    let Some(variant_uuid) = line.variant else {
        return ResolvedLine {
            line,
            title: product.title.clone(),
            slug: product.slug.clone(),
            variant_title: None,
            sku: None,
            image: product.image.clone(),
            base_price: product.price,
            available_stock: product.stock,
            category: product.category,
            attributes: VariantAttributes::new(),
            unavailable_reason: None,
        };
    };

    let Some(variant) = product.variant(variant_uuid) else {
        return ResolvedLine::unavailable(line, VARIANT_NOT_FOUND);
    };

    ResolvedLine {
        line,
        title: product.title.clone(),
        slug: product.slug.clone(),
        variant_title: Some(variant.title.clone()),
        sku: variant.sku.clone(),
        image: variant.image.clone().or_else(|| product.image.clone()),
        base_price: variant.price,
        available_stock: variant.stock,
        category: product.category,
        attributes: variant.attributes.clone(),
        unavailable_reason: None,
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::*;

    fn product() -> CatalogProduct {
        CatalogProduct {
            uuid: ProductUuid::new(),
            title: "Linen Shirt".to_string(),
            slug: "linen-shirt".to_string(),
            image: Some("shirt.jpg".to_string()),
            price: Decimal::from(40),
            stock: 10,
            category: Some(CategoryUuid::new()),
            is_active: true,
            variants: vec![CatalogVariant {
                uuid: VariantUuid::new(),
                title: "Large".to_string(),
                sku: Some("SHIRT-L".to_string()),
                price: Decimal::from(45),
                stock: 2,
                image: None,
                attributes: smallvec![VariantAttribute {
                    name: "Size".to_string(),
                    value: "L".to_string(),
                }],
            }],
        }
    }

    #[test]
    fn product_level_fields_are_used_without_variant() {
        let product = product();

        let resolved = resolve_line(CartLine::new(product.uuid, 3), Some(&product));

        assert_eq!(resolved.base_price, Decimal::from(40));
        assert_eq!(resolved.available_stock, 10);
        assert!(resolved.is_available());
    }

    #[test]
    fn variant_is_authoritative_for_price_and_stock() {
        let product = product();
        let variant = product.variants.first().map(|v| v.uuid).unwrap_or_default();

        let resolved = resolve_line(
            CartLine::with_variant(product.uuid, variant, 3),
            Some(&product),
        );

        assert_eq!(resolved.base_price, Decimal::from(45));
        assert_eq!(resolved.available_stock, 2);
        assert_eq!(resolved.image.as_deref(), Some("shirt.jpg"));
        assert_eq!(resolved.attributes.len(), 1);
        assert!(!resolved.is_available(), "3 requested against stock of 2");
    }

    #[test]
    fn missing_product_is_unavailable_and_free() {
        let resolved = resolve_line(CartLine::new(ProductUuid::new(), 1), None);

        assert_eq!(resolved.unavailable_reason, Some(PRODUCT_NOT_FOUND));
        assert_eq!(resolved.base_price, Decimal::ZERO);
        assert!(!resolved.is_available());
    }

    #[test]
    fn inactive_product_is_treated_as_missing() {
        let mut product = product();
        product.is_active = false;

        let resolved = resolve_line(CartLine::new(product.uuid, 1), Some(&product));

        assert_eq!(resolved.unavailable_reason, Some(PRODUCT_NOT_FOUND));
    }

    #[test]
    fn unknown_variant_is_unavailable() {
        let product = product();

        let resolved = resolve_line(
            CartLine::with_variant(product.uuid, VariantUuid::new(), 1),
            Some(&product),
        );

        assert_eq!(resolved.unavailable_reason, Some(VARIANT_NOT_FOUND));
    }
}
