//! Typed Uuids

use std::{
    cmp::Ordering,
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    hash::{Hash, Hasher},
    marker::PhantomData,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// A UUID tagged with the kind of record it identifies.
///
/// The tag only exists at compile time, so a [`ProductUuid`] cannot be passed
/// where a [`VariantUuid`] is expected.
pub struct TypedUuid<T>(Uuid, PhantomData<T>);

impl<T> TypedUuid<T> {
    /// Generate a new time-ordered (v7) id.
    #[must_use]
    pub fn new() -> Self {
        Self::from_uuid(Uuid::now_v7())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, PhantomData)
    }

    /// Unwrap into the untyped UUID.
    #[must_use]
    pub const fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl<T> Default for TypedUuid<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for TypedUuid<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedUuid<T> {}

impl<T> Debug for TypedUuid<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Debug::fmt(&self.0, f)
    }
}

impl<T> Display for TypedUuid<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl<T> PartialEq for TypedUuid<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for TypedUuid<T> {}

impl<T> Hash for TypedUuid<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> PartialOrd for TypedUuid<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for TypedUuid<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> From<Uuid> for TypedUuid<T> {
    fn from(value: Uuid) -> Self {
        Self::from_uuid(value)
    }
}

impl<T> From<TypedUuid<T>> for Uuid {
    fn from(value: TypedUuid<T>) -> Self {
        value.into_uuid()
    }
}

impl<T> Serialize for TypedUuid<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for TypedUuid<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Uuid::deserialize(deserializer).map(Self::from_uuid)
    }
}

/// Marker for catalog products.
#[derive(Debug)]
pub enum ProductTag {}

/// Marker for product variants.
#[derive(Debug)]
pub enum VariantTag {}

/// Marker for catalog categories.
#[derive(Debug)]
pub enum CategoryTag {}

/// Marker for time-boxed deals.
#[derive(Debug)]
pub enum DealTag {}

/// Marker for coupons.
#[derive(Debug)]
pub enum CouponTag {}

/// Marker for automatic promotions.
#[derive(Debug)]
pub enum PromotionTag {}

/// Marker for persisted orders.
#[derive(Debug)]
pub enum OrderTag {}

/// Marker for authenticated customers.
#[derive(Debug)]
pub enum CustomerTag {}

/// Product UUID
pub type ProductUuid = TypedUuid<ProductTag>;

/// Variant UUID
pub type VariantUuid = TypedUuid<VariantTag>;

/// Category UUID
pub type CategoryUuid = TypedUuid<CategoryTag>;

/// Deal UUID
pub type DealUuid = TypedUuid<DealTag>;

/// Coupon UUID
pub type CouponUuid = TypedUuid<CouponTag>;

/// Promotion UUID
pub type PromotionUuid = TypedUuid<PromotionTag>;

/// Order UUID
pub type OrderUuid = TypedUuid<OrderTag>;

/// Customer UUID
pub type CustomerUuid = TypedUuid<CustomerTag>;
