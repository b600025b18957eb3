//! Inventory reservation saga.
//!
//! Stock is taken one line at a time with an atomic conditional decrement.
//! Every successful decrement is recorded so that a later failure, in this
//! saga or after it, can hand the stock back. Compensation is best effort: a
//! release that fails is logged and counted, not retried, and a crash midway
//! leaves the remaining stock taken.

use std::sync::Arc;

use tally::{
    cart::CartLine,
    ids::{ProductUuid, VariantUuid},
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{database::StoreError, domain::catalog::CatalogRepository};

/// Where a saga is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SagaState {
    /// Nothing reserved yet.
    Pending,

    /// Reserving the line at this index.
    Reserving { line: usize },

    /// Every line is reserved.
    Committed,

    /// Releasing what was reserved.
    RollingBack,

    /// Compensation ran; nothing this saga reserved is still intended to be
    /// held.
    Failed { failure: SagaFailure },
}

/// Why a saga was rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SagaFailure {
    /// The line's conditional decrement matched nothing.
    InsufficientStock { line: usize },

    /// The store failed while reserving the line.
    Storage { line: usize },

    /// Every line was reserved but a later step failed.
    Aborted,
}

/// One successful decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reservation {
    pub line: usize,
    pub product: ProductUuid,
    pub variant: Option<VariantUuid>,
    pub quantity: u32,
}

#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("insufficient stock for line {line}")]
    InsufficientStock { line: usize },

    #[error("failed to reserve line {line}")]
    Storage {
        line: usize,
        #[source]
        source: StoreError,
    },
}

/// Outcome of a rollback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompensationReport {
    /// Reservations handed back.
    pub released: usize,

    /// Reservations whose release failed.
    pub unreleased: usize,
}

pub struct ReservationSaga {
    catalog: Arc<dyn CatalogRepository>,
    lines: Vec<CartLine>,
    state: SagaState,
    applied: Vec<Reservation>,
}

impl ReservationSaga {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogRepository>, lines: Vec<CartLine>) -> Self {
        Self {
            catalog,
            applied: Vec::with_capacity(lines.len()),
            lines,
            state: SagaState::Pending,
        }
    }

    #[must_use]
    pub fn state(&self) -> SagaState {
        self.state
    }

    /// Reservations currently held, in the order they were taken.
    #[must_use]
    pub fn applied(&self) -> &[Reservation] {
        &self.applied
    }

    /// Reserve every line in order.
    ///
    /// On the first failure everything already reserved is released before
    /// the error is returned, leaving the saga in [`SagaState::Failed`].
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::InsufficientStock`] when a line's stock ran
    /// out, or [`ReservationError::Storage`] when the store failed.
    pub async fn reserve_all(&mut self) -> Result<(), ReservationError> {
        for (index, line) in self.lines.clone().into_iter().enumerate() {
            self.state = SagaState::Reserving { line: index };

            let reserved = self
                .catalog
                .try_reserve_stock(line.product, line.variant, line.quantity)
                .await;

            match reserved {
                Ok(true) => self.applied.push(Reservation {
                    line: index,
                    product: line.product,
                    variant: line.variant,
                    quantity: line.quantity,
                }),
                Ok(false) => {
                    warn!(
                        line = index,
                        product_uuid = %line.product,
                        quantity = line.quantity,
                        "stock reservation conflict"
                    );

                    self.compensate(SagaFailure::InsufficientStock { line: index })
                        .await;

                    return Err(ReservationError::InsufficientStock { line: index });
                }
                Err(source) => {
                    self.compensate(SagaFailure::Storage { line: index }).await;

                    return Err(ReservationError::Storage {
                        line: index,
                        source,
                    });
                }
            }
        }

        self.state = SagaState::Committed;

        Ok(())
    }

    /// Release every held reservation and finish in [`SagaState::Failed`].
    ///
    /// Releases are independent of each other, so one failing does not stop
    /// the rest.
    pub async fn compensate(&mut self, failure: SagaFailure) -> CompensationReport {
        self.state = SagaState::RollingBack;

        let mut report = CompensationReport::default();

        for reservation in self.applied.drain(..) {
            let released = self
                .catalog
                .release_stock(reservation.product, reservation.variant, reservation.quantity)
                .await;

            match released {
                Ok(()) => report.released += 1,
                Err(error) => {
                    warn!(
                        line = reservation.line,
                        product_uuid = %reservation.product,
                        quantity = reservation.quantity,
                        error = %error,
                        "failed to release reserved stock"
                    );

                    report.unreleased += 1;
                }
            }
        }

        debug!(
            released = report.released,
            unreleased = report.unreleased,
            "reservations rolled back"
        );

        self.state = SagaState::Failed { failure };

        report
    }
}

#[cfg(test)]
mod tests {
    use mockall::{Sequence, predicate::eq};
    use testresult::TestResult;

    use crate::domain::catalog::MockCatalogRepository;

    use super::*;

    fn lines(products: &[ProductUuid]) -> Vec<CartLine> {
        products
            .iter()
            .map(|product| CartLine::new(*product, 2))
            .collect()
    }

    #[tokio::test]
    async fn all_lines_reserved_commits() -> TestResult {
        let products = [ProductUuid::new(), ProductUuid::new()];

        let mut catalog = MockCatalogRepository::new();

        catalog
            .expect_try_reserve_stock()
            .times(2)
            .returning(|_, _, _| Ok(true));

        catalog.expect_release_stock().never();

        let mut saga = ReservationSaga::new(Arc::new(catalog), lines(&products));

        saga.reserve_all().await?;

        assert_eq!(saga.state(), SagaState::Committed);
        assert_eq!(saga.applied().len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn conflict_releases_earlier_lines_only() {
        let products = [ProductUuid::new(), ProductUuid::new(), ProductUuid::new()];
        let [first, second, third] = products;

        let mut catalog = MockCatalogRepository::new();
        let mut sequence = Sequence::new();

        catalog
            .expect_try_reserve_stock()
            .with(eq(first), eq(None), eq(2))
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _, _| Ok(true));

        catalog
            .expect_try_reserve_stock()
            .with(eq(second), eq(None), eq(2))
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _, _| Ok(false));

        catalog
            .expect_release_stock()
            .with(eq(first), eq(None), eq(2))
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _, _| Ok(()));

        catalog
            .expect_try_reserve_stock()
            .with(eq(third), eq(None), eq(2))
            .never();

        let mut saga = ReservationSaga::new(Arc::new(catalog), lines(&products));

        let result = saga.reserve_all().await;

        assert!(
            matches!(result, Err(ReservationError::InsufficientStock { line: 1 })),
            "expected InsufficientStock, got {result:?}"
        );
        assert_eq!(
            saga.state(),
            SagaState::Failed {
                failure: SagaFailure::InsufficientStock { line: 1 }
            }
        );
        assert!(saga.applied().is_empty());
    }

    #[tokio::test]
    async fn storage_failure_rolls_back() {
        let products = [ProductUuid::new(), ProductUuid::new()];
        let [first, second] = products;

        let mut catalog = MockCatalogRepository::new();
        let mut sequence = Sequence::new();

        catalog
            .expect_try_reserve_stock()
            .with(eq(first), eq(None), eq(2))
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _, _| Ok(true));

        catalog
            .expect_try_reserve_stock()
            .with(eq(second), eq(None), eq(2))
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _, _| Err(StoreError::Unavailable("connection reset".to_string())));

        catalog
            .expect_release_stock()
            .with(eq(first), eq(None), eq(2))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut saga = ReservationSaga::new(Arc::new(catalog), lines(&products));

        let result = saga.reserve_all().await;

        assert!(
            matches!(result, Err(ReservationError::Storage { line: 1, .. })),
            "expected Storage, got {result:?}"
        );
        assert_eq!(
            saga.state(),
            SagaState::Failed {
                failure: SagaFailure::Storage { line: 1 }
            }
        );
    }

    #[tokio::test]
    async fn failed_release_is_counted_and_the_rest_continue() -> TestResult {
        let products = [ProductUuid::new(), ProductUuid::new()];
        let [first, second] = products;

        let mut catalog = MockCatalogRepository::new();

        catalog
            .expect_try_reserve_stock()
            .times(2)
            .returning(|_, _, _| Ok(true));

        catalog
            .expect_release_stock()
            .with(eq(first), eq(None), eq(2))
            .times(1)
            .returning(|_, _, _| Err(StoreError::Unavailable("timeout".to_string())));

        catalog
            .expect_release_stock()
            .with(eq(second), eq(None), eq(2))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut saga = ReservationSaga::new(Arc::new(catalog), lines(&products));

        saga.reserve_all().await?;

        let report = saga.compensate(SagaFailure::Aborted).await;

        assert_eq!(
            report,
            CompensationReport {
                released: 1,
                unreleased: 1
            }
        );
        assert_eq!(
            saga.state(),
            SagaState::Failed {
                failure: SagaFailure::Aborted
            }
        );

        Ok(())
    }
}
