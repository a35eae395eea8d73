//! Saga coordinator for orchestrating the checkout workflow.

use std::time::Instant;

use common::CheckoutId;
use domain::{BearerToken, CheckoutRequest, Invoice, Money, OrderId, OrderRecord, PricedItem};

use crate::error::{CompensationReport, PartialFailure, SagaError, UpstreamError};
use crate::services::catalog::CatalogService;
use crate::services::orders::{NewOrder, OrderService};
use crate::step::SagaStep;

/// Outcome of a checkout saga that ran to completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReceipt {
    /// Correlation ID assigned to this saga run.
    pub checkout_id: CheckoutId,
    /// Identifiers of the orders created, in input order.
    pub order_ids: Vec<OrderId>,
    /// Displayable invoice references, one per created order.
    pub invoices: Vec<Invoice>,
    /// Sum of all line totals.
    pub total: Money,
}

/// Per-run ledger of what the saga has durably done so far.
///
/// The reserved prefix is exactly what compensation must release when
/// the saga aborts.
#[derive(Debug, Default)]
struct SagaProgress {
    reserved: Vec<PricedItem>,
    order_ids: Vec<OrderId>,
}

/// Orchestrates the execution of checkout sagas.
///
/// The coordinator drives a 3-step saga (reserve stock → create order →
/// commit stock) across the catalog and order services, with
/// compensating releases on failure. It holds no state between runs.
pub struct SagaCoordinator<C, O>
where
    C: CatalogService,
    O: OrderService,
{
    catalog: C,
    orders: O,
}

impl<C, O> SagaCoordinator<C, O>
where
    C: CatalogService,
    O: OrderService,
{
    /// Creates a new saga coordinator over the two upstream services.
    pub fn new(catalog: C, orders: O) -> Self {
        Self { catalog, orders }
    }

    /// Executes a checkout saga for the given request.
    ///
    /// Items are processed in strict list order within each step; later
    /// steps depend on the prices resolved in the first, and
    /// compensation must be able to unwind a known prefix. Validation
    /// failures return before any upstream call is made.
    #[tracing::instrument(
        skip(self, request),
        fields(customer = %request.customer_name, items = request.items.len())
    )]
    pub async fn execute(&self, request: CheckoutRequest) -> Result<CheckoutReceipt, SagaError> {
        metrics::counter!("checkout_sagas_total").increment(1);
        let saga_start = Instant::now();

        request.validate()?;
        let credential = request.credential()?.clone();
        let CheckoutRequest {
            customer_name,
            items,
            ..
        } = request;

        let checkout_id = CheckoutId::new();
        let mut progress = SagaProgress::default();

        // Step 1: price and reserve every item.
        tracing::info!(
            %checkout_id,
            step = SagaStep::ReserveStock.as_str(),
            "saga step started"
        );
        for item in items {
            let unit_price = match self.catalog.fetch_price(&item.product_id, &credential).await {
                Ok(price) => price,
                Err(source) => {
                    let compensation =
                        self.release_reserved(&progress.reserved, &credential).await;
                    return Err(self.abort(
                        checkout_id,
                        SagaStep::ReserveStock,
                        source,
                        compensation,
                        progress.order_ids,
                        saga_start,
                    ));
                }
            };

            let priced = item.priced(unit_price);
            match self
                .catalog
                .reserve_stock(&priced.product_id, priced.quantity, &credential)
                .await
            {
                Ok(()) => progress.reserved.push(priced),
                Err(source) => {
                    let compensation =
                        self.release_reserved(&progress.reserved, &credential).await;
                    return Err(self.abort(
                        checkout_id,
                        SagaStep::ReserveStock,
                        source,
                        compensation,
                        progress.order_ids,
                        saga_start,
                    ));
                }
            }
        }

        // Step 2: create one order per reserved item.
        tracing::info!(
            %checkout_id,
            step = SagaStep::CreateOrder.as_str(),
            "saga step started"
        );
        for item in &progress.reserved {
            match self
                .orders
                .create_order(NewOrder::from_item(&customer_name, item))
                .await
            {
                Ok(Some(order_id)) => progress.order_ids.push(order_id),
                Ok(None) => {
                    tracing::warn!(
                        %checkout_id,
                        product_id = %item.product_id,
                        "order created without an order id, skipping its invoice"
                    );
                }
                Err(source) => {
                    // Every reservation is still held at this point.
                    let compensation =
                        self.release_reserved(&progress.reserved, &credential).await;
                    return Err(self.abort(
                        checkout_id,
                        SagaStep::CreateOrder,
                        source,
                        compensation,
                        progress.order_ids,
                        saga_start,
                    ));
                }
            }
        }

        // Step 3: commit every reservation. The first committed item is
        // the point of no return.
        tracing::info!(
            %checkout_id,
            step = SagaStep::CommitStock.as_str(),
            "saga step started"
        );
        for (index, item) in progress.reserved.iter().enumerate() {
            if let Err(source) = self
                .catalog
                .commit_stock(&item.product_id, item.quantity, &credential)
                .await
            {
                // Committed items are final; only the uncommitted tail
                // still holds reservations.
                let compensation = self
                    .release_reserved(&progress.reserved[index..], &credential)
                    .await;
                return Err(self.abort(
                    checkout_id,
                    SagaStep::CommitStock,
                    source,
                    compensation,
                    progress.order_ids,
                    saga_start,
                ));
            }
        }

        let total = progress
            .reserved
            .iter()
            .fold(Money::zero(), |sum, item| sum + item.line_total);
        let invoices: Vec<Invoice> = progress
            .order_ids
            .iter()
            .cloned()
            .map(Invoice::for_order)
            .collect();

        let duration = saga_start.elapsed().as_secs_f64();
        metrics::histogram!("checkout_saga_duration_seconds").record(duration);
        metrics::counter!("checkout_sagas_completed").increment(1);
        tracing::info!(
            %checkout_id,
            orders = progress.order_ids.len(),
            %total,
            duration,
            "checkout saga completed"
        );

        Ok(CheckoutReceipt {
            checkout_id,
            order_ids: progress.order_ids,
            invoices,
            total,
        })
    }

    /// Best-effort release of held reservations, newest first.
    ///
    /// A failed release is logged and reported, never escalated: the
    /// failure that aborted the saga is what the caller must see.
    async fn release_reserved(
        &self,
        items: &[PricedItem],
        credential: &BearerToken,
    ) -> CompensationReport {
        let mut report = CompensationReport::default();
        if items.is_empty() {
            return report;
        }

        metrics::counter!("checkout_compensations_total").increment(1);
        for item in items.iter().rev() {
            match self
                .catalog
                .release_stock(&item.product_id, item.quantity, credential)
                .await
            {
                Ok(()) => report.released.push(item.product_id.clone()),
                Err(error) => {
                    tracing::error!(
                        product_id = %item.product_id,
                        %error,
                        "failed to release reservation"
                    );
                    report.leaked.push(item.product_id.clone());
                }
            }
        }
        report
    }

    /// Records the abort and shapes the error the caller sees.
    fn abort(
        &self,
        checkout_id: CheckoutId,
        step: SagaStep,
        source: UpstreamError,
        compensation: CompensationReport,
        order_ids: Vec<OrderId>,
        saga_start: Instant,
    ) -> SagaError {
        metrics::histogram!("checkout_saga_duration_seconds")
            .record(saga_start.elapsed().as_secs_f64());
        metrics::counter!("checkout_sagas_failed").increment(1);
        tracing::warn!(
            %checkout_id,
            step = step.as_str(),
            error = %source,
            orders_created = order_ids.len(),
            released = compensation.released.len(),
            leaked = compensation.leaked.len(),
            "checkout saga aborted"
        );

        if order_ids.is_empty() {
            SagaError::Upstream {
                step,
                source,
                compensation,
            }
        } else {
            SagaError::Partial(PartialFailure {
                step,
                order_ids,
                source,
                compensation,
            })
        }
    }

    /// Returns every order belonging to the given customer.
    ///
    /// The order service has no per-customer query, so this fetches the
    /// full listing and filters by exact customer name. No match is an
    /// empty result, not an error.
    #[tracing::instrument(skip(self))]
    pub async fn customer_orders(
        &self,
        customer_name: &str,
    ) -> Result<Vec<OrderRecord>, UpstreamError> {
        let orders = self.orders.list_orders().await?;
        let matching: Vec<OrderRecord> = orders
            .into_iter()
            .filter(|order| order.belongs_to(customer_name))
            .collect();
        tracing::debug!(matching = matching.len(), "filtered customer orders");
        Ok(matching)
    }
}
