//! Checkout: snapshot the cart into an immutable order and capture payment.
//!
//! Totals are always computed from *current* product prices, so an admin
//! price edit between cart-add and checkout changes what the shopper pays.
//! Order creation, payment capture, and cart clearing form one
//! compensatable sequence: a failed capture discards the just-created order
//! and leaves the cart untouched, and the cart is cleared only after the
//! capture is confirmed.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::RoundingStrategy;

use crate::error::{Result, ShopError};
use crate::models::cart::CartLine;
use crate::models::order::{LineItem, NewOrder, Order, OrderUser, ProductSnapshot};
use crate::models::user::User;
use crate::payment::{ChargeRequest, PaymentGateway};
use crate::services::cart::hydrate;
use crate::stores::{CartStore, OrderStore, ProductStore};

use tamarind_core::{OrderId, UserId};

/// Cart total at current prices: Σ(unit price × quantity).
#[must_use]
pub fn compute_total(lines: &[CartLine]) -> Decimal {
    lines.iter().map(CartLine::line_total).sum()
}

/// A total in minor currency units, rounded half away from zero.
fn to_minor_units(total: Decimal) -> i64 {
    (total * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(i64::MAX)
}

/// The order engine.
pub struct CheckoutService {
    products: Arc<dyn ProductStore>,
    carts: Arc<dyn CartStore>,
    orders: Arc<dyn OrderStore>,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
}

impl CheckoutService {
    /// Create a checkout service charging in `currency`.
    #[must_use]
    pub fn new(
        products: Arc<dyn ProductStore>,
        carts: Arc<dyn CartStore>,
        orders: Arc<dyn OrderStore>,
        gateway: Arc<dyn PaymentGateway>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            products,
            carts,
            orders,
            gateway,
            currency: currency.into(),
        }
    }

    /// Place an order for the user's current cart.
    ///
    /// Hydrates the cart (lines whose product has been deleted are dropped,
    /// never charged for), snapshots the remaining lines into an immutable
    /// order, captures payment tagged with the order id, and clears the
    /// cart on confirmed capture. An empty cart still produces a valid
    /// zero-total order.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Payment` if capture fails (the order is
    /// discarded and the cart kept), or `ShopError::Repository` on store
    /// failures.
    pub async fn place_order(&self, user: &User, source_token: &str) -> Result<Order> {
        let entries = self.carts.entries(user.id).await?;
        let view = hydrate(&*self.products, &entries).await?;

        if !view.unavailable.is_empty() {
            tracing::warn!(
                user_id = %user.id,
                dropped = view.unavailable.len(),
                "dropping unavailable cart lines from order"
            );
        }

        let total = compute_total(&view.lines);
        let line_items = view
            .lines
            .iter()
            .map(|line| LineItem {
                product: ProductSnapshot::from(&line.product),
                quantity: line.quantity,
            })
            .collect();

        let order = self
            .orders
            .insert(NewOrder {
                user: OrderUser {
                    user_id: user.id,
                    email: user.email.clone(),
                },
                line_items,
            })
            .await?;

        match self.capture(order.id, user.id, total, source_token).await {
            Ok(()) => {
                self.carts.clear(user.id).await?;
                Ok(order)
            }
            Err(err) => {
                // Compensation: the order never completed, so it must not
                // appear in history.
                if let Err(discard_err) = self.orders.discard(order.id).await {
                    tracing::error!(
                        order_id = %order.id,
                        error = %discard_err,
                        "failed to discard order after capture failure"
                    );
                }
                Err(err)
            }
        }
    }

    /// The user's completed orders, newest first.
    ///
    /// Discarded orders never appear here: a failed capture removes its
    /// order before `place_order` returns.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Repository` if the store fails.
    pub async fn order_history(&self, user_id: UserId) -> Result<Vec<Order>> {
        Ok(self.orders.list_for_user(user_id).await?)
    }

    async fn capture(
        &self,
        order_id: OrderId,
        user_id: UserId,
        total: Decimal,
        source_token: &str,
    ) -> Result<()> {
        let mut metadata = HashMap::new();
        metadata.insert("order_id".to_owned(), order_id.to_string());

        let outcome = self
            .gateway
            .charge(ChargeRequest {
                amount_minor_units: to_minor_units(total),
                currency: self.currency.clone(),
                source_token: source_token.to_owned(),
                metadata,
            })
            .await
            .map_err(ShopError::Payment)?;

        tracing::info!(
            %order_id,
            %user_id,
            charge_id = %outcome.charge_id,
            gateway = self.gateway.gateway_name(),
            "payment captured"
        );

        Ok(())
    }
}
