//! # Checkout
//!
//! Turns the session's cart into an order.
//!
//! ## Submit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  submit(customer, fulfilment, currency)                                 │
//! │       │                                                                 │
//! │       ├── cart empty?          ──► CheckoutError::EmptyCart             │
//! │       ├── form invalid?        ──► CheckoutError::Invalid               │
//! │       │                                                                 │
//! │       ├── CheckoutPayload::from_cart                                    │
//! │       ├── gateway.submit_order ──► failure: warn!, cart kept            │
//! │       │                                                                 │
//! │       └── success: ordered lines removed, OrderReceipt returned         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A single attempt per call. Retrying is the customer's click.

use std::sync::Arc;

use bistro_core::validation::validate_customer;
use bistro_core::{CheckoutPayload, CustomerInfo, Fulfilment, OrderReceipt, PricingPolicy};
use tracing::{info, warn};

use crate::cart_store::CartStore;
use crate::error::CheckoutError;
use crate::gateway::OrderGateway;

pub struct Checkout {
    store: Arc<CartStore>,
    gateway: Arc<dyn OrderGateway>,
    policy: PricingPolicy,
}

impl Checkout {
    pub fn new(store: Arc<CartStore>, gateway: Arc<dyn OrderGateway>, policy: PricingPolicy) -> Self {
        Checkout {
            store,
            gateway,
            policy,
        }
    }

    /// Builds the payload the current cart would submit.
    pub fn preview(
        &self,
        customer: CustomerInfo,
        fulfilment: Fulfilment,
        currency_code: &str,
    ) -> Result<CheckoutPayload, CheckoutError> {
        let cart = self
            .store
            .get()
            .map_err(|e| CheckoutError::Unavailable(e.to_string()))?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        validate_customer(&customer, fulfilment)?;

        Ok(CheckoutPayload::from_cart(
            &cart,
            &self.policy,
            fulfilment,
            customer,
            currency_code,
        ))
    }

    /// Submits the cart as an order.
    ///
    /// On success the submitted lines leave the cart, which empties it unless
    /// something was added while the order was in flight. On any failure the
    /// cart is left exactly as it was so the customer can fix and resubmit.
    pub async fn submit(
        &self,
        customer: CustomerInfo,
        fulfilment: Fulfilment,
        currency_code: &str,
    ) -> Result<OrderReceipt, CheckoutError> {
        let payload = self.preview(customer, fulfilment, currency_code)?;

        let receipt = match self.gateway.submit_order(&payload).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(error = %e, total_cents = payload.total.cents(), "Order submission failed");
                return Err(e.into());
            }
        };

        info!(order_id = %receipt.order_id, total_cents = payload.total.cents(), "Order placed");

        let ordered: Vec<(i64, u32)> = payload
            .items
            .iter()
            .map(|item| (item.id, item.quantity))
            .collect();
        if let Err(e) = self.store.remove_ordered(&ordered) {
            // The order exists; a stale cart is the lesser problem
            warn!(order_id = %receipt.order_id, error = %e, "Could not clear cart after checkout");
        }

        Ok(receipt)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;
    use bistro_core::{CatalogItem, Money};
    use std::sync::Mutex;

    /// Records payloads and answers with a canned result.
    struct FakeGateway {
        reply: Mutex<Option<Result<OrderReceipt, GatewayError>>>,
        seen: Mutex<Vec<CheckoutPayload>>,
        /// Added to this store while the request is in flight.
        late_add: Option<(Arc<CartStore>, CatalogItem)>,
    }

    impl FakeGateway {
        fn replying(reply: Result<OrderReceipt, GatewayError>) -> Arc<Self> {
            Arc::new(FakeGateway {
                reply: Mutex::new(Some(reply)),
                seen: Mutex::new(Vec::new()),
                late_add: None,
            })
        }
    }

    #[async_trait]
    impl OrderGateway for FakeGateway {
        async fn submit_order(
            &self,
            payload: &CheckoutPayload,
        ) -> Result<OrderReceipt, GatewayError> {
            self.seen.lock().unwrap().push(payload.clone());
            if let Some((store, item)) = &self.late_add {
                store.add_item(item, 1).unwrap();
            }
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(GatewayError::Transport("no reply".to_string())))
        }
    }

    fn customer() -> CustomerInfo {
        CustomerInfo {
            name: "Ada".to_string(),
            phone: "555 010 0100".to_string(),
            address: Some("1 Main St".to_string()),
            ..Default::default()
        }
    }

    fn filled_store() -> Arc<CartStore> {
        let store = Arc::new(CartStore::load(Arc::new(MemoryStorage::new())));
        store
            .add_item(&CatalogItem::new(1, "Lasagna", Money::from_cents(1000)), 2)
            .unwrap();
        store
            .add_item(&CatalogItem::new(2, "Salad", Money::from_cents(550)), 1)
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_success_clears_cart() {
        let store = filled_store();
        let gateway = FakeGateway::replying(Ok(OrderReceipt {
            order_id: "order-1".to_string(),
        }));
        let checkout = Checkout::new(store.clone(), gateway.clone(), PricingPolicy::default());

        let receipt = checkout
            .submit(customer(), Fulfilment::Delivery, "USD")
            .await
            .unwrap();

        assert_eq!(receipt.order_id, "order-1");
        assert!(store.get().unwrap().is_empty());

        let seen = gateway.seen.lock().unwrap();
        assert_eq!(seen[0].total.cents(), 3353);
        assert_eq!(seen[0].items.len(), 2);
    }

    #[tokio::test]
    async fn test_success_keeps_lines_added_in_flight() {
        let store = filled_store();
        let soup = CatalogItem::new(3, "Soup", Money::from_cents(450));
        let gateway = Arc::new(FakeGateway {
            reply: Mutex::new(Some(Ok(OrderReceipt {
                order_id: "order-2".to_string(),
            }))),
            seen: Mutex::new(Vec::new()),
            late_add: Some((store.clone(), soup)),
        });
        let checkout = Checkout::new(store.clone(), gateway.clone(), PricingPolicy::default());

        checkout
            .submit(customer(), Fulfilment::Pickup, "USD")
            .await
            .unwrap();

        let cart = store.get().unwrap();
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.get(3).unwrap().quantity, 1);
        assert_eq!(gateway.seen.lock().unwrap()[0].items.len(), 2);
    }

    #[tokio::test]
    async fn test_rejection_preserves_cart() {
        let store = filled_store();
        let before = store.get().unwrap();
        let gateway = FakeGateway::replying(Err(GatewayError::Rejected {
            code: "MENU_ITEM_UNAVAILABLE".to_string(),
            message: "Salad is sold out".to_string(),
        }));
        let checkout = Checkout::new(store.clone(), gateway, PricingPolicy::default());

        let err = checkout
            .submit(customer(), Fulfilment::Delivery, "USD")
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "Salad is sold out");
        assert_eq!(store.get().unwrap(), before);
    }

    #[tokio::test]
    async fn test_local_validation_never_calls_gateway() {
        let gateway = FakeGateway::replying(Ok(OrderReceipt {
            order_id: "unused".to_string(),
        }));

        let empty = Arc::new(CartStore::load(Arc::new(MemoryStorage::new())));
        let checkout = Checkout::new(empty, gateway.clone(), PricingPolicy::default());
        assert!(matches!(
            checkout.submit(customer(), Fulfilment::Pickup, "USD").await,
            Err(CheckoutError::EmptyCart)
        ));

        let checkout = Checkout::new(filled_store(), gateway.clone(), PricingPolicy::default());
        let mut no_address = customer();
        no_address.address = None;
        assert!(matches!(
            checkout.submit(no_address, Fulfilment::Delivery, "USD").await,
            Err(CheckoutError::Invalid(_))
        ));

        assert!(gateway.seen.lock().unwrap().is_empty());
    }
}
