//! # Checkout Workflow
//!
//! Drives one customer from cart to placed order.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      CheckoutWorkflow                                   │
//! │                                                                         │
//! │  begin(identity, cart) ── no user ──► AuthenticationRequired            │
//! │       │                └─ no lines ─► EmptyCart                         │
//! │       ▼                                                                 │
//! │  [Address] ── submit_address ──► [Payment] ◄── select_payment           │
//! │       ▲                             │                                   │
//! │       └──── back_to_address ────────┤                                   │
//! │                                     │ place_order                       │
//! │              ┌──────────────────────┴───────────────────┐               │
//! │              │ cod / upi / card                         │ razorpay      │
//! │              ▼                                          ▼               │
//! │   orders.create(snapshot)                    gateway.open_session       │
//! │     ok:  clear cart,                         returns AwaitingGateway    │
//! │          [Confirmation]                      continuation runs in       │
//! │     err: stay [Payment],                     PaymentCallbacks later     │
//! │          cart intact                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering
//! Order creation happens before the cart is cleared, which happens before
//! the step becomes `Confirmation`. A failed write never loses the cart.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use goonj_core::checkout::check_entry;
use goonj_core::{
    Address, Cart, CartLine, CheckoutProgress, CheckoutStep, CoreError, Money, PaymentMethod,
    User,
};
use goonj_db::OrderRepository;

use super::attempt::{
    AttemptResolution, AttemptStatus, CheckoutAttempt, PaymentCallbacks, PendingPlacement,
};
use super::gateway::{GatewayContact, PaymentGateway, SessionRequest};
use crate::error::ApiError;

// =============================================================================
// Dependencies
// =============================================================================

/// Merchant details shown on the gateway's payment sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreProfile {
    pub name: String,
    pub currency: String,
}

impl Default for StoreProfile {
    fn default() -> Self {
        StoreProfile {
            name: "Goonj Library".to_string(),
            currency: "INR".to_string(),
        }
    }
}

/// Collaborators injected into every checkout session.
#[derive(Clone)]
pub struct CheckoutDeps {
    pub orders: Arc<dyn OrderRepository>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub store: StoreProfile,
}

impl CheckoutDeps {
    pub fn new(orders: Arc<dyn OrderRepository>, gateway: Arc<dyn PaymentGateway>) -> Self {
        CheckoutDeps {
            orders,
            gateway,
            store: StoreProfile::default(),
        }
    }

    pub fn with_store(mut self, store: StoreProfile) -> Self {
        self.store = store;
        self
    }
}

// =============================================================================
// Session State
// =============================================================================

/// Mutable state of one checkout session.
#[derive(Debug)]
pub(crate) struct CheckoutState {
    user: User,
    cart: Cart,
    progress: CheckoutProgress,
    in_flight: Option<Arc<CheckoutAttempt>>,
    last_failure: Option<String>,
}

impl CheckoutState {
    fn refuse_while_paying(&self) -> Result<(), ApiError> {
        if self.in_flight.is_some() {
            warn!(uid = %self.user.uid, "Refused while a gateway payment is in flight");
            return Err(CoreError::PaymentInProgress.into());
        }
        Ok(())
    }

    /// Applies the outcome of a gateway attempt.
    pub(crate) fn finish_attempt(&mut self, attempt_id: &str, resolution: &AttemptResolution) {
        if self.in_flight.as_ref().map(|a| a.id()) == Some(attempt_id) {
            self.in_flight = None;
        }

        match resolution {
            AttemptResolution::Placed { order_id } => {
                self.cart.clear();
                self.last_failure = None;
                match self.progress.confirm() {
                    Ok(()) => info!(order_id = %order_id, uid = %self.user.uid, "Checkout confirmed"),
                    Err(e) => warn!(order_id = %order_id, error = %e, "Order placed but step not advanced"),
                }
            }
            AttemptResolution::Declined { reason }
            | AttemptResolution::PersistenceFailed { reason } => {
                self.last_failure = Some(reason.clone());
            }
            AttemptResolution::Duplicate => {}
        }
    }
}

// =============================================================================
// Public Types
// =============================================================================

/// Result of a successful `place_order` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlacementOutcome {
    /// Order persisted; the session is at `Confirmation`.
    Placed { order_id: String },
    /// Gateway session opened; watch `attempt_status` for the outcome.
    AwaitingGateway {
        attempt_id: String,
        gateway_order_id: String,
    },
}

/// Read-only view of a checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSnapshot {
    pub user_id: String,
    pub step: CheckoutStep,
    pub lines: Vec<CartLine>,
    pub total: Money,
    pub address: Address,
    pub payment_method: PaymentMethod,
    pub attempt_in_flight: Option<String>,
    pub last_failure: Option<String>,
}

// =============================================================================
// Workflow
// =============================================================================

/// One customer's checkout session.
pub struct CheckoutWorkflow {
    state: Arc<Mutex<CheckoutState>>,
    deps: CheckoutDeps,
    status: Arc<watch::Sender<AttemptStatus>>,
}

impl CheckoutWorkflow {
    /// Starts a session for `identity` over `cart`.
    ///
    /// ## Errors
    /// - `AuthenticationRequired` when nobody is signed in
    /// - `EmptyCart` when the cart has no lines
    pub fn begin(identity: Option<User>, cart: Cart, deps: CheckoutDeps) -> Result<Self, ApiError> {
        let user = match check_entry(identity.as_ref(), &cart) {
            Ok(user) => user.clone(),
            Err(e) => {
                warn!(error = %e, "Checkout refused at entry");
                return Err(e.into());
            }
        };

        info!(
            uid = %user.uid,
            lines = cart.line_count(),
            total = %cart.total(),
            "Checkout started"
        );

        let (status, _) = watch::channel(AttemptStatus::Idle);
        Ok(CheckoutWorkflow {
            state: Arc::new(Mutex::new(CheckoutState {
                user,
                cart,
                progress: CheckoutProgress::new(),
                in_flight: None,
                last_failure: None,
            })),
            deps,
            status: Arc::new(status),
        })
    }

    /// `Address → Payment`.
    pub async fn submit_address(&self, address: Address) -> Result<(), ApiError> {
        let mut state = self.state.lock().await;
        if let Err(e) = state.progress.submit_address(address) {
            warn!(uid = %state.user.uid, error = %e, "Address refused");
            return Err(e.into());
        }
        info!(uid = %state.user.uid, step = %state.progress.step(), "Address accepted");
        Ok(())
    }

    /// `Payment → Address`.
    pub async fn back_to_address(&self) -> Result<(), ApiError> {
        let mut state = self.state.lock().await;
        state.refuse_while_paying()?;
        state.progress.back_to_address()?;
        debug!(uid = %state.user.uid, "Back to address step");
        Ok(())
    }

    /// Replaces the payment method.
    pub async fn select_payment(&self, method: PaymentMethod) -> Result<(), ApiError> {
        let mut state = self.state.lock().await;
        state.refuse_while_paying()?;
        let tag = method.tag();
        state.progress.select_payment(method)?;
        debug!(uid = %state.user.uid, payment = tag, "Payment method selected");
        Ok(())
    }

    /// `Payment → Confirmation`, through persistence or the gateway.
    ///
    /// ## Errors
    /// - `InvalidState` outside the payment step
    /// - `ValidationError` when the method's details are incomplete
    /// - `PaymentInProgress` while a gateway attempt is unanswered
    /// - `PaymentFailure` when the gateway session cannot be opened
    /// - `PersistenceError` when the order could not be saved (cart kept)
    pub async fn place_order(&self) -> Result<PlacementOutcome, ApiError> {
        let mut state = self.state.lock().await;
        debug!(uid = %state.user.uid, "Placing order");

        state.refuse_while_paying()?;
        if let Err(e) = state.progress.ready_for_placement() {
            warn!(uid = %state.user.uid, error = %e, "Order placement refused");
            return Err(e.into());
        }
        if state.cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let placement = PendingPlacement {
            user_id: state.user.uid.clone(),
            lines: state.cart.snapshot(),
            total: state.cart.total(),
            address: state.progress.address().clone(),
            payment_method: state.progress.payment_method().clone(),
        };
        state.last_failure = None;

        if placement.payment_method.is_gateway() {
            let contact = GatewayContact {
                name: placement.address.full_name.clone(),
                email: state.user.email.clone(),
                phone: placement.address.phone.clone(),
            };
            let attempt = Arc::new(CheckoutAttempt::new(placement));
            state.in_flight = Some(Arc::clone(&attempt));
            self.status.send_replace(AttemptStatus::Awaiting {
                attempt_id: attempt.id().to_string(),
            });
            // the gateway may answer before open_session returns
            drop(state);
            return self.open_gateway_session(attempt, contact).await;
        }

        match self.deps.orders.create(placement.to_new_order(None)).await {
            Ok(order_id) => {
                state.cart.clear();
                state.progress.confirm()?;
                info!(
                    order_id = %order_id,
                    uid = %state.user.uid,
                    payment = placement.payment_method.tag(),
                    total = %placement.total,
                    "Order placed"
                );
                Ok(PlacementOutcome::Placed { order_id })
            }
            Err(err) => {
                error!(uid = %state.user.uid, error = %err, "Order could not be saved; cart kept");
                let api = ApiError::from(err);
                state.last_failure = Some(api.message.clone());
                Err(api)
            }
        }
    }

    async fn open_gateway_session(
        &self,
        attempt: Arc<CheckoutAttempt>,
        contact: GatewayContact,
    ) -> Result<PlacementOutcome, ApiError> {
        let attempt_id = attempt.id().to_string();
        let request = SessionRequest {
            attempt_id: attempt_id.clone(),
            amount: attempt.placement().total,
            currency: self.deps.store.currency.clone(),
            description: self.deps.store.name.clone(),
            contact,
        };
        let callbacks = PaymentCallbacks::new(
            Arc::clone(&attempt),
            Arc::clone(&self.deps.orders),
            Arc::downgrade(&self.state),
            Arc::clone(&self.status),
        );

        match self.deps.gateway.open_session(request, callbacks).await {
            Ok(session) => {
                info!(
                    attempt_id = %attempt_id,
                    gateway_order_id = %session.gateway_order_id,
                    "Awaiting gateway"
                );
                Ok(PlacementOutcome::AwaitingGateway {
                    attempt_id,
                    gateway_order_id: session.gateway_order_id,
                })
            }
            Err(err) => {
                warn!(attempt_id = %attempt_id, error = %err, "Gateway session failed to open");
                // retire the attempt so a stray callback cannot place an order
                if attempt.consume() {
                    let resolution = AttemptResolution::Declined {
                        reason: err.to_string(),
                    };
                    self.state.lock().await.finish_attempt(&attempt_id, &resolution);
                    self.status.send_replace(AttemptStatus::Resolved(resolution));
                }
                Err(err.into())
            }
        }
    }

    /// Subscribes to the session's gateway attempt status.
    pub fn attempt_status(&self) -> watch::Receiver<AttemptStatus> {
        self.status.subscribe()
    }

    pub async fn step(&self) -> CheckoutStep {
        self.state.lock().await.progress.step()
    }

    /// Copy of the session's cart.
    pub async fn cart(&self) -> Cart {
        self.state.lock().await.cart.clone()
    }

    pub async fn snapshot(&self) -> CheckoutSnapshot {
        let state = self.state.lock().await;
        CheckoutSnapshot {
            user_id: state.user.uid.clone(),
            step: state.progress.step(),
            lines: state.cart.snapshot(),
            total: state.cart.total(),
            address: state.progress.address().clone(),
            payment_method: state.progress.payment_method().clone(),
            attempt_in_flight: state.in_flight.as_ref().map(|a| a.id().to_string()),
            last_failure: state.last_failure.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::checkout::gateway::SimulatedGateway;
    use crate::error::ErrorCode;
    use goonj_core::Book;
    use goonj_db::{Database, DbConfig};

    fn book(id: i64, price_cents: i64) -> Book {
        Book {
            id,
            title: format!("Book {}", id),
            author: "Premchand".into(),
            category: "Fiction".into(),
            price_cents,
            pages: 200,
            language: "Hindi".into(),
            description: String::new(),
            image: String::new(),
            isbn: String::new(),
        }
    }

    fn reader() -> User {
        User {
            uid: "u-1".into(),
            email: "reader@goonj.in".into(),
            display_name: "Reader".into(),
            photo_url: None,
        }
    }

    fn address() -> Address {
        Address {
            full_name: "Asha Rao".into(),
            phone: "9876543210".into(),
            house_number: "12".into(),
            street_name: "MG Road".into(),
            city: "Pune".into(),
            state: "Maharashtra".into(),
            pincode: "411001".into(),
        }
    }

    async fn deps() -> CheckoutDeps {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        CheckoutDeps::new(
            Arc::new(db.orders()),
            Arc::new(SimulatedGateway::new("rzp_test_key", Duration::from_millis(10))),
        )
    }

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add(book(1, 20000));
        cart
    }

    #[tokio::test]
    async fn test_begin_requires_identity_and_lines() {
        let err = CheckoutWorkflow::begin(None, cart(), deps().await).err().unwrap();
        assert_eq!(err.code, ErrorCode::AuthenticationRequired);

        let err = CheckoutWorkflow::begin(Some(reader()), Cart::new(), deps().await)
            .err()
            .unwrap();
        assert_eq!(err.code, ErrorCode::EmptyCart);
    }

    #[tokio::test]
    async fn test_refused_transitions_change_nothing() {
        let workflow = CheckoutWorkflow::begin(Some(reader()), cart(), deps().await).unwrap();

        let err = workflow.place_order().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);

        let mut bad = address();
        bad.phone = "12345".into();
        let err = workflow.submit_address(bad).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let snapshot = workflow.snapshot().await;
        assert_eq!(snapshot.step, CheckoutStep::Address);
        assert_eq!(snapshot.address, Address::default());
        assert_eq!(snapshot.total, Money::from_cents(10000));
    }

    #[tokio::test]
    async fn test_back_and_forth_keeps_address() {
        let workflow = CheckoutWorkflow::begin(Some(reader()), cart(), deps().await).unwrap();
        workflow.submit_address(address()).await.unwrap();
        assert_eq!(workflow.step().await, CheckoutStep::Payment);

        workflow.back_to_address().await.unwrap();
        let snapshot = workflow.snapshot().await;
        assert_eq!(snapshot.step, CheckoutStep::Address);
        assert_eq!(snapshot.address, address());
    }

    #[tokio::test]
    async fn test_finish_attempt_declined_records_reason() {
        let workflow = CheckoutWorkflow::begin(Some(reader()), cart(), deps().await).unwrap();
        workflow.submit_address(address()).await.unwrap();

        workflow.state.lock().await.finish_attempt(
            "no-such-attempt",
            &AttemptResolution::Declined {
                reason: "Card declined".into(),
            },
        );

        let snapshot = workflow.snapshot().await;
        assert_eq!(snapshot.step, CheckoutStep::Payment);
        assert_eq!(snapshot.last_failure.as_deref(), Some("Card declined"));
        assert_eq!(snapshot.lines.len(), 1);
    }

    #[tokio::test]
    async fn test_cod_places_and_confirms() {
        let workflow = CheckoutWorkflow::begin(Some(reader()), cart(), deps().await).unwrap();
        workflow.submit_address(address()).await.unwrap();

        let outcome = workflow.place_order().await.unwrap();
        assert!(matches!(outcome, PlacementOutcome::Placed { .. }));
        assert_eq!(workflow.step().await, CheckoutStep::Confirmation);
        assert!(workflow.cart().await.is_empty());
        assert_eq!(*workflow.attempt_status().borrow(), AttemptStatus::Idle);

        let err = workflow.submit_address(address()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);
    }
}
