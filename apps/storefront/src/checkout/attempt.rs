//! # Checkout Attempts
//!
//! One gateway payment = one attempt. The attempt freezes everything the
//! order needs when the session opens and carries a single-use guard.
//!
//! ## Idempotent Continuation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Callback Handling                                    │
//! │                                                                         │
//! │  on_success / on_failure                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  attempt.consume()  ── already consumed? ──► Duplicate (no work)        │
//! │       │ first caller only                                               │
//! │       ▼                                                                 │
//! │  success: orders.create(frozen snapshot + gateway ids)                  │
//! │  failure: nothing persisted                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  session still alive? (Weak::upgrade)                                   │
//! │       ├── yes: placed → clear cart, step = Confirmation                 │
//! │       │        failed → stay at Payment, remember the reason            │
//! │       └── no:  nothing to update; the order (if any) is already saved   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  status channel ◄── Resolved(resolution)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use goonj_core::{Address, CartLine, GatewayReference, Money, NewOrder, PaymentMethod};
use goonj_db::OrderRepository;

use super::gateway::{PaymentConfirmation, PaymentDeclined};
use super::workflow::CheckoutState;
use crate::error::ApiError;

// =============================================================================
// Status
// =============================================================================

/// How a gateway attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttemptResolution {
    /// Payment confirmed and the order persisted.
    Placed { order_id: String },
    /// Gateway reported failure; nothing persisted.
    Declined { reason: String },
    /// Payment confirmed but the order could not be saved.
    PersistenceFailed { reason: String },
    /// A later callback for an attempt that was already resolved.
    Duplicate,
}

/// Observable state of the session's gateway payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AttemptStatus {
    /// No gateway payment has been started.
    #[default]
    Idle,
    /// Session open, waiting for the gateway.
    Awaiting { attempt_id: String },
    /// The latest attempt finished.
    Resolved(AttemptResolution),
}

impl AttemptStatus {
    pub fn is_resolved(&self) -> bool {
        matches!(self, AttemptStatus::Resolved(_))
    }
}

// =============================================================================
// Pending Placement
// =============================================================================

/// Everything an order needs, frozen when the attempt starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPlacement {
    pub user_id: String,
    pub lines: Vec<CartLine>,
    pub total: Money,
    pub address: Address,
    pub payment_method: PaymentMethod,
}

impl PendingPlacement {
    /// The order to create, with optional gateway correlation ids.
    pub fn to_new_order(&self, gateway: Option<GatewayReference>) -> NewOrder {
        NewOrder {
            user_id: self.user_id.clone(),
            items: self.lines.clone(),
            total: self.total,
            address: self.address.clone(),
            payment_method: self.payment_method.clone(),
            gateway,
        }
    }
}

// =============================================================================
// Checkout Attempt
// =============================================================================

/// One gateway payment attempt and its single-use guard.
#[derive(Debug)]
pub struct CheckoutAttempt {
    id: String,
    placement: PendingPlacement,
    consumed: AtomicBool,
}

impl CheckoutAttempt {
    pub fn new(placement: PendingPlacement) -> Self {
        CheckoutAttempt {
            id: Uuid::new_v4().to_string(),
            placement,
            consumed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn placement(&self) -> &PendingPlacement {
        &self.placement
    }

    /// Claims the attempt. Returns `true` for exactly one caller, ever.
    pub fn consume(&self) -> bool {
        !self.consumed.swap(true, Ordering::AcqRel)
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed.load(Ordering::Acquire)
    }
}

// =============================================================================
// Payment Callbacks
// =============================================================================

/// The success/failure continuation pair handed to the gateway.
///
/// Clones share one attempt, so the guard holds across every copy.
#[derive(Clone)]
pub struct PaymentCallbacks {
    attempt: Arc<CheckoutAttempt>,
    orders: Arc<dyn OrderRepository>,
    session: Weak<Mutex<CheckoutState>>,
    status: Arc<watch::Sender<AttemptStatus>>,
}

impl fmt::Debug for PaymentCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentCallbacks")
            .field("attempt_id", &self.attempt.id())
            .field("consumed", &self.attempt.is_consumed())
            .finish()
    }
}

impl PaymentCallbacks {
    pub(crate) fn new(
        attempt: Arc<CheckoutAttempt>,
        orders: Arc<dyn OrderRepository>,
        session: Weak<Mutex<CheckoutState>>,
        status: Arc<watch::Sender<AttemptStatus>>,
    ) -> Self {
        PaymentCallbacks {
            attempt,
            orders,
            session,
            status,
        }
    }

    pub fn attempt_id(&self) -> &str {
        self.attempt.id()
    }

    /// Gateway reports success: persist the frozen order exactly once.
    pub async fn on_success(&self, confirmation: PaymentConfirmation) -> AttemptResolution {
        if !self.attempt.consume() {
            warn!(
                attempt_id = %self.attempt.id(),
                gateway_payment_id = %confirmation.gateway_payment_id,
                "Ignoring repeated gateway callback"
            );
            return AttemptResolution::Duplicate;
        }

        debug!(
            attempt_id = %self.attempt.id(),
            gateway_order_id = %confirmation.gateway_order_id,
            "Gateway confirmed payment"
        );

        let new_order = self.attempt.placement().to_new_order(Some(GatewayReference {
            gateway_order_id: confirmation.gateway_order_id,
            gateway_payment_id: confirmation.gateway_payment_id,
        }));

        let resolution = match self.orders.create(new_order).await {
            Ok(order_id) => AttemptResolution::Placed { order_id },
            Err(err) => AttemptResolution::PersistenceFailed {
                reason: ApiError::from(err).message,
            },
        };

        self.settle(resolution.clone()).await;
        resolution
    }

    /// Gateway reports failure: persist nothing.
    pub async fn on_failure(&self, declined: PaymentDeclined) -> AttemptResolution {
        if !self.attempt.consume() {
            warn!(attempt_id = %self.attempt.id(), "Ignoring repeated gateway callback");
            return AttemptResolution::Duplicate;
        }

        warn!(
            attempt_id = %self.attempt.id(),
            code = declined.code.as_deref().unwrap_or("-"),
            reason = %declined.description,
            "Gateway declined payment"
        );

        let resolution = AttemptResolution::Declined {
            reason: declined.description,
        };
        self.settle(resolution.clone()).await;
        resolution
    }

    /// Applies a resolution to the session (if it still exists) and
    /// publishes it.
    async fn settle(&self, resolution: AttemptResolution) {
        match self.session.upgrade() {
            Some(session) => {
                let mut state = session.lock().await;
                state.finish_attempt(self.attempt.id(), &resolution);
            }
            None => {
                info!(
                    attempt_id = %self.attempt.id(),
                    "Checkout session is gone; nothing to update"
                );
            }
        }
        self.status.send_replace(AttemptStatus::Resolved(resolution));
    }
}
