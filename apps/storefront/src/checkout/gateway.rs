//! # Payment Gateway Boundary
//!
//! A hosted payment gateway collects funds out of process and reports back
//! later through one of two callbacks.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Gateway Round-Trip                                   │
//! │                                                                         │
//! │  CheckoutWorkflow.place_order()                                         │
//! │       │  open_session(request, callbacks)                               │
//! │       ▼                                                                 │
//! │  PaymentGateway ──► Ok(GatewaySession { gateway_order_id })             │
//! │       │             (place_order returns AwaitingGateway here)          │
//! │       ┊                                                                 │
//! │       ┊  ... some later turn of the runtime ...                         │
//! │       ▼                                                                 │
//! │  callbacks.on_success(PaymentConfirmation)  ──► order persisted         │
//! │  callbacks.on_failure(PaymentDeclined)      ──► nothing persisted       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The gateway may fire a callback more than once, or fire both; the
//! [`PaymentCallbacks`] guard makes only the first one count.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use goonj_core::Money;

use super::attempt::PaymentCallbacks;

// =============================================================================
// Session Types
// =============================================================================

/// Who is paying, as shown on the gateway's payment sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayContact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Everything the gateway needs to open a payment session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRequest {
    /// Attempt-scoped correlation id minted by the workflow.
    pub attempt_id: String,
    /// Frozen cart total, in minor units.
    pub amount: Money,
    pub currency: String,
    /// Merchant label for the payment sheet.
    pub description: String,
    pub contact: GatewayContact,
}

/// Handle returned when a session opened successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewaySession {
    pub gateway_order_id: String,
}

/// Success payload delivered by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
}

/// Failure payload delivered by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDeclined {
    pub code: Option<String>,
    pub description: String,
}

/// The gateway could not open a session at all.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// Gateway unreachable or not configured.
    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),

    /// Gateway refused the session request.
    #[error("Payment gateway rejected the request: {0}")]
    Rejected(String),
}

// =============================================================================
// Gateway Trait
// =============================================================================

/// An out-of-process payment collector.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Opens a session and returns without waiting for the outcome.
    ///
    /// The implementation keeps `callbacks` and invokes exactly one of them
    /// when the customer finishes (or abandons) the payment.
    async fn open_session(
        &self,
        request: SessionRequest,
        callbacks: PaymentCallbacks,
    ) -> Result<GatewaySession, GatewayError>;
}

// =============================================================================
// Simulated Gateway
// =============================================================================

/// What the simulated gateway reports once its delay elapses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulatedOutcome {
    Approve,
    Decline { reason: String },
}

/// Stand-in for the hosted checkout, used by the CLI.
///
/// Mints an `order_<millis>` id, then answers on a spawned task after the
/// configured delay.
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    key: String,
    delay: Duration,
    outcome: SimulatedOutcome,
}

impl SimulatedGateway {
    pub fn new(key: impl Into<String>, delay: Duration) -> Self {
        SimulatedGateway {
            key: key.into(),
            delay,
            outcome: SimulatedOutcome::Approve,
        }
    }

    /// Sets the outcome every session will report.
    pub fn with_outcome(mut self, outcome: SimulatedOutcome) -> Self {
        self.outcome = outcome;
        self
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn open_session(
        &self,
        request: SessionRequest,
        callbacks: PaymentCallbacks,
    ) -> Result<GatewaySession, GatewayError> {
        if self.key.trim().is_empty() {
            return Err(GatewayError::Unavailable("gateway key is not configured".to_string()));
        }
        if !request.amount.is_positive() {
            return Err(GatewayError::Rejected("amount must be positive".to_string()));
        }

        let stamp = Utc::now().timestamp_millis();
        let gateway_order_id = format!("order_{}", stamp);

        info!(
            attempt_id = %request.attempt_id,
            gateway_order_id = %gateway_order_id,
            amount = %request.amount,
            currency = %request.currency,
            "Gateway session opened"
        );

        let delay = self.delay;
        let outcome = self.outcome.clone();
        let order_id = gateway_order_id.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!(gateway_order_id = %order_id, "Simulated gateway answering");
            match outcome {
                SimulatedOutcome::Approve => {
                    callbacks
                        .on_success(PaymentConfirmation {
                            gateway_order_id: order_id,
                            gateway_payment_id: format!("pay_{}", stamp),
                        })
                        .await;
                }
                SimulatedOutcome::Decline { reason } => {
                    callbacks
                        .on_failure(PaymentDeclined {
                            code: Some("BAD_REQUEST_ERROR".to_string()),
                            description: reason,
                        })
                        .await;
                }
            }
        });

        Ok(GatewaySession { gateway_order_id })
    }
}
