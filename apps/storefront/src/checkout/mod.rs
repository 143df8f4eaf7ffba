//! # Checkout
//!
//! - [`workflow`] - The per-customer session and its step transitions
//! - [`attempt`] - Gateway attempts, the single-use guard, callbacks
//! - [`gateway`] - The payment gateway boundary and a simulated gateway

pub mod attempt;
pub mod gateway;
pub mod workflow;

pub use attempt::{AttemptResolution, AttemptStatus, CheckoutAttempt, PaymentCallbacks, PendingPlacement};
pub use gateway::{
    GatewayContact, GatewayError, GatewaySession, PaymentConfirmation, PaymentDeclined,
    PaymentGateway, SessionRequest, SimulatedGateway, SimulatedOutcome,
};
pub use workflow::{CheckoutDeps, CheckoutSnapshot, CheckoutWorkflow, PlacementOutcome, StoreProfile};
