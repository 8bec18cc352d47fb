//! Telephony collaborators
//!
//! The platform owns calls. The session binds to one [`PlatformCall`] at a
//! time, receives its state changes through
//! [`CallSession::on_call_state_changed`](crate::session::CallSession::on_call_state_changed)
//! and forwards user commands to it. New outgoing calls go through a
//! [`CallPlacer`].

use async_trait::async_trait;

use crate::call::{CallDetails, CallHandle, PlatformCallState, PlatformError};

/// One call tracked by the platform telephony stack
#[async_trait]
pub trait PlatformCall: Send + Sync {
    fn handle(&self) -> CallHandle;

    /// Number, caller name and current capabilities
    fn details(&self) -> CallDetails;

    /// Current platform-side state
    fn state(&self) -> PlatformCallState;

    async fn answer(&self) -> Result<(), PlatformError>;

    async fn disconnect(&self) -> Result<(), PlatformError>;

    async fn hold(&self) -> Result<(), PlatformError>;

    async fn unhold(&self) -> Result<(), PlatformError>;
}

/// Asks the platform to dial a number
#[async_trait]
pub trait CallPlacer: Send + Sync {
    /// Returns once the platform accepted or rejected the request; the call
    /// itself shows up later through call registration.
    async fn place_call(&self, number: &str) -> Result<(), PlatformError>;
}
