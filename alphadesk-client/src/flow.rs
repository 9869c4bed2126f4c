//! State machine for one authenticated request.
//!
//! A request is sent, refreshed at most once, and retried at most once:
//!
//! ```text
//! Idle        401        -> Refreshing  Refresh
//! Idle        other      -> Succeeded   Return
//! Refreshing  ok         -> Retrying    Retry
//! Refreshing  failed     -> Failed      Terminate
//! Retrying    401        -> Failed      Expire
//! Retrying    other      -> Succeeded   Return
//! ```
//!
//! [`AuthFlow::step`] only decides; the caller performs the action it
//! returns and reports the outcome as the next event.

use std::fmt;
use thiserror::Error;

/// Where a request is in its refresh-and-retry cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// First send not yet answered.
    Idle,
    /// Waiting for the credential refresh.
    Refreshing,
    /// Retried with the refreshed credential.
    Retrying,
    /// Session is terminally unauthorized.
    Failed,
    /// A response was handed back to the caller.
    Succeeded,
}

impl FlowState {
    /// Whether no further events are accepted.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::Succeeded)
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Refreshing => "refreshing",
            Self::Retrying => "retrying",
            Self::Failed => "failed",
            Self::Succeeded => "succeeded",
        };
        f.write_str(name)
    }
}

/// Something that happened to the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// A response arrived with this status.
    Response(u16),
    /// The credential refresh settled.
    Refreshed(bool),
}

impl AuthEvent {
    fn is_unauthorized(self) -> bool {
        matches!(self, Self::Response(401))
    }
}

impl fmt::Display for AuthEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Response(status) => write!(f, "response {status}"),
            Self::Refreshed(true) => f.write_str("refresh ok"),
            Self::Refreshed(false) => f.write_str("refresh failed"),
        }
    }
}

/// What the caller must do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    /// Refresh the credentials.
    Refresh,
    /// Send the request again with the new access token.
    Retry,
    /// Hand the last response to the caller.
    Return,
    /// Report the session as lost; the refresh already purged it.
    Terminate,
    /// Purge the session, fire the unauthorized callback, report it lost.
    Expire,
}

/// Errors from driving the flow.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FlowError {
    /// The event is not valid in the current state.
    #[error("Invalid auth flow transition: {event} while {state}")]
    InvalidTransition {
        /// State when the event arrived.
        state: FlowState,
        /// The rejected event.
        event: AuthEvent,
    },
}

impl From<FlowError> for alphadesk_core::ClientError {
    fn from(err: FlowError) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// Refresh-and-retry-once state machine.
#[derive(Debug, Clone)]
pub struct AuthFlow {
    state: FlowState,
    attempts: u8,
}

impl Default for AuthFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthFlow {
    /// Start a flow for a request about to be sent.
    pub fn new() -> Self {
        Self {
            state: FlowState::Idle,
            attempts: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Sends answered so far. Never exceeds 2.
    pub fn attempts(&self) -> u8 {
        self.attempts
    }

    /// Apply an event and return the action to perform.
    pub fn step(&mut self, event: AuthEvent) -> Result<AuthAction, FlowError> {
        let (next, action) = match (self.state, event) {
            (FlowState::Idle, AuthEvent::Response(_)) if event.is_unauthorized() => {
                (FlowState::Refreshing, AuthAction::Refresh)
            }
            (FlowState::Idle, AuthEvent::Response(_)) => (FlowState::Succeeded, AuthAction::Return),
            (FlowState::Refreshing, AuthEvent::Refreshed(true)) => {
                (FlowState::Retrying, AuthAction::Retry)
            }
            (FlowState::Refreshing, AuthEvent::Refreshed(false)) => {
                (FlowState::Failed, AuthAction::Terminate)
            }
            (FlowState::Retrying, AuthEvent::Response(_)) if event.is_unauthorized() => {
                (FlowState::Failed, AuthAction::Expire)
            }
            (FlowState::Retrying, AuthEvent::Response(_)) => {
                (FlowState::Succeeded, AuthAction::Return)
            }
            (state, event) => return Err(FlowError::InvalidTransition { state, event }),
        };

        if matches!(event, AuthEvent::Response(_)) {
            self.attempts += 1;
        }
        self.state = next;
        Ok(action)
    }
}
