//! # Auth State
//!
//! The session lock. Every command except `login` checks it first.
//!
//! ```text
//!   Locked ──login(pin ok)──► Unlocked ──logout──► Locked
//!     ▲                                               │
//!     └───────────── login(pin wrong) ◄───────────────┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::error::ApiError;

/// Whether the cashier has unlocked the session.
#[derive(Debug)]
pub struct AuthState {
    pin: Option<String>,
    unlocked: AtomicBool,
}

impl AuthState {
    /// Starts locked. With no PIN configured any PIN unlocks.
    pub fn new(pin: Option<String>) -> Self {
        AuthState {
            pin,
            unlocked: AtomicBool::new(false),
        }
    }

    /// Tries to unlock. Returns whether the PIN was accepted.
    pub fn login(&self, pin: &str) -> bool {
        let accepted = match &self.pin {
            Some(expected) => expected == pin.trim(),
            None => true,
        };

        if accepted {
            self.unlocked.store(true, Ordering::SeqCst);
            info!("Session unlocked");
        } else {
            warn!("Rejected login attempt");
        }
        accepted
    }

    pub fn logout(&self) {
        self.unlocked.store(false, Ordering::SeqCst);
        info!("Session locked");
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked.load(Ordering::SeqCst)
    }

    /// Fails with [`crate::error::ErrorCode::Locked`] while locked.
    pub fn ensure_unlocked(&self) -> Result<(), ApiError> {
        if self.is_unlocked() {
            Ok(())
        } else {
            Err(ApiError::locked())
        }
    }
}
