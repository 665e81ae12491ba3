//! Nullable infrastructure for deterministic testing.
//!
//! Test-friendly stand-ins for everything the verifier reaches outside the
//! process:
//! - [`NullClock`] records retry sleeps and returns immediately
//! - [`NullLedger`] is an in-memory finality ledger serving both the
//!   submission and the query channel
//!
//! Neither touches the network or real time.

pub mod clock;
pub mod ledger;

pub use clock::NullClock;
pub use ledger::{Equivocation, NullLedger};
