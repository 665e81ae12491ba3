//! Submission and confirmation against the finality ledger.
//!
//! The ledger is reached through two narrow channels: [`SubmissionChannel`]
//! for state-changing payloads and [`QueryChannel`] for reads. Submissions
//! are fired once; [`SubmissionVerifier`] then polls the query channel on a
//! fixed interval until the ledger reports what was sent, the attempt budget
//! runs out, or the caller cancels.
//!
//! Timing goes through [`RetryClock`] so tests run without real delays.

pub mod channel;
pub mod clock;
pub mod config;
pub mod confirm;
pub mod error;
pub mod publisher;
pub mod shutdown;

pub use channel::{Ack, QueryChannel, SubmissionChannel};
pub use clock::{RetryClock, TokioClock};
pub use config::VerifierConfig;
pub use confirm::{Confirmed, RetryPolicy, SubmissionVerifier};
pub use error::{ChannelError, Discrepancy, VerifierError};
pub use publisher::{FinalityPublisher, Published};
pub use shutdown::ShutdownController;
pub use tokio_util::sync::CancellationToken;
