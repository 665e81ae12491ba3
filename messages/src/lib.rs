//! Messages exchanged with the finality ledger.
//!
//! Two state-changing payloads go through the submission channel
//! ([`ExecuteMsg`]) and two read-only requests through the query channel
//! ([`QueryMsg`]). All byte fields are lowercase hex strings; field names are
//! fixed camelCase because independent processes must agree on them.

pub mod error;
pub mod execute;
pub mod query;

pub use error::MessageError;
pub use execute::{commitment_message, CommitmentPayload, ExecuteMsg, RevealPayload};
pub use query::{CommitmentRecord, QueryMsg, QueryResponse};
