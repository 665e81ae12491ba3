//! The two channels to the ledger.

use crate::ChannelError;
use pubrand_messages::{ExecuteMsg, QueryMsg, QueryResponse};
use std::future::Future;
use std::sync::Arc;

/// Receipt for an accepted submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ack {
    /// Ledger-assigned identifier (transaction hash or similar).
    pub id: String,
}

/// Fires state-changing payloads at the ledger. Not idempotent: callers
/// submit each payload once.
pub trait SubmissionChannel: Send + Sync {
    fn submit(&self, msg: &ExecuteMsg) -> impl Future<Output = Result<Ack, ChannelError>> + Send;
}

/// Reads committed state. Safe to repeat and to interleave.
pub trait QueryChannel: Send + Sync {
    fn query(
        &self,
        request: &QueryMsg,
    ) -> impl Future<Output = Result<QueryResponse, ChannelError>> + Send;
}

impl<T: SubmissionChannel> SubmissionChannel for Arc<T> {
    fn submit(&self, msg: &ExecuteMsg) -> impl Future<Output = Result<Ack, ChannelError>> + Send {
        self.as_ref().submit(msg)
    }
}

impl<T: QueryChannel> QueryChannel for Arc<T> {
    fn query(
        &self,
        request: &QueryMsg,
    ) -> impl Future<Output = Result<QueryResponse, ChannelError>> + Send {
        self.as_ref().query(request)
    }
}

impl<T: QueryChannel> QueryChannel for &T {
    fn query(
        &self,
        request: &QueryMsg,
    ) -> impl Future<Output = Result<QueryResponse, ChannelError>> + Send {
        (**self).query(request)
    }
}
