use crate::chain::ShardeumClient;
use crate::entity::TransactionStatus;
use crate::services::retry::{
    cancel_pair, run_with_retry, CancelHandle, CancelToken, Probe, RetryOutcome, RetryPolicy,
};
use anyhow::{anyhow, Result};
use log::{debug, info};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Watches a submitted transaction until its receipt shows a final status.
pub struct StatusPoller {
    client: Arc<ShardeumClient>,
    policy: RetryPolicy,
}

impl StatusPoller {
    pub fn new(client: Arc<ShardeumClient>, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Poll the receipt of `hash`. Lookup errors count as still pending.
    pub async fn poll(&self, hash: &str, cancel: CancelToken) -> RetryOutcome<TransactionStatus> {
        let outcome = run_with_retry(&self.policy, cancel, |attempt| {
            let client = self.client.clone();
            let hash = hash.to_string();
            async move {
                let receipt = client.get_transaction_status(&hash).await;
                match receipt.terminal_status() {
                    Some(status) => Probe::Ready(status),
                    None => {
                        debug!("Transaction {} still {:?} (attempt {})", hash, receipt, attempt);
                        Probe::Pending
                    }
                }
            }
        })
        .await;

        match &outcome {
            RetryOutcome::Terminal(status) => info!("Transaction {} resolved as {}", hash, status),
            RetryOutcome::Exhausted { attempts } => {
                info!("Transaction {} still pending after {} attempts", hash, attempts)
            }
            RetryOutcome::Cancelled { attempts } => {
                debug!("Polling of {} cancelled after {} attempts", hash, attempts)
            }
        }

        outcome
    }

    /// Poll in a background task and hand a terminal status to `on_resolved`.
    pub fn spawn<F, Fut>(self: &Arc<Self>, hash: String, on_resolved: F) -> PollHandle
    where
        F: FnOnce(TransactionStatus) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let (cancel, token) = cancel_pair();
        let poller = self.clone();

        let join = tokio::spawn(async move {
            let outcome = poller.poll(&hash, token).await;
            if let RetryOutcome::Terminal(status) = &outcome {
                crate::services::best_effort("Updating transaction status", on_resolved(*status))
                    .await;
            }
            outcome
        });

        PollHandle { cancel, join }
    }
}

/// Handle on a background poll. Dropping it detaches the poll.
#[derive(Debug)]
pub struct PollHandle {
    cancel: CancelHandle,
    join: JoinHandle<RetryOutcome<TransactionStatus>>,
}

impl PollHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub async fn join(self) -> Result<RetryOutcome<TransactionStatus>> {
        self.join
            .await
            .map_err(|e| anyhow!("Status poll task failed: {}", e))
    }
}
