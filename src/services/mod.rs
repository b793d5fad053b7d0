pub mod background;
pub mod retry;
pub mod status_poller;
pub mod transaction_status_service;
pub mod wallet_watcher;

pub use background::{best_effort, spawn_best_effort};
pub use retry::{cancel_pair, run_with_retry, CancelHandle, CancelToken, Probe, RetryOutcome, RetryPolicy};
pub use status_poller::{PollHandle, StatusPoller};
pub use transaction_status_service::TransactionStatusService;
pub use wallet_watcher::WalletWatcher;
