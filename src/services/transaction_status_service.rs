use crate::interactor::transaction_interactor::TransactionInteractor;
use anyhow::Result;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::{interval, Instant};

/// Background sweep over every stored pending transaction.
///
/// Picks up records whose in-process poll was lost (restart) or exhausted.
pub struct TransactionStatusService {
    transactions: Arc<dyn TransactionInteractor>,
    period: Duration,
    stop_tx: Option<mpsc::Sender<()>>,
}

impl TransactionStatusService {
    pub fn new(transactions: Arc<dyn TransactionInteractor>, period: Duration) -> Self {
        Self {
            transactions,
            // `interval` panics on a zero period
            period: period.max(Duration::from_millis(1)),
            stop_tx: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.stop_tx.is_some()
    }

    pub async fn start(&mut self) -> Result<()> {
        if self.stop_tx.is_some() {
            warn!("Transaction status service is already running");
            return Ok(());
        }

        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
        self.stop_tx = Some(stop_tx);

        let transactions = self.transactions.clone();
        let period = self.period;

        tokio::spawn(async move {
            let mut ticker = interval(period);
            let mut last_run = Instant::now();

            loop {
                select! {
                    _ = ticker.tick() => {
                        debug!("Sweeping pending transactions (last run: {:.2?} ago)", last_run.elapsed());

                        match transactions.refresh_all_pending().await {
                            Ok(0) => {}
                            Ok(updated) => info!("Resolved {} pending transactions", updated),
                            Err(e) => error!("Error sweeping pending transactions: {}", e),
                        }

                        last_run = Instant::now();
                    }
                    _ = stop_rx.recv() => {
                        info!("Stopping transaction status service");
                        break;
                    }
                }
            }
        });

        info!("Transaction status service started");
        Ok(())
    }

    pub async fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(()).await;
            info!("Transaction status service stop signal sent");
        }
    }
}
