//! Attempt-bounded, cancellable polling loop.

use std::future::Future;
use std::time::Duration;
use tokio::select;
use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
    /// Wall-clock budget for the whole loop, on top of the attempt ceiling.
    pub deadline: Option<Duration>,
}

/// What a single attempt observed.
#[derive(Debug, Clone, PartialEq)]
pub enum Probe<T> {
    Ready(T),
    Pending,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RetryOutcome<T> {
    Terminal(T),
    /// Attempts or deadline ran out while still pending.
    Exhausted { attempts: u32 },
    Cancelled { attempts: u32 },
}

impl<T> RetryOutcome<T> {
    pub fn terminal(self) -> Option<T> {
        match self {
            RetryOutcome::Terminal(value) => Some(value),
            _ => None,
        }
    }
}

/// Sending half of a cancellation signal.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Receiving half of a cancellation signal. Dropping the handle without
/// calling `cancel` leaves the token uncancelled.
#[derive(Clone)]
pub struct CancelToken {
    rx: Option<watch::Receiver<bool>>,
}

impl CancelToken {
    pub fn never() -> Self {
        Self { rx: None }
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().map(|rx| *rx.borrow()).unwrap_or(false)
    }

    pub async fn cancelled(&mut self) {
        if let Some(rx) = self.rx.as_mut() {
            while !*rx.borrow_and_update() {
                if rx.changed().await.is_err() {
                    break;
                }
            }
            if *rx.borrow() {
                return;
            }
        }
        std::future::pending::<()>().await
    }
}

pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx: Some(rx) })
}

/// Run `probe` until it reports `Ready`, the attempts or deadline run out,
/// or `cancel` fires. The probe receives the 1-based attempt number.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    mut cancel: CancelToken,
    mut probe: F,
) -> RetryOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Probe<T>>,
{
    let deadline = policy.deadline.map(|budget| Instant::now() + budget);
    let mut attempts = 0;

    while attempts < policy.max_attempts {
        if cancel.is_cancelled() {
            return RetryOutcome::Cancelled { attempts };
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }

        attempts += 1;
        if let Probe::Ready(value) = probe(attempts).await {
            return RetryOutcome::Terminal(value);
        }
        if attempts == policy.max_attempts {
            break;
        }

        let mut wake = Instant::now() + policy.interval;
        if let Some(d) = deadline {
            wake = wake.min(d);
        }

        select! {
            _ = sleep_until(wake) => {}
            _ = cancel.cancelled() => {
                return RetryOutcome::Cancelled { attempts };
            }
        }
    }

    RetryOutcome::Exhausted { attempts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            interval: Duration::from_millis(1),
            max_attempts,
            deadline: None,
        }
    }

    #[tokio::test]
    async fn stops_on_first_ready() {
        let outcome = run_with_retry(&policy(10), CancelToken::never(), |attempt| async move {
            if attempt == 3 {
                Probe::Ready(attempt)
            } else {
                Probe::Pending
            }
        })
        .await;

        assert_eq!(outcome, RetryOutcome::Terminal(3));
    }

    #[tokio::test]
    async fn exhausts_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let outcome: RetryOutcome<()> = run_with_retry(&policy(4), CancelToken::never(), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Probe::Pending }
        })
        .await;

        assert_eq!(outcome, RetryOutcome::Exhausted { attempts: 4 });
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn cancel_before_start_skips_probe() {
        let (handle, token) = cancel_pair();
        handle.cancel();

        let outcome: RetryOutcome<()> =
            run_with_retry(&policy(4), token, |_| async { Probe::Pending }).await;
        assert_eq!(outcome, RetryOutcome::Cancelled { attempts: 0 });
    }

    #[tokio::test]
    async fn cancel_interrupts_the_wait() {
        let (handle, token) = cancel_pair();
        let slow = RetryPolicy {
            interval: Duration::from_secs(60),
            max_attempts: 5,
            deadline: None,
        };

        let task = tokio::spawn(async move {
            run_with_retry(&slow, token, |_| async { Probe::<()>::Pending }).await
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();

        assert_eq!(task.await.unwrap(), RetryOutcome::Cancelled { attempts: 1 });
    }

    #[tokio::test]
    async fn deadline_ends_loop_early() {
        let bounded = RetryPolicy {
            interval: Duration::from_millis(50),
            max_attempts: 1_000,
            deadline: Some(Duration::from_millis(120)),
        };

        let outcome: RetryOutcome<()> =
            run_with_retry(&bounded, CancelToken::never(), |_| async { Probe::Pending }).await;

        match outcome {
            RetryOutcome::Exhausted { attempts } => assert!(attempts >= 2 && attempts <= 4),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn dropped_handle_never_cancels() {
        let (handle, token) = cancel_pair();
        drop(handle);

        let outcome = run_with_retry(&policy(3), token, |attempt| async move {
            if attempt == 2 {
                Probe::Ready("done")
            } else {
                Probe::Pending
            }
        })
        .await;
        assert_eq!(outcome, RetryOutcome::Terminal("done"));
    }
}
