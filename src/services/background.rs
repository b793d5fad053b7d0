use anyhow::Result;
use log::warn;
use std::future::Future;
use tokio::task::JoinHandle;

/// Await a side effect whose failure must not affect the caller.
pub async fn best_effort<T, Fut>(label: &str, fut: Fut) -> Option<T>
where
    Fut: Future<Output = Result<T>>,
{
    match fut.await {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{} failed: {:#}", label, e);
            None
        }
    }
}

/// Detach a side effect; failures are only logged.
pub fn spawn_best_effort<Fut>(label: &'static str, fut: Fut) -> JoinHandle<()>
where
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        best_effort(label, fut).await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[tokio::test]
    async fn failures_become_none() {
        assert_eq!(best_effort("ok", async { Ok::<_, anyhow::Error>(3) }).await, Some(3));
        assert_eq!(
            best_effort("boom", async { Err::<u32, _>(anyhow!("boom")) }).await,
            None
        );
    }

    #[tokio::test]
    async fn spawned_failure_does_not_panic_the_task() {
        let handle = spawn_best_effort("boom", async { Err(anyhow!("boom")) });
        assert!(handle.await.is_ok());
    }
}
