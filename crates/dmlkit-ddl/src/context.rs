//! Cancellation for schema loading and validation.
//!
//! A [`Context`] carries an optional cancel signal and an optional deadline.
//! Database round trips are raced against it with [`Context::run`]; when the
//! context finishes first the caller gets [`SqlError::Canceled`] or
//! [`SqlError::Timeout`] as-is.

use dmlkit::{SqlError, SqlResult};
use std::future::{Future, pending};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct Context {
    cancel: Option<watch::Receiver<bool>>,
    deadline: Option<(Instant, Duration)>,
}

/// Cancels the [`Context`] it was created with, and every clone of it.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Context {
    /// A context that is never canceled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a cancelable context. The deadline, if any, is kept.
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let ctx = Self {
            cancel: Some(rx),
            deadline: self.deadline,
        };
        (ctx, CancelHandle { tx })
    }

    /// Derive a context that times out after `timeout`. An earlier existing
    /// deadline wins.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let at = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some((existing, d)) if existing <= at => Some((existing, d)),
            _ => Some((at, timeout)),
        };
        Self {
            cancel: self.cancel.clone(),
            deadline,
        }
    }

    /// The error this context finished with, if it already did.
    pub fn err(&self) -> Option<SqlError> {
        if self.cancel.as_ref().is_some_and(|rx| *rx.borrow()) {
            return Some(SqlError::Canceled);
        }
        match self.deadline {
            Some((at, d)) if Instant::now() >= at => Some(SqlError::Timeout(d)),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Drive `fut` until it completes or the context finishes.
    pub async fn run<F, T>(&self, fut: F) -> SqlResult<T>
    where
        F: Future<Output = SqlResult<T>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            res = fut => res,
        }
    }

    async fn done(&self) -> SqlError {
        let canceled = async {
            match &self.cancel {
                Some(rx) => {
                    let mut rx = rx.clone();
                    loop {
                        if *rx.borrow_and_update() {
                            return;
                        }
                        if rx.changed().await.is_err() {
                            // Handle dropped without canceling.
                            pending::<()>().await;
                        }
                    }
                }
                None => pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some((at, d)) => {
                    tokio::time::sleep_until(at).await;
                    d
                }
                None => pending::<Duration>().await,
            }
        };
        tokio::select! {
            _ = canceled => SqlError::Canceled,
            d = expired => SqlError::Timeout(d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn background_runs_to_completion() {
        let ctx = Context::background();
        assert!(ctx.err().is_none());
        let v = ctx.run(async { Ok::<_, SqlError>(7) }).await.unwrap();
        assert_eq!(v, 7);
    }

    #[tokio::test]
    async fn canceled_before_run() {
        let (ctx, handle) = Context::background().with_cancel();
        handle.cancel();
        let err = ctx.run(async { Ok::<_, SqlError>(()) }).await.unwrap_err();
        assert!(err.is_canceled());
        assert_eq!(err.to_string(), "context canceled");
    }

    #[tokio::test]
    async fn canceled_while_running() {
        let (ctx, handle) = Context::background().with_cancel();
        let clone = ctx.clone();
        let task = tokio::spawn(async move { clone.run(pending::<SqlResult<()>>()).await });
        tokio::task::yield_now().await;
        handle.cancel();
        let err = task.await.unwrap().unwrap_err();
        assert!(err.is_canceled());
        assert!(ctx.is_done());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_expires() {
        let ctx = Context::background().with_timeout(Duration::from_millis(50));
        let err = ctx.run(pending::<SqlResult<()>>()).await.unwrap_err();
        assert!(err.is_timeout());
        assert!(matches!(err, SqlError::Timeout(d) if d == Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn dropped_handle_does_not_cancel() {
        let (ctx, handle) = Context::background().with_cancel();
        drop(handle);
        let v = ctx
            .run(async {
                tokio::task::yield_now().await;
                Ok::<_, SqlError>(1)
            })
            .await
            .unwrap();
        assert_eq!(v, 1);
    }
}
