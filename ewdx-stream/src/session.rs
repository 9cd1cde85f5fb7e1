//! Pieces shared by both session actors

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{sleep_until, timeout, Instant};
use tracing::debug;

use crate::error::{Result, SessionError};

/// Grace period for an actor to finish its teardown
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolve at `deadline`, or never when there is none
pub(crate) async fn expire(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Wait for an actor task, aborting it if it overruns [`SHUTDOWN_TIMEOUT`]
pub(crate) async fn join_actor(mut task: JoinHandle<()>, name: &str) -> Result<()> {
    match timeout(SHUTDOWN_TIMEOUT, &mut task).await {
        Ok(Ok(())) => {
            debug!(session = name, "Session actor joined");
            Ok(())
        }
        Ok(Err(e)) => Err(SessionError::ShutdownError(format!(
            "{} session task failed: {}",
            name, e
        ))),
        Err(_) => {
            task.abort();
            // The task owns the transport; it is only closed once the task is dropped
            let _ = task.await;
            Err(SessionError::ShutdownError(format!(
                "{} session shutdown timed out after {} seconds",
                name,
                SHUTDOWN_TIMEOUT.as_secs()
            )))
        }
    }
}
