//! Command execution helpers

use std::future::Future;
use std::time::Instant;

use taskflow_domain::Result;

use crate::utils::logging::log_command_execution;

/// Run a command, timing it and logging its outcome.
///
/// # Example
///
/// ```rust,ignore
/// let profile = execute_logged("member::profile", || ctx.api.profile()).await?;
/// ```
pub async fn execute_logged<F, Fut, T>(command_name: &str, command_fn: F) -> Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let start = Instant::now();
    let result = command_fn().await;
    log_command_execution(command_name, start.elapsed(), result.as_ref().err());
    result
}

#[cfg(test)]
mod tests {
    use taskflow_domain::TaskflowError;

    use super::*;

    #[tokio::test]
    async fn test_execute_logged_passes_result_through() {
        let ok = execute_logged("test::ok", || async { Ok(7) }).await;
        assert_eq!(ok, Ok(7));

        let err: Result<()> = execute_logged("test::err", || async {
            Err(TaskflowError::NetworkUnavailable("offline".into()))
        })
        .await;
        assert!(err.unwrap_err().is_network());
    }
}
