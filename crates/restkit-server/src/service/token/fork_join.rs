//! Two-leg fork-join on the blocking thread pool.
//!
//! Signing and verification are CPU-bound, so each leg runs through
//! [`tokio::task::spawn_blocking`]. The caller waits for both legs and gets
//! either both results or the first error by leg index.
//!
//! # Cancellation
//!
//! Legs run under a child of the caller's [`CancellationToken`]. A leg checks
//! the token before doing any work. If the caller cancels while the legs are
//! in flight, [`fork_join`] returns [`TokenError::Cancelled`] immediately and
//! the late results are discarded. Dropping the returned future cancels the
//! child token as well.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::error::{TokenError, TokenResult};
use crate::utility::tracing_targets::TRACING_TARGET_TOKENS;

/// Runs `left` and `right` in parallel and waits for both.
///
/// # Errors
///
/// - [`TokenError::Cancelled`] if `cancel` fires before both legs finish.
/// - The error of `left` if it failed, otherwise the error of `right`.
/// - [`TokenError::TaskFailed`] if a leg panicked.
pub async fn fork_join<A, B, L, R>(
    cancel: &CancellationToken,
    left: L,
    right: R,
) -> TokenResult<(A, B)>
where
    A: Send + 'static,
    B: Send + 'static,
    L: FnOnce() -> TokenResult<A> + Send + 'static,
    R: FnOnce() -> TokenResult<B> + Send + 'static,
{
    if cancel.is_cancelled() {
        return Err(TokenError::Cancelled);
    }

    let legs = cancel.child_token();
    let _guard = legs.clone().drop_guard();

    let left = spawn_leg(legs.clone(), left);
    let right = spawn_leg(legs, right);

    tokio::select! {
        biased;

        () = cancel.cancelled() => {
            tracing::debug!(
                target: TRACING_TARGET_TOKENS,
                "fork-join cancelled before both legs completed"
            );

            Err(TokenError::Cancelled)
        }
        (left, right) = async { tokio::join!(left, right) } => {
            let left = left??;
            let right = right??;
            Ok((left, right))
        }
    }
}

fn spawn_leg<T, F>(cancel: CancellationToken, leg: F) -> JoinHandle<TokenResult<T>>
where
    T: Send + 'static,
    F: FnOnce() -> TokenResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        if cancel.is_cancelled() {
            return Err(TokenError::Cancelled);
        }

        leg()
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn both_legs_succeed() -> anyhow::Result<()> {
        let cancel = CancellationToken::new();
        let (left, right) = fork_join(&cancel, || Ok(1), || Ok("two")).await?;

        assert_eq!(left, 1);
        assert_eq!(right, "two");
        Ok(())
    }

    #[tokio::test]
    async fn left_error_wins_when_both_fail() {
        let cancel = CancellationToken::new();
        let result = fork_join::<(), (), _, _>(
            &cancel,
            || Err(TokenError::InvalidToken),
            || Err(TokenError::signing("right failed")),
        )
        .await;

        assert!(matches!(result, Err(TokenError::InvalidToken)));
    }

    #[tokio::test]
    async fn right_error_is_reported() {
        let cancel = CancellationToken::new();
        let result = fork_join::<i32, (), _, _>(
            &cancel,
            || Ok(1),
            || Err(TokenError::InvalidToken),
        )
        .await;

        assert!(matches!(result, Err(TokenError::InvalidToken)));
    }

    #[tokio::test]
    async fn cancelled_token_skips_legs() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let runs = Arc::new(AtomicUsize::new(0));
        let (left_runs, right_runs) = (runs.clone(), runs.clone());

        let result = fork_join(
            &cancel,
            move || {
                left_runs.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
            move || {
                right_runs.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        )
        .await;

        assert!(matches!(result, Err(TokenError::Cancelled)));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancellation_returns_without_waiting() {
        let cancel = CancellationToken::new();
        let (release, blocked) = mpsc::channel::<()>();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = fork_join(
            &cancel,
            || Ok(()),
            move || {
                let _ = blocked.recv_timeout(Duration::from_secs(5));
                Ok(())
            },
        )
        .await;

        assert!(matches!(result, Err(TokenError::Cancelled)));
        let _ = release.send(());
    }

    #[tokio::test]
    async fn panicking_leg_is_reported_as_task_failure() {
        let cancel = CancellationToken::new();
        let result = fork_join::<(), (), _, _>(&cancel, || panic!("leg exploded"), || Ok(())).await;

        assert!(matches!(result, Err(TokenError::TaskFailed(_))));
    }
}
