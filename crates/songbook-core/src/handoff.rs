//! Best-effort hand-off to an external PDF reader.
//!
//! After a deep link is opened there is no acknowledgement from the handler.
//! The only signal that it was accepted is that our window lost focus. A
//! `Handoff` races that signal (delivered by cancelling its token) against a
//! fallback timer. Once the race is decided it cannot be re-armed.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

pub const DEFAULT_FALLBACK: Duration = Duration::from_millis(900);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffOutcome {
    /// Focus was lost before the timer fired; the external app took over.
    Accepted,
    /// The timer fired first; the caller should open the direct URL instead.
    Fallback,
}

#[derive(Debug)]
pub struct Handoff {
    token: CancellationToken,
    timeout: Duration,
}

impl Handoff {
    pub fn new(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            timeout,
        }
    }

    /// Handle used to report "window hidden". Cancelling it settles the race
    /// as accepted.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Wait for whichever comes first.
    pub async fn run(self) -> HandoffOutcome {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => HandoffOutcome::Accepted,
            _ = tokio::time::sleep(self.timeout) => HandoffOutcome::Fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let handoff = Handoff::new(Duration::from_millis(20));
        assert_eq!(handoff.run().await, HandoffOutcome::Fallback);
    }

    #[tokio::test]
    async fn test_focus_loss_accepts() {
        let handoff = Handoff::new(Duration::from_secs(5));
        let token = handoff.token();
        let task = tokio::spawn(handoff.run());
        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();
        assert_eq!(task.await.unwrap(), HandoffOutcome::Accepted);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_is_accepted() {
        let handoff = Handoff::new(Duration::from_millis(1));
        handoff.token().cancel();
        assert_eq!(handoff.run().await, HandoffOutcome::Accepted);
    }
}
