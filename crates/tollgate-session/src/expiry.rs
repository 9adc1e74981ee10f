//! The per-connection token expiry deadline.

use std::time::Duration;

use tokio::time::{self, Instant};

/// At most one armed deadline per connection.
///
/// Armed on every successful authenticate with delay = token TTL;
/// re-arming replaces the previous deadline outright, disarming cancels
/// it. [`expired`](Self::expired) is meant to sit in the session actor's
/// `tokio::select!` loop: it resolves when the armed deadline passes and
/// pends forever while disarmed, so the loop's other branches keep
/// running.
///
/// The deadline remembers which access token it was armed for. Firing is
/// inherently racy against re-login; the caller compares the returned
/// token against the connection's current one and discards stale fires.
#[derive(Debug, Default)]
pub struct ExpiryTimer {
    armed: Option<Armed>,
}

#[derive(Debug)]
struct Armed {
    at: Instant,
    access_token: String,
}

impl ExpiryTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms (or re-arms) the deadline `ttl` from now, guarding
    /// `access_token`.
    pub fn arm(&mut self, ttl: Duration, access_token: String) {
        self.armed = Some(Armed {
            at: Instant::now() + ttl,
            access_token,
        });
    }

    /// Cancels the armed deadline, if any.
    pub fn disarm(&mut self) {
        self.armed = None;
    }

    /// Whether a deadline is currently armed.
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Resolves with the guarded token once the armed deadline passes,
    /// disarming in the process. Pends forever while disarmed.
    ///
    /// Cancel-safe: dropping the future mid-sleep leaves the deadline
    /// armed, and the next call picks it up again.
    pub async fn expired(&mut self) -> String {
        match &self.armed {
            Some(armed) => {
                time::sleep_until(armed.at).await;
                self.armed.take().expect("deadline was armed").access_token
            }
            None => {
                // Never resolves; select! keeps servicing other branches.
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Timer behavior under `tokio::time::pause()` — the clock only moves
    //! when the test advances it (or a timeout auto-advances), keeping
    //! every assertion deterministic.

    use tokio::time::{advance, timeout};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_expired_pends_while_unarmed() {
        let mut timer = ExpiryTimer::new();

        let result = timeout(Duration::from_secs(3_600), timer.expired()).await;

        assert!(result.is_err(), "unarmed timer must never fire");
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_fires_with_armed_token_and_disarms() {
        let mut timer = ExpiryTimer::new();
        timer.arm(Duration::from_secs(60), "T1".into());
        assert!(timer.is_armed());

        let token = timer.expired().await;

        assert_eq!(token, "T1");
        assert!(!timer.is_armed(), "firing consumes the deadline");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_replaces_deadline_and_token() {
        let mut timer = ExpiryTimer::new();
        timer.arm(Duration::from_secs(60), "T1".into());
        timer.arm(Duration::from_secs(120), "T2".into());

        // Past the original deadline, before the re-armed one: nothing
        // fires.
        advance(Duration::from_secs(90)).await;
        let early = timeout(Duration::from_millis(1), timer.expired()).await;
        assert!(early.is_err(), "replaced deadline must not fire");

        // Past the re-armed deadline: fires with the new token.
        advance(Duration::from_secs(40)).await;
        let token = timer.expired().await;
        assert_eq!(token, "T2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_cancels_deadline() {
        let mut timer = ExpiryTimer::new();
        timer.arm(Duration::from_secs(1), "T1".into());
        timer.disarm();
        assert!(!timer.is_armed());

        let result = timeout(Duration::from_secs(3_600), timer.expired()).await;

        assert!(result.is_err(), "disarmed timer must never fire");
    }
}
