use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
    /// Number of probes made, the successful one included.
    pub probes: usize,
    /// `false` when the deadline passed first.
    pub finished: bool,
}

/// Run `probe` every `interval` until it returns `true` or `timeout` elapses.
///
/// The first probe runs immediately. No probe is started once the next one
/// would begin past the deadline.
pub async fn poll_until<F, Fut>(interval: Duration, timeout: Duration, mut probe: F) -> PollOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + timeout;
    let mut probes = 0;
    loop {
        probes += 1;
        if probe().await {
            return PollOutcome {
                probes,
                finished: true,
            };
        }
        if Instant::now() + interval > deadline {
            return PollOutcome {
                probes,
                finished: false,
            };
        }
        tokio::time::sleep(interval).await;
    }
}
