use std::time::{Duration, Instant};

use crate::session::RequestToken;

/// Single-slot, clock-driven debounce. Arming replaces whatever was pending.
#[derive(Debug, Clone, Default)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<(RequestToken, Instant)>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.delay.is_zero()
    }

    pub fn arm(&mut self, token: RequestToken, now: Instant) -> Instant {
        let due = now + self.delay;
        self.pending = Some((token, due));
        due
    }

    pub fn cancel(&mut self) -> Option<RequestToken> {
        self.pending.take().map(|(token, _)| token)
    }

    pub fn pending(&self) -> Option<RequestToken> {
        self.pending.map(|(token, _)| token)
    }

    pub fn take_ready(&mut self, now: Instant) -> Option<RequestToken> {
        match self.pending {
            Some((token, due)) if now >= due => {
                self.pending = None;
                Some(token)
            }
            _ => None,
        }
    }
}
