use std::time::Duration;

use tokio::time::Instant;

pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(1000);

/// Admission filter shared by every gesture source: at most one gesture is
/// accepted per cooldown window.
#[derive(Debug, Clone)]
pub struct CooldownGate {
    cooldown: Duration,
    last_accepted_at: Option<Instant>,
}

impl CooldownGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_accepted_at: None,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn last_accepted_at(&self) -> Option<Instant> {
        self.last_accepted_at
    }

    pub fn admit(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_accepted_at {
            // Timestamps older than the last admission saturate to zero and are rejected.
            if now.saturating_duration_since(last) < self.cooldown {
                return false;
            }
        }
        self.last_accepted_at = Some(now);
        true
    }
}

impl Default for CooldownGate {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}
