use tokio::time::{Duration, Instant};

/// Single-slot pending-scan timer. Arming while armed replaces the previous
/// deadline, so bursts collapse into one scan; timers never stack.
#[derive(Debug)]
pub struct DebounceSlot {
    window: Duration,
    deadline: Option<Instant>,
}

impl DebounceSlot {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.window);
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

/// Resolves when the deadline passes; never resolves while disarmed.
pub async fn elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
