use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Debouncer {
    delay: f64,
    deadline: Option<f64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay: delay.as_secs_f64(),
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now: f64) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once, on the first call at or after the deadline.
    pub fn fire(&mut self, now: f64) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn remaining(&self, now: f64) -> Option<Duration> {
        self.deadline
            .map(|deadline| Duration::from_secs_f64((deadline - now).max(0.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bursts_collapse_into_one_trailing_fire() {
        let mut debounce = Debouncer::new(Duration::from_millis(300));
        debounce.schedule(0.0);
        debounce.schedule(0.2);
        assert!(!debounce.fire(0.35));
        assert!(debounce.fire(0.5));
        assert!(!debounce.fire(0.9));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn cancel_drops_the_deadline() {
        let mut debounce = Debouncer::new(Duration::from_millis(300));
        debounce.schedule(1.0);
        let remaining = debounce.remaining(1.1).expect("armed");
        assert!(remaining > Duration::from_millis(190) && remaining < Duration::from_millis(210));
        debounce.cancel();
        assert!(!debounce.fire(5.0));
        assert_eq!(debounce.remaining(5.0), None);
    }
}
