use std::time::Duration;

/// Accumulates durations per stage index.
#[derive(Debug, Default)]
pub struct TimeCalc {
    n: usize,
    duration: Vec<Duration>,
}

#[allow(dead_code)]
impl TimeCalc {
    pub fn total(&self) -> Duration {
        self.duration.iter().sum::<Duration>()
    }

    /// Number of complete rounds recorded.
    pub fn n(&self) -> usize {
        if self.duration.is_empty() {
            return 0;
        }
        self.n / self.duration.len()
    }

    pub fn avg(&self) -> Duration {
        match self.n() {
            0 => Duration::ZERO,
            n => self.total() / n as u32,
        }
    }

    pub fn avg_i(&self, i: usize) -> Duration {
        match (self.duration.get(i), self.n()) {
            (Some(d), n) if n > 0 => *d / n as u32,
            _ => Duration::ZERO,
        }
    }

    pub fn ts(&self) -> &Vec<Duration> {
        &self.duration
    }

    pub fn add_or_push(&mut self, i: usize, x: Duration) {
        match self.duration.get_mut(i) {
            Some(elem) => *elem += x,
            None => {
                if i >= self.duration.len() {
                    self.duration.push(x)
                }
            }
        }
        self.n += 1;
    }

    pub fn clear(&mut self) {
        self.n = Default::default();
        self.duration = Default::default();
    }
}
