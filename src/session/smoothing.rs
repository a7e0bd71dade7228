use std::collections::VecDeque;

/// Rolling mean over the most recent live WPM samples.
#[derive(Clone, Debug)]
pub struct WpmWindow {
    samples: VecDeque<u32>,
    capacity: usize,
}

impl WpmWindow {
    /// A window of at least one sample.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, wpm: u32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(wpm);
    }

    /// Mean of the retained samples; 0 before the first one.
    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.samples.iter().map(|&s| u64::from(s)).sum();
        sum as f64 / self.samples.len() as f64
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
