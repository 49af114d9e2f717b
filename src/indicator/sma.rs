/// Simple moving average over a ring buffer.
///
/// Accepts `Option` inputs so it can smooth series that have an undefined
/// warm-up prefix: pushing `None` empties the window, so an average is only
/// produced once `period` consecutive defined values have been seen.
///
/// The average is summed from the window on every read, oldest value first;
/// nothing carries over from values that already left the window.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    buffer: Vec<f64>,
    head: usize,
    count: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "SMA period must be > 0");
        Self {
            period,
            buffer: vec![0.0; period],
            head: 0,
            count: 0,
        }
    }

    /// Push a value, return the current SMA if the window is full.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        self.buffer[self.head] = value;
        self.head = (self.head + 1) % self.period;
        if self.count < self.period {
            self.count += 1;
        }
        self.value()
    }

    /// Push a possibly-undefined value. `None` resets the window.
    pub fn push_opt(&mut self, value: Option<f64>) -> Option<f64> {
        match value {
            Some(v) => self.push(v),
            None => {
                self.reset();
                None
            }
        }
    }

    pub fn value(&self) -> Option<f64> {
        if self.count < self.period {
            return None;
        }
        // Once full, `head` points at the oldest value.
        let sum: f64 = (0..self.period)
            .map(|i| self.buffer[(self.head + i) % self.period])
            .sum();
        Some(sum / self.period as f64)
    }

    pub fn reset(&mut self) {
        self.head = 0;
        self.count = 0;
    }

    pub fn is_ready(&self) -> bool {
        self.count >= self.period
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

/// Rolling SMA aligned 1:1 with `values`; the first `period - 1` defined
/// inputs (and anything after a gap) produce `None`.
pub fn sma_series(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut sma = Sma::new(period);
    values.iter().map(|v| sma.push_opt(*v)).collect()
}
