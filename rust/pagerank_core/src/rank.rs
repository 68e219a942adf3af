//! Double-buffered rank state.

/// The two rank vectors of a power iteration.
///
/// `current` holds the estimate being read, `next` the accumulator being
/// written. [`RankBuffers::hand_over`] swaps the roles without allocating.
#[derive(Debug, Clone)]
pub struct RankBuffers {
    current: Vec<f64>,
    next: Vec<f64>,
}

impl RankBuffers {
    /// Uniform `1/n` start vector and a zeroed accumulator.
    pub fn uniform(n: usize) -> Self {
        let initial = if n == 0 { 0.0 } else { 1.0 / n as f64 };
        Self {
            current: vec![initial; n],
            next: vec![0.0; n],
        }
    }

    /// Start from a caller-supplied rank vector.
    pub fn from_current(current: Vec<f64>) -> Self {
        let next = vec![0.0; current.len()];
        Self { current, next }
    }

    pub fn current(&self) -> &[f64] {
        &self.current
    }

    pub fn next(&self) -> &[f64] {
        &self.next
    }

    /// Read `current` while writing `next`.
    pub fn split(&mut self) -> (&[f64], &mut [f64]) {
        (&self.current, &mut self.next)
    }

    /// The accumulator becomes the estimate; the old estimate's storage is
    /// reused as the next accumulator.
    pub fn hand_over(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }

    /// Release the most recently written vector.
    pub fn into_next(self) -> Vec<f64> {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_start() {
        let buffers = RankBuffers::uniform(4);
        assert_eq!(buffers.current().len(), 4);
        assert!(buffers.current().iter().all(|&r| r == 0.25));
        assert!(buffers.next().iter().all(|&r| r == 0.0));
    }

    #[test]
    fn test_hand_over_reuses_storage() {
        let mut buffers = RankBuffers::uniform(3);
        let current_ptr = buffers.current().as_ptr();
        let next_ptr = buffers.next().as_ptr();

        {
            let (_, next) = buffers.split();
            next.copy_from_slice(&[0.5, 0.25, 0.25]);
        }
        buffers.hand_over();

        assert_eq!(buffers.current(), &[0.5, 0.25, 0.25]);
        assert_eq!(buffers.current().as_ptr(), next_ptr);
        assert_eq!(buffers.next().as_ptr(), current_ptr);
    }

    #[test]
    fn test_into_next() {
        let mut buffers = RankBuffers::from_current(vec![1.0, 0.0]);
        buffers.split().1.copy_from_slice(&[0.3, 0.7]);
        assert_eq!(buffers.into_next(), vec![0.3, 0.7]);
    }
}
