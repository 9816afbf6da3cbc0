use eyre::{eyre, Result};
use std::collections::VecDeque;

/// Upper bound on the up-front allocation; larger windows grow on demand
const PREALLOCATED_SAMPLES: usize = 64;

/// Fixed-capacity FIFO of error samples (oldest first).
///
/// Overflow never blocks or fails: pushing into a full buffer evicts the
/// oldest sample and hands it back so the caller can keep a running sum
/// in step with the window.
#[derive(Debug, Clone)]
pub struct ErrorHistory {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl ErrorHistory {
    /// Create an empty history holding at most `capacity` samples
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(eyre!("Error history capacity must be at least 1"));
        }

        Ok(Self {
            samples: VecDeque::with_capacity(capacity.min(PREALLOCATED_SAMPLES)),
            capacity,
        })
    }

    /// Append a sample, returning the evicted oldest sample if the buffer
    /// was already full
    pub fn push(&mut self, value: f64) -> Option<f64> {
        self.samples.push_back(value);
        if self.samples.len() > self.capacity {
            self.samples.pop_front()
        } else {
            None
        }
    }

    pub fn size(&self) -> usize {
        self.samples.len()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.samples.iter()
    }

    /// Sum of the retained samples, recomputed from scratch
    pub fn sum(&self) -> f64 {
        self.samples.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(ErrorHistory::new(0).is_err());
    }

    #[test]
    fn test_fills_without_eviction() {
        let mut history = ErrorHistory::new(3).unwrap();

        assert!(history.is_empty());
        assert_eq!(history.push(1.0), None);
        assert_eq!(history.push(2.0), None);
        assert!(!history.is_full());
        assert_eq!(history.push(3.0), None);

        assert!(history.is_full());
        assert_eq!(history.size(), 3);
        assert_eq!(history.iter().copied().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let mut history = ErrorHistory::new(3).unwrap();
        history.push(1.0);
        history.push(2.0);
        history.push(3.0);

        // Fourth push evicts exactly the first sample
        assert_eq!(history.push(4.0), Some(1.0));
        assert_eq!(history.size(), 3);
        assert!(history.is_full());
        assert_eq!(history.iter().copied().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);

        assert_eq!(history.push(5.0), Some(2.0));
        assert_eq!(history.sum(), 12.0);
    }

    #[test]
    fn test_huge_capacity_allocates_lazily() {
        let mut history = ErrorHistory::new(usize::MAX).unwrap();
        assert_eq!(history.capacity(), usize::MAX);

        for i in 0..200 {
            assert_eq!(history.push(i as f64), None);
        }
        assert_eq!(history.size(), 200);
        assert!(!history.is_full());

        let history = ErrorHistory::new(1usize << 40).unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn test_capacity_one() {
        let mut history = ErrorHistory::new(1).unwrap();

        assert_eq!(history.push(7.0), None);
        assert_eq!(history.push(-2.0), Some(7.0));
        assert_eq!(history.push(0.5), Some(-2.0));
        assert_eq!(history.size(), 1);
        assert_eq!(history.capacity(), 1);
    }
}
