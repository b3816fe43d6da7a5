//! Rolling per-symbol price history

use std::collections::{HashMap, VecDeque};

use crate::shared::errors::PriceError;
use crate::shared::types::Symbol;
use super::PriceSample;

/// Bounded FIFO of price samples for one symbol, oldest first
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBuffer {
    samples: VecDeque<PriceSample>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a valid sample, evicting from the front past capacity
    pub fn push(&mut self, sample: PriceSample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Append a fetch outcome. Unavailable outcomes leave the buffer untouched.
    pub fn append(&mut self, outcome: &Result<PriceSample, PriceError>) -> bool {
        match outcome {
            Ok(sample) => {
                self.push(*sample);
                true
            }
            Err(_) => false,
        }
    }

    pub fn latest(&self) -> Option<PriceSample> {
        self.samples.back().copied()
    }

    /// Second-to-last sample, or the latest one when fewer than two exist
    pub fn previous(&self) -> Option<PriceSample> {
        if self.samples.len() >= 2 {
            self.samples.get(self.samples.len() - 2).copied()
        } else {
            self.latest()
        }
    }

    pub fn first(&self) -> Option<PriceSample> {
        self.samples.front().copied()
    }

    /// Last `n` samples, oldest first
    pub fn window(&self, n: usize) -> Vec<PriceSample> {
        let skip = self.samples.len().saturating_sub(n);
        self.samples.iter().skip(skip).copied().collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PriceSample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// History buffers for every tracked symbol.
///
/// A symbol that was never appended to reads as an empty buffer.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    buffers: HashMap<Symbol, HistoryBuffer>,
    capacity: usize,
    empty: HistoryBuffer,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffers: HashMap::new(),
            capacity: capacity.max(1),
            empty: HistoryBuffer::new(capacity),
        }
    }

    pub fn append(&mut self, symbol: &Symbol, outcome: &Result<PriceSample, PriceError>) -> bool {
        let Ok(sample) = outcome else {
            return false;
        };
        self.buffers
            .entry(symbol.clone())
            .or_insert_with(|| HistoryBuffer::new(self.capacity))
            .push(*sample);
        true
    }

    /// Seed a symbol's history with older samples, oldest first
    pub fn seed(&mut self, symbol: &Symbol, samples: &[PriceSample]) -> usize {
        if samples.is_empty() {
            return 0;
        }
        let buffer = self
            .buffers
            .entry(symbol.clone())
            .or_insert_with(|| HistoryBuffer::new(self.capacity));
        for sample in samples {
            buffer.push(*sample);
        }
        buffer.len()
    }

    pub fn get(&self, symbol: &Symbol) -> &HistoryBuffer {
        self.buffers.get(symbol).unwrap_or(&self.empty)
    }

    pub fn latest(&self, symbol: &Symbol) -> Option<PriceSample> {
        self.get(symbol).latest()
    }

    pub fn previous(&self, symbol: &Symbol) -> Option<PriceSample> {
        self.get(symbol).previous()
    }

    pub fn window(&self, symbol: &Symbol, n: usize) -> Vec<PriceSample> {
        self.get(symbol).window(n)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.buffers.keys()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
