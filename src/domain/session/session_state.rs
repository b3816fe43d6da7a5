//! Session state: basket membership and first-observed prices

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::price::HistoryStore;
use crate::shared::types::Symbol;
use crate::shared::utils::{calculate_percentage_change, mean};

/// Performance of one basket member since its initial price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolPerformance {
    pub symbol: Symbol,
    pub initial_price: f64,
    pub current_price: f64,
    pub pct_change: f64,
}

/// Mean percent change over basket members with both prices known
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionPerformance {
    pub mean_pct: f64,
    pub members: Vec<SymbolPerformance>,
    pub basket_size: usize,
}

impl SessionPerformance {
    pub fn contributing(&self) -> usize {
        self.members.len()
    }
}

/// Process-lifetime session context.
///
/// Each basket member's initial price is recorded once, from the first
/// successful fetch, and never changes afterwards.
#[derive(Debug, Clone)]
pub struct SessionState {
    id: Uuid,
    started_at: DateTime<Utc>,
    basket: Vec<Symbol>,
    initial_prices: HashMap<Symbol, f64>,
}

impl SessionState {
    pub fn new(basket: Vec<Symbol>) -> Self {
        let mut unique = Vec::with_capacity(basket.len());
        for symbol in basket {
            if !unique.contains(&symbol) {
                unique.push(symbol);
            }
        }
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            basket: unique,
            initial_prices: HashMap::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn basket(&self) -> &[Symbol] {
        &self.basket
    }

    pub fn in_basket(&self, symbol: &Symbol) -> bool {
        self.basket.contains(symbol)
    }

    /// Record the initial price for a basket member. Returns `true` only the first time.
    pub fn record_initial_price(&mut self, symbol: &Symbol, price: f64) -> bool {
        if !self.in_basket(symbol) || !price.is_finite() || price <= 0.0 {
            return false;
        }
        if self.initial_prices.contains_key(symbol) {
            return false;
        }
        self.initial_prices.insert(symbol.clone(), price);
        true
    }

    pub fn initial_price(&self, symbol: &Symbol) -> Option<f64> {
        self.initial_prices.get(symbol).copied()
    }

    /// Basket performance given a lookup of current prices
    pub fn performance<F>(&self, current_price: F) -> SessionPerformance
    where
        F: Fn(&Symbol) -> Option<f64>,
    {
        let members: Vec<SymbolPerformance> = self
            .basket
            .iter()
            .filter_map(|symbol| {
                let initial = self.initial_price(symbol).filter(|p| *p > 0.0)?;
                let current = current_price(symbol).filter(|p| p.is_finite() && *p > 0.0)?;
                Some(SymbolPerformance {
                    symbol: symbol.clone(),
                    initial_price: initial,
                    current_price: current,
                    pct_change: calculate_percentage_change(initial, current),
                })
            })
            .collect();

        let pct: Vec<f64> = members.iter().map(|m| m.pct_change).collect();
        SessionPerformance {
            mean_pct: mean(&pct).unwrap_or(0.0),
            members,
            basket_size: self.basket.len(),
        }
    }

    /// Basket performance using each symbol's latest buffered sample
    pub fn performance_from_history(&self, history: &HistoryStore) -> SessionPerformance {
        self.performance(|symbol| history.latest(symbol).map(|s| s.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basket(symbols: &[&str]) -> Vec<Symbol> {
        symbols.iter().map(|s| Symbol::from(*s)).collect()
    }

    #[test]
    fn test_initial_price_recorded_once() {
        let mut state = SessionState::new(basket(&["A"]));
        let a = Symbol::from("A");
        assert!(state.record_initial_price(&a, 100.0));
        assert!(!state.record_initial_price(&a, 200.0));
        assert_eq!(state.initial_price(&a), Some(100.0));
    }

    #[test]
    fn test_initial_price_rejects_invalid() {
        let mut state = SessionState::new(basket(&["A"]));
        let a = Symbol::from("A");
        assert!(!state.record_initial_price(&a, 0.0));
        assert!(!state.record_initial_price(&a, -1.0));
        assert!(!state.record_initial_price(&Symbol::from("OTHER"), 10.0));
        assert_eq!(state.initial_price(&a), None);
    }

    #[test]
    fn test_mixed_basket_cancels_out() {
        let mut state = SessionState::new(basket(&["A", "B"]));
        state.record_initial_price(&Symbol::from("A"), 100.0);
        state.record_initial_price(&Symbol::from("B"), 50.0);
        let current: HashMap<Symbol, f64> =
            [(Symbol::from("A"), 110.0), (Symbol::from("B"), 45.0)].into_iter().collect();
        let perf = state.performance(|s| current.get(s).copied());
        assert_eq!(perf.contributing(), 2);
        assert!(perf.mean_pct.abs() < 1e-12);
    }

    #[test]
    fn test_partial_data_averages_valid_members_only() {
        let mut state = SessionState::new(basket(&["A", "B", "C", "D", "E"]));
        state.record_initial_price(&Symbol::from("A"), 100.0);
        state.record_initial_price(&Symbol::from("B"), 100.0);
        state.record_initial_price(&Symbol::from("C"), 100.0);
        state.record_initial_price(&Symbol::from("D"), 100.0);
        let current: HashMap<Symbol, f64> = [
            (Symbol::from("A"), 103.0),
            (Symbol::from("B"), 106.0),
            (Symbol::from("C"), 100.0),
            (Symbol::from("E"), 500.0),
        ]
        .into_iter()
        .collect();
        let perf = state.performance(|s| current.get(s).copied());
        assert_eq!(perf.contributing(), 3);
        assert_eq!(perf.basket_size, 5);
        assert!((perf.mean_pct - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_valid_members_is_zero() {
        let state = SessionState::new(basket(&["A", "B", "C", "D", "E"]));
        let perf = state.performance(|_| Some(100.0));
        assert_eq!(perf.mean_pct, 0.0);
        assert_eq!(perf.contributing(), 0);
    }

    #[test]
    fn test_duplicate_basket_members_collapse() {
        let state = SessionState::new(basket(&["A", "a", "B"]));
        assert_eq!(state.basket().len(), 2);
    }
}
