//! Session domain - basket-level performance since the session started

mod session_state;
mod profit_simulator;

pub use session_state::{SessionPerformance, SessionState, SymbolPerformance};
pub use profit_simulator::{ProfitProjection, ProfitSimulator};

use serde::{Deserialize, Serialize};

/// Linear map from session performance to the displayed trust index:
/// `clamp(neutral + session_perf * gain, lower, upper)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustIndexConfig {
    pub neutral: f64,
    pub gain: f64,
    pub lower: f64,
    pub upper: f64,
}

impl Default for TrustIndexConfig {
    fn default() -> Self {
        Self {
            neutral: 50.0,
            gain: 10.0,
            lower: 0.0,
            upper: 100.0,
        }
    }
}

impl TrustIndexConfig {
    pub fn index(&self, session_perf: f64) -> f64 {
        if self.lower.is_nan() || self.upper.is_nan() {
            return self.neutral;
        }
        let perf = if session_perf.is_finite() { session_perf } else { 0.0 };
        let lower = self.lower.min(self.upper);
        let upper = self.upper.max(self.lower);
        (self.neutral + perf * self.gain).clamp(lower, upper)
    }
}
