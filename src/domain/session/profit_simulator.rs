//! "What if I had invested at session start" projection

use serde::{Deserialize, Serialize};

use crate::shared::errors::MetricsError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfitProjection {
    pub principal: f64,
    pub session_perf: f64,
    pub final_value: f64,
    pub gain: f64,
}

/// Applies the session performance to a principal
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfitSimulator;

impl ProfitSimulator {
    pub fn project(&self, principal: f64, session_perf: f64) -> Result<ProfitProjection, MetricsError> {
        if !principal.is_finite() || principal <= 0.0 {
            return Err(MetricsError::InvalidPrincipal(principal));
        }
        let session_perf = if session_perf.is_finite() { session_perf } else { 0.0 };
        let gain = principal * session_perf / 100.0;
        Ok(ProfitProjection {
            principal,
            session_perf,
            final_value: principal + gain,
            gain,
        })
    }
}
