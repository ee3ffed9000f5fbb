//! CSP solver configuration.

/// Configuration for the backtracking solver.
///
/// # Examples
///
/// ```
/// use appt_solver::csp::CspConfig;
///
/// let config = CspConfig::default().with_max_backtracks(50_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CspConfig {
    /// Global cap on backtracking attempts.
    ///
    /// Bounds the worst-case exponential search on pathological inputs.
    /// When the cap is reached the partial assignment found so far is kept
    /// and the remaining appointments are left unassigned.
    pub max_backtracks: usize,
}

impl Default for CspConfig {
    fn default() -> Self {
        Self {
            max_backtracks: 10_000,
        }
    }
}

impl CspConfig {
    /// Sets the backtrack cap.
    pub fn with_max_backtracks(mut self, n: usize) -> Self {
        self.max_backtracks = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_backtracks == 0 {
            return Err("max_backtracks must be at least 1".into());
        }
        Ok(())
    }
}
