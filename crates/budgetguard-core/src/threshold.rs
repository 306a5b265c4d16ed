//! Spend ratio evaluation.

use crate::alert::AlertRecord;
use crate::error::{GuardError, Result};

/// Default ratio at which the guard fires.
pub const DEFAULT_THRESHOLD: f64 = 1.0;

/// Result of comparing spend against the configured threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub cost: f64,
    pub budget: f64,
    pub ratio: f64,
    pub threshold: f64,
}

impl Evaluation {
    /// Inclusive: a ratio equal to the threshold fires.
    pub fn fires(&self) -> bool {
        self.ratio >= self.threshold
    }
}

/// `cost / budget`, refusing non-positive budgets.
pub fn spend_ratio(cost: f64, budget: f64) -> Result<f64> {
    if budget <= 0.0 || budget.is_nan() {
        return Err(GuardError::InvalidBudget(budget));
    }
    Ok(cost / budget)
}

/// Evaluate an alert against `threshold`.
///
/// The audit record (cost, budget, ratio, display name) is logged before the
/// decision is returned so near misses are visible too.
pub fn evaluate(alert: &AlertRecord, threshold: f64) -> Result<Evaluation> {
    let ratio = match spend_ratio(alert.cost_amount, alert.budget_amount) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(
                budget = alert.budget_amount,
                display_name = %alert.display_name(),
                "invalid budget amount"
            );
            return Err(e);
        }
    };

    tracing::info!(
        cost = alert.cost_amount,
        budget = alert.budget_amount,
        ratio = %format!("{ratio:.4}"),
        display_name = %alert.display_name(),
        currency = alert.currency_code.as_deref().unwrap_or(""),
        alert_threshold = ?alert.alert_threshold_exceeded,
        interval_start = alert.cost_interval_start.as_deref().unwrap_or(""),
        "budget update"
    );

    Ok(Evaluation {
        cost: alert.cost_amount,
        budget: alert.budget_amount,
        ratio,
        threshold,
    })
}
