// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome tallies for flood simulations.

use axum::http::StatusCode;
use std::collections::HashMap;

/// Possible outcomes for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Accepted,
    RateLimited,
    Rejected,
    Failed,
}

impl From<StatusCode> for Outcome {
    fn from(status: StatusCode) -> Self {
        match status {
            StatusCode::OK => Self::Accepted,
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            s if s.is_client_error() => Self::Rejected,
            _ => Self::Failed,
        }
    }
}

/// Counts outcomes overall and per client.
#[derive(Debug, Default)]
pub struct FloodMetrics {
    outcomes: HashMap<Outcome, usize>,
    accepted_per_client: HashMap<String, usize>,
}

impl FloodMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request outcome.
    pub fn record(&mut self, client: &str, status: StatusCode) {
        let outcome = Outcome::from(status);
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        if outcome == Outcome::Accepted {
            *self
                .accepted_per_client
                .entry(client.to_string())
                .or_insert(0) += 1;
        }
    }

    /// Get count for a specific outcome.
    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Get total request count.
    pub fn total_requests(&self) -> usize {
        self.outcomes.values().sum()
    }

    /// Highest number of accepted requests for any one client.
    pub fn max_accepted_per_client(&self) -> usize {
        self.accepted_per_client.values().copied().max().unwrap_or(0)
    }

    pub fn clients_served(&self) -> usize {
        self.accepted_per_client.len()
    }
}

impl std::fmt::Display for FloodMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Flood Report ===")?;
        writeln!(f, "Total Requests:    {}", self.total_requests())?;
        writeln!(f, "Accepted:          {}", self.count(Outcome::Accepted))?;
        writeln!(f, "Rate Limited:      {}", self.count(Outcome::RateLimited))?;
        writeln!(f, "Rejected:          {}", self.count(Outcome::Rejected))?;
        writeln!(f, "Failed:            {}", self.count(Outcome::Failed))?;
        writeln!(f, "Clients Served:    {}", self.clients_served())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collection() {
        let mut metrics = FloodMetrics::new();
        metrics.record("10.0.0.1", StatusCode::OK);
        metrics.record("10.0.0.1", StatusCode::OK);
        metrics.record("10.0.0.1", StatusCode::TOO_MANY_REQUESTS);
        metrics.record("10.0.0.2", StatusCode::BAD_REQUEST);

        assert_eq!(metrics.total_requests(), 4);
        assert_eq!(metrics.count(Outcome::Accepted), 2);
        assert_eq!(metrics.count(Outcome::RateLimited), 1);
        assert_eq!(metrics.count(Outcome::Rejected), 1);
        assert_eq!(metrics.max_accepted_per_client(), 2);
        assert_eq!(metrics.clients_served(), 1);
    }
}
