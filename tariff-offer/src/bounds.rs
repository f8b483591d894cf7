use serde::{Deserialize, Serialize};
use tariff_shared::PricingParams;

/// Accepted margin interval `[floor, cap]` with a slack of `epsilon` on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginBounds {
    pub floor: f64,
    pub cap: Option<f64>,
    pub epsilon: f64,
}

impl MarginBounds {
    pub fn from_params(params: &PricingParams, epsilon: f64) -> Self {
        Self {
            floor: params.margin_floor(),
            cap: params.margin_cap(),
            epsilon,
        }
    }

    /// Targets the inverse solver is asked for: the floor, then the cap if set.
    pub fn targets(&self) -> impl Iterator<Item = f64> {
        std::iter::once(self.floor).chain(self.cap)
    }

    pub fn admits(&self, margin: f64) -> bool {
        if margin.is_nan() || margin < self.floor - self.epsilon {
            return false;
        }
        self.cap.map_or(true, |cap| margin <= cap + self.epsilon)
    }

    /// How far `margin` lies outside `[floor, cap]`; zero inside.
    pub fn distance(&self, margin: f64) -> f64 {
        if margin.is_nan() {
            return f64::INFINITY;
        }
        if margin < self.floor {
            return self.floor - margin;
        }
        match self.cap {
            Some(cap) if margin > cap => margin - cap,
            _ => 0.0,
        }
    }

    pub fn violation_note(&self) -> String {
        let cap = self
            .cap
            .map(|c| format!(", <= {:.0}%", c * 100.0))
            .unwrap_or_default();
        format!(
            "no candidate satisfies margin bounds (>= {:.0}%{}); returning the closest candidate",
            self.floor * 100.0,
            cap
        )
    }
}
