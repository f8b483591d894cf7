pub mod fee;
pub mod range;
pub mod solver;

pub use fee::{compute_profit_for_price, margin_ratio, FeeComponents, FeeModel};
pub use range::price_range_for_margin;
pub use solver::{bisect_for_margin, bisect_in_bracket, solve_for_target_margin, InverseSolver, MarginRoot, Regime};

use tariff_shared::PricingParams;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("{0} must be a finite number")]
    NonFinite(&'static str),
    #[error("Exchange rate must be positive, got {0}")]
    InvalidExchangeRate(f64),
    #[error("Cost must not be negative, got {0}")]
    NegativeCost(f64),
    #[error("Commission and acquiring leave nothing of the price ({0} >= 1)")]
    FeesExceedPrice(f64),
    #[error("Currency conversion fee must be below 100%, got {0}")]
    FxFeeTooHigh(f64),
    #[error("Last-mile fee is invalid: {0}")]
    InvalidLastMile(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Rejects input the fee model cannot evaluate meaningfully.
pub fn validate_params(params: &PricingParams) -> CoreResult<()> {
    let fields = [
        ("weight_g", params.weight_g),
        ("cost", params.cost),
        ("commission", params.commission),
        ("acquiring", params.acquiring),
        ("fx", params.fx),
        ("last_mile.rate", params.last_mile.rate),
        ("last_mile.min", params.last_mile.min),
        ("last_mile.max", params.last_mile.max),
        ("exchange_rate", params.exchange_rate),
    ];
    if let Some((name, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
        return Err(CoreError::NonFinite(name));
    }
    if params.exchange_rate <= 0.0 {
        return Err(CoreError::InvalidExchangeRate(params.exchange_rate));
    }
    if params.cost < 0.0 {
        return Err(CoreError::NegativeCost(params.cost));
    }
    let lm = &params.last_mile;
    if lm.rate < 0.0 || lm.min < 0.0 {
        return Err(CoreError::InvalidLastMile(format!(
            "rate and min must not be negative, got rate {} and min {}",
            lm.rate, lm.min
        )));
    }
    if lm.min > lm.max {
        return Err(CoreError::InvalidLastMile(format!(
            "min {} exceeds max {}",
            lm.min, lm.max
        )));
    }
    if params.weight_g < 0.0 {
        return Err(CoreError::ValidationError(format!(
            "weight_g must not be negative, got {}",
            params.weight_g
        )));
    }
    Ok(())
}

/// Additional conditions for the margin equation to have a price solution.
pub fn validate_solvable(params: &PricingParams) -> CoreResult<()> {
    validate_params(params)?;
    let percentage_fees = params.commission + params.acquiring;
    if 1.0 - percentage_fees <= 0.0 {
        return Err(CoreError::FeesExceedPrice(percentage_fees));
    }
    if 1.0 - params.fx <= 0.0 {
        return Err(CoreError::FxFeeTooHigh(params.fx));
    }
    Ok(())
}
