//! Seasonal components and the rules that switch them on

use crate::config::{ProphetConfig, SeasonalityToggle};
use crate::error::Result;
use chrono::{Duration, NaiveDateTime};
use forecast_math::fourier;

/// One periodic component modelled by a Fourier series
#[derive(Debug, Clone, PartialEq)]
pub struct Seasonality {
    pub name: String,
    /// Period in days
    pub period: f64,
    pub fourier_order: usize,
}

impl Seasonality {
    pub fn new(name: impl Into<String>, period: f64, fourier_order: usize) -> Self {
        Self {
            name: name.into(),
            period,
            fourier_order,
        }
    }

    /// Number of coefficients this component adds to the design matrix
    pub fn width(&self) -> usize {
        2 * self.fourier_order
    }

    /// Feature columns at the given dates
    pub fn features(&self, dates: &[NaiveDateTime]) -> Result<Vec<Vec<f64>>> {
        Ok(fourier::fourier_series(
            &days_since_epoch(dates),
            self.period,
            self.fourier_order,
        )?)
    }

    /// Component values at the given dates, on the scale of the coefficients
    pub fn evaluate(&self, dates: &[NaiveDateTime], coefficients: &[f64]) -> Result<Vec<f64>> {
        Ok(fourier::evaluate_series(
            &days_since_epoch(dates),
            self.period,
            coefficients,
        )?)
    }
}

/// Fractional days since 1970-01-01, the time axis of every seasonality
pub fn days_since_epoch(dates: &[NaiveDateTime]) -> Vec<f64> {
    dates
        .iter()
        .map(|d| d.and_utc().timestamp_millis() as f64 / 86_400_000.0)
        .collect()
}

struct BuiltIn {
    name: &'static str,
    period: f64,
    default_order: usize,
}

const YEARLY: BuiltIn = BuiltIn {
    name: "yearly",
    period: 365.25,
    default_order: 10,
};
const WEEKLY: BuiltIn = BuiltIn {
    name: "weekly",
    period: 7.0,
    default_order: 3,
};
const DAILY: BuiltIn = BuiltIn {
    name: "daily",
    period: 1.0,
    default_order: 4,
};

/// Decide which seasonalities to fit for a sorted history.
///
/// Automatic rules:
/// - yearly needs at least two years of history
/// - weekly needs two weeks of history and sub-weekly spacing
/// - daily needs two days of history and sub-daily spacing
pub fn resolve_seasonalities(config: &ProphetConfig, sorted_dates: &[NaiveDateTime]) -> Vec<Seasonality> {
    let span = match (sorted_dates.first(), sorted_dates.last()) {
        (Some(first), Some(last)) => *last - *first,
        _ => Duration::zero(),
    };
    let min_gap = sorted_dates
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|gap| *gap > Duration::zero())
        .min();

    let auto_rules = [
        (&YEARLY, config.yearly_seasonality, span >= Duration::days(730)),
        (
            &WEEKLY,
            config.weekly_seasonality,
            span >= Duration::weeks(2) && min_gap.map_or(false, |g| g < Duration::weeks(1)),
        ),
        (
            &DAILY,
            config.daily_seasonality,
            span >= Duration::days(2) && min_gap.map_or(false, |g| g < Duration::days(1)),
        ),
    ];

    let mut active = Vec::new();
    for (builtin, toggle, auto_enabled) in auto_rules {
        let order = match toggle {
            SeasonalityToggle::Auto if auto_enabled => Some(builtin.default_order),
            SeasonalityToggle::Auto => {
                log::info!(
                    "Disabling {name} seasonality. Set {name}_seasonality to \"on\" to override this.",
                    name = builtin.name
                );
                None
            }
            SeasonalityToggle::On => Some(builtin.default_order),
            SeasonalityToggle::Off => None,
            SeasonalityToggle::Fourier(order) => Some(order),
        };

        if let Some(order) = order {
            active.push(Seasonality::new(builtin.name, builtin.period, order));
        }
    }

    for custom in &config.extra_seasonalities {
        if let Some(existing) = active.iter_mut().find(|s| s.name == custom.name) {
            log::info!("Replacing {} seasonality with custom settings", custom.name);
            *existing = Seasonality::new(custom.name.clone(), custom.period, custom.fourier_order);
        } else {
            active.push(Seasonality::new(
                custom.name.clone(),
                custom.period,
                custom.fourier_order,
            ));
        }
    }

    active
}
