/// AQI formula engine.
///
/// Converts pollutant concentrations into EPA Air Quality Index values and
/// maps index values onto the six severity tiers.
///
/// Submodules:
/// - `breakpoints` — piecewise-linear breakpoint tables and the interpolator.
/// - `category` — severity tiers, labels and health recommendations.
/// - `calculator` — AQI and sub-indices for hand-entered concentrations.

pub mod breakpoints;
pub mod calculator;
pub mod category;

pub use breakpoints::{aqi_from_pm25, pollutant_sub_indices, Breakpoint, BreakpointTable, SubIndex};
pub use calculator::{calculate, Calculation};
pub use category::{category_of, health_recommendation, Category};
