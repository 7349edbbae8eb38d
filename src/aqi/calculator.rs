/// Calculator view: AQI for hand-entered concentrations.

use serde::Serialize;

use super::breakpoints::{pollutant_sub_indices, SubIndex};
use super::category::{category_of, Category};
use crate::analysis::stats::round_to;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calculation {
    /// Always the PM2.5 sub-index, matching the stored AQI.
    pub aqi: f64,
    pub category: Category,
    pub primary_pollutant: &'static str,
    pub sub_indices: Vec<SubIndex>,
    pub health_message: &'static str,
}

pub fn calculate(pm25: f64, pm10: f64) -> Calculation {
    let sub_indices: Vec<SubIndex> = pollutant_sub_indices(pm25, pm10)
        .into_iter()
        .map(|s| SubIndex {
            index: round_to(s.index, 2),
            ..s
        })
        .collect();
    let primary = &sub_indices[0];
    let category = category_of(primary.index);
    Calculation {
        aqi: primary.index,
        category,
        primary_pollutant: primary.pollutant,
        health_message: category.health_message(),
        sub_indices,
    }
}
