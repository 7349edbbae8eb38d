/// Breakpoint tables and piecewise-linear AQI interpolation.
///
/// For a concentration `c` inside segment `[c_low, c_high] -> [i_low, i_high]`:
///
/// ```text
/// index = (i_high - i_low) / (c_high - c_low) * (c - c_low) + i_low
/// ```
///
/// The tables have 0.1 µg/m³ gaps between segments (12.0 then 12.1). A value
/// falling in a gap is assigned to the next segment and interpolated from
/// that segment's lower bound, which keeps the mapping monotone. Values above
/// the last segment keep the last segment's slope instead of saturating.

use serde::Serialize;

/// One row of a breakpoint table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub c_low: f64,
    pub c_high: f64,
    pub i_low: f64,
    pub i_high: f64,
}

impl Breakpoint {
    const fn new(c_low: f64, c_high: f64, i_low: f64, i_high: f64) -> Self {
        Self { c_low, c_high, i_low, i_high }
    }

    fn interpolate(&self, c: f64) -> f64 {
        (self.i_high - self.i_low) / (self.c_high - self.c_low) * (c - self.c_low) + self.i_low
    }
}

/// A pollutant's breakpoint table, segments in ascending order.
#[derive(Debug, Clone, Copy)]
pub struct BreakpointTable {
    pub pollutant: &'static str,
    pub segments: &'static [Breakpoint],
}

impl BreakpointTable {
    /// Index value for `concentration`.
    ///
    /// Negative and NaN concentrations are clamped to 0. Concentrations above
    /// the table are extrapolated along the last segment. Never panics; an
    /// empty table yields 0.
    pub fn index_for(&self, concentration: f64) -> f64 {
        let c = if concentration.is_nan() || concentration < 0.0 {
            0.0
        } else {
            concentration
        };

        match self.segments.iter().find(|bp| c <= bp.c_high) {
            Some(bp) => bp.interpolate(c),
            None => self.segments.last().map(|bp| bp.interpolate(c)).unwrap_or(0.0),
        }
    }
}

/// EPA PM2.5 breakpoints (µg/m³, 24-hour).
pub static PM25_TABLE: BreakpointTable = BreakpointTable {
    pollutant: "PM2.5",
    segments: &[
        Breakpoint::new(0.0, 12.0, 0.0, 50.0),      // Good
        Breakpoint::new(12.1, 35.4, 51.0, 100.0),   // Moderate
        Breakpoint::new(35.5, 55.4, 101.0, 150.0),  // Unhealthy for Sensitive Groups
        Breakpoint::new(55.5, 150.4, 151.0, 200.0), // Unhealthy
        Breakpoint::new(150.5, 250.4, 201.0, 300.0), // Very Unhealthy
        Breakpoint::new(250.5, 500.4, 301.0, 500.0), // Hazardous
    ],
};

/// EPA PM10 breakpoints (µg/m³, 24-hour). Not part of the stored AQI.
pub static PM10_TABLE: BreakpointTable = BreakpointTable {
    pollutant: "PM10",
    segments: &[
        Breakpoint::new(0.0, 54.0, 0.0, 50.0),
        Breakpoint::new(55.0, 154.0, 51.0, 100.0),
        Breakpoint::new(155.0, 254.0, 101.0, 150.0),
        Breakpoint::new(255.0, 354.0, 151.0, 200.0),
        Breakpoint::new(355.0, 424.0, 201.0, 300.0),
        Breakpoint::new(425.0, 604.0, 301.0, 500.0),
    ],
};

/// AQI for a PM2.5 concentration. This is the only pollutant that feeds
/// the stored AQI.
pub fn aqi_from_pm25(concentration: f64) -> f64 {
    PM25_TABLE.index_for(concentration)
}

/// Per-pollutant sub-index, as shown by the calculator view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubIndex {
    pub pollutant: &'static str,
    pub concentration: f64,
    pub index: f64,
}

/// Sub-indices for every pollutant that has a table. The PM2.5 entry comes
/// first and is the primary pollutant.
pub fn pollutant_sub_indices(pm25: f64, pm10: f64) -> Vec<SubIndex> {
    [(&PM25_TABLE, pm25), (&PM10_TABLE, pm10)]
        .into_iter()
        .map(|(table, c)| SubIndex {
            pollutant: table.pollutant,
            concentration: c,
            index: table.index_for(c),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_zero_concentration_is_zero_index() {
        assert_eq!(aqi_from_pm25(0.0), 0.0);
    }

    #[test]
    fn test_segment_endpoints_map_to_index_endpoints() {
        assert!(close(aqi_from_pm25(12.0), 50.0));
        assert!(close(aqi_from_pm25(12.1), 51.0));
        assert!(close(aqi_from_pm25(35.4), 100.0));
        assert!(close(aqi_from_pm25(35.5), 101.0));
        assert!(close(aqi_from_pm25(55.4), 150.0));
        assert!(close(aqi_from_pm25(150.4), 200.0));
        assert!(close(aqi_from_pm25(250.4), 300.0));
        assert!(close(aqi_from_pm25(500.4), 500.0));
    }

    #[test]
    fn test_midpoint_of_good_segment() {
        assert!(close(aqi_from_pm25(6.0), 25.0));
    }

    #[test]
    fn test_above_table_extrapolates_last_slope() {
        // Last segment slope is 199 / 249.9 per µg/m³.
        let slope = 199.0 / 249.9;
        let expected = 500.0 + slope * 100.0;
        let got = aqi_from_pm25(600.4);
        assert!(close(got, expected), "expected {}, got {}", expected, got);
        assert!(got > 500.0, "values above the table must keep rising");
    }

    #[test]
    fn test_negative_and_nan_input_clamp_to_zero() {
        assert_eq!(aqi_from_pm25(-4.0), 0.0);
        assert_eq!(aqi_from_pm25(f64::NAN), 0.0);
    }

    #[test]
    fn test_index_is_monotone_across_range_including_gaps() {
        let mut previous = aqi_from_pm25(0.0);
        let mut c = 0.0;
        while c <= 700.0 {
            let index = aqi_from_pm25(c);
            assert!(
                index + 1e-9 >= previous,
                "index decreased at c={}: {} < {}",
                c,
                index,
                previous
            );
            previous = index;
            c += 0.01;
        }
    }

    #[test]
    fn test_gap_value_stays_between_neighbouring_endpoints() {
        let gap = aqi_from_pm25(12.05);
        assert!(gap > 50.0 && gap < 51.0, "12.05 should bridge 50..51, got {}", gap);
    }

    #[test]
    fn test_pm10_table_interpolates() {
        assert!(close(PM10_TABLE.index_for(54.0), 50.0));
        assert!(close(PM10_TABLE.index_for(154.0), 100.0));
    }

    #[test]
    fn test_empty_table_never_panics() {
        let empty = BreakpointTable { pollutant: "none", segments: &[] };
        assert_eq!(empty.index_for(42.0), 0.0);
    }

    #[test]
    fn test_sub_indices_lead_with_pm25() {
        let subs = pollutant_sub_indices(35.4, 54.0);
        assert_eq!(subs[0].pollutant, "PM2.5");
        assert!(close(subs[0].index, 100.0));
        assert_eq!(subs[1].pollutant, "PM10");
        assert!(close(subs[1].index, 50.0));
    }
}
