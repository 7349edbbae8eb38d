/// Descriptive statistics and the significance tests used by the comparator.
///
/// Every number that leaves this crate passes through [`finite_or_zero`]
/// first, so NaN and ±infinity never reach a consumer.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};
use statrs::statistics::Statistics;

use crate::aqi::{category_of, Category};

/// Significance level for every test reported by the service.
pub const ALPHA: f64 = 0.05;

// ---------------------------------------------------------------------------
// Normalization helpers
// ---------------------------------------------------------------------------

/// Returns `value` if finite, otherwise `default`.
pub fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() { value } else { default }
}

/// Returns `value` if finite, otherwise 0.0.
pub fn finite_or_zero(value: f64) -> f64 {
    finite_or(value, 0.0)
}

/// Rounds to `places` decimal places after normalizing non-finite input.
///
/// Values too large to scale are already integral and pass through.
pub fn round_to(value: f64, places: i32) -> f64 {
    let value = finite_or_zero(value);
    let factor = 10f64.powi(places);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// Arithmetic mean. 0.0 for an empty series.
pub fn mean(values: &[f64]) -> f64 {
    finite_or_zero(values.iter().mean())
}

/// Median; the average of the two middle elements for even lengths.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    let m = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    finite_or_zero(m)
}

/// Sample variance (n - 1 denominator). 0.0 for fewer than two values.
pub fn sample_variance(values: &[f64]) -> f64 {
    finite_or_zero(values.iter().variance())
}

/// Sample standard deviation. 0.0 for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

/// Summary statistics over a numeric series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl Stats {
    /// All fields are 0.0 for an empty series.
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Stats {
                count: 0,
                mean: 0.0,
                median: 0.0,
                std_dev: 0.0,
                min: 0.0,
                max: 0.0,
            };
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Stats {
            count: values.len(),
            mean: mean(values),
            median: median(values),
            std_dev: std_dev(values),
            min: finite_or_zero(min),
            max: finite_or_zero(max),
        }
    }

    /// Copy with every float rounded to `places` decimals.
    pub fn rounded(&self, places: i32) -> Self {
        Stats {
            count: self.count,
            mean: round_to(self.mean, places),
            median: round_to(self.median, places),
            std_dev: round_to(self.std_dev, places),
            min: round_to(self.min, places),
            max: round_to(self.max, places),
        }
    }
}

// ---------------------------------------------------------------------------
// Trend and category distribution
// ---------------------------------------------------------------------------

/// Direction of AQI over a series. Lower AQI is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Worsening,
    Stable,
}

impl Trend {
    /// Compares the mean of the last values against the first ones.
    ///
    /// Each window holds up to five values and never more than half the
    /// series, so head and tail do not overlap.
    pub fn from_values(values: &[f64]) -> Self {
        let window = (values.len() / 2).min(5);
        if window == 0 {
            return Trend::Stable;
        }
        let head = mean(&values[..window]);
        let tail = mean(&values[values.len() - window..]);
        if tail < head {
            Trend::Improving
        } else if tail > head {
            Trend::Worsening
        } else {
            Trend::Stable
        }
    }
}

/// Count of values per category, in tier order, omitting empty tiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub label: &'static str,
    pub count: usize,
}

pub fn category_distribution(categories: impl IntoIterator<Item = Category>) -> Vec<CategoryCount> {
    let mut counts = [0usize; 6];
    for category in categories {
        counts[category.tier() as usize] += 1;
    }
    Category::ALL
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(category, count)| CategoryCount {
            category: *category,
            label: category.label(),
            count,
        })
        .collect()
}

/// Category distribution of raw AQI values.
pub fn aqi_category_distribution(values: &[f64]) -> Vec<CategoryCount> {
    category_distribution(values.iter().map(|v| category_of(*v)))
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation over the first `min(a.len(), b.len())` pairs.
///
/// Returns 0.0 when fewer than two pairs overlap or either side is constant.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }
    let (a, b) = (&a[..n], &b[..n]);
    let cov = a.iter().covariance(b.iter());
    finite_or_zero(cov / (std_dev(a) * std_dev(b)))
}

// ---------------------------------------------------------------------------
// Significance tests
// ---------------------------------------------------------------------------

/// Result of a significance test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestOutcome {
    pub statistic: f64,
    pub p_value: f64,
    pub significant: bool,
}

impl TestOutcome {
    /// NaN statistic becomes 0.0 and NaN p-value becomes 1.0.
    fn new(statistic: f64, p_value: f64) -> Self {
        let statistic = finite_or_zero(statistic);
        let p_value = finite_or(p_value, 1.0).clamp(0.0, 1.0);
        TestOutcome {
            statistic,
            p_value,
            significant: p_value < ALPHA,
        }
    }
}

/// Two-sample Student's t-test with pooled variance, two-sided.
///
/// Returns `None` if either sample has fewer than two values.
pub fn t_test(a: &[f64], b: &[f64]) -> Option<TestOutcome> {
    if a.len() < 2 || b.len() < 2 {
        return None;
    }
    let (na, nb) = (a.len() as f64, b.len() as f64);
    let df = na + nb - 2.0;
    let pooled = ((na - 1.0) * sample_variance(a) + (nb - 1.0) * sample_variance(b)) / df;
    let se = (pooled * (1.0 / na + 1.0 / nb)).sqrt();
    let diff = mean(a) - mean(b);

    let t = if se > 0.0 {
        diff / se
    } else if diff == 0.0 {
        f64::NAN
    } else {
        // Zero within-group spread with distinct means.
        return Some(TestOutcome::new(diff.signum() * f64::MAX, 0.0));
    };
    let p = student_t_two_sided_p(t, df);
    Some(TestOutcome::new(t, p))
}

/// One-way ANOVA across all groups.
///
/// Returns `None` for fewer than two groups or any group with fewer than two
/// values.
pub fn anova(groups: &[&[f64]]) -> Option<TestOutcome> {
    if groups.len() < 2 || groups.iter().any(|g| g.len() < 2) {
        return None;
    }
    let k = groups.len() as f64;
    let n: f64 = groups.iter().map(|g| g.len() as f64).sum();
    let grand = groups.iter().flat_map(|g| g.iter()).sum::<f64>() / n;

    let ss_between: f64 = groups
        .iter()
        .map(|g| g.len() as f64 * (mean(g) - grand).powi(2))
        .sum();
    let ss_within: f64 = groups
        .iter()
        .map(|g| {
            let m = mean(g);
            g.iter().map(|v| (v - m).powi(2)).sum::<f64>()
        })
        .sum();

    let df_between = k - 1.0;
    let df_within = n - k;
    let ms_within = ss_within / df_within;
    if ms_within == 0.0 {
        if ss_between == 0.0 {
            return Some(TestOutcome::new(f64::NAN, f64::NAN));
        }
        return Some(TestOutcome::new(f64::MAX, 0.0));
    }
    let f = (ss_between / df_between) / ms_within;
    let p = f_upper_tail_p(f, df_between, df_within);
    Some(TestOutcome::new(f, p))
}

/// Two-sided p-value of Student's t distribution.
fn student_t_two_sided_p(t: f64, df: f64) -> f64 {
    if t.is_nan() {
        return f64::NAN;
    }
    StudentsT::new(0.0, 1.0, df).map_or(f64::NAN, |dist| 2.0 * dist.cdf(-t.abs()))
}

/// Upper-tail p-value of the F distribution.
fn f_upper_tail_p(f: f64, d1: f64, d2: f64) -> f64 {
    if f <= 0.0 {
        return 1.0;
    }
    FisherSnedecor::new(d1, d2).map_or(f64::NAN, |dist| 1.0 - dist.cdf(f))
}
