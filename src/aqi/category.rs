/// AQI severity tiers.
///
/// Thresholds are inclusive on the upper bound: an index of exactly 50 is
/// `Good`, 50.01 is `Moderate`.

use serde::{Deserialize, Serialize};

/// AQI severity tiers, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Good,
        Category::Moderate,
        Category::UnhealthyForSensitiveGroups,
        Category::Unhealthy,
        Category::VeryUnhealthy,
        Category::Hazardous,
    ];

    /// Human-readable label. This is the form stored in `AqiRecord::category`.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Good => "Good",
            Category::Moderate => "Moderate",
            Category::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Category::Unhealthy => "Unhealthy",
            Category::VeryUnhealthy => "Very Unhealthy",
            Category::Hazardous => "Hazardous",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Category::Good => "😊",
            Category::Moderate => "😐",
            Category::UnhealthyForSensitiveGroups => "⚠️",
            Category::Unhealthy => "😷",
            Category::VeryUnhealthy => "🚨",
            Category::Hazardous => "☠️",
        }
    }

    /// Severity tier, 0 (Good) through 5 (Hazardous).
    pub fn tier(&self) -> u8 {
        *self as u8
    }

    /// Display class used by the dashboard cards.
    pub fn severity_class(&self) -> &'static str {
        match self {
            Category::Good => "success",
            Category::Moderate | Category::UnhealthyForSensitiveGroups => "warning",
            _ => "danger",
        }
    }

    pub fn health_message(&self) -> &'static str {
        match self {
            Category::Good => "Air quality is satisfactory, and air pollution poses little or no risk.",
            Category::Moderate => "Air quality is acceptable. However, there may be a risk for some people.",
            Category::UnhealthyForSensitiveGroups => "Members of sensitive groups may experience health effects.",
            Category::Unhealthy => "Some members of the general public may experience health effects.",
            Category::VeryUnhealthy => "Health alert: The risk of health effects is increased for everyone.",
            Category::Hazardous => "Health warning of emergency conditions: everyone is more likely to be affected.",
        }
    }

    /// Parses a stored label. Accepts the plain label with or without a
    /// trailing emoji.
    pub fn from_label(label: &str) -> Option<Category> {
        let trimmed = label.trim();
        // Longest labels first so "Unhealthy" doesn't shadow the longer ones.
        let mut by_length = Category::ALL;
        by_length.sort_by_key(|c| std::cmp::Reverse(c.label().len()));
        by_length.into_iter().find(|c| {
            trimmed == c.label()
                || trimmed
                    .strip_prefix(c.label())
                    .is_some_and(|rest| rest.starts_with(' '))
        })
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Maps an index value onto its tier. NaN is treated as 0.
pub fn category_of(index: f64) -> Category {
    let index = if index.is_nan() { 0.0 } else { index };
    if index <= 50.0 {
        Category::Good
    } else if index <= 100.0 {
        Category::Moderate
    } else if index <= 150.0 {
        Category::UnhealthyForSensitiveGroups
    } else if index <= 200.0 {
        Category::Unhealthy
    } else if index <= 300.0 {
        Category::VeryUnhealthy
    } else {
        Category::Hazardous
    }
}

/// Advice shown next to the current AQI.
pub fn health_recommendation(index: f64) -> &'static str {
    match category_of(index) {
        Category::Good => "✅ Air quality is excellent! Perfect for outdoor activities and exercise.",
        Category::Moderate => {
            "😐 Air quality is acceptable. Unusually sensitive people should consider reducing prolonged outdoor exertion."
        }
        Category::UnhealthyForSensitiveGroups => {
            "⚠️ Unhealthy for sensitive groups. People with respiratory conditions should limit outdoor activity."
        }
        Category::Unhealthy => "😷 Unhealthy air! Everyone may experience health effects. Limit outdoor activities.",
        Category::VeryUnhealthy => {
            "🚨 Very Unhealthy! Health alert. Everyone should avoid prolonged outdoor exertion."
        }
        Category::Hazardous => {
            "☠️ HAZARDOUS ALERT! Stay indoors. Avoid all outdoor activities. Use air purifiers indoors."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_belong_to_lower_tier() {
        assert_eq!(category_of(50.0), Category::Good);
        assert_eq!(category_of(50.01), Category::Moderate);
        assert_eq!(category_of(100.0), Category::Moderate);
        assert_eq!(category_of(150.0), Category::UnhealthyForSensitiveGroups);
        assert_eq!(category_of(200.0), Category::Unhealthy);
        assert_eq!(category_of(300.0), Category::VeryUnhealthy);
        assert_eq!(category_of(300.01), Category::Hazardous);
        assert_eq!(category_of(500.0), Category::Hazardous);
    }

    #[test]
    fn test_labels_match_expected_text() {
        assert_eq!(category_of(50.0).label(), "Good");
        assert_eq!(category_of(50.01).label(), "Moderate");
        assert_eq!(category_of(500.0).label(), "Hazardous");
    }

    #[test]
    fn test_nan_and_negative_are_good() {
        assert_eq!(category_of(f64::NAN), Category::Good);
        assert_eq!(category_of(-3.0), Category::Good);
        assert_eq!(category_of(f64::INFINITY), Category::Hazardous);
    }

    #[test]
    fn test_tiers_are_ordered() {
        for pair in Category::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].tier() + 1, pair[1].tier());
        }
    }

    #[test]
    fn test_from_label_round_trips_every_tier() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.label()), Some(category));
            let decorated = format!("{} {}", category.label(), category.emoji());
            assert_eq!(Category::from_label(&decorated), Some(category));
        }
        assert_eq!(Category::from_label("Smoky"), None);
    }

    #[test]
    fn test_severity_classes() {
        assert_eq!(Category::Good.severity_class(), "success");
        assert_eq!(Category::UnhealthyForSensitiveGroups.severity_class(), "warning");
        assert_eq!(Category::Hazardous.severity_class(), "danger");
    }

    #[test]
    fn test_recommendation_follows_category() {
        assert!(health_recommendation(20.0).contains("excellent"));
        assert!(health_recommendation(450.0).contains("HAZARDOUS"));
    }
}
