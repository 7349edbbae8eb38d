/// City registry for the air-quality heatmap, plus country-code names.
///
/// Defines the fixed set of major cities shown on the snapshot map along
/// with their coordinates. This is the single source of truth for the map's
/// city list; the heatmap aggregation iterates this registry in order.

// ---------------------------------------------------------------------------
// City metadata
// ---------------------------------------------------------------------------

/// A city shown on the snapshot map.
#[derive(Debug)]
pub struct MajorCity {
    /// Display name, also the history key looked up for the city.
    pub name: &'static str,
    /// ISO 3166 alpha-2 country code.
    pub country_code: &'static str,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
}

/// Major cities of India and Pakistan, ordered as the map lists them.
pub static CITY_REGISTRY: &[MajorCity] = &[
    MajorCity { name: "Delhi", country_code: "IN", latitude: 28.7041, longitude: 77.1025 },
    MajorCity { name: "Mumbai", country_code: "IN", latitude: 19.0760, longitude: 72.8777 },
    MajorCity { name: "Bangalore", country_code: "IN", latitude: 12.9716, longitude: 77.5946 },
    MajorCity { name: "Kolkata", country_code: "IN", latitude: 22.5726, longitude: 88.3639 },
    MajorCity { name: "Chennai", country_code: "IN", latitude: 13.0827, longitude: 80.2707 },
    MajorCity { name: "Hyderabad", country_code: "IN", latitude: 17.3850, longitude: 78.4867 },
    MajorCity { name: "Pune", country_code: "IN", latitude: 18.5204, longitude: 73.8567 },
    MajorCity { name: "Ahmedabad", country_code: "IN", latitude: 23.0225, longitude: 72.5714 },
    MajorCity { name: "Jaipur", country_code: "IN", latitude: 26.9124, longitude: 75.7873 },
    MajorCity { name: "Lucknow", country_code: "IN", latitude: 26.8467, longitude: 80.9462 },
    MajorCity { name: "Karachi", country_code: "PK", latitude: 24.8607, longitude: 67.0011 },
    MajorCity { name: "Lahore", country_code: "PK", latitude: 31.5204, longitude: 74.3587 },
    MajorCity { name: "Islamabad", country_code: "PK", latitude: 33.6844, longitude: 73.0479 },
];

/// Look up a registry city by exact name.
pub fn find_city(name: &str) -> Option<&'static MajorCity> {
    CITY_REGISTRY.iter().find(|c| c.name == name)
}

// ---------------------------------------------------------------------------
// Country names
// ---------------------------------------------------------------------------

static COUNTRY_NAMES: &[(&str, &str)] = &[
    ("PK", "Pakistan"), ("IN", "India"), ("US", "United States"), ("GB", "United Kingdom"),
    ("CN", "China"), ("JP", "Japan"), ("DE", "Germany"), ("FR", "France"), ("IT", "Italy"),
    ("ES", "Spain"), ("CA", "Canada"), ("AU", "Australia"), ("BR", "Brazil"), ("RU", "Russia"),
    ("MX", "Mexico"), ("KR", "South Korea"), ("ID", "Indonesia"), ("TR", "Turkey"),
    ("SA", "Saudi Arabia"), ("AR", "Argentina"), ("PL", "Poland"), ("NL", "Netherlands"),
    ("BE", "Belgium"), ("SE", "Sweden"), ("CH", "Switzerland"), ("AT", "Austria"),
    ("NO", "Norway"), ("DK", "Denmark"), ("FI", "Finland"), ("IE", "Ireland"),
    ("PT", "Portugal"), ("GR", "Greece"), ("CZ", "Czech Republic"), ("RO", "Romania"),
    ("NZ", "New Zealand"), ("SG", "Singapore"), ("MY", "Malaysia"), ("TH", "Thailand"),
    ("PH", "Philippines"), ("VN", "Vietnam"), ("BD", "Bangladesh"), ("LK", "Sri Lanka"),
    ("NP", "Nepal"), ("AF", "Afghanistan"), ("AE", "United Arab Emirates"), ("EG", "Egypt"),
    ("ZA", "South Africa"), ("NG", "Nigeria"), ("KE", "Kenya"),
];

/// Full country name for an ISO alpha-2 code; unknown codes come back as-is.
pub fn country_name(code: &str) -> String {
    COUNTRY_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| code.to_string())
}
