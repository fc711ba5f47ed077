//! Static locality table.

/// A locality with hand-curated sub-areas and TLD conventions.
#[derive(Debug)]
pub struct KnownLocality {
    /// Lower-cased lookup key.
    pub key: &'static str,
    pub neighborhoods: &'static [&'static str],
    pub metro_areas: &'static [&'static str],
    pub local_names: &'static [&'static str],
    pub country_code: &'static str,
    pub languages: &'static [&'static str],
    pub business_tlds: &'static [&'static str],
}

pub const KNOWN_LOCALITIES: &[KnownLocality] = &[
    KnownLocality {
        key: "san francisco",
        neighborhoods: &[
            "SOMA",
            "Mission",
            "Financial District",
            "Castro",
            "Mission Bay",
            "Potrero Hill",
        ],
        metro_areas: &["Bay Area", "Silicon Valley", "Peninsula", "East Bay"],
        local_names: &["SF", "San Fran", "The City", "San Francisco"],
        country_code: "US",
        languages: &["en"],
        business_tlds: &[".com", ".org", ".net"],
    },
    KnownLocality {
        key: "new york",
        neighborhoods: &["Manhattan", "Brooklyn", "Queens", "Bronx", "Staten Island"],
        metro_areas: &["NYC Metro", "Tri-State Area", "Greater New York"],
        local_names: &["NYC", "New York City", "The Big Apple", "New York"],
        country_code: "US",
        languages: &["en"],
        business_tlds: &[".com", ".org", ".net"],
    },
    KnownLocality {
        key: "london",
        neighborhoods: &[
            "City of London",
            "Westminster",
            "Camden",
            "Shoreditch",
            "Canary Wharf",
        ],
        metro_areas: &["Greater London", "Home Counties", "Thames Valley"],
        local_names: &["London", "The City"],
        country_code: "GB",
        languages: &["en"],
        business_tlds: &[".co.uk", ".org.uk", ".com"],
    },
    KnownLocality {
        key: "berlin",
        neighborhoods: &["Mitte", "Kreuzberg", "Prenzlauer Berg", "Charlottenburg"],
        metro_areas: &["Greater Berlin", "Berlin-Brandenburg"],
        local_names: &["Berlin"],
        country_code: "DE",
        languages: &["de", "en"],
        business_tlds: &[".de", ".com", ".org"],
    },
    KnownLocality {
        key: "mumbai",
        neighborhoods: &["Bandra", "Andheri", "Lower Parel", "Powai", "Worli"],
        metro_areas: &["Mumbai Metropolitan Region", "Greater Mumbai"],
        local_names: &["Mumbai", "Bombay"],
        country_code: "IN",
        languages: &["en", "hi"],
        business_tlds: &[".in", ".co.in", ".com"],
    },
];

/// Case-insensitive exact lookup.
pub fn find(region: &str) -> Option<&'static KnownLocality> {
    let key = region.trim().to_lowercase();
    KNOWN_LOCALITIES.iter().find(|l| l.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_is_case_insensitive() {
        assert!(find("BERLIN").is_some());
        assert!(find("  new york ").is_some());
        assert!(find("New York City").is_none());
    }

    #[test]
    fn test_table_entries_have_tlds() {
        for locality in KNOWN_LOCALITIES {
            assert!(!locality.business_tlds.is_empty(), "{}", locality.key);
            assert_eq!(locality.country_code.len(), 2);
        }
    }
}
