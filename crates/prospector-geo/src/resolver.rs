//! Region → locality record.

use prospector_core::LocalityRecord;
use tracing::{debug, warn};

use crate::localities::{self, KnownLocality};

const UNKNOWN_REGION: &str = "Unknown";

/// Stateless geographic resolver.
pub struct GeoResolver;

impl GeoResolver {
    /// Resolve a region name. Never fails.
    pub fn resolve(region: &str) -> LocalityRecord {
        let region = region.trim();
        if region.is_empty() {
            warn!("Empty region, using placeholder locality");
            return Self::unknown();
        }

        match localities::find(region) {
            Some(known) => {
                debug!("Resolved known locality: {}", known.key);
                Self::from_known(region, known)
            }
            None => Self::synthetic(region),
        }
    }

    fn from_known(region: &str, known: &KnownLocality) -> LocalityRecord {
        LocalityRecord {
            primary_city: region.to_string(),
            neighborhoods: to_owned(known.neighborhoods),
            metro_areas: to_owned(known.metro_areas),
            local_names: to_owned(known.local_names),
            country_code: known.country_code.to_string(),
            languages: to_owned(known.languages),
            business_tlds: to_owned(known.business_tlds),
        }
    }

    /// Generic record for regions outside the table.
    fn synthetic(region: &str) -> LocalityRecord {
        LocalityRecord {
            primary_city: region.to_string(),
            neighborhoods: Vec::new(),
            metro_areas: vec![region.to_string(), format!("Greater {}", region)],
            local_names: vec![region.to_string()],
            country_code: "US".into(),
            languages: vec!["en".into()],
            business_tlds: vec![".com".into(), ".org".into(), ".net".into()],
        }
    }

    /// Last-resort record when the region itself is unusable.
    fn unknown() -> LocalityRecord {
        LocalityRecord {
            primary_city: UNKNOWN_REGION.into(),
            neighborhoods: Vec::new(),
            metro_areas: vec![UNKNOWN_REGION.into()],
            local_names: vec![UNKNOWN_REGION.into()],
            country_code: "US".into(),
            languages: vec!["en".into()],
            business_tlds: vec![".com".into()],
        }
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
