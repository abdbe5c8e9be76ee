/// Station registry for the buoy dashboard.
///
/// The canonical list of NDBC stations the service exposes, grouped by
/// region. This is the single source of truth for station ids; other modules
/// look stations up here rather than hardcoding ids.
use serde::Serialize;
use utoipa::ToSchema;

/// Metadata for a single NDBC station. Process-constant.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Station {
    /// NDBC station identifier, e.g. "41122".
    pub id: &'static str,
    /// Display name used in station pickers.
    pub name: &'static str,
    pub region: &'static str,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
}

/// A region and the stations it groups, in registry order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Region {
    pub name: &'static str,
    pub stations: Vec<Station>,
}

/// Stations ordered by region, then as listed on the dashboard.
///
/// 41004 appears under two regions; lookups by id return the first entry.
pub static STATION_REGISTRY: &[Station] = &[
    Station {
        id: "13001",
        name: "NE Extension",
        region: "Atlantic (Tropical)",
        latitude: 12.0,
        longitude: -23.0,
    },
    Station {
        id: "41040",
        name: "NE of Martinique",
        region: "Atlantic (Tropical)",
        latitude: 14.554,
        longitude: -53.045,
    },
    Station {
        id: "41049",
        name: "Bermuda",
        region: "Atlantic (West)",
        latitude: 27.490,
        longitude: -62.938,
    },
    Station {
        id: "41004",
        name: "St. Martin (island)",
        region: "Atlantic (West)",
        latitude: 32.502,
        longitude: -79.099,
    },
    Station {
        id: "41122",
        name: "Hollywood Beach",
        region: "Gulf of Mexico (East)/Florida",
        latitude: 26.001,
        longitude: -80.096,
    },
    Station {
        id: "41070",
        name: "Daytona Beach",
        region: "Gulf of Mexico (East)/Florida",
        latitude: 29.289,
        longitude: -80.802,
    },
    Station {
        id: "41114",
        name: "Fort Pierce",
        region: "Gulf of Mexico (East)/Florida",
        latitude: 27.552,
        longitude: -80.216,
    },
    Station {
        id: "41010",
        name: "Cape Canaveral",
        region: "Gulf of Mexico (East)/Florida",
        latitude: 28.878,
        longitude: -78.485,
    },
    Station {
        id: "41117",
        name: "St. Augustine",
        region: "Gulf of Mexico (East)/Florida",
        latitude: 29.999,
        longitude: -81.079,
    },
    Station {
        id: "41004",
        name: "Charleston, SC",
        region: "USA-Southeast",
        latitude: 32.502,
        longitude: -79.099,
    },
    Station {
        id: "41002",
        name: "Cape Hatteras, SC",
        region: "USA-Southeast",
        latitude: 31.743,
        longitude: -74.955,
    },
    Station {
        id: "41159",
        name: "Onslow Bay, NC",
        region: "USA-Southeast",
        latitude: 34.213,
        longitude: -76.949,
    },
    Station {
        id: "46047",
        name: "San Diego",
        region: "USA-Southwest",
        latitude: 32.388,
        longitude: -119.525,
    },
];

/// Region names in registry order, without duplicates.
pub fn region_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = Vec::new();
    for station in STATION_REGISTRY {
        if !names.contains(&station.region) {
            names.push(station.region);
        }
    }
    names
}

/// Stations in `region`. Empty if the region is unknown.
pub fn stations_in_region(region: &str) -> Vec<&'static Station> {
    STATION_REGISTRY
        .iter()
        .filter(|s| s.region == region)
        .collect()
}

/// The full region -> stations hierarchy.
pub fn regions() -> Vec<Region> {
    region_names()
        .into_iter()
        .map(|name| Region {
            name,
            stations: stations_in_region(name).into_iter().cloned().collect(),
        })
        .collect()
}

/// Looks up a station by id. Returns `None` if not found.
pub fn find_station(station_id: &str) -> Option<&'static Station> {
    STATION_REGISTRY.iter().find(|s| s.id == station_id)
}

/// Looks up a station id within one region. Ids listed under several regions
/// resolve to that region's entry.
pub fn find_station_id_in_region(region: &str, station_id: &str) -> Option<&'static Station> {
    STATION_REGISTRY
        .iter()
        .find(|s| s.region == region && s.id == station_id)
}

/// Looks up a station by the region and display name shown in pickers.
pub fn find_station_in_region(region: &str, name: &str) -> Option<&'static Station> {
    STATION_REGISTRY
        .iter()
        .find(|s| s.region == region && s.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::is_valid_station_id;

    #[test]
    fn test_all_station_ids_are_valid_ndbc_format() {
        for station in STATION_REGISTRY {
            assert!(
                is_valid_station_id(station.id),
                "Station '{}' has malformed id '{}'",
                station.name,
                station.id
            );
        }
    }

    #[test]
    fn test_coordinates_in_range() {
        for station in STATION_REGISTRY {
            assert!((-90.0..=90.0).contains(&station.latitude), "{}", station.name);
            assert!((-180.0..=180.0).contains(&station.longitude), "{}", station.name);
        }
    }

    #[test]
    fn test_region_names_unique_and_ordered() {
        assert_eq!(
            region_names(),
            vec![
                "Atlantic (Tropical)",
                "Atlantic (West)",
                "Gulf of Mexico (East)/Florida",
                "USA-Southeast",
                "USA-Southwest",
            ]
        );
    }

    #[test]
    fn test_stations_in_region() {
        let florida = stations_in_region("Gulf of Mexico (East)/Florida");
        assert_eq!(florida.len(), 5);
        assert_eq!(florida[0].id, "41122");
        assert!(stations_in_region("Pacific (North)").is_empty());
    }

    #[test]
    fn test_regions_hierarchy_covers_registry() {
        let total: usize = regions().iter().map(|r| r.stations.len()).sum();
        assert_eq!(total, STATION_REGISTRY.len());
    }

    #[test]
    fn test_find_station() {
        let station = find_station("41010").unwrap();
        assert_eq!(station.name, "Cape Canaveral");
        assert!(find_station("99999").is_none());
    }

    #[test]
    fn test_shared_id_resolves_to_first_entry() {
        assert_eq!(find_station("41004").unwrap().region, "Atlantic (West)");
        let charleston = find_station_in_region("USA-Southeast", "Charleston, SC").unwrap();
        assert_eq!(charleston.id, "41004");
    }

    #[test]
    fn test_find_station_id_in_region() {
        let charleston = find_station_id_in_region("USA-Southeast", "41004").unwrap();
        assert_eq!(charleston.name, "Charleston, SC");
        let st_martin = find_station_id_in_region("Atlantic (West)", "41004").unwrap();
        assert_eq!(st_martin.name, "St. Martin (island)");
        assert!(find_station_id_in_region("USA-Southwest", "41004").is_none());
    }
}
