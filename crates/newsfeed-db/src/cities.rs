use std::collections::BTreeSet;

use newsfeed_core::Timestamp;
use newsfeed_core::geo::Coordinates;
use redb_bincode::ReadableTable as _;
use snafu::{ResultExt as _, ensure};
use tracing::{debug, info};

use crate::{
    CityRecord, Database, DbResult, EmptyCityNameSnafu, InvalidCoordinatesSnafu, LOG_TARGET,
    cities,
};

/// Cities the table is seeded with when empty: name, latitude, longitude,
/// country.
pub const DEFAULT_CITIES: [(&str, f64, f64, &str); 20] = [
    ("New York", 40.7128, -74.0060, "USA"),
    ("London", 51.5074, -0.1278, "UK"),
    ("Paris", 48.8566, 2.3522, "France"),
    ("Tokyo", 35.6762, 139.6503, "Japan"),
    ("Sydney", -33.8688, 151.2093, "Australia"),
    ("Los Angeles", 34.0522, -118.2437, "USA"),
    ("Berlin", 52.5200, 13.4050, "Germany"),
    ("Moscow", 55.7558, 37.6176, "Russia"),
    ("Mumbai", 19.0760, 72.8777, "India"),
    ("Beijing", 39.9042, 116.4074, "China"),
    ("Cairo", 30.0444, 31.2357, "Egypt"),
    ("São Paulo", -23.5505, -46.6333, "Brazil"),
    ("Mexico City", 19.4326, -99.1332, "Mexico"),
    ("Buenos Aires", -34.6118, -58.3960, "Argentina"),
    ("Lagos", 6.5244, 3.3792, "Nigeria"),
    ("Bangkok", 13.7563, 100.5018, "Thailand"),
    ("Istanbul", 41.0082, 28.9784, "Turkey"),
    ("Seoul", 37.5665, 126.9780, "South Korea"),
    ("Dubai", 25.2048, 55.2708, "UAE"),
    ("Singapore", 1.3521, 103.8198, "Singapore"),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CityStats {
    pub cities: u64,
    /// Distinct non-empty countries.
    pub countries: u64,
}

fn city_key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl Database {
    /// Case-insensitive lookup.
    pub fn get_city(&self, name: &str) -> DbResult<Option<CityRecord>> {
        let key = city_key(name);
        self.read_with(|tx| {
            let table = tx.open_table(&cities::TABLE)?;
            Ok(table.get(&key)?.map(|g| g.value()))
        })
    }

    /// Store coordinates for `name`, replacing any previous entry.
    pub fn save_city(
        &self,
        name: &str,
        coordinates: Coordinates,
        country: Option<&str>,
    ) -> DbResult<CityRecord> {
        let name = name.trim();
        ensure!(!name.is_empty(), EmptyCityNameSnafu);

        let record = CityRecord {
            name: name.to_owned(),
            coordinates,
            country: country
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(ToOwned::to_owned),
            created_at: Timestamp::now(),
        };

        self.write_with(|tx| {
            let mut table = tx.open_table(&cities::TABLE)?;
            table.insert(&city_key(name), &record)?;
            Ok(())
        })?;

        info!(target: LOG_TARGET, city = %record.name, coordinates = %coordinates, "City saved");
        Ok(record)
    }

    /// All cities ordered by (lowercased) name.
    pub fn list_cities(&self) -> DbResult<Vec<CityRecord>> {
        self.read_with(|tx| {
            let table = tx.open_table(&cities::TABLE)?;
            let mut cities = vec![];
            for entry in table.range::<String>(..)? {
                let (_, v) = entry?;
                cities.push(v.value());
            }
            Ok(cities)
        })
    }

    /// Fill the table with [`DEFAULT_CITIES`] if it has no entries yet.
    ///
    /// Returns the number of cities inserted.
    pub fn seed_default_cities(&self) -> DbResult<usize> {
        let now = Timestamp::now();
        let inserted = self.write_with(|tx| {
            let mut table = tx.open_table(&cities::TABLE)?;
            if table.first()?.is_some() {
                return Ok(0);
            }

            for (name, lat, lon, country) in DEFAULT_CITIES {
                let coordinates = Coordinates::new(lat, lon).context(InvalidCoordinatesSnafu)?;
                table.insert(
                    &city_key(name),
                    &CityRecord {
                        name: name.to_owned(),
                        coordinates,
                        country: Some(country.to_owned()),
                        created_at: now,
                    },
                )?;
            }
            Ok(DEFAULT_CITIES.len())
        })?;

        if 0 < inserted {
            info!(target: LOG_TARGET, count = inserted, "Seeded default cities");
        } else {
            debug!(target: LOG_TARGET, "City table already populated");
        }
        Ok(inserted)
    }

    pub fn city_stats(&self) -> DbResult<CityStats> {
        let cities = self.list_cities()?;
        let countries: BTreeSet<_> = cities
            .iter()
            .filter_map(|c| c.country.as_deref())
            .collect();
        Ok(CityStats {
            cities: cities.len() as u64,
            countries: countries.len() as u64,
        })
    }
}
