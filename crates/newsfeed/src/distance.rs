use std::io::{BufRead, Write};

use newsfeed_core::geo::DistanceReport;
use newsfeed_db::{CityRecord, Database, DbError};
use snafu::{ResultExt as _, Snafu};
use tracing::info;

use crate::prompt::{PromptError, Prompter};

const LOG_TARGET: &str = "newsfeed::distance";

#[derive(Debug, Snafu)]
pub enum DistanceError {
    #[snafu(display("City store error"))]
    CityStore { source: DbError },
    #[snafu(display("Could not get coordinates for '{city}'"))]
    CityPrompt { source: PromptError, city: String },
}

pub type DistanceResult<T> = std::result::Result<T, DistanceError>;

/// Look up `name`, asking for and saving its coordinates when unknown.
pub fn resolve_city<R: BufRead, W: Write>(
    db: &Database,
    name: &str,
    prompter: &mut Prompter<R, W>,
) -> DistanceResult<CityRecord> {
    if let Some(city) = db.get_city(name).context(CityStoreSnafu)? {
        return Ok(city);
    }
    let (coordinates, country) = prompter
        .city_details(name.trim())
        .context(CityPromptSnafu { city: name })?;
    db.save_city(name, coordinates, country.as_deref())
        .context(CityStoreSnafu)
}

/// Distance between two cities, seeding the store with well-known cities on
/// first use.
pub fn distance<R: BufRead, W: Write>(
    db: &Database,
    from: &str,
    to: &str,
    prompter: &mut Prompter<R, W>,
) -> DistanceResult<DistanceReport> {
    if from.trim().eq_ignore_ascii_case(to.trim()) {
        return Ok(DistanceReport::new(from.trim(), to.trim(), 0.0));
    }

    let seeded = db.seed_default_cities().context(CityStoreSnafu)?;
    if 0 < seeded {
        info!(target: LOG_TARGET, seeded, "Seeded city database");
    }

    let a = resolve_city(db, from, prompter)?;
    let b = resolve_city(db, to, prompter)?;
    Ok(DistanceReport::between(a.name, a.coordinates, b.name, b.coordinates))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_target_names_this_module() {
        assert_eq!(format!("{LOG_TARGET}::tests"), module_path!());
    }
}
