use newsfeed_core::geo::Coordinates;
use newsfeed_core::{News, PrivateAd, Record, RecordKind, WeatherAlert};
use newsfeed_util_error::BoxedErrorResult;
use tempfile::{TempDir, tempdir};
use time::macros::{date, datetime};

use crate::{Database, DbError, RowFields, db_version};

fn temp_db() -> BoxedErrorResult<(TempDir, Database)> {
    let dir = tempdir()?;
    let db = Database::open(dir.path().join("db.redb"))?;

    Ok((dir, db))
}

fn news(text: &str, city: &str) -> Record {
    News::new(text, city).expect("valid").into()
}

#[test_log::test]
fn insert_then_exists() -> BoxedErrorResult<()> {
    let (_dir, db) = temp_db()?;
    let record = news("Fire downtown", "Springfield");

    assert!(!db.exists(&record)?);
    let inserted = db.insert(&record)?;
    assert_eq!(inserted.kind, RecordKind::News);
    assert_eq!(inserted.id, 1);
    assert_eq!(inserted.fingerprint, record.fingerprint());
    assert!(db.exists(&record)?);

    Ok(())
}

#[test_log::test]
fn duplicate_is_rejected_inside_transaction() -> BoxedErrorResult<()> {
    let (_dir, db) = temp_db()?;
    let first = news("Fire downtown", "Springfield");
    // Different capture time, same content.
    let second = news("  Fire downtown", "Springfield ");

    db.insert(&first)?;
    let err = db.insert(&second).unwrap_err();
    assert!(err.is_duplicate(), "{err:?}");
    assert!(matches!(
        err,
        DbError::DuplicateFingerprint {
            kind: RecordKind::News,
            ..
        }
    ));
    assert_eq!(db.counts()?.news, 1);

    Ok(())
}

#[test_log::test]
fn same_fields_in_different_kinds_do_not_collide() -> BoxedErrorResult<()> {
    let (_dir, db) = temp_db()?;
    db.insert(&news("Sale", "2099-01-01"))?;
    db.insert(&PrivateAd::parse("Sale", "2099-01-01")?.into())?;

    let counts = db.counts()?;
    assert_eq!(counts.news, 1);
    assert_eq!(counts.private_ad, 1);
    assert_eq!(counts.total(), 2);

    Ok(())
}

#[test_log::test]
fn clear_all_zeroes_counts() -> BoxedErrorResult<()> {
    let (_dir, db) = temp_db()?;
    db.insert(&news("A", "X"))?;
    db.insert(&news("B", "X"))?;
    db.insert(&WeatherAlert::new("Storm", "High", "Coast")?.into())?;

    assert_eq!(db.clear_all()?, 3);
    assert_eq!(db.counts()?.total(), 0);
    for kind in RecordKind::ALL {
        assert!(db.recent(kind, 10)?.is_empty());
    }

    // Cleared records can be published again.
    db.insert(&news("A", "X"))?;
    assert_eq!(db.counts()?.news, 1);

    Ok(())
}

#[test_log::test]
fn recent_is_newest_first_and_limited() -> BoxedErrorResult<()> {
    let (_dir, db) = temp_db()?;
    for i in 0..5 {
        db.insert(&news(&format!("Item {i}"), "Town"))?;
    }

    let rows = db.recent(RecordKind::News, 3)?;
    let texts: Vec<_> = rows.iter().map(|r| r.fields.text().to_owned()).collect();
    assert_eq!(texts, ["Item 4", "Item 3", "Item 2"]);
    assert!(rows.iter().all(|r| r.kind() == RecordKind::News));
    assert!(db.recent(RecordKind::WeatherAlert, 3)?.is_empty());
    assert_eq!(db.recent(RecordKind::News, 0)?.len(), 0);

    Ok(())
}

#[test_log::test]
fn private_ad_row_keeps_days_left_at_insertion() -> BoxedErrorResult<()> {
    let (_dir, db) = temp_db()?;
    let ad: Record =
        PrivateAd::new_at("Bike", date!(2030 - 06 - 10), datetime!(2030-06-01 12:00 UTC))?.into();
    db.insert_at(&ad, datetime!(2030-06-03 08:00 UTC))?;

    let rows = db.recent(RecordKind::PrivateAd, 1)?;
    assert_eq!(
        rows[0].fields,
        RowFields::PrivateAd {
            text: "Bike".into(),
            expiration_date: "2030-06-10".into(),
            days_left: 7,
        }
    );
    assert_eq!(rows[0].created_at.to_string(), "2030-06-01 12:00");
    assert_eq!(rows[0].inserted_at.to_string(), "2030-06-03 08:00");

    Ok(())
}

#[test_log::test]
fn data_survives_reopen() -> BoxedErrorResult<()> {
    let (dir, db) = temp_db()?;
    db.insert(&news("A", "X"))?;
    drop(db);

    let db = Database::open(dir.path().join("db.redb"))?;
    assert_eq!(db.counts()?.news, 1);
    // Ids keep counting after reopen.
    assert_eq!(db.insert(&news("B", "X"))?.id, 2);

    Ok(())
}

#[test_log::test]
fn newer_schema_is_refused() -> BoxedErrorResult<()> {
    let (dir, db) = temp_db()?;
    db.write_with(|tx| {
        let mut table = tx.open_table(&db_version::TABLE)?;
        table.insert(&(), &99)?;
        Ok(())
    })?;

    let err = Database::open(dir.path().join("db.redb")).unwrap_err();
    assert!(matches!(
        err,
        DbError::DbVersionTooHigh {
            db_ver: 99,
            code_ver: 1,
            ..
        }
    ));

    Ok(())
}

#[test_log::test]
fn info_reports_counts_and_size() -> BoxedErrorResult<()> {
    let (_dir, db) = temp_db()?;
    db.insert(&news("A", "X"))?;

    let info = db.info()?;
    assert_eq!(info.total(), 1);
    assert!(0 < info.size_bytes);
    assert!(info.to_string().contains("News: 1"));

    Ok(())
}

#[test_log::test]
fn city_lookup_is_case_insensitive() -> BoxedErrorResult<()> {
    let (_dir, db) = temp_db()?;
    assert_eq!(db.seed_default_cities()?, 20);

    let london = db.get_city("london")?.expect("seeded");
    assert_eq!(london.name, "London");
    assert_eq!(db.get_city("LONDON")?, Some(london));
    assert!(db.get_city("Atlantis")?.is_none());

    Ok(())
}

#[test_log::test]
fn seeding_only_fills_empty_table() -> BoxedErrorResult<()> {
    let (_dir, db) = temp_db()?;
    db.save_city("Kyiv", Coordinates::new(50.4501, 30.5234)?, Some("Ukraine"))?;
    assert_eq!(db.seed_default_cities()?, 0);
    assert_eq!(db.list_cities()?.len(), 1);

    Ok(())
}

#[test_log::test]
fn save_city_replaces_existing() -> BoxedErrorResult<()> {
    let (_dir, db) = temp_db()?;
    db.seed_default_cities()?;
    db.save_city(" paris ", Coordinates::new(1.0, 2.0)?, Some(" "))?;

    let paris = db.get_city("Paris")?.expect("saved");
    assert_eq!(paris.name, "paris");
    assert_eq!(paris.coordinates, Coordinates::new(1.0, 2.0)?);
    assert_eq!(paris.country, None);
    assert_eq!(db.list_cities()?.len(), 20);

    Ok(())
}

#[test_log::test]
fn list_and_stats() -> BoxedErrorResult<()> {
    let (_dir, db) = temp_db()?;
    db.seed_default_cities()?;

    let names: Vec<_> = db.list_cities()?.into_iter().map(|c| c.name).collect();
    assert_eq!(names.first().map(String::as_str), Some("Bangkok"));
    assert_eq!(names.len(), 20);

    let stats = db.city_stats()?;
    assert_eq!(stats.cities, 20);
    // USA appears twice.
    assert_eq!(stats.countries, 19);

    Ok(())
}

#[test]
fn empty_city_name_is_rejected() -> BoxedErrorResult<()> {
    let (_dir, db) = temp_db()?;
    let err = db
        .save_city("  ", Coordinates::new(0.0, 0.0)?, None)
        .unwrap_err();
    assert!(matches!(err, DbError::EmptyCityName { .. }));

    Ok(())
}
