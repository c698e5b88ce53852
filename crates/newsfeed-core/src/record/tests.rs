use rand::SeedableRng as _;
use rand::rngs::StdRng;
use time::macros::{date, datetime};

use super::*;

#[test]
fn fields_are_trimmed() {
    let news = News::new("  Fire downtown \n", " Springfield ").unwrap();
    assert_eq!(news.text(), "Fire downtown");
    assert_eq!(news.city(), "Springfield");
}

#[test]
fn empty_fields_are_rejected() {
    let err = News::new("   ", "Springfield").unwrap_err();
    assert!(matches!(
        err,
        RecordError::MissingField {
            kind: RecordKind::News,
            field: "text"
        }
    ));

    let err = WeatherAlert::new("Storm", "High", "").unwrap_err();
    assert!(matches!(
        err,
        RecordError::MissingField {
            field: "location",
            ..
        }
    ));
}

#[test]
fn private_ad_rejects_unparsable_date() {
    let err = PrivateAd::parse("Sale", "01/02/2099").unwrap_err();
    assert!(matches!(
        err,
        RecordError::InvalidDate {
            field: "expiration_date",
            ..
        }
    ));
}

#[test]
fn private_ad_accepts_past_date() {
    let ad = PrivateAd::parse("Old sale", "2001-01-01").unwrap();
    assert!(ad.days_left(date!(2001 - 01 - 11)) == -10);
}

#[test]
fn days_left_counts_calendar_days() {
    let ad = PrivateAd::new_at("Sale", date!(2099 - 01 - 01), datetime!(2098-12-31 23:59 UTC))
        .unwrap();
    assert_eq!(ad.days_left(date!(2098 - 12 - 31)), 1);
    assert_eq!(ad.days_left(date!(2099 - 01 - 01)), 0);
}

#[test]
fn alert_id_shape() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let alert = WeatherAlert::new_with_rng(
            "Storm",
            "High",
            "Coast",
            datetime!(2024-05-01 10:00 UTC),
            &mut rng,
        )
        .unwrap();
        let id = alert.alert_id();
        assert_eq!(id.len(), 7);
        let suffix = id.strip_prefix(ALERT_ID_PREFIX).unwrap();
        assert!(
            suffix
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        );
    }
}

#[test]
fn fingerprint_ignores_capture_time_and_alert_id() {
    let mut rng = StdRng::seed_from_u64(1);
    let a: Record = WeatherAlert::new_with_rng(
        "Storm",
        "High",
        "Coast",
        datetime!(2024-05-01 10:00 UTC),
        &mut rng,
    )
    .unwrap()
    .into();
    let b: Record = WeatherAlert::new_with_rng(
        "Storm",
        "High",
        "Coast",
        datetime!(2025-01-01 00:00 UTC),
        &mut rng,
    )
    .unwrap()
    .into();
    assert_eq!(a.fingerprint(), b.fingerprint());

    let c: Record = WeatherAlert::new("Storm", "Low", "Coast").unwrap().into();
    assert_ne!(a.fingerprint(), c.fingerprint());
}

#[test]
fn fingerprint_covers_field_values_only() {
    let news: Record = News::new("Sale", "2099-01-01").unwrap().into();
    let ad: Record = PrivateAd::parse("Sale", "2099-01-01").unwrap().into();
    // Kinds live in separate tables, so this never collides.
    assert_eq!(news.fingerprint(), ad.fingerprint());
    assert_ne!(news.kind(), ad.kind());
}

#[test]
fn kind_tags_are_case_insensitive() {
    assert_eq!(RecordKind::from_tag("NEWS"), Some(RecordKind::News));
    assert_eq!(
        " Private_Ad ".parse::<RecordKind>().unwrap(),
        RecordKind::PrivateAd
    );
    assert!(matches!(
        "sports".parse::<RecordKind>(),
        Err(RecordError::UnsupportedType { .. })
    ));
}

#[test]
fn severity_normalizes_to_title_case() {
    assert_eq!("critical".parse::<Severity>().unwrap().to_string(), "Critical");
    assert_eq!(" hIgH ".parse::<Severity>().unwrap(), Severity::High);
    assert!("severe".parse::<Severity>().is_err());
}

#[test]
fn render_news() {
    let news: Record = News::new_at(
        "Fire downtown",
        "Springfield",
        datetime!(2024-03-05 07:09:59 UTC),
    )
    .unwrap()
    .into();
    assert_eq!(
        news.render(),
        "News -------------------------\nFire downtown\nSpringfield, 2024-03-05 07:09\n\n"
    );
}

#[test]
fn render_private_ad() {
    let ad: Record = PrivateAd::new_at(
        "Sale",
        date!(2099 - 01 - 01),
        datetime!(2098-12-01 00:00 UTC),
    )
    .unwrap()
    .into();
    assert_eq!(
        ad.render_on(date!(2098 - 12 - 22)),
        "Private Ad -------------------\nSale\nActual until: 2099-01-01, 10 days left\n\n"
    );
}

#[test]
fn render_weather_alert() {
    let mut rng = StdRng::seed_from_u64(3);
    let alert = WeatherAlert::new_with_rng(
        "Heavy rain",
        "Medium",
        "Kyiv",
        datetime!(2024-11-30 18:45 UTC),
        &mut rng,
    )
    .unwrap();
    let id = alert.alert_id().to_owned();
    let rendered = Record::from(alert).render();
    assert_eq!(
        rendered,
        format!(
            "Weather Alert ----------------\nAlert ID: {id}\nSeverity: Medium\nHeavy rain\nLocation: Kyiv, 2024-11-30 18:45\n\n"
        )
    );
}
