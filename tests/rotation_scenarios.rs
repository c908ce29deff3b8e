use awful_news_tweets::oauth::{AuthorizationHeader, OAuthCredentials, percent_encode};
use awful_news_tweets::rotation::{
    current_index, current_source, ms_until_next_rotation, next_source, schedule,
};
use awful_news_tweets::{RotationConfig, RotationError};
use chrono::{Duration, TimeZone, Timelike, Utc};
use url::Url;

fn abc(interval_hours: u32) -> RotationConfig {
    RotationConfig::from_names(["A", "B", "C"], interval_hours).unwrap()
}

#[test]
fn four_hour_rotation_at_two_am() {
    let config = abc(4);
    let now = Utc.with_ymd_and_hms(2025, 5, 6, 2, 0, 0).unwrap();

    assert_eq!(current_source(now, &config).name(), "A");
    assert_eq!(next_source(now, &config).name(), "B");
    assert_eq!(ms_until_next_rotation(now, &config), 2 * 3_600_000);

    let entries = schedule(now, &config);
    assert_eq!(entries.len(), 6);
    assert_eq!(entries[0].starts_at, Utc.with_ymd_and_hms(2025, 5, 6, 0, 0, 0).unwrap());
    assert!(entries[0].starts_at <= now);
    for pair in entries.windows(2) {
        assert_eq!(pair[1].starts_at - pair[0].starts_at, Duration::hours(4));
    }
    let names: Vec<_> = entries.iter().map(|e| e.source.as_str()).collect();
    assert_eq!(names, ["A", "B", "C", "A", "B", "C"]);
}

#[test]
fn five_hour_interval_late_evening_stays_in_range() {
    for n in 1..=6 {
        let names: Vec<String> = (0..n).map(|i| format!("s{i}")).collect();
        let config = RotationConfig::from_names(names, 5).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 5, 6, 23, 30, 0).unwrap();

        let index = current_index(now, &config);
        assert_eq!(index, 4 % n);
        assert!(index < config.sources().len());
        assert!(ms_until_next_rotation(now, &config) < 5 * 3_600_000);
    }
}

#[test]
fn selection_is_stable_within_a_window() {
    let config = abc(4);
    let start = Utc.with_ymd_and_hms(2025, 5, 6, 8, 0, 0).unwrap();
    let expected = current_source(start, &config).name().to_string();

    let mut t = start;
    while t.hour() < 12 {
        assert_eq!(current_source(t, &config).name(), expected);
        t += Duration::minutes(17);
    }
}

#[test]
fn invalid_rotations_are_rejected() {
    assert_eq!(
        RotationConfig::from_names(Vec::<String>::new(), 4).unwrap_err(),
        RotationError::NoSources
    );
    assert_eq!(
        RotationConfig::from_names(["A"], 0).unwrap_err(),
        RotationError::ZeroInterval
    );
}

#[test]
fn authorization_header_is_reproducible() {
    let creds = OAuthCredentials::new("ck", "cs", "at", "ats").unwrap();
    let url = Url::parse("https://api.twitter.com/2/tweets").unwrap();

    let a = AuthorizationHeader::with_nonce(&creds, "POST", &url, "abc", "1700000000").unwrap();
    let b = AuthorizationHeader::with_nonce(&creds, "POST", &url, "abc", "1700000000").unwrap();
    assert_eq!(a.as_str(), b.as_str());
    assert!(a.as_str().starts_with("OAuth "));
    assert!(a.as_str().contains("oauth_nonce=\"abc\""));
    assert!(a.as_str().contains(&format!("oauth_consumer_key=\"{}\"", percent_encode("ck"))));

    let c = AuthorizationHeader::with_nonce(&creds, "POST", &url, "abd", "1700000000").unwrap();
    assert_ne!(a.as_str(), c.as_str());
}
