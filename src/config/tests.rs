use std::io::Write;

use super::*;

#[test]
fn defaults_when_nothing_is_configured() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.store.base_url, DEFAULT_BASE_URL);
    assert_eq!(settings.store.caller_token, None);
    assert_eq!(settings.store.timeout, None);
    assert_eq!(settings.cache, CacheSettings::default());
    assert_eq!(settings.cache.stale_time, Duration::from_secs(300));
    assert_eq!(settings.logging.level, LevelFilter::INFO);
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.store.base_url = Some("http://file.example/api".to_string());
    raw.logging.level = Some("info".to_string());

    let overrides = StoreOverrides {
        base_url: Some("http://cli.example/api".to_string()),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.store.base_url, "http://cli.example/api");
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn rejects_zero_windows() {
    let mut raw = RawSettings::default();
    raw.cache.live_refetch_secs = Some(0);

    let err = Settings::from_raw(raw).unwrap_err();

    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.live_refetch_secs",
            ..
        }
    ));
}

#[test]
fn rejects_unparseable_base_url() {
    let mut raw = RawSettings::default();
    raw.store.base_url = Some("::nope::".to_string());
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn empty_token_means_anonymous() {
    let mut raw = RawSettings::default();
    raw.store.caller_token = Some(String::new());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.store.caller_token, None);
}

#[test]
fn reads_values_from_config_file() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    writeln!(
        file,
        r#"
[store]
base_url = "http://market.example/api"
timeout_secs = 10

[cache]
stale_secs = 60
live_stale_secs = 5
"#
    )
    .expect("write config");

    let settings = load(Some(file.path()), &StoreOverrides::default()).expect("valid settings");

    assert_eq!(settings.store.base_url, "http://market.example/api");
    assert_eq!(settings.store.timeout, Some(Duration::from_secs(10)));
    assert_eq!(settings.cache.stale_time, Duration::from_secs(60));
    assert_eq!(settings.cache.live_stale_time, Duration::from_secs(5));
    assert_eq!(settings.cache.live_refetch_interval, Duration::from_secs(30));
}
