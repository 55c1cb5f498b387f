use super::{load_catalog, load_settings_from, parse_catalog, Settings};

use std::{
    collections::HashMap,
    env, fs,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use shared::domain::ControlKind;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| vars.get(key).cloned()
}

#[test]
fn defaults_match_the_party_setup() {
    let settings = load_settings_from(None, env_from(&[]));
    assert_eq!(settings, Settings::default());

    let config = settings.game_config();
    assert_eq!(config.controls_per_device, 6);
    assert_eq!(config.reward, 10);
    assert_eq!(config.cooldown, Duration::from_secs(2));
    assert_eq!(config.rng_seed, None);
}

#[test]
fn file_values_override_defaults() {
    let raw = r#"
        bind_addr = "127.0.0.1:9000"
        cooldown_ms = 500
        rng_seed = 4
    "#;
    let settings = load_settings_from(Some(raw), env_from(&[]));
    assert_eq!(settings.server_bind, "127.0.0.1:9000");
    assert_eq!(settings.cooldown_ms, 500);
    assert_eq!(settings.rng_seed, Some(4));
    assert_eq!(settings.reward, 10);
}

#[test]
fn env_overrides_file() {
    let raw = r#"bind_addr = "127.0.0.1:9000""#;
    let settings = load_settings_from(
        Some(raw),
        env_from(&[
            ("SERVER_BIND", "127.0.0.1:9100"),
            ("APP__BIND_ADDR", "127.0.0.1:9200"),
            ("APP__REWARD", "25"),
            ("APP__CONTROLS_PER_DEVICE", "4"),
        ]),
    );
    assert_eq!(settings.server_bind, "127.0.0.1:9200");
    assert_eq!(settings.reward, 25);
    assert_eq!(settings.controls_per_device, 4);
}

#[test]
fn unparsable_numbers_keep_previous_value() {
    let settings = load_settings_from(None, env_from(&[("APP__COOLDOWN_MS", "soon")]));
    assert_eq!(settings.cooldown_ms, 2000);
}

#[test]
fn malformed_file_falls_back_to_defaults() {
    let settings = load_settings_from(Some("cooldown_ms = ["), env_from(&[]));
    assert_eq!(settings, Settings::default());
}

#[test]
fn zero_controls_per_device_is_raised_to_one() {
    let settings = Settings {
        controls_per_device: 0,
        ..Settings::default()
    };
    assert_eq!(settings.game_config().controls_per_device, 1);
}

#[test]
fn catalog_file_parses_wire_names() {
    let catalog = parse_catalog(
        r#"
        [[controls]]
        name = "Hauptschalter"
        type = "toggle"
        color = "rot"
        min_value = 0
        max_value = 1

        [[controls]]
        name = "Schubregler"
        type = "slider"
        color = "blau"
        min_value = 0
        max_value = 7
        "#,
    )
    .expect("catalog");
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.specs()[0].kind, ControlKind::Toggle);
}

#[test]
fn catalog_file_with_inverted_range_is_rejected() {
    let err = parse_catalog(
        r#"
        [[controls]]
        name = "Warp"
        type = "dial"
        color = "grün"
        min_value = 9
        max_value = 2
        "#,
    )
    .expect_err("should fail");
    assert!(err.to_string().contains("Warp"));
}

#[test]
fn missing_catalog_path_uses_builtin() {
    assert_eq!(load_catalog(None).expect("builtin").len(), 28);
}

#[test]
fn catalog_loaded_from_disk() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("panel_catalog_test_{suffix}.toml"));
    fs::write(
        &path,
        "[[controls]]\nname = \"Dock\"\ntype = \"push_button\"\ncolor = \"gelb\"\nmin_value = 0\nmax_value = 2\n",
    )
    .expect("write");

    let catalog = load_catalog(path.to_str()).expect("catalog");
    assert_eq!(catalog.specs()[0].kind, ControlKind::PushButton);

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn unreadable_catalog_path_reports_context() {
    let err = load_catalog(Some("/nonexistent/panel_catalog.toml")).expect_err("should fail");
    assert!(err.to_string().contains("failed to read control catalog"));
}
