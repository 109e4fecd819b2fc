use super::settings::{PartialBrokerSettings, PartialSettings, Settings};
use super::{load_config, load_config_from};
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 8080);
    assert_eq!(settings.server.path, "/ws");
    assert_eq!(settings.server.queue_capacity, 256);
    assert_eq!(settings.server.write_timeout_ms, 10_000);
    assert_eq!(settings.broker.url, "redis://127.0.0.1:6379");
    assert_eq!(settings.broker.channel, "myChannel");
    assert_eq!(settings.listen_address(), "0.0.0.0:8080");
}

#[test]
fn partial_settings_only_override_what_is_present() {
    let partial = PartialSettings {
        broker: Some(PartialBrokerSettings {
            channel: Some("events".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    };

    let merged = partial.merge(Settings::default());
    assert_eq!(merged.broker.channel, "events");
    assert_eq!(merged.broker.url, Settings::default().broker.url);
    assert_eq!(merged.server, Settings::default().server);
}

#[test]
#[serial]
fn load_config_from_file_overrides_defaults() {
    // load_config reads config/default.* relative to the working directory
    let tmp = TempDir::new().expect("create tempdir");
    let orig = env::current_dir().expect("current_dir");
    env::set_current_dir(tmp.path()).expect("set current dir");

    fs::create_dir_all("config").expect("create config dir");
    let toml = r#"
        [server]
        host = "127.0.0.1"
        port = 9000

        [broker]
        channel = "fromFile"
        retry_max_ms = 1000
    "#;
    fs::write("config/default.toml", toml).expect("write config file");

    let cfg = load_config();
    env::set_current_dir(orig).expect("restore cwd");

    let cfg = cfg.expect("load_config failed");
    assert_eq!(cfg.listen_address(), "127.0.0.1:9000");
    assert_eq!(cfg.server.path, "/ws");
    assert_eq!(cfg.broker.channel, "fromFile");
    assert_eq!(cfg.broker.retry_max_ms, 1000);
    assert_eq!(cfg.broker.retry_initial_ms, 500);
}

#[test]
#[serial]
fn environment_overrides_file() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("hub.toml");
    fs::write(&path, "[broker]\nchannel = \"fromFile\"\n").expect("write config file");
    let path = path.to_str().expect("utf-8 path").to_string();

    temp_env::with_vars(
        [
            ("FANHUB_BROKER__CHANNEL", Some("fromEnv")),
            ("FANHUB_SERVER__PATH", Some("/events")),
            ("FANHUB_SERVER__QUEUE_CAPACITY", Some("8")),
        ],
        || {
            let cfg = load_config_from(&path).expect("load_config_from failed");
            assert_eq!(cfg.broker.channel, "fromEnv");
            assert_eq!(cfg.server.path, "/events");
            assert_eq!(cfg.server.queue_capacity, 8);
        },
    );
}

#[test]
#[serial]
fn missing_file_yields_defaults() {
    temp_env::with_vars_unset(
        [
            "FANHUB_BROKER__CHANNEL",
            "FANHUB_SERVER__PATH",
            "FANHUB_SERVER__QUEUE_CAPACITY",
        ],
        || {
            let cfg = load_config_from("does/not/exist").expect("load_config_from failed");
            assert_eq!(cfg, Settings::default());
        },
    );
}
