use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use prefview_core::config::{self, Config, ConfigError, PrefsTarget};
use prefview_core::prober::ProbeStrategy;

fn scratch_path(file_name: &str) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir()
        .join(format!("prefview-config-{unique}"))
        .join(file_name)
}

#[test]
fn defaults_validate() {
    let cfg = Config::default();
    assert_eq!(cfg.company_name, "DefaultCompany");
    assert_eq!(cfg.product_name, "My project");
    assert_eq!(cfg.target, PrefsTarget::Editor);
    assert_eq!(cfg.probe_strategy, ProbeStrategy::Sentinel);
    assert!(!cfg.show_raw_keys);
    assert!(config::validate(&cfg).is_ok());
}

#[test]
fn missing_file_loads_defaults() {
    let path = scratch_path("config.toml");

    let cfg = config::load(Some(&path)).unwrap();

    assert_eq!(cfg.company_name, "DefaultCompany");
    assert_eq!(cfg.config_path, path);
    assert!(!path.exists());
}

#[test]
fn save_then_load_preserves_fields() {
    let path = scratch_path("config.toml");
    let cfg = Config {
        company_name: "Acme".to_string(),
        product_name: "Rocket Game".to_string(),
        target: PrefsTarget::Player,
        probe_strategy: ProbeStrategy::NativeTag,
        show_raw_keys: true,
        config_path: path.clone(),
    };

    config::save(&cfg).unwrap();
    let loaded = config::load(Some(&path)).unwrap();

    assert_eq!(loaded, cfg);
    std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
}

#[test]
fn partial_toml_falls_back_to_defaults() {
    let path = scratch_path("config.toml");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "product_name = \"Tower\"\n").unwrap();

    let cfg = config::load(Some(&path)).unwrap();

    assert_eq!(cfg.company_name, "DefaultCompany");
    assert_eq!(cfg.product_name, "Tower");
    std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
}

#[test]
fn loads_json5_by_extension() {
    let path = scratch_path("config.json5");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        "{\n  // player build\n  company_name: 'Acme',\n  target: 'player',\n  probe_strategy: 'native_tag',\n}\n",
    )
    .unwrap();

    let cfg = config::load(Some(&path)).unwrap();

    assert_eq!(cfg.company_name, "Acme");
    assert_eq!(cfg.product_name, "My project");
    assert_eq!(cfg.target, PrefsTarget::Player);
    assert_eq!(cfg.probe_strategy, ProbeStrategy::NativeTag);
    std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
}

#[test]
fn malformed_file_is_a_parse_error() {
    let path = scratch_path("config.toml");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "company_name = [").unwrap();

    let result = config::load(Some(&path));

    assert!(matches!(result, Err(ConfigError::Parse(_))));
    std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
}

#[test]
fn rejects_empty_or_nested_names() {
    let mut cfg = Config::default();
    cfg.company_name = "  ".to_string();
    assert!(matches!(
        config::validate(&cfg),
        Err(ConfigError::Invalid(_))
    ));

    let mut cfg = Config::default();
    cfg.product_name = r"Game\Sub".to_string();
    assert!(matches!(
        config::validate(&cfg),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn registry_subkey_follows_target() {
    let mut cfg = Config::default();
    assert_eq!(
        cfg.registry_subkey(),
        r"Software\Unity\UnityEditor\DefaultCompany\My project"
    );

    cfg.target = PrefsTarget::Player;
    assert_eq!(cfg.registry_subkey(), r"Software\DefaultCompany\My project");
}
