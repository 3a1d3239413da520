use gauntlet_common::GauntletConfig;
use gauntlet_config::GauntletConfigLoader;
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn loads_typed_config_from_file() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
target:
  base_url: "http://${PLAYGROUND_HOST}"
browser:
  headless: false
  window_width: 1440
timeouts:
  slow_element_ms: 45000
"#;
    let p = write_yaml(&tmp, "gauntlet.yaml", file_yaml);

    temp_env::with_var("PLAYGROUND_HOST", Some("playground.local"), || {
        let config: GauntletConfig = GauntletConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load suite config");

        assert_eq!(config.target.base_url, "http://playground.local");
        assert!(!config.browser.headless);
        assert_eq!(config.browser.window_width, 1440);
        assert_eq!(config.timeouts.slow_element_ms, 45_000);
        // Sections the file omits keep their defaults.
        assert_eq!(config.browser.window_height, 900);
        assert_eq!(config.timeouts.poll_ms, 50);
    });
}

#[test]
#[serial]
fn environment_overrides_file_values() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "gauntlet.yaml", "browser:\n  headless: false\n");

    temp_env::with_var("GAUNTLET__BROWSER__HEADLESS", Some("true"), || {
        let config: GauntletConfig = GauntletConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load suite config");

        assert!(config.browser.headless);
    });
}

#[test]
#[serial]
fn missing_optional_file_yields_defaults() {
    let tmp = TempDir::new().unwrap();

    let config: GauntletConfig = GauntletConfigLoader::new()
        .with_file_if_present(tmp.path().join("absent.yaml"))
        .load()
        .expect("defaults without a file");

    assert!(config.browser.headless);
    assert_eq!(config.target.base_url, "http://uitestingplayground.com");
}

#[test]
#[serial]
fn missing_required_file_fails() {
    let tmp = TempDir::new().unwrap();

    let result: Result<GauntletConfig, _> = GauntletConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();

    assert!(result.is_err());
}

#[test]
#[serial]
fn explicit_config_env_wins_even_when_missing() {
    temp_env::with_var("GAUNTLET_CONFIG", Some("/nonexistent/gauntlet.yaml"), || {
        let p = gauntlet_config::resolve_config_file().expect("explicit path");
        assert_eq!(p, PathBuf::from("/nonexistent/gauntlet.yaml"));
    });
}

#[test]
#[serial]
fn resolve_returns_none_without_any_candidate() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().to_str().expect("utf-8 temp path");

    temp_env::with_vars(
        [
            ("GAUNTLET_CONFIG", None),
            ("XDG_CONFIG_HOME", Some(dir)),
            ("HOME", Some(dir)),
        ],
        || {
            assert_eq!(gauntlet_config::resolve_config_file(), None);
        },
    );
}
