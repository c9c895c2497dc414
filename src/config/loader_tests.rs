//! Tests for configuration file loading.

use super::*;
use serial_test::serial;
use std::env;
use std::fs;

#[test]
fn default_config_path_contains_chatscroll_config_toml() {
    let path = default_config_path().expect("Should have default path");
    let path_str = path.to_string_lossy();
    assert!(
        path_str.contains("chatscroll") && path_str.ends_with("config.toml"),
        "Path should contain 'chatscroll' and end with 'config.toml', got: {}",
        path_str
    );
}

#[test]
fn default_log_path_ends_with_log_file_name() {
    let path = default_log_path();
    assert!(path.ends_with("chatscroll.log"), "got {:?}", path);
}

#[test]
fn load_config_file_returns_ok_none_for_missing_file() {
    let result = load_config_file("/nonexistent/path/to/config.toml");
    assert_eq!(
        result,
        Ok(None),
        "Missing config file should return Ok(None), not an error"
    );
}

#[test]
fn load_config_file_parses_valid_toml() {
    let config_path = env::temp_dir().join("chatscroll_test_config.toml");

    let toml_content = r#"
capacity = 500
wordwrap = false
wrap_limit = 12
indent = 9
auto_indent = false
max_auto_indent = 40
time_stamp = true
color_paste = true
refresh_ms = 100
"#;

    fs::write(&config_path, toml_content).expect("Failed to write test config");

    let config = load_config_file(&config_path)
        .expect("Should successfully parse valid TOML")
        .expect("Should return Some(ConfigFile) for existing file");

    assert_eq!(config.capacity, Some(500));
    assert_eq!(config.wordwrap, Some(false));
    assert_eq!(config.wrap_limit, Some(12));
    assert_eq!(config.indent, Some(9));
    assert_eq!(config.auto_indent, Some(false));
    assert_eq!(config.max_auto_indent, Some(40));
    assert_eq!(config.time_stamp, Some(true));
    assert_eq!(config.color_paste, Some(true));
    assert_eq!(config.refresh_ms, Some(100));
    assert_eq!(config.log_file_path, None);

    fs::remove_file(config_path).ok();
}

#[test]
fn load_config_file_returns_error_for_invalid_toml() {
    let config_path = env::temp_dir().join("chatscroll_test_invalid.toml");

    fs::write(&config_path, "this is not valid TOML ][}{")
        .expect("Failed to write invalid test config");

    let result = load_config_file(&config_path);
    match result {
        Err(ConfigError::ParseError { path, reason: _ }) => {
            assert_eq!(path, config_path);
        }
        _ => panic!("Expected ParseError, got {:?}", result),
    }

    fs::remove_file(config_path).ok();
}

#[test]
fn config_file_rejects_unknown_fields() {
    let result: Result<ConfigFile, _> = toml::from_str("theme = \"dark\"\n");
    assert!(result.is_err(), "unknown keys must be rejected");
}

#[test]
fn config_file_rejects_wrong_types() {
    let result: Result<ConfigFile, _> = toml::from_str("capacity = \"lots\"\n");
    assert!(result.is_err());
}

#[test]
fn merge_config_uses_defaults_when_none() {
    assert_eq!(merge_config(None), ResolvedConfig::default());
}

#[test]
fn merge_config_uses_defaults_for_none_fields() {
    let file = ConfigFile {
        indent: Some(12),
        time_stamp: Some(true),
        ..ConfigFile::default()
    };

    let resolved = merge_config(Some(file));
    let defaults = ResolvedConfig::default();

    assert_eq!(resolved.indent, 12);
    assert!(resolved.time_stamp);
    assert_eq!(resolved.capacity, defaults.capacity);
    assert_eq!(resolved.wordwrap, defaults.wordwrap);
    assert_eq!(resolved.refresh_ms, defaults.refresh_ms);
    assert_eq!(resolved.log_file_path, defaults.log_file_path);
}

#[test]
fn resolved_config_default_has_expected_values() {
    let config = ResolvedConfig::default();
    assert_eq!(config.capacity, DEFAULT_CAPACITY);
    assert!(config.wordwrap);
    assert_eq!(config.wrap_limit, DEFAULT_WRAP_LIMIT);
    assert_eq!(config.indent, MARGIN);
    assert!(config.auto_indent);
    assert!(!config.time_stamp);
    assert!(!config.color_paste);
    assert_eq!(config.refresh_ms, DEFAULT_REFRESH_MS);
}

/// RAII guard to ensure environment variable cleanup even under test parallelism.
/// Removes the var on drop, preventing test pollution in parallel execution.
struct EnvGuard(&'static str);

impl EnvGuard {
    fn new(name: &'static str) -> Self {
        env::remove_var(name);
        EnvGuard(name)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        env::remove_var(self.0);
    }
}

#[test]
#[serial(chatscroll_env)]
fn apply_env_overrides_reads_capacity_and_wordwrap() {
    let _capacity = EnvGuard::new("CHATSCROLL_CAPACITY");
    let _wordwrap = EnvGuard::new("CHATSCROLL_WORDWRAP");

    env::set_var("CHATSCROLL_CAPACITY", "250");
    env::set_var("CHATSCROLL_WORDWRAP", "off");

    let result = apply_env_overrides(ResolvedConfig::default());
    assert_eq!(result.capacity, 250);
    assert!(!result.wordwrap);
    assert_eq!(result.indent, ResolvedConfig::default().indent);
}

#[test]
#[serial(chatscroll_env)]
fn apply_env_overrides_ignores_garbage() {
    let _capacity = EnvGuard::new("CHATSCROLL_CAPACITY");
    let _wordwrap = EnvGuard::new("CHATSCROLL_WORDWRAP");

    env::set_var("CHATSCROLL_CAPACITY", "many");
    env::set_var("CHATSCROLL_WORDWRAP", "maybe");

    let base = ResolvedConfig::default();
    assert_eq!(apply_env_overrides(base.clone()), base);
}

#[test]
#[serial(chatscroll_env)]
fn apply_env_overrides_no_change_when_env_var_not_set() {
    let _capacity = EnvGuard::new("CHATSCROLL_CAPACITY");
    let _wordwrap = EnvGuard::new("CHATSCROLL_WORDWRAP");

    let base = ResolvedConfig::default();
    assert_eq!(apply_env_overrides(base.clone()), base);
}

#[test]
#[serial(chatscroll_config)]
fn load_config_with_precedence_prefers_explicit_path() {
    let _guard = EnvGuard::new("CHATSCROLL_CONFIG");

    let explicit = env::temp_dir().join("chatscroll_test_explicit.toml");
    let from_env = env::temp_dir().join("chatscroll_test_env.toml");
    fs::write(&explicit, "indent = 5\n").expect("write explicit");
    fs::write(&from_env, "indent = 7\n").expect("write env");

    env::set_var("CHATSCROLL_CONFIG", from_env.to_str().unwrap());

    let config = load_config_with_precedence(Some(explicit.clone()))
        .expect("load")
        .expect("present");
    assert_eq!(config.indent, Some(5));

    fs::remove_file(explicit).ok();
    fs::remove_file(from_env).ok();
}

#[test]
#[serial(chatscroll_config)]
fn load_config_with_precedence_uses_env_var_when_no_explicit_path() {
    let _guard = EnvGuard::new("CHATSCROLL_CONFIG");

    let from_env = env::temp_dir().join("chatscroll_test_env_only.toml");
    fs::write(&from_env, "time_stamp = true\n").expect("write env");
    env::set_var("CHATSCROLL_CONFIG", from_env.to_str().unwrap());

    let config = load_config_with_precedence(None)
        .expect("load")
        .expect("present");
    assert_eq!(config.time_stamp, Some(true));

    fs::remove_file(from_env).ok();
}

#[test]
#[serial(chatscroll_config)]
fn load_config_with_precedence_rejects_empty_env_var() {
    let _guard = EnvGuard::new("CHATSCROLL_CONFIG");
    env::set_var("CHATSCROLL_CONFIG", "");

    assert!(matches!(
        load_config_with_precedence(None),
        Err(ConfigError::InvalidPath(_))
    ));
}

#[test]
fn apply_cli_overrides_no_overrides() {
    let base = ResolvedConfig::default();
    assert_eq!(apply_cli_overrides(base.clone(), &CliOverrides::default()), base);
}

#[test]
fn apply_cli_overrides_multiple_overrides() {
    let cli = CliOverrides {
        capacity: Some(42),
        no_wordwrap: true,
        timestamps: true,
    };
    let result = apply_cli_overrides(ResolvedConfig::default(), &cli);
    assert_eq!(result.capacity, 42);
    assert!(!result.wordwrap);
    assert!(result.time_stamp);
}

#[test]
#[serial(chatscroll_env)]
fn precedence_chain_full_defaults_to_cli() {
    let _capacity = EnvGuard::new("CHATSCROLL_CAPACITY");
    let _wordwrap = EnvGuard::new("CHATSCROLL_WORDWRAP");

    let file = ConfigFile {
        capacity: Some(100),
        wordwrap: Some(false),
        indent: Some(8),
        ..ConfigFile::default()
    };
    let merged = merge_config(Some(file));
    assert_eq!(merged.capacity, 100);

    env::set_var("CHATSCROLL_CAPACITY", "200");
    env::set_var("CHATSCROLL_WORDWRAP", "true");
    let with_env = apply_env_overrides(merged);
    assert_eq!(with_env.capacity, 200);
    assert!(with_env.wordwrap);

    let cli = CliOverrides {
        capacity: Some(300),
        ..CliOverrides::default()
    };
    let resolved = apply_cli_overrides(with_env, &cli);
    assert_eq!(resolved.capacity, 300);
    assert!(resolved.wordwrap);
    assert_eq!(resolved.indent, 8);
}
