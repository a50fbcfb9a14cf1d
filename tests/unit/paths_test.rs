use serial_test::serial;
use std::env;
use std::path::PathBuf;

use routescript::{
    Config,
    configs::{expand_path, find_config_file, get_default_config_dir, resolve_script_roots},
};

#[test]
#[serial]
fn test_get_default_config_dir() {
    let config_dir = get_default_config_dir().expect("Should get config dir");
    assert!(config_dir.ends_with("routescript"));
}

#[test]
#[serial]
fn test_xdg_config_home_valid_absolute() {
    unsafe {
        env::set_var("XDG_CONFIG_HOME", "/custom/config");
    }
    let dir = get_default_config_dir().unwrap();
    assert_eq!(dir, PathBuf::from("/custom/config/routescript"));
    unsafe {
        env::remove_var("XDG_CONFIG_HOME");
    }
}

#[test]
#[serial]
fn test_xdg_config_home_empty_string() {
    unsafe {
        env::set_var("XDG_CONFIG_HOME", "");
    }
    let dir = get_default_config_dir().unwrap();
    assert!(dir.to_str().unwrap().contains(".config/routescript"));
    unsafe {
        env::remove_var("XDG_CONFIG_HOME");
    }
}

#[test]
#[serial]
fn test_xdg_config_home_relative_path() {
    unsafe {
        env::set_var("XDG_CONFIG_HOME", "relative/path");
    }
    let dir = get_default_config_dir().unwrap();
    assert!(dir.is_absolute());
    assert!(dir.to_str().unwrap().contains(".config/routescript"));
    unsafe {
        env::remove_var("XDG_CONFIG_HOME");
    }
}

#[test]
#[serial]
fn test_default_script_root() {
    unsafe {
        env::set_var("XDG_CONFIG_HOME", "/custom/config");
    }
    let roots = resolve_script_roots(&Config::default()).unwrap();
    assert_eq!(roots, vec![PathBuf::from("/custom/config/routescript/routes")]);
    unsafe {
        env::remove_var("XDG_CONFIG_HOME");
    }
}

#[test]
#[serial]
fn test_configured_script_roots_are_expanded() {
    unsafe {
        env::set_var("ROUTESCRIPT_TEST_ROOT", "/srv/routes");
    }
    let config = Config {
        script_roots: vec![PathBuf::from("$ROUTESCRIPT_TEST_ROOT/main"), PathBuf::from("/opt")],
        ..Default::default()
    };

    let roots = resolve_script_roots(&config).unwrap();
    assert_eq!(
        roots,
        vec![PathBuf::from("/srv/routes/main"), PathBuf::from("/opt")]
    );
    unsafe {
        env::remove_var("ROUTESCRIPT_TEST_ROOT");
    }
}

#[test]
#[serial]
fn test_expand_path_tilde() {
    let home = dirs::home_dir().expect("Should have a home dir");
    let expanded = expand_path(PathBuf::from("~/routes/main.lua")).unwrap();
    assert_eq!(expanded, home.join("routes/main.lua"));
}

#[test]
fn test_expand_path_undefined_variable_fails() {
    assert!(expand_path(PathBuf::from("$ROUTESCRIPT_SURELY_UNDEFINED_VAR/x")).is_err());
}

#[test]
fn test_find_config_file_explicit_missing() {
    let result = find_config_file(Some(PathBuf::from("/nonexistent/routescript.toml")));
    assert!(result.is_err());
}

#[test]
fn test_find_config_file_explicit_existing() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("custom.toml");
    std::fs::write(&path, "").unwrap();

    let found = find_config_file(Some(path.clone())).unwrap();
    assert_eq!(found, Some(path));
}
