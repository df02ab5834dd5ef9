use anyhow::Result;
use log::LevelFilter;
use preswald_utils::*;
use serial_test::serial;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_normalize_username() {
    assert_eq!(normalize_github_username("John_Doe@123"), "john-doe-123");
    assert_eq!(normalize_github_username("  Already-Fine  "), "already-fine");
}

#[test]
fn test_api_key_validation() {
    assert!(validate_api_key("prswld-ab11bc24-927c-4962-820a-417312f3c55c").is_valid);

    let empty = validate_api_key("");
    assert!(!empty.is_valid);
    assert!(!empty.message.is_empty());

    let bad = validate_api_key("bad-key");
    assert!(!bad.is_valid);
    assert!(bad.message.contains("Required format"));
}

#[test]
fn test_github_username_validation() {
    let corrected = validate_github_username("John_Doe");
    assert!(!corrected.is_valid);
    assert_eq!(corrected.corrected.as_deref(), Some("john-doe"));

    let valid = validate_github_username("valid-user");
    assert!(valid.is_valid);
    assert_eq!(valid.corrected.as_deref(), Some("valid-user"));
}

#[test]
fn test_slug_helpers() {
    assert!(!validate_slug("ab"));
    assert!(validate_slug("valid-slug-1"));

    let slug = generate_slug("My Project!!");
    assert!(validate_slug(&slug));
    assert!(slug.starts_with("my-project-"));

    assert_eq!(slug_with_suffix("", 123_456), "preswald-123456");
}

#[test]
fn test_project_config_readers() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join(DEFAULT_CONFIG_FILE);
    fs::write(
        &path,
        "[project]\ntitle = \"Sales Dashboard\"\nslug = \"sales-dashboard-482913\"\nport = 8600\n",
    )?;

    assert_eq!(read_port(&path, 8501), 8600);
    assert_eq!(get_slug(&path)?, "sales-dashboard-482913");

    let config = PreswaldConfig::load(&path)?;
    assert_eq!(config.project_port()?, Some(8600));
    Ok(())
}

#[test]
fn test_get_slug_is_fatal_when_missing() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join(DEFAULT_CONFIG_FILE);
    fs::write(&path, "[project]\ntitle = \"No slug yet\"\n")?;

    let err = get_slug(&path).unwrap_err();
    assert!(format!("{err:#}").contains("missing key `project.slug`"));
    assert_eq!(read_port(&path, 8501), 8501);
    Ok(())
}

#[test]
#[serial]
fn test_configure_logging_last_call_wins() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join(DEFAULT_CONFIG_FILE);
    fs::write(&path, "[logging]\nlevel = \"WARNING\"\nformat = \"%(levelname)s %(message)s\"\n")?;

    assert_eq!(configure_logging(Some(&path), None)?, "WARNING");
    assert_eq!(log::max_level(), LevelFilter::Warn);

    assert_eq!(configure_logging(Some(&path), Some("debug"))?, "debug");
    assert_eq!(log::max_level(), LevelFilter::Debug);
    assert!(log::log_enabled!(log::Level::Debug));

    assert_eq!(configure_logging(Some(&path), Some("ERROR"))?, "ERROR");
    assert_eq!(log::max_level(), LevelFilter::Error);
    assert!(!log::log_enabled!(log::Level::Warn));
    Ok(())
}

#[test]
#[serial]
fn test_configure_logging_defaults() -> Result<()> {
    let dir = tempdir()?;
    let missing = dir.path().join(DEFAULT_CONFIG_FILE);
    assert_eq!(configure_logging(Some(&missing), None)?, "INFO");
    assert_eq!(log::max_level(), LevelFilter::Info);
    Ok(())
}

#[test]
#[serial]
fn test_configure_logging_rejects_unknown_level() -> Result<()> {
    let dir = tempdir()?;
    let missing = dir.path().join(DEFAULT_CONFIG_FILE);
    let err = configure_logging(Some(&missing), Some("verbose")).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownLevel(level) if level == "verbose"));
    Ok(())
}

#[test]
fn test_lib_version() {
    assert!(!PRESWALD_UTILS_VERSION.is_empty());
}
