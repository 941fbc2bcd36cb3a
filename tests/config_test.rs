//! Tests for layered settings loading

use std::fs;

use rstest::rstest;
use tempfile::TempDir;

use hubadmin::config::{Settings, DEFAULT_REPO_ID};

#[test]
fn given_config_file_when_loading_then_overrides_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hubadmin.toml");
    fs::write(
        &path,
        r#"
repo_id = "me/robot-logs"
split = "validation"
timeout_secs = 5
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(path.as_path())).unwrap();

    // Assert
    assert_eq!(settings.repo_id, "me/robot-logs");
    assert_eq!(settings.split, "validation");
    assert_eq!(settings.timeout_secs, 5);
    assert_eq!(settings.revision, "main");
}

#[test]
fn given_config_file_and_repo_flag_when_loading_then_flag_wins() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hubadmin.toml");
    fs::write(&path, "repo_id = \"me/from-file\"\n").unwrap();

    let settings = Settings::load(Some(path.as_path()))
        .unwrap()
        .with_repo(Some("me/from-flag"));

    assert_eq!(settings.repo_id, "me/from-flag");
}

#[test]
fn given_missing_explicit_file_when_loading_then_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = Settings::load(Some(path.as_path())).unwrap_err();

    assert!(err.to_string().contains("config file not found"));
}

#[test]
fn given_malformed_file_when_loading_then_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hubadmin.toml");
    fs::write(&path, "repo_id = [unterminated").unwrap();

    assert!(Settings::load(Some(path.as_path())).is_err());
}

#[rstest]
#[case("hf_abc123\n", Some("hf_abc123"))]
#[case("  hf_padded  \n", Some("hf_padded"))]
#[case("\n", None)]
fn given_token_file_when_resolving_then_reads_trimmed_token(
    #[case] content: &str,
    #[case] expected: Option<&str>,
) {
    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("token");
    fs::write(&token_path, content).unwrap();
    let settings = Settings {
        token: None,
        token_path,
        ..Default::default()
    };

    assert_eq!(settings.resolve_token().as_deref(), expected);
}

#[test]
fn given_explicit_token_when_resolving_then_ignores_token_file() {
    let settings = Settings {
        token: Some("hf_explicit".into()),
        token_path: "/nonexistent/token".into(),
        ..Default::default()
    };

    assert_eq!(settings.resolve_token().as_deref(), Some("hf_explicit"));
}

#[test]
fn given_default_settings_then_target_default_repo() {
    assert_eq!(Settings::default().repo_id, DEFAULT_REPO_ID);
}
