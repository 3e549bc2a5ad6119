use clap::Parser;
use predicates::prelude::*;
use serial_test::serial;
use std::path::PathBuf;

use ontograph::cli::Cli;
use ontograph::config::OntologyConfig;
use ontograph::constants::CONFIG_PATH_ENV;
use ontograph::graph::DataType;
use ontograph::test_utils::GraphFixture;

use crate::common::TestWorkspace;

async fn workspace_with_tag() -> (TestWorkspace, u64) {
    let mut fixture = GraphFixture::new();
    let tag = fixture.tag("plants", DataType::Integer);
    let workspace = TestWorkspace::new().unwrap();
    workspace.write_store(fixture.store()).await.unwrap();
    (workspace, tag.serial().unwrap())
}

#[tokio::test]
async fn test_store_is_taken_from_config_file() {
    let (workspace, serial) = workspace_with_tag().await;

    // TOML literal strings keep Windows separators intact
    let config = format!("store = '{}'\n", workspace.store_path().display());
    workspace.write_file("config.toml", &config).await.unwrap();

    workspace
        .command()
        .args(["resolve", "plants"])
        .assert()
        .success()
        .stdout(predicate::str::contains(serial.to_string()));
}

#[tokio::test]
async fn test_store_flag_overrides_config_file() {
    let (workspace, serial) = workspace_with_tag().await;
    workspace
        .write_file("config.toml", "store = 'elsewhere.json'\n")
        .await
        .unwrap();

    workspace
        .command_with_store()
        .args(["resolve", "plants"])
        .assert()
        .success()
        .stdout(predicate::str::contains(serial.to_string()));
}

#[tokio::test]
async fn test_invalid_config_fails() {
    let (workspace, _) = workspace_with_tag().await;
    workspace
        .write_file("config.toml", "language = [unterminated\n")
        .await
        .unwrap();

    workspace
        .command_with_store()
        .args(["resolve", "plants"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config.toml"));
}

#[tokio::test]
async fn test_saved_config_is_used_by_the_cli() {
    let (workspace, serial) = workspace_with_tag().await;
    let config = OntologyConfig {
        store: Some(workspace.store_path()),
        ..OntologyConfig::default()
    };
    config.save_to(&workspace.config_path()).await.unwrap();

    let output = workspace
        .command()
        .args(["definition", serial.to_string().as_str(), "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["persistent_id"], "plants");
}

#[test]
#[serial]
fn test_config_path_from_environment() {
    unsafe {
        std::env::set_var(CONFIG_PATH_ENV, "/tmp/ontograph-env.toml");
    }

    let cli = Cli::try_parse_from(["ontograph", "resolve", "plants"]).unwrap();
    assert_eq!(
        cli.build_config().config_path,
        Some(PathBuf::from("/tmp/ontograph-env.toml"))
    );

    // The flag wins over the environment
    let cli = Cli::try_parse_from(["ontograph", "--config", "local.toml", "resolve", "plants"])
        .unwrap();
    assert_eq!(cli.build_config().config_path, Some(PathBuf::from("local.toml")));

    unsafe {
        std::env::remove_var(CONFIG_PATH_ENV);
    }
}
