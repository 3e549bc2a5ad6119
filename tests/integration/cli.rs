use predicates::prelude::*;

use ontograph::core::NodeId;
use ontograph::graph::DataType;
use ontograph::store::MemoryStore;
use ontograph::test_utils::TemplateFixture;

use crate::common::TestWorkspace;

/// Template fixture plus a `crop:wheat:variety` tag, snapshotted to disk.
struct Setup {
    workspace: TestWorkspace,
    root: NodeId,
    plot: NodeId,
    serial: u64,
}

async fn setup() -> Setup {
    let TemplateFixture {
        mut fixture,
        root,
        plot,
        ..
    } = TemplateFixture::build();
    let tag = fixture.tag("crop:wheat:variety", DataType::String);

    let workspace = TestWorkspace::new().unwrap();
    workspace.write_store(fixture.store()).await.unwrap();

    Setup {
        workspace,
        root,
        plot,
        serial: tag.serial().unwrap(),
    }
}

#[tokio::test]
async fn test_store_snapshot_round_trip_through_cli() {
    let Setup {
        workspace, serial, ..
    } = setup().await;

    let output = workspace.run(&["resolve", "crop:wheat:variety", "--format", "json"]);
    output.assert_success();
    let json = output.json();
    assert_eq!(json["persistent_id"], "crop:wheat:variety");
    assert_eq!(json["serial"], serial);

    let output = workspace.run(&["definition", &serial.to_string(), "-f", "json"]);
    output.assert_success();
    assert_eq!(output.json()["data_type"], "string");

    // The snapshot loads back into an equal store
    let loaded = MemoryStore::load_from(&workspace.store_path()).await.unwrap();
    let again = workspace.path().join("copy.json");
    loaded.save_to(&again).await.unwrap();
    let reloaded = MemoryStore::load_from(&again).await.unwrap();
    assert_eq!(loaded.snapshot().unwrap(), reloaded.snapshot().unwrap());
}

#[tokio::test]
async fn test_resolve_text_and_unknown_identifier() {
    let Setup {
        workspace, serial, ..
    } = setup().await;

    workspace
        .command_with_store()
        .args(["resolve", "crop:wheat:variety"])
        .assert()
        .success()
        .stdout(predicate::str::contains(serial.to_string()));

    workspace
        .command_with_store()
        .args(["resolve", "crop:barley"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("crop:barley").and(predicate::str::contains("not found")));
}

#[tokio::test]
async fn test_relationships_of_a_worksheet() {
    let Setup {
        workspace, plot, ..
    } = setup().await;

    let output = workspace.run(&[
        "relationships",
        &plot.to_string(),
        "--direction",
        "incoming",
        "--predicate",
        "predicate:property-of",
        "--format",
        "json",
    ]);
    output.assert_success();

    let json = output.json();
    let names: Vec<&str> = json["predicate:property-of"]
        .as_array()
        .unwrap()
        .iter()
        .map(|node| node["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["PLOT_ID", "PLOT_UNIT", "PLOT_AREA"]);
}

#[tokio::test]
async fn test_relationships_rejects_unknown_direction() {
    let Setup {
        workspace, plot, ..
    } = setup().await;

    workspace
        .command_with_store()
        .args(["relationships", plot.to_string().as_str(), "--direction", "sideways"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sideways"));
}

#[tokio::test]
async fn test_template_summary() {
    let Setup {
        workspace, root, ..
    } = setup().await;

    let output = workspace.run(&["template", &root.to_string(), "--format", "json"]);
    output.assert_success();
    let json = output.json();
    let symbols: Vec<&str> = json["worksheets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|sheet| sheet["symbol"].as_str().unwrap())
        .collect();
    assert_eq!(symbols, ["UNIT", "PLOT", "SAMPLE"]);
    assert_eq!(json["worksheets"][0]["unit"], true);
    assert_eq!(json["worksheets"][1]["index"], "PLOT_ID");

    workspace
        .command_with_store()
        .args(["template", root.to_string().as_str(), "--format", "tree"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PLOT_UNIT -> UNIT_ID"))
        .stdout(predicate::str::contains("UNIT_ID (key)"));
}

#[tokio::test]
async fn test_order_and_non_template_root() {
    let Setup {
        workspace, root, plot, ..
    } = setup().await;

    let output = workspace.run(&["order", &root.to_string(), "--format", "json"]);
    output.assert_success();
    let json = output.json();
    assert_eq!(json["root"], "UNIT");
    assert_eq!(json["steps"][0]["worksheet"], "PLOT");
    assert_eq!(json["steps"][0]["field"], "PLOT_UNIT");
    assert_eq!(json["steps"][1]["worksheet"], "SAMPLE");
    assert_eq!(json["steps"][1]["parent"], "PLOT");

    workspace
        .command_with_store()
        .args(["order", plot.to_string().as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid template"));
}

#[tokio::test]
async fn test_validate_workbook_headers() {
    let Setup {
        workspace, root, ..
    } = setup().await;

    let valid = workspace
        .write_file(
            "valid.json",
            r#"[
                { "title": "UNIT", "symbol_row": 1, "symbols": { "1": "UNIT_ID" }, "data_row": 2 },
                { "title": "PLOT", "symbol_row": 1,
                  "symbols": { "1": "PLOT_ID", "2": "PLOT_UNIT", "3": "PLOT_AREA" }, "data_row": 2 }
            ]"#,
        )
        .await
        .unwrap();
    workspace
        .command_with_store()
        .arg("validate")
        .arg(root.to_string())
        .arg(&valid)
        .assert()
        .success()
        .stdout(predicate::str::contains("✓"));

    let invalid = workspace
        .write_file(
            "invalid.json",
            r#"[{ "title": "PLOT", "symbols": { "1": "PLOT_ID", "2": "PLOT_AERA" }, "data_row": 3 }]"#,
        )
        .await
        .unwrap();
    let output = workspace.run(&[
        "validate",
        &root.to_string(),
        invalid.to_str().unwrap(),
        "--format",
        "json",
    ]);
    output.assert_failure();
    let report = output.json();
    let issues: Vec<&str> = report["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|issue| issue["issue"].as_str().unwrap())
        .collect();
    for expected in ["unknown_column", "missing_field", "row_mismatch", "missing_worksheet"] {
        assert!(issues.contains(&expected), "{expected} missing from {issues:?}");
    }
    assert!(output.stderr.contains("issue(s)"));
}

#[test]
fn test_missing_store_is_reported() {
    let workspace = TestWorkspace::new().unwrap();
    workspace
        .command()
        .args(["resolve", "crop:wheat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--store"));

    workspace
        .command()
        .arg("--store")
        .arg(workspace.path().join("absent.json"))
        .args(["resolve", "crop:wheat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.json"));
}

#[test]
fn test_help_lists_commands() {
    let workspace = TestWorkspace::new().unwrap();
    let mut cmd = workspace.command();
    cmd.arg("--help");
    cmd.assert().success().stdout(
        predicate::str::contains("resolve")
            .and(predicate::str::contains("relationships"))
            .and(predicate::str::contains("validate")),
    );
}
