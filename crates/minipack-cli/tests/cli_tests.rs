use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn minipack_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("minipack"))
}

/// A project with an entry importing two modules, one of them twice
fn sample_project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("src/js")).unwrap();
    fs::write(
        root.join("src/app.js"),
        concat!(
            "const a = require(\"./js/a.js\");\n",
            "const b = require(\"./js/b.js\");\n",
            "const again = require(\"./js/a.js\");\n",
            "console.log(a.text + b.text);\n",
        ),
    )
    .unwrap();
    fs::write(
        root.join("src/js/a.js"),
        "module.exports = { text: \"a\" };\n",
    )
    .unwrap();
    fs::write(
        root.join("src/js/b.js"),
        "module.exports = { text: \"b\" };\n",
    )
    .unwrap();
    temp_dir
}

#[test]
fn test_bundles_project_to_default_output() {
    let temp_dir = sample_project();
    let root = temp_dir.path();

    minipack_cmd()
        .current_dir(root)
        .arg("./src/app.js")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bundled 3 module(s)"));

    let bundle = fs::read_to_string(root.join("dist/bundle.js")).unwrap();
    assert!(bundle.contains("return __minipack_require__(\"./src/app.js\");"));
    assert!(bundle.contains("\"./src/js/a.js\": function"));
    assert!(bundle.contains("\"./src/js/b.js\": function"));
}

#[test]
fn test_out_dir_and_out_file_override_defaults() {
    let temp_dir = sample_project();
    let root = temp_dir.path();

    minipack_cmd()
        .current_dir(root)
        .arg("./src/app.js")
        .arg("--out-dir")
        .arg("build")
        .arg("--out-file")
        .arg("app.bundle.js")
        .assert()
        .success();

    assert!(root.join("build/app.bundle.js").exists());
    assert!(!root.join("dist/bundle.js").exists());
}

#[test]
fn test_config_file_supplies_entry_and_loaders() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("src/style")).unwrap();
    fs::write(
        root.join("src/app.js"),
        "require(\"./style/index.css\");\n",
    )
    .unwrap();
    fs::write(root.join("src/style/index.css"), "body { color: red; }\n").unwrap();
    fs::write(
        root.join("minipack.json"),
        r#"{
            "entry": "./src/app.js",
            "output": { "path": "./out", "filename": "main.js" },
            "module": {
                "rules": [
                    { "test": "*.css", "use": ["css-loader"] }
                ]
            }
        }"#,
    )
    .unwrap();

    minipack_cmd().current_dir(root).assert().success();

    let bundle = fs::read_to_string(root.join("out/main.js")).unwrap();
    assert!(bundle.contains("document.createElement(\"style\")"));
}

#[test]
fn test_init_scaffolds_bundleable_project() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    minipack_cmd()
        .current_dir(root)
        .arg("--init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created minipack.json"));

    assert!(root.join("minipack.json").exists());
    assert!(root.join("src/app.js").exists());
    assert!(root.join("src/js/greeting.js").exists());

    // the scaffold must bundle as-is
    minipack_cmd()
        .current_dir(root)
        .assert()
        .success()
        .stdout(predicate::str::contains("Bundled 2 module(s)"));
    assert!(root.join("dist/bundle.js").exists());
}

#[test]
fn test_missing_entry_fails_with_identifier_in_message() {
    let temp_dir = TempDir::new().unwrap();

    minipack_cmd()
        .current_dir(temp_dir.path())
        .arg("./src/app.js")
        .assert()
        .failure()
        .stderr(predicate::str::contains("./src/app.js"));
}

#[test]
fn test_missing_dependency_names_the_importer() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("src/app.js"), "require(\"./gone.js\");\n").unwrap();

    minipack_cmd()
        .current_dir(root)
        .arg("./src/app.js")
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("./src/gone.js")
                .and(predicate::str::contains("./src/app.js")),
        );
}

#[test]
fn test_unknown_loader_fails_before_reading_modules() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(
        root.join("minipack.json"),
        r#"{
            "entry": "./src/app.js",
            "module": {
                "rules": [
                    { "test": "*.css", "use": ["no-such-loader"] }
                ]
            }
        }"#,
    )
    .unwrap();

    minipack_cmd()
        .current_dir(root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-such-loader"));
}
