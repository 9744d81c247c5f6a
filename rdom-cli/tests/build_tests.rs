use rdom_cli::{BuildConfig, EmitMode};
use rdom_compiler::WhitespaceMode;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn out_dir(case: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../target/rdom-cli-tests")
        .join(format!("{}-{case}", std::process::id()))
}

#[test]
fn cli_build_emits_module() {
    let out_dir = out_dir("module");
    rdom_cli::build_cmd(&fixture("App.html"), Some(out_dir.as_path()), EmitMode::Module).expect("build module");

    let content = fs::read_to_string(out_dir.join("App.js")).expect("read module output");
    assert!(content.starts_with("export const render = function(){with(this){return _c('div'"));
    assert!(content.contains("_l((items),function(item){return _c('li',{key:item.id"));
    assert!(content.contains("export const staticRenderFns = [\n  function(){with(this){return _c('header'"));
    assert!(!content.contains("footer goes here"), "comments are dropped by default");
}

#[test]
fn cli_build_emits_json() {
    let out_dir = out_dir("json");
    rdom_cli::build_cmd(&fixture("App.html"), Some(out_dir.as_path()), EmitMode::Json).expect("build json");

    let content = fs::read_to_string(out_dir.join("App.json")).expect("read json output");
    let json: Value = serde_json::from_str(&content).expect("valid json");
    assert!(json["mainBody"].as_str().is_some_and(|b| b.starts_with("with(this){return _c('div'")));
    assert_eq!(json["staticBodies"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["errors"], Value::Array(Vec::new()));
}

#[test]
fn cli_build_keeps_comments_when_configured() {
    let out_dir = out_dir("comments");
    let config = BuildConfig {
        comments: true,
        ..BuildConfig::default()
    };
    let path = rdom_cli::build_with(&fixture("App.html"), Some(out_dir.as_path()), EmitMode::Module, &config)
        .expect("build with comments");
    let content = fs::read_to_string(path).expect("read module output");
    assert!(content.contains(r#"_e(" footer goes here ")"#));
}

#[test]
fn cli_build_rejects_template_errors() {
    let out_dir = out_dir("broken");
    let err = rdom_cli::build_cmd(&fixture("Broken.html"), Some(out_dir.as_path()), EmitMode::Module)
        .expect_err("broken template");
    assert!(err.to_string().contains("1 template error(s)"));
    assert!(!out_dir.join("Broken.js").exists());

    let config = BuildConfig {
        allow_errors: true,
        ..BuildConfig::default()
    };
    let path = rdom_cli::build_with(&fixture("Broken.html"), Some(out_dir.as_path()), EmitMode::Module, &config)
        .expect("allowed errors");
    assert!(path.ends_with("Broken.js"));
}

#[test]
fn cli_build_reports_missing_input() {
    let err = rdom_cli::build_cmd(&fixture("Missing.html"), Some(out_dir("missing").as_path()), EmitMode::Module)
        .expect_err("missing input");
    assert!(err.to_string().starts_with("failed to read"));
}

#[test]
fn config_file_is_loaded() {
    let dir = out_dir("config");
    fs::create_dir_all(&dir).expect("create config dir");
    let path = dir.join("rdom.json");
    fs::write(&path, r#"{"whitespace":"condense","delimiters":["${","}"],"directivePrefix":"x-"}"#)
        .expect("write config");

    let config = BuildConfig::load(&path).expect("load config");
    assert_eq!(config.whitespace, WhitespaceMode::Condense);
    assert_eq!(config.delimiters, Some(("${".to_string(), "}".to_string())));
    assert_eq!(config.directive_prefix.as_deref(), Some("x-"));
    assert!(!config.comments);

    let options = config.compiler_options();
    assert_eq!(options.directive_prefix, "x-");
}
