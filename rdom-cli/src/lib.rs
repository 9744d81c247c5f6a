use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use log::debug;
use rdom_compiler::platform::web::base_options;
use rdom_compiler::{CompileOutput, CompilerOptions, WhitespaceMode, compile};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum EmitMode {
    /// ES module exporting `render` and `staticRenderFns`
    Module,
    /// The raw compile output as JSON
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Whitespace {
    Preserve,
    Condense,
}

impl From<Whitespace> for WhitespaceMode {
    fn from(value: Whitespace) -> Self {
        match value {
            Whitespace::Preserve => WhitespaceMode::Preserve,
            Whitespace::Condense => WhitespaceMode::Condense,
        }
    }
}

/// Options file accepted by `rdom build --config`. Command-line flags win.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildConfig {
    pub comments: bool,
    pub whitespace: WhitespaceMode,
    pub delimiters: Option<(String, String)>,
    pub directive_prefix: Option<String>,
    pub allow_errors: bool,
}

impl BuildConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        let config =
            serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))?;
        debug!("loaded build config from {}", path.display());
        Ok(config)
    }

    pub fn compiler_options(&self) -> CompilerOptions {
        let mut options = base_options()
            .with_comments(self.comments)
            .with_whitespace(self.whitespace);
        if let Some((open, close)) = &self.delimiters {
            options = options.with_delimiters(open, close);
        }
        if let Some(prefix) = &self.directive_prefix {
            options = options.with_prefix(prefix);
        }
        options
    }
}

/// ES module text for a compiled template.
pub fn render_module(out: &CompileOutput) -> String {
    let statics: Vec<String> = out
        .static_bodies
        .iter()
        .map(|body| format!("  function(){{{body}}}"))
        .collect();
    let mut code = format!("export const render = function(){{{}}};\n", out.main_body);
    if statics.is_empty() {
        code.push_str("export const staticRenderFns = [];\n");
    } else {
        code.push_str(&format!("export const staticRenderFns = [\n{}\n];\n", statics.join(",\n")));
    }
    code
}

/// Compile a template file with default settings into `out_dir`.
pub fn build_cmd(input: &Path, out_dir: Option<&Path>, emit: EmitMode) -> Result<()> {
    build_with(input, out_dir, emit, &BuildConfig::default()).map(|_| ())
}

/// Compile a template file and write the result; returns the written path.
pub fn build_with(input: &Path, out_dir: Option<&Path>, emit: EmitMode, config: &BuildConfig) -> Result<PathBuf> {
    let src =
        fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))?;

    let options = config.compiler_options();
    let out = compile(&src, &options).with_context(|| format!("failed to compile {}", input.display()))?;

    for tip in &out.tips {
        eprintln!("tip: {tip}");
    }
    if !out.errors.is_empty() {
        for error in &out.errors {
            eprintln!("error: {error}");
        }
        if !config.allow_errors {
            bail!("{} has {} template error(s)", input.display(), out.errors.len());
        }
    }

    let name = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("template");

    let (code, ext) = match emit {
        EmitMode::Module => (render_module(&out), "js"),
        EmitMode::Json => (out.to_json()?, "json"),
    };

    let out_dir = out_dir
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("target/rdom-gen"));
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let out_path = out_dir.join(format!("{name}.{ext}"));
    fs::write(&out_path, code)
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    println!("Generated: {}", out_path.display());
    Ok(out_path)
}
