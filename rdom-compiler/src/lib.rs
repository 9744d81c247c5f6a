pub mod diagnostics;
pub mod directive_expr;
pub mod directives;
pub mod error;
pub mod events;
pub mod filters;
pub mod html_tokenizer;
pub mod model;
pub mod optimizer;
pub mod options;
pub mod platform;
pub mod template_ast;
pub mod template_codegen;
pub mod template_parse;
pub mod text_parser;
pub mod util;


use log::debug;
use serde::Serialize;

pub use diagnostics::{CompileContext, Diagnostic, Diagnostics};
pub use error::CompileError;
pub use options::{
    Branch, CompilerOptions, DirectiveHandler, DirectiveRegistry, Expansion, IfLink, Module, TagTable, WhitespaceMode,
};
pub use template_ast::{Ast, Directive, Element, NodeId, NodeKind};
pub use template_codegen::{CodegenResult, Normalization, generate, normalization_for};
pub use template_parse::parse;

/// Everything one compile call produces. Output is best effort even when
/// `errors` is non-empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOutput {
    pub main_body: String,
    pub static_bodies: Vec<String>,
    pub errors: Vec<String>,
    pub tips: Vec<String>,
}

impl CompileOutput {
    pub fn to_json(&self) -> Result<String, CompileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Parses, optimizes and generates code for `template`.
pub fn compile(template: &str, options: &CompilerOptions) -> Result<CompileOutput, CompileError> {
    let source = template.trim();
    let mut ctx = CompileContext::new(options);

    let mut ast = parse(source, &mut ctx)?;
    optimizer::optimize(&mut ast, &ctx);
    let CodegenResult {
        main_body,
        static_bodies,
    } = generate(&ast, &mut ctx)?;

    let (errors, tips) = ctx.diagnostics.render(source);
    debug!(
        "compiled template: {} nodes, {} errors, {} tips",
        ast.len(),
        errors.len(),
        tips.len()
    );
    Ok(CompileOutput {
        main_body,
        static_bodies,
        errors,
        tips,
    })
}
