use serde_json::{Map, Value};

use crate::diagnostics::CompileContext;
use crate::error::CompileError;
use crate::options::Module;
use crate::template_ast::Element;
use crate::text_parser::parse_text;

/// `color: red; background: url(a;b)` into an ordered property map.
/// Semicolons inside parentheses do not separate declarations.
pub fn parse_style_text(text: &str) -> Map<String, Value> {
    let mut declarations = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ';' if depth <= 0 => {
                declarations.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    declarations.push(&text[start..]);

    let mut map = Map::new();
    for declaration in declarations {
        if let Some((property, value)) = declaration.split_once(':') {
            map.insert(property.trim().to_string(), Value::String(value.trim().to_string()));
        }
    }
    map
}

pub struct StyleModule;

impl Module for StyleModule {
    fn name(&self) -> &str {
        "style"
    }

    fn transform_node(&self, el: &mut Element, ctx: &mut CompileContext<'_>) -> Result<(), CompileError> {
        if let Some(static_style) = el.get_and_remove_attr("style") {
            if parse_text(&static_style, ctx.options.delimiters.as_ref()).is_some() {
                ctx.tip(
                    format!(
                        "style=\"{static_style}\": Interpolation inside attributes has been removed. \
Use {prefix}bind or the colon shorthand instead. For example, instead of \
<div style=\"{{{{ val }}}}\">, use <div :style=\"val\">.",
                        prefix = ctx.options.directive_prefix
                    ),
                    Some(el.span),
                );
            }
            let parsed = parse_style_text(&static_style);
            if !parsed.is_empty() {
                el.static_style = Some(serde_json::to_string(&parsed)?);
            }
        }
        let prefix = ctx.options.directive_prefix.clone();
        if let Some(binding) = el.take_binding_attr("style", &prefix, false) {
            el.style_binding = Some(binding);
        }
        Ok(())
    }

    fn gen_data(&self, el: &Element) -> Result<String, CompileError> {
        Ok(match (&el.static_style, &el.style_binding) {
            (Some(s), Some(b)) => {
                let object_literal = b.trim();
                if object_literal.starts_with('{') && object_literal.ends_with('}') {
                    let s_inner = &s[1..s.len() - 1];
                    let b_inner = &object_literal[1..object_literal.len() - 1];
                    format!("style:({{{s_inner},{b_inner}}}),")
                } else {
                    format!("style:_rs({b}, {s}),")
                }
            }
            (None, Some(b)) => format!("style:(_rs({b})),"),
            (Some(s), None) => format!("style:({s}),"),
            (None, None) => String::new(),
        })
    }
}
