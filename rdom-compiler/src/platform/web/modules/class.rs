use crate::diagnostics::CompileContext;
use crate::error::CompileError;
use crate::options::Module;
use crate::template_ast::Element;
use crate::text_parser::parse_text;
use crate::util::json_string;

/// Moves `class` / `:class` into dedicated fields and merges them at codegen.
pub struct ClassModule;

impl Module for ClassModule {
    fn name(&self) -> &str {
        "class"
    }

    fn transform_node(&self, el: &mut Element, ctx: &mut CompileContext<'_>) -> Result<(), CompileError> {
        if let Some(static_class) = el.get_and_remove_attr("class") {
            if parse_text(&static_class, ctx.options.delimiters.as_ref()).is_some() {
                ctx.tip(
                    format!(
                        "class=\"{static_class}\": Interpolation inside attributes has been removed. \
Use {prefix}bind or the colon shorthand instead. For example, instead of \
<div class=\"{{{{ val }}}}\">, use <div :class=\"val\">.",
                        prefix = ctx.options.directive_prefix
                    ),
                    Some(el.span),
                );
            }
            if !static_class.is_empty() {
                el.static_class = Some(json_string(&static_class));
            }
        }
        let prefix = ctx.options.directive_prefix.clone();
        if let Some(binding) = el.take_binding_attr("class", &prefix, false) {
            el.class_binding = Some(binding);
        }
        Ok(())
    }

    fn gen_data(&self, el: &Element) -> Result<String, CompileError> {
        let key = if el.tag.contains('-') { "class" } else { "className" };
        Ok(match (&el.static_class, &el.class_binding) {
            (Some(s), Some(b)) => format!("{key}:_rc({b},{s}),"),
            (None, Some(b)) => format!("{key}:_rc({b}),"),
            (Some(s), None) => format!("{key}:{s},"),
            (None, None) => String::new(),
        })
    }
}
