//! Platform-independent directives: object `r-on`, object `r-bind` and `r-cloak`.

use crate::diagnostics::CompileContext;
use crate::error::CompileError;
use crate::options::DirectiveRegistry;
use crate::template_ast::{BindObject, Directive, Element};

pub fn register_base(registry: &mut DirectiveRegistry) {
    registry.register("on", on);
    registry.register("bind", bind);
    registry.register("cloak", cloak);
}

/// `r-on="listeners"` wraps the data object in `_g(data,listeners)`.
fn on(el: &mut Element, dir: &Directive, ctx: &mut CompileContext<'_>) -> Result<bool, CompileError> {
    if !dir.modifiers.is_empty() {
        ctx.error("r-on without argument does not support modifiers.", Some(dir.span));
    }
    el.wrap_listeners = dir.value.clone();
    Ok(false)
}

/// `r-bind="attrs"` wraps the data object in `_b(...)`.
fn bind(el: &mut Element, dir: &Directive, _ctx: &mut CompileContext<'_>) -> Result<bool, CompileError> {
    el.wrap_data = dir.value.as_ref().map(|value| BindObject {
        value: value.clone(),
        is_prop: dir.has_modifier("prop"),
        is_sync: dir.has_modifier("sync"),
    });
    Ok(false)
}

fn cloak(_el: &mut Element, _dir: &Directive, _ctx: &mut CompileContext<'_>) -> Result<bool, CompileError> {
    Ok(false)
}
