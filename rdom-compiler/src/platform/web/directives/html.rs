use crate::diagnostics::CompileContext;
use crate::error::CompileError;
use crate::template_ast::{Directive, Element};

pub fn html(el: &mut Element, dir: &Directive, _ctx: &mut CompileContext<'_>) -> Result<bool, CompileError> {
    if let Some(value) = &dir.value {
        el.add_prop("innerHTML", format!("_s({value})"), false);
    }
    Ok(false)
}
