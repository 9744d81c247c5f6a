use log::trace;

use crate::diagnostics::CompileContext;
use crate::error::CompileError;
use crate::model::{gen_assignment_code, gen_component_model};
use crate::template_ast::{Directive, Element};

/// Two-way binding. Native form controls get a prop plus a `change`
/// listener and keep the directive for the runtime; components only get
/// the prop/listener pair.
pub fn model(el: &mut Element, dir: &Directive, ctx: &mut CompileContext<'_>) -> Result<bool, CompileError> {
    let value = dir.value.clone().unwrap_or_default();
    let number = dir.has_modifier("number");
    let trim = dir.has_modifier("trim");
    let tag = el.tag.clone();
    let type_attr = el.attr("type").map(str::to_string);
    let prefix = ctx.options.directive_prefix.clone();
    trace!("{prefix}model=\"{value}\" on <{tag}>");

    if tag == "input" && type_attr.as_deref() == Some("file") {
        ctx.error(
            format!(
                "<{tag} {prefix}model=\"{value}\" type=\"file\">:\nFile inputs are read only. \
Use a {prefix}on:change listener instead."
            ),
            Some(dir.span),
        );
    }

    if el.component.is_some() {
        gen_component_model(el, &value, trim, number);
        return Ok(false);
    }
    match (tag.as_str(), type_attr.as_deref()) {
        ("select", _) => gen_select(el, &value, number),
        ("input", Some("checkbox")) => gen_checkbox_model(el, &value, number, &prefix),
        ("input", Some("radio")) => gen_radio_model(el, &value, number, &prefix),
        ("input", _) | ("textarea", _) => gen_default_model(el, dir, &value, ctx),
        _ if !ctx.options.tags.is_reserved(&tag) => {
            gen_component_model(el, &value, trim, number);
            return Ok(false);
        }
        _ => ctx.error(
            format!(
                "<{tag} {prefix}model=\"{value}\">: {prefix}model is not supported on this element type. \
If you are working with contenteditable, it's recommended to wrap a library dedicated \
for that purpose inside a custom component."
            ),
            Some(dir.span),
        ),
    }
    Ok(true)
}

fn gen_checkbox_model(el: &mut Element, value: &str, number: bool, prefix: &str) {
    let value_binding = el
        .take_binding_attr("value", prefix, true)
        .unwrap_or_else(|| "null".to_string());
    let true_binding = el
        .take_binding_attr("true-value", prefix, true)
        .unwrap_or_else(|| "true".to_string());
    let false_binding = el
        .take_binding_attr("false-value", prefix, true)
        .unwrap_or_else(|| "false".to_string());

    let checked_when_scalar = if true_binding == "true" {
        format!(":({value})")
    } else {
        format!(":_q({value},{true_binding})")
    };
    el.add_prop(
        "checked",
        format!("Array.isArray({value})?_i({value},{value_binding})>-1{checked_when_scalar}"),
        false,
    );

    let item = if number { format!("_n({value_binding})") } else { value_binding };
    let code = format!(
        "var $$a={value},$$el=$event.target,$$c=$$el.checked?({true_binding}):({false_binding});\
if(Array.isArray($$a)){{var $$v={item},$$i=_i($$a,$$v);\
if($$el.checked){{$$i<0&&({add})}}else{{$$i>-1&&({remove})}}}}else{{{assign}}}",
        add = gen_assignment_code(value, "$$a.concat([$$v])"),
        remove = gen_assignment_code(value, "$$a.slice(0,$$i).concat($$a.slice($$i+1))"),
        assign = gen_assignment_code(value, "$$c"),
    );
    el.add_handler("change", &code, None, true, false);
}

fn gen_radio_model(el: &mut Element, value: &str, number: bool, prefix: &str) {
    let mut value_binding = el
        .take_binding_attr("value", prefix, true)
        .unwrap_or_else(|| "null".to_string());
    if number {
        value_binding = format!("_n({value_binding})");
    }
    el.add_prop("checked", format!("_q({value},{value_binding})"), false);
    el.add_handler("change", &gen_assignment_code(value, &value_binding), None, true, false);
}

fn gen_select(el: &mut Element, value: &str, number: bool) {
    let selected = format!(
        "Array.prototype.filter.call($event.target.options,function(o){{return o.selected}})\
.map(function(o){{var val = \"_value\" in o ? o._value : o.value;return {}}})",
        if number { "_n(val)" } else { "val" }
    );
    let code = format!(
        "var $$selectedVal = {selected}; {}",
        gen_assignment_code(value, "$event.target.multiple ? $$selectedVal : $$selectedVal[0]")
    );
    el.add_handler("change", &code, None, true, false);
}

/// Text-like inputs and textareas: `value` prop and a `change` listener.
fn gen_default_model(el: &mut Element, dir: &Directive, value: &str, ctx: &mut CompileContext<'_>) {
    let options = ctx.options;
    let prefix = &options.directive_prefix;
    let type_attr = el.attr("type").map(str::to_string);

    let bind_value = format!("{prefix}bind:value");
    let has_type_binding = el.has_attr(":type") || el.has_attr(&format!("{prefix}bind:type"));
    if let Some((binding, bound)) = [":value", bind_value.as_str()]
        .into_iter()
        .find_map(|name| el.attr(name).map(|v| (name.to_string(), v.to_string())))
    {
        if !has_type_binding {
            ctx.error(
                format!(
                    "{binding}=\"{bound}\" conflicts with {prefix}model on the same element \
because the latter already expands to a value binding internally"
                ),
                Some(dir.span),
            );
        }
    }

    let lazy = dir.has_modifier("lazy");
    let number = dir.has_modifier("number");
    let trim = dir.has_modifier("trim");
    let needs_composition_guard = !lazy && type_attr.as_deref() != Some("range");

    let mut value_expression = if trim {
        "$event.target.value.trim()".to_string()
    } else {
        "$event.target.value".to_string()
    };
    if number {
        value_expression = format!("_n({value_expression})");
    }
    let mut code = gen_assignment_code(value, &value_expression);
    if needs_composition_guard {
        code = format!("if($event.target.composing)return;{code}");
    }

    el.add_prop("value", format!("({value})"), false);
    el.add_handler("change", &code, None, true, false);
    if trim || number {
        el.add_handler("blur", "$forceUpdate()", None, false, false);
    }
}
