//! Listener codegen: modifier guards, handler shapes and event keys.

use std::collections::HashMap;

use lazy_static::lazy_static;
use serde_json::{Value, json};

use crate::directive_expr::{is_function_expression, is_method_path};
use crate::template_ast::{EventBinding, Handler};
use crate::util::{camelize, capitalize, json_string};

lazy_static! {
    static ref KEY_CODES: HashMap<&'static str, Value> = HashMap::from([
        ("esc", json!(27)),
        ("tab", json!(9)),
        ("enter", json!(13)),
        ("space", json!(32)),
        ("up", json!(38)),
        ("left", json!(37)),
        ("right", json!(39)),
        ("down", json!(40)),
        ("delete", json!([8, 46])),
    ]);
    static ref KEY_NAMES: HashMap<&'static str, Value> = HashMap::from([
        ("esc", json!("Escape")),
        ("tab", json!("Tab")),
        ("enter", json!("Enter")),
        ("space", json!(" ")),
        ("up", json!(["Up", "ArrowUp"])),
        ("left", json!(["Left", "ArrowLeft"])),
        ("right", json!(["Right", "ArrowRight"])),
        ("down", json!(["Down", "ArrowDown"])),
        ("delete", json!(["Backspace", "Delete"])),
    ]);
}

const SYSTEM_KEYS: [&str; 4] = ["ctrl", "shift", "alt", "meta"];

fn gen_guard(condition: &str) -> String {
    format!("if({condition})return null;")
}

/// Guard for system keys and mouse buttons.
fn system_guard(modifier: &str) -> Option<String> {
    match modifier {
        "ctrl" | "shift" | "alt" | "meta" => Some(gen_guard(&format!("!$event.{modifier}Key"))),
        "left" => Some(gen_guard("'button' in $event && $event.button !== 0")),
        "middle" => Some(gen_guard("'button' in $event && $event.button !== 1")),
        "right" => Some(gen_guard("'button' in $event && $event.button !== 2")),
        _ => None,
    }
}

fn propagation_guard(modifier: &str) -> Option<String> {
    match modifier {
        "stop" => Some("$event.stopPropagation();".to_string()),
        "prevent" => Some("$event.preventDefault();".to_string()),
        "self" => Some(gen_guard("$event.target !== $event.currentTarget")),
        _ => None,
    }
}

fn js_literal(value: Option<&Value>) -> String {
    value.map_or_else(|| "undefined".to_string(), Value::to_string)
}

fn gen_filter_code(key: &str) -> String {
    if let Ok(code) = key.parse::<u32>() {
        if code != 0 {
            return format!("$event.keyCode!=={code}");
        }
    }
    format!(
        "_k($event.keyCode,{},{},$event.key,{})",
        json_string(key),
        js_literal(KEY_CODES.get(key)),
        js_literal(KEY_NAMES.get(key)),
    )
}

fn gen_key_filter(keys: &[&str]) -> String {
    let filters: Vec<String> = keys.iter().map(|k| gen_filter_code(k)).collect();
    format!("if(!('button' in $event)&&{})return null;", filters.join("&&"))
}

/// Guard prelude for a modifier list: key identity first, then system
/// keys and buttons, then propagation, each group in declared order.
pub fn gen_modifier_prelude(modifiers: &[String]) -> String {
    let mut keys: Vec<&str> = Vec::new();
    let mut system = String::new();
    let mut propagation = String::new();

    for modifier in modifiers {
        let modifier = modifier.as_str();
        if let Some(guard) = propagation_guard(modifier) {
            propagation.push_str(&guard);
        } else if let Some(guard) = system_guard(modifier) {
            system.push_str(&guard);
            if KEY_CODES.contains_key(modifier) {
                keys.push(modifier);
            }
        } else if modifier == "exact" {
            let unlisted: Vec<String> = SYSTEM_KEYS
                .iter()
                .filter(|k| !modifiers.iter().any(|m| m == *k))
                .map(|k| format!("$event.{k}Key"))
                .collect();
            if !unlisted.is_empty() {
                system.push_str(&gen_guard(&unlisted.join("||")));
            }
        } else {
            keys.push(modifier);
        }
    }

    let mut code = String::new();
    if !keys.is_empty() {
        code.push_str(&gen_key_filter(&keys));
    }
    code.push_str(&system);
    code.push_str(&propagation);
    code
}

pub fn gen_handler(handler: &Handler) -> String {
    let value = handler.value.as_str();
    let method_path = is_method_path(value);
    let function_expression = is_function_expression(value);

    match &handler.modifiers {
        None if method_path || function_expression => value.to_string(),
        None => format!("function($event){{{value}}}"),
        Some(modifiers) => {
            let prelude = gen_modifier_prelude(modifiers);
            let call = if method_path {
                format!("return {value}($event)")
            } else if function_expression {
                format!("return ({value})($event)")
            } else {
                value.to_string()
            };
            format!("function($event){{{prelude}{call}}}")
        }
    }
}

/// `on` + PascalCase name + `Capture`? + `Once`?
pub fn event_key(event: &EventBinding) -> String {
    let mut suffix = String::new();
    if event.capture {
        suffix.push_str("Capture");
    }
    if event.once {
        suffix.push_str("Once");
    }
    if event.dynamic {
        if suffix.is_empty() {
            format!("[_ek({})]", event.name)
        } else {
            format!("[_ek({},{})]", event.name, json_string(&suffix))
        }
    } else {
        json_string(&format!("on{}{suffix}", capitalize(&camelize(&event.name))))
    }
}

/// Data-object fragment for every listener, each entry ending with `,`.
pub fn gen_handlers(events: &[EventBinding]) -> String {
    let mut out = String::new();
    for event in events {
        let code = match event.handlers.as_slice() {
            [] => "function(){}".to_string(),
            [single] => gen_handler(single),
            many => {
                let all: Vec<String> = many.iter().map(gen_handler).collect();
                format!("_p({})", all.join(","))
            }
        };
        out.push_str(&event_key(event));
        out.push(':');
        out.push_str(&code);
        out.push(',');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_mods(value: &str, mods: &[&str]) -> Handler {
        Handler {
            value: value.to_string(),
            modifiers: Some(mods.iter().map(|m| m.to_string()).collect()),
        }
    }

    #[test]
    fn key_guard_precedes_prevent() {
        assert_eq!(
            gen_handler(&with_mods("onInput", &["prevent", "enter"])),
            "function($event){if(!('button' in $event)&&_k($event.keyCode,\"enter\",13,$event.key,\"Enter\"))return null;$event.preventDefault();return onInput($event)}"
        );
    }

    #[test]
    fn exact_lists_only_unlisted_keys() {
        assert_eq!(
            gen_modifier_prelude(&["ctrl".to_string(), "exact".to_string()]),
            "if(!$event.ctrlKey)return null;if($event.shiftKey||$event.altKey||$event.metaKey)return null;"
        );
    }

    #[test]
    fn left_button_also_filters_arrow_key() {
        let prelude = gen_modifier_prelude(&["left".to_string()]);
        assert!(prelude.starts_with("if(!('button' in $event)&&_k($event.keyCode,\"left\",37,"));
        assert!(prelude.ends_with("if('button' in $event && $event.button !== 0)return null;"));
    }

    #[test]
    fn dynamic_event_key() {
        let event = EventBinding {
            name: "name".to_string(),
            dynamic: true,
            capture: true,
            once: false,
            handlers: Vec::new(),
        };
        assert_eq!(event_key(&event), "[_ek(name,\"Capture\")]");
    }
}
