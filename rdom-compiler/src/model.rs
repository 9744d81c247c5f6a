//! Two-way binding helpers shared by native and component `r-model`.

use crate::template_ast::Element;

/// A bound path split into its base expression and access segments.
/// Dot segments come back as quoted literals, bracket segments verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParse {
    pub exp: String,
    pub tokens: Vec<String>,
}

pub fn parse_model(val: &str) -> ModelParse {
    let value = val.trim();
    if !value.contains(['[', ']', '.']) {
        return ModelParse {
            exp: value.to_string(),
            tokens: vec![value.to_string()],
        };
    }

    let bytes = value.as_bytes();
    let mut tokens = Vec::new();
    let mut start = 0usize;
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'.' if depth == 0 => {
                if i == 0 || bytes[i - 1] != b']' {
                    tokens.push(format!("\"{}\"", &value[start..i]));
                }
                start = i + 1;
            }
            b'[' => {
                if depth == 0 {
                    if start != i {
                        let quote = if i > 0 && bytes[i - 1] == b']' { "" } else { "\"" };
                        tokens.push(format!("{quote}{}{quote}", &value[start..i]));
                    }
                    start = i + 1;
                }
                depth += 1;
            }
            b']' => {
                depth -= 1;
                if depth == 0 {
                    tokens.push(value[start..i].to_string());
                    start = i + 1;
                }
            }
            _ => {}
        }
    }
    if start < value.len() {
        tokens.push(format!("\"{}\"", &value[start..]));
    }

    let last_len = tokens.last().map(String::len).unwrap_or(0);
    let trailing = if value.ends_with(']') {
        last_len + 2
    } else {
        last_len.saturating_sub(1)
    };
    let exp = value
        .get(..value.len().saturating_sub(trailing))
        .unwrap_or_default()
        .to_string();
    ModelParse { exp, tokens }
}

/// Statement assigning `assignment` to the bound path.
pub fn gen_assignment_code(value: &str, assignment: &str) -> String {
    let res = parse_model(value);
    if res.tokens.len() <= 1 {
        format!("{value}={assignment}")
    } else if value.trim_start().starts_with("state.") {
        format!("$set(state, [{}], {assignment})", res.tokens[1..].join(","))
    } else {
        let last = &res.tokens[res.tokens.len() - 1];
        format!("$set({}, {last}, {assignment})", res.exp)
    }
}

/// `r-model` on a component: a `value` prop plus a `change` listener.
pub fn gen_component_model(el: &mut Element, value: &str, trim: bool, number: bool) {
    let base = "$$v";
    let mut value_expression = base.to_string();
    if trim {
        value_expression = format!("(typeof {base} === 'string'? {base}.trim(): {base})");
    }
    if number {
        value_expression = format!("_n({value_expression})");
    }
    let assignment = gen_assignment_code(value, &value_expression);

    el.add_prop("value", format!("({value})"), false);
    el.add_handler("change", &format!("function ({base}) {{{assignment}}}"), None, true, false);
}
