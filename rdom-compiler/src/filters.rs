//! `expr | filterA | filterB(arg)` rewriting.
//!
//! The scanner walks the expression once, tracking string, template and
//! regex literals plus bracket depth so that only top-level single `|`
//! characters split filters.

fn is_division_operand(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ')' | '.' | '+' | '-' | '$' | ']')
}

/// Rewrites a (possibly) filtered expression into nested `_f("name")(...)`
/// calls. Expressions without filters come back trimmed.
pub fn parse_filters(exp: &str) -> String {
    let chars: Vec<char> = exp.chars().collect();
    let slice = |from: usize, to: usize| -> String { chars[from..to].iter().collect::<String>().trim().to_string() };

    let mut in_single = false;
    let mut in_double = false;
    let mut in_template = false;
    let mut in_regex = false;
    let (mut curly, mut square, mut paren) = (0i32, 0i32, 0i32);
    let mut last_filter_index = 0usize;
    let mut expression: Option<String> = None;
    let mut filters: Vec<String> = Vec::new();
    let mut prev: char;
    let mut c = '\0';

    for i in 0..chars.len() {
        prev = c;
        c = chars[i];
        if in_single {
            if c == '\'' && prev != '\\' {
                in_single = false;
            }
        } else if in_double {
            if c == '"' && prev != '\\' {
                in_double = false;
            }
        } else if in_template {
            if c == '`' && prev != '\\' {
                in_template = false;
            }
        } else if in_regex {
            if c == '/' && prev != '\\' {
                in_regex = false;
            }
        } else if c == '|'
            && chars.get(i + 1) != Some(&'|')
            && (i == 0 || chars[i - 1] != '|')
            && curly == 0
            && square == 0
            && paren == 0
        {
            if expression.is_none() {
                last_filter_index = i + 1;
                expression = Some(slice(0, i));
            } else {
                filters.push(slice(last_filter_index, i));
                last_filter_index = i + 1;
            }
        } else {
            match c {
                '"' => in_double = true,
                '\'' => in_single = true,
                '`' => in_template = true,
                '(' => paren += 1,
                ')' => paren -= 1,
                '[' => square += 1,
                ']' => square -= 1,
                '{' => curly += 1,
                '}' => curly -= 1,
                _ => {}
            }
            if c == '/' {
                let before = chars[..i].iter().rev().find(|&&p| p != ' ');
                if before.is_none_or(|&p| !is_division_operand(p)) {
                    in_regex = true;
                }
            }
        }
    }

    let mut expression = match expression {
        None => return slice(0, chars.len()),
        Some(expression) => expression,
    };
    if last_filter_index != 0 {
        filters.push(slice(last_filter_index, chars.len()));
    }
    for filter in &filters {
        expression = wrap_filter(&expression, filter);
    }
    expression
}

/// `_f("name")(exp[,args])`
pub fn wrap_filter(exp: &str, filter: &str) -> String {
    match filter.find('(') {
        None => format!("_f(\"{filter}\")({exp})"),
        Some(i) => {
            let name = &filter[..i];
            let args = &filter[i + 1..];
            if args == ")" {
                format!("_f(\"{name}\")({exp}{args}")
            } else {
                format!("_f(\"{name}\")({exp},{args}")
            }
        }
    }
}
