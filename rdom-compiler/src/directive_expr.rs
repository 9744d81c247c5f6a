use pest::Parser;

use crate::template_ast::ForDescriptor;

#[derive(pest_derive::Parser)]
#[grammar = "directive_expr.pest"]
struct DirectiveExprParser;

/// Parses `alias in source` (or `of`). The alias may carry up to two
/// iterator names, `(item, key, index)`, and destructuring patterns are
/// passed through verbatim.
pub fn parse_for(exp: &str) -> Option<ForDescriptor> {
    let pair = DirectiveExprParser::parse(Rule::for_expression, exp).ok()?.next()?;

    let mut alias = None;
    let mut source = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::for_alias => alias = Some(inner.as_str()),
            Rule::for_source => source = Some(inner.as_str()),
            _ => {}
        }
    }
    let source = source?.trim().to_string();
    let alias = strip_parens(alias?.trim());
    let (alias, iterator1, iterator2) = split_iterators(alias);

    Some(ForDescriptor {
        source,
        alias,
        iterator1,
        iterator2,
    })
}

fn strip_parens(alias: &str) -> &str {
    let alias = alias.strip_prefix('(').unwrap_or(alias);
    alias.strip_suffix(')').unwrap_or(alias)
}

fn is_iterator_segment(s: &str) -> bool {
    !s.contains(['}', ']'])
}

/// Peels at most two trailing `, name` segments off the alias.
fn split_iterators(alias: &str) -> (String, Option<String>, Option<String>) {
    let Some(last_comma) = alias.rfind(',') else {
        return (alias.to_string(), None, None);
    };
    let tail = &alias[last_comma + 1..];
    if !is_iterator_segment(tail) {
        return (alias.to_string(), None, None);
    }
    let head = &alias[..last_comma];
    if let Some(prev_comma) = head.rfind(',') {
        let middle = &head[prev_comma + 1..];
        if is_iterator_segment(middle) {
            return (
                head[..prev_comma].trim().to_string(),
                Some(middle.trim().to_string()),
                Some(tail.trim().to_string()),
            );
        }
    }
    (head.trim().to_string(), Some(tail.trim().to_string()), None)
}

/// `foo`, `foo.bar`, `foo['bar']`, `foo[0]`, `foo[bar]`
pub fn is_method_path(value: &str) -> bool {
    DirectiveExprParser::parse(Rule::method_path, value).is_ok()
}

/// Arrow functions and `function` expressions.
pub fn is_function_expression(value: &str) -> bool {
    DirectiveExprParser::parse(Rule::function_expression, value).is_ok()
}
