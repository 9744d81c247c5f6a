use crate::filters::parse_filters;
use crate::template_ast::TextToken;

const DEFAULT_OPEN: &str = "{{";
const DEFAULT_CLOSE: &str = "}}";

/// Splits `text` into literal and expression tokens. Returns `None` when the
/// text contains no interpolation.
pub fn parse_text(text: &str, delimiters: Option<&(String, String)>) -> Option<Vec<TextToken>> {
    let (open, close) = match delimiters {
        Some((open, close)) if !open.is_empty() && !close.is_empty() => (open.as_str(), close.as_str()),
        _ => (DEFAULT_OPEN, DEFAULT_CLOSE),
    };

    let mut tokens = Vec::new();
    let mut has_expression = false;
    let mut last = 0usize;
    let mut cursor = 0usize;

    while let Some(rel_open) = text[cursor..].find(open) {
        let open_at = cursor + rel_open;
        let body_start = open_at + open.len();
        // An interpolation holds at least one character.
        let Some(first) = text[body_start..].chars().next() else {
            break;
        };
        let search_from = body_start + first.len_utf8();
        let Some(rel_close) = text[search_from..].find(close) else {
            break;
        };
        let close_at = search_from + rel_close;

        if open_at > last {
            tokens.push(TextToken::Literal(text[last..open_at].to_string()));
        }
        let body = text[body_start..close_at].trim();
        tokens.push(TextToken::Expression(parse_filters(body)));
        has_expression = true;

        last = close_at + close.len();
        cursor = last;
    }

    if !has_expression {
        return None;
    }
    if last < text.len() {
        tokens.push(TextToken::Literal(text[last..].to_string()));
    }
    Some(tokens)
}

/// Render-function expression for a token list: `"lit"+_s(expr)+...`
pub fn tokens_to_expression(tokens: &[TextToken]) -> String {
    tokens
        .iter()
        .map(|t| match t {
            TextToken::Literal(s) => crate::util::json_string(s),
            TextToken::Expression(e) => format!("_s({e})"),
        })
        .collect::<Vec<_>>()
        .join("+")
}
