use crate::options::TagTable;
use crate::template_ast::{Attr, Span};
use crate::util::decode_entities;

/// Receives markup events in document order.
pub trait TokenSink {
    type Error;

    fn start_tag(&mut self, tag: &str, attrs: Vec<Attr>, unary: bool, span: Span) -> Result<(), Self::Error>;
    fn end_tag(&mut self, tag: &str, span: Span) -> Result<(), Self::Error>;
    fn chars(&mut self, text: &str, span: Span) -> Result<(), Self::Error>;
    fn comment(&mut self, text: &str, span: Span) -> Result<(), Self::Error>;
    fn warn(&mut self, message: String, span: Option<Span>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    TagOpen,
    EndTag,
    Comment,
    Cdata,
    ConditionalComment,
    Doctype,
    RawText,
}

struct OpenTag {
    tag: String,
    lower: String,
    span: Span,
}

struct StartTag {
    tag: String,
    attrs: Vec<Attr>,
    unary_slash: bool,
    span: Span,
}

pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    tags: &'a TagTable,
    keep_comments: bool,
    stack: Vec<OpenTag>,
}

/// Tokenizes `input`, closing whatever is still open at the end.
pub fn tokenize<S: TokenSink>(input: &str, tags: &TagTable, keep_comments: bool, sink: &mut S) -> Result<(), S::Error> {
    Tokenizer {
        input,
        pos: 0,
        tags,
        keep_comments,
        stack: Vec::new(),
    }
    .run(sink)
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || (!c.is_ascii() && c.is_alphabetic())
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | ':') || (!c.is_ascii() && c.is_alphanumeric())
}

fn is_attr_name_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '"' | '\'' | '<' | '>' | '/' | '=')
}

fn ignores_first_newline(tag: &str) -> bool {
    tag.eq_ignore_ascii_case("pre") || tag.eq_ignore_ascii_case("textarea")
}

impl<'a> Tokenizer<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn last_tag(&self) -> Option<&str> {
        self.stack.last().map(|t| t.lower.as_str())
    }

    fn state(&self) -> State {
        if self.last_tag().is_some_and(|t| self.tags.is_raw_text(t)) {
            return State::RawText;
        }
        let rest = self.rest();
        if !rest.starts_with('<') {
            State::Text
        } else if rest.starts_with("<!--") {
            State::Comment
        } else if rest.starts_with("<![CDATA[") {
            State::Cdata
        } else if rest.starts_with("<![") {
            State::ConditionalComment
        } else if rest.get(..10).is_some_and(|p| p.eq_ignore_ascii_case("<!DOCTYPE ")) {
            State::Doctype
        } else if rest.starts_with("</") {
            State::EndTag
        } else {
            State::TagOpen
        }
    }

    fn run<S: TokenSink>(mut self, sink: &mut S) -> Result<(), S::Error> {
        while self.pos < self.input.len() {
            let start = self.pos;
            match self.state() {
                State::RawText => {
                    self.consume_raw_text(sink)?;
                    continue;
                }
                State::Comment => {
                    if let Some(end) = self.rest().find("-->") {
                        if self.keep_comments {
                            // `<!-->` and `<!--->` close before the opener ends.
                            let text = self.rest().get(4..end).unwrap_or_default();
                            sink.comment(text, Span::new(start, start + end + 3))?;
                        }
                        self.pos += end + 3;
                        continue;
                    }
                }
                State::Cdata => {
                    if let Some(end) = self.rest().find("]]>") {
                        let text = &self.rest()[9..end];
                        if !text.is_empty() {
                            sink.chars(text, Span::new(start + 9, start + end))?;
                        }
                        self.pos += end + 3;
                        continue;
                    }
                }
                State::ConditionalComment => {
                    if let Some(end) = self.rest().find("]>") {
                        self.pos += end + 2;
                        continue;
                    }
                }
                State::Doctype => {
                    if let Some(end) = self.rest().find('>') {
                        self.pos += end + 1;
                        continue;
                    }
                }
                State::EndTag => {
                    if let Some((name, len)) = self.match_end_tag(self.pos) {
                        self.pos += len;
                        self.parse_end_tag(Some(name), Span::new(start, self.pos), sink)?;
                        continue;
                    }
                }
                State::TagOpen => {
                    if let Some(tag) = self.parse_start_tag() {
                        let ignore_newline = ignores_first_newline(&tag.tag);
                        self.handle_start_tag(tag, sink)?;
                        if ignore_newline && self.rest().starts_with('\n') {
                            self.pos += 1;
                        }
                        continue;
                    }
                }
                State::Text => {}
            }

            let end = self.scan_text_end();
            if end > self.pos {
                let text = &self.input[self.pos..end];
                self.pos = end;
                sink.chars(text, Span::new(start, end))?;
                continue;
            }

            // Nothing could be consumed: keep the remainder as text.
            let rest = self.rest();
            sink.chars(rest, Span::new(start, self.input.len()))?;
            sink.warn(
                format!("Mal-formatted tag at end of template: \"{rest}\""),
                Some(Span::new(start, self.input.len())),
            );
            self.pos = self.input.len();
        }

        let end = self.input.len();
        self.parse_end_tag(None, Span::new(end, end), sink)
    }

    /// Start of the next markup construct at or after `pos`.
    fn scan_text_end(&self) -> usize {
        let mut cursor = self.pos;
        while let Some(rel) = self.input[cursor..].find('<') {
            let at = cursor + rel;
            if self.starts_markup(at) {
                return at;
            }
            cursor = at + 1;
        }
        self.input.len()
    }

    fn starts_markup(&self, at: usize) -> bool {
        let rest = &self.input[at..];
        rest.starts_with("<!--")
            || rest.starts_with("<![")
            || self.match_end_tag(at).is_some()
            || rest[1..].chars().next().is_some_and(is_name_start)
    }

    /// `</name ...>` at `at`: the tag name and the byte length of the match.
    fn match_end_tag(&self, at: usize) -> Option<(&'a str, usize)> {
        let rest = &self.input[at..];
        let after = rest.strip_prefix("</")?;
        let name_len = self.name_len(after)?;
        let close = after[name_len..].find('>')?;
        Some((&after[..name_len], 2 + name_len + close + 1))
    }

    fn name_len(&self, s: &str) -> Option<usize> {
        let mut chars = s.char_indices();
        match chars.next() {
            Some((_, c)) if is_name_start(c) => {}
            _ => return None,
        }
        Some(
            chars
                .find(|&(_, c)| !is_name_char(c))
                .map(|(i, _)| i)
                .unwrap_or(s.len()),
        )
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    /// Reads `<tag attr...>`; on failure the cursor is left untouched.
    fn parse_start_tag(&mut self) -> Option<StartTag> {
        let start = self.pos;
        let name_len = self.name_len(&self.rest()[1..])?;
        let tag = self.rest()[1..1 + name_len].to_string();
        self.pos += 1 + name_len;

        let mut attrs = Vec::new();
        loop {
            let before_ws = self.pos;
            self.skip_ws();
            let rest = self.rest();
            if rest.starts_with("/>") {
                self.pos += 2;
                return Some(StartTag {
                    tag,
                    attrs,
                    unary_slash: true,
                    span: Span::new(start, self.pos),
                });
            }
            if rest.starts_with('>') {
                self.pos += 1;
                return Some(StartTag {
                    tag,
                    attrs,
                    unary_slash: false,
                    span: Span::new(start, self.pos),
                });
            }
            // Attributes must be separated from the tag name and each other.
            if self.pos == before_ws && !attrs.is_empty() {
                self.pos = start;
                return None;
            }
            match self.read_attribute() {
                Some(attr) => attrs.push(attr),
                None => {
                    self.pos = start;
                    return None;
                }
            }
        }
    }

    fn read_attribute(&mut self) -> Option<Attr> {
        let start = self.pos;
        let name_len = attr_name_len(self.rest());
        if name_len == 0 {
            return None;
        }
        let name = self.rest()[..name_len].to_string();
        self.pos += name_len;

        let after_name = self.pos;
        self.skip_ws();
        if !self.rest().starts_with('=') {
            self.pos = after_name;
            return Some(Attr {
                name,
                value: String::new(),
                span: Span::new(start, self.pos),
            });
        }
        self.pos += 1;
        self.skip_ws();

        let rest = self.rest();
        let raw = match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let close = rest[1..].find(quote)?;
                self.pos += close + 2;
                &rest[1..close + 1]
            }
            Some(_) => {
                let len = rest
                    .find(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '=' | '<' | '>' | '`'))
                    .unwrap_or(rest.len());
                if len == 0 {
                    return None;
                }
                self.pos += len;
                &rest[..len]
            }
            None => return None,
        };
        Some(Attr {
            name,
            value: decode_entities(raw),
            span: Span::new(start, self.pos),
        })
    }

    fn handle_start_tag<S: TokenSink>(&mut self, start: StartTag, sink: &mut S) -> Result<(), S::Error> {
        let lower = start.tag.to_ascii_lowercase();
        if self.tags.expect_html {
            if self.last_tag() == Some("p") && self.tags.is_non_phrasing(&lower) {
                self.parse_end_tag(Some("p"), start.span, sink)?;
            }
            if self.tags.can_be_left_open(&lower) && self.last_tag() == Some(lower.as_str()) {
                self.parse_end_tag(Some(&start.tag), start.span, sink)?;
            }
        }

        let unary = self.tags.is_unary(&lower) || start.unary_slash;
        if !unary {
            self.stack.push(OpenTag {
                tag: start.tag.clone(),
                lower,
                span: start.span,
            });
        }
        sink.start_tag(&start.tag, start.attrs, unary, start.span)
    }

    fn parse_end_tag<S: TokenSink>(&mut self, name: Option<&str>, span: Span, sink: &mut S) -> Result<(), S::Error> {
        let lower = name.map(str::to_ascii_lowercase);
        let pos = match &lower {
            Some(lower) => self.stack.iter().rposition(|t| &t.lower == lower),
            None => Some(0),
        };

        match pos {
            Some(pos) => {
                for i in (pos..self.stack.len()).rev() {
                    let open = &self.stack[i];
                    if (i > pos || name.is_none()) && !self.tags.can_be_left_open(&open.lower) {
                        sink.warn(format!("tag <{}> has no matching end tag.", open.tag), Some(open.span));
                    }
                    sink.end_tag(&open.tag, span)?;
                }
                self.stack.truncate(pos);
            }
            None => {
                let name = name.unwrap_or_default();
                match lower.as_deref() {
                    Some("br") => sink.start_tag(name, Vec::new(), true, span)?,
                    Some("p") => {
                        sink.start_tag(name, Vec::new(), false, span)?;
                        sink.end_tag(name, span)?;
                    }
                    _ => sink.warn(format!("Unmatched end tag </{name}>."), Some(span)),
                }
            }
        }
        Ok(())
    }

    fn consume_raw_text<S: TokenSink>(&mut self, sink: &mut S) -> Result<(), S::Error> {
        let (tag, lower) = match self.stack.last() {
            Some(open) => (open.tag.clone(), open.lower.clone()),
            None => return Ok(()),
        };
        let start = self.pos;
        let rest = self.rest();
        let needle = format!("</{lower}");
        let close = rest
            .to_ascii_lowercase()
            .find(&needle)
            .and_then(|at| rest[at..].find('>').map(|gt| (at, at + gt + 1)));

        let (text_end, consumed) = match close {
            Some((at, end)) => (at, end),
            None => (rest.len(), rest.len()),
        };
        let mut text = &rest[..text_end];
        let mut text_start = start;
        if ignores_first_newline(&lower) && text.starts_with('\n') {
            text = &text[1..];
            text_start += 1;
        }
        if !text.is_empty() {
            sink.chars(text, Span::new(text_start, start + text_end))?;
        }
        self.pos = start + consumed;
        if close.is_some() {
            self.parse_end_tag(Some(&tag), Span::new(start + text_end, self.pos), sink)?;
        } else {
            // Unterminated; the final flush reports it.
            self.pos = self.input.len();
        }
        Ok(())
    }
}

/// Attribute names may contain a bracketed dynamic argument, `:[key]`.
fn attr_name_len(s: &str) -> usize {
    let mut len = 0;
    let mut chars = s.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '[' {
            if let Some(close) = s[i..].find(']') {
                if !s[i..i + close].contains('=') {
                    while chars.peek().is_some_and(|&(j, _)| j <= i + close) {
                        chars.next();
                    }
                    len = i + close + 1;
                    continue;
                }
            }
        }
        if !is_attr_name_char(c) {
            break;
        }
        len = i + c.len_utf8();
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        warnings: Vec<String>,
    }

    impl TokenSink for Recorder {
        type Error = ();

        fn start_tag(&mut self, tag: &str, attrs: Vec<Attr>, unary: bool, _span: Span) -> Result<(), ()> {
            let attrs: Vec<String> = attrs.iter().map(|a| format!("{}={}", a.name, a.value)).collect();
            self.events
                .push(format!("<{tag}{}{}>", if attrs.is_empty() { String::new() } else { format!(" {}", attrs.join(" ")) }, if unary { "/" } else { "" }));
            Ok(())
        }

        fn end_tag(&mut self, tag: &str, _span: Span) -> Result<(), ()> {
            self.events.push(format!("</{tag}>"));
            Ok(())
        }

        fn chars(&mut self, text: &str, _span: Span) -> Result<(), ()> {
            self.events.push(format!("'{text}'"));
            Ok(())
        }

        fn comment(&mut self, text: &str, _span: Span) -> Result<(), ()> {
            self.events.push(format!("!{text}"));
            Ok(())
        }

        fn warn(&mut self, message: String, _span: Option<Span>) {
            self.warnings.push(message);
        }
    }

    fn run(input: &str, tags: &TagTable) -> Recorder {
        let mut rec = Recorder::default();
        tokenize(input, tags, true, &mut rec).unwrap();
        rec
    }

    #[test]
    fn reads_attributes_in_all_quote_styles() {
        let rec = run(r#"<a href="x" title='y' data-n=3 hidden :[key].prop="v"></a>"#, &TagTable::default());
        assert_eq!(rec.events[0], "<a href=x title=y data-n=3 hidden= :[key].prop=v>");
        assert_eq!(rec.events[1], "</a>");
        assert!(rec.warnings.is_empty());
    }

    #[test]
    fn raw_text_is_not_tokenized() {
        let rec = run("<script>if (a<b) {}</script>", &TagTable::default());
        assert_eq!(rec.events, vec!["<script>", "'if (a<b) {}'", "</script>"]);
    }

    #[test]
    fn comments_cdata_and_doctype() {
        let rec = run("<!DOCTYPE html><div><!--c--><![CDATA[x]]></div>", &TagTable::default());
        assert_eq!(rec.events, vec!["<div>", "!c", "'x'", "</div>"]);
    }

    #[test]
    fn warns_on_unclosed_and_unmatched() {
        let rec = run("<div><span></div></em>", &TagTable::default());
        assert_eq!(rec.warnings[0], "tag <span> has no matching end tag.");
        assert_eq!(rec.warnings[1], "Unmatched end tag </em>.");
    }

    #[test]
    fn malformed_tag_is_kept_as_text() {
        let rec = run("<div><span id=\"x\"</div>", &TagTable::default());
        assert!(rec.warnings.iter().any(|w| w.starts_with("Mal-formatted tag at end of template")));
    }
}
