use std::collections::HashSet;

use crate::options::TagTable;

const HTML_TAGS: &[&str] = &[
    "html", "body", "base", "head", "link", "meta", "style", "title", "address", "article", "aside", "footer",
    "header", "h1", "h2", "h3", "h4", "h5", "h6", "hgroup", "nav", "section", "div", "dd", "dl", "dt",
    "figcaption", "figure", "picture", "hr", "img", "li", "main", "ol", "p", "pre", "ul", "a", "b", "abbr", "bdi",
    "bdo", "br", "cite", "code", "data", "dfn", "em", "i", "kbd", "mark", "q", "rp", "rt", "rtc", "ruby", "s",
    "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var", "wbr", "area", "audio", "map", "track",
    "video", "embed", "object", "param", "source", "canvas", "script", "noscript", "del", "ins", "caption", "col",
    "colgroup", "table", "thead", "tbody", "td", "th", "tr", "button", "datalist", "fieldset", "form", "input",
    "label", "legend", "meter", "optgroup", "option", "output", "progress", "select", "textarea", "details",
    "dialog", "menu", "menuitem", "summary", "content", "element", "shadow", "template", "blockquote", "iframe",
    "tfoot",
];

const SVG_TAGS: &[&str] = &[
    "svg", "animate", "circle", "clippath", "cursor", "defs", "desc", "ellipse", "filter", "font-face",
    "foreignObject", "g", "glyph", "image", "line", "marker", "mask", "missing-glyph", "path", "pattern",
    "polygon", "polyline", "rect", "switch", "symbol", "text", "textpath", "tspan", "use", "view",
];

const UNARY_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "frame", "hr", "img", "input", "isindex", "keygen", "link", "meta",
    "param", "source", "track", "wbr",
];

// Elements whose end tag may be omitted.
const CAN_BE_LEFT_OPEN: &[&str] = &[
    "colgroup", "dd", "dt", "li", "options", "p", "td", "tfoot", "th", "thead", "tr", "source",
];

const NON_PHRASING: &[&str] = &[
    "address", "article", "aside", "base", "blockquote", "body", "caption", "col", "colgroup", "dd", "details",
    "dialog", "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4",
    "h5", "h6", "head", "header", "hgroup", "hr", "html", "legend", "li", "menuitem", "meta", "optgroup",
    "option", "param", "rp", "rt", "source", "style", "summary", "tbody", "td", "tfoot", "th", "thead", "title",
    "tr", "track",
];

fn set(tags: &[&'static str]) -> HashSet<&'static str> {
    tags.iter().copied().collect()
}

pub fn tag_namespace(tag: &str) -> Option<&'static str> {
    if SVG_TAGS.contains(&tag) {
        Some("svg")
    } else if tag == "math" {
        Some("math")
    } else {
        None
    }
}

pub fn web_tag_table() -> TagTable {
    TagTable {
        expect_html: true,
        unary: set(UNARY_TAGS),
        can_be_left_open: set(CAN_BE_LEFT_OPEN),
        non_phrasing: set(NON_PHRASING),
        reserved: HTML_TAGS.iter().chain(SVG_TAGS).copied().collect(),
        pre: set(&["pre"]),
        namespace: tag_namespace,
        ..TagTable::default()
    }
}

/// Attributes that have to be bound as DOM properties to stay in sync.
pub fn must_use_prop(tag: &str, type_attr: Option<&str>, attr: &str) -> bool {
    let accepts_value = matches!(tag, "input" | "textarea" | "option" | "select" | "progress");
    (attr == "value" && accepts_value && type_attr != Some("button"))
        || (attr == "selected" && tag == "option")
        || (attr == "checked" && tag == "input")
        || (attr == "muted" && tag == "video")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_on_button_input_stays_an_attribute() {
        assert!(must_use_prop("input", Some("text"), "value"));
        assert!(!must_use_prop("input", Some("button"), "value"));
        assert!(!must_use_prop("p", None, "value"));
    }

    #[test]
    fn svg_children_get_a_namespace() {
        let tags = web_tag_table();
        assert_eq!(tags.namespace_of("circle"), Some("svg"));
        assert_eq!(tags.namespace_of("div"), None);
        assert!(tags.is_reserved("circle"));
        assert!(!tags.is_reserved("my-comp"));
    }
}
