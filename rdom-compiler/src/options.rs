use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::diagnostics::CompileContext;
use crate::error::CompileError;
use crate::template_ast::{Attr, Directive, Element};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhitespaceMode {
    /// Whitespace-only runs between tags collapse to a single space.
    #[default]
    Preserve,
    /// Runs containing a line break are dropped, everything else collapses.
    Condense,
}

/// Per-tag classification used by the tokenizer, tree builder and optimizer.
#[derive(Debug, Clone)]
pub struct TagTable {
    pub expect_html: bool,
    pub unary: HashSet<&'static str>,
    pub can_be_left_open: HashSet<&'static str>,
    pub non_phrasing: HashSet<&'static str>,
    /// Content is not tokenized as markup.
    pub raw_text: HashSet<&'static str>,
    /// Platform tags; anything else may be a component.
    pub reserved: HashSet<&'static str>,
    pub pre: HashSet<&'static str>,
    pub namespace: fn(&str) -> Option<&'static str>,
}

impl Default for TagTable {
    fn default() -> Self {
        TagTable {
            expect_html: false,
            unary: HashSet::new(),
            can_be_left_open: HashSet::new(),
            non_phrasing: HashSet::new(),
            raw_text: ["script", "style", "textarea"].into_iter().collect(),
            reserved: HashSet::new(),
            pre: HashSet::new(),
            namespace: |_| None,
        }
    }
}

impl TagTable {
    pub fn is_unary(&self, tag: &str) -> bool {
        self.unary.contains(tag)
    }

    pub fn can_be_left_open(&self, tag: &str) -> bool {
        self.can_be_left_open.contains(tag)
    }

    pub fn is_non_phrasing(&self, tag: &str) -> bool {
        self.non_phrasing.contains(tag)
    }

    pub fn is_raw_text(&self, tag: &str) -> bool {
        self.raw_text.contains(tag.to_ascii_lowercase().as_str())
    }

    pub fn is_reserved(&self, tag: &str) -> bool {
        self.reserved.contains(tag)
    }

    pub fn is_pre(&self, tag: &str) -> bool {
        self.pre.contains(tag)
    }

    pub fn namespace_of(&self, tag: &str) -> Option<&'static str> {
        (self.namespace)(tag)
    }
}

/// How an `r-if` chain produced by a module expansion links to its siblings.
#[derive(Debug, Clone, PartialEq)]
pub enum IfLink {
    None,
    ElseIf(String),
    Else,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub attrs: Vec<Attr>,
    pub condition: Option<String>,
}

/// Replacement of one element by an `r-if` chain of independently processed
/// clones. Only the first branch keeps its `r-for`.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub branches: Vec<Branch>,
    pub link: IfLink,
}

/// Per-element transform hooks. Every method is optional.
pub trait Module {
    fn name(&self) -> &str {
        "module"
    }

    /// `extra` keys this module sets that do not disqualify a static node.
    fn static_keys(&self) -> &[&'static str] {
        &[]
    }

    fn pre_transform_node(
        &self,
        _el: &Element,
        _ctx: &mut CompileContext<'_>,
    ) -> Result<Option<Expansion>, CompileError> {
        Ok(None)
    }

    fn transform_node(&self, _el: &mut Element, _ctx: &mut CompileContext<'_>) -> Result<(), CompileError> {
        Ok(())
    }

    /// Data-object fragment, each entry terminated by `,`.
    fn gen_data(&self, _el: &Element) -> Result<String, CompileError> {
        Ok(String::new())
    }

    fn transform_code(&self, _el: &Element, code: String) -> Result<String, CompileError> {
        Ok(code)
    }
}

/// Runs when a directive is attached to an element. Returns whether the
/// directive must still be emitted for the runtime.
pub trait DirectiveHandler {
    fn handle(&self, el: &mut Element, dir: &Directive, ctx: &mut CompileContext<'_>) -> Result<bool, CompileError>;
}

impl<F> DirectiveHandler for F
where
    F: Fn(&mut Element, &Directive, &mut CompileContext<'_>) -> Result<bool, CompileError>,
{
    fn handle(&self, el: &mut Element, dir: &Directive, ctx: &mut CompileContext<'_>) -> Result<bool, CompileError> {
        self(el, dir, ctx)
    }
}

#[derive(Default)]
pub struct DirectiveRegistry {
    handlers: BTreeMap<String, Box<dyn DirectiveHandler>>,
}

impl DirectiveRegistry {
    /// Registry with the platform-independent `on`, `bind` and `cloak`.
    pub fn base() -> Self {
        let mut registry = DirectiveRegistry::default();
        crate::directives::register_base(&mut registry);
        registry
    }

    pub fn register(&mut self, name: &str, handler: impl DirectiveHandler + 'static) {
        self.handlers.insert(name.to_string(), Box::new(handler));
    }

    pub fn get(&self, name: &str) -> Option<&dyn DirectiveHandler> {
        self.handlers.get(name).map(|h| h.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

pub struct CompilerOptions {
    pub delimiters: Option<(String, String)>,
    pub whitespace: WhitespaceMode,
    pub comments: bool,
    pub directive_prefix: String,
    pub tags: TagTable,
    /// `(tag, type attribute, attribute name)`: bind as a DOM prop?
    pub must_use_prop: fn(&str, Option<&str>, &str) -> bool,
    pub modules: Vec<Box<dyn Module>>,
    pub directives: DirectiveRegistry,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            delimiters: None,
            whitespace: WhitespaceMode::default(),
            comments: false,
            directive_prefix: "r-".to_string(),
            tags: TagTable::default(),
            must_use_prop: |_, _, _| false,
            modules: Vec::new(),
            directives: DirectiveRegistry::base(),
        }
    }
}

impl CompilerOptions {
    pub fn with_module(mut self, module: impl Module + 'static) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    pub fn with_directive(mut self, name: &str, handler: impl DirectiveHandler + 'static) -> Self {
        self.directives.register(name, handler);
        self
    }

    pub fn with_comments(mut self, comments: bool) -> Self {
        self.comments = comments;
        self
    }

    pub fn with_delimiters(mut self, open: &str, close: &str) -> Self {
        self.delimiters = Some((open.to_string(), close.to_string()));
        self
    }

    pub fn with_whitespace(mut self, whitespace: WhitespaceMode) -> Self {
        self.whitespace = whitespace;
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.directive_prefix = prefix.to_string();
        self
    }

    pub fn with_tags(mut self, tags: TagTable) -> Self {
        self.tags = tags;
        self
    }

    pub fn is_static_key(&self, key: &str) -> bool {
        self.modules
            .iter()
            .any(|m| m.static_keys().iter().any(|k| *k == key))
    }

    pub fn must_use_prop(&self, tag: &str, type_attr: Option<&str>, attr: &str) -> bool {
        (self.must_use_prop)(tag, type_attr, attr)
    }
}
