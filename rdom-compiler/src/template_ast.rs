use std::collections::BTreeMap;

use serde_json::Value;

/// Index of a node inside an [`Ast`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Byte range into the (trimmed) template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }
}

/// Raw attribute as written in the markup.
#[derive(Debug, Clone, PartialEq)]
pub struct Attr {
    pub name: String,
    pub value: String,
    pub span: Span,
}

impl Attr {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attr {
            name: name.into(),
            value: value.into(),
            span: Span::default(),
        }
    }
}

/// Processed `name: value` pair; `value` is already source code.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub value: String,
    pub dynamic: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DirectiveArg {
    Static(String),
    Dynamic(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub name: String,
    pub raw_name: String,
    pub value: Option<String>,
    pub arg: Option<DirectiveArg>,
    pub modifiers: Vec<String>,
    /// Decided by the directive hook at parse time.
    pub needs_runtime: bool,
    pub span: Span,
}

impl Directive {
    pub fn has_modifier(&self, name: &str) -> bool {
        self.modifiers.iter().any(|m| m == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForDescriptor {
    pub source: String,
    pub alias: String,
    pub iterator1: Option<String>,
    pub iterator2: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfCondition {
    /// `None` for the terminal `else` branch.
    pub exp: Option<String>,
    pub block: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Handler {
    pub value: String,
    /// `Some` (possibly empty) when the listener was declared with modifiers.
    pub modifiers: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventBinding {
    pub name: String,
    pub dynamic: bool,
    pub capture: bool,
    pub once: bool,
    pub handlers: Vec<Handler>,
}

/// Whole-object `r-bind="obj"`.
#[derive(Debug, Clone, PartialEq)]
pub struct BindObject {
    pub value: String,
    pub is_prop: bool,
    pub is_sync: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextToken {
    Literal(String),
    Expression(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub tag: String,
    pub attrs_list: Vec<Attr>,
    pub attrs_map: BTreeMap<String, String>,
    pub children: Vec<NodeId>,
    pub ns: Option<&'static str>,

    pub attrs: Vec<Binding>,
    pub props: Vec<Binding>,
    pub events: Vec<EventBinding>,
    pub directives: Vec<Directive>,
    pub has_bindings: bool,
    pub plain: bool,
    pub pre: bool,
    pub forbidden: bool,

    pub for_loop: Option<ForDescriptor>,
    pub if_exp: Option<String>,
    pub else_if: Option<String>,
    pub is_else: bool,
    pub if_conditions: Vec<IfCondition>,
    pub once: bool,

    pub key: Option<String>,
    pub ref_name: Option<String>,
    pub ref_in_for: bool,
    pub slot_name: Option<String>,
    pub slot_target: Option<String>,
    pub slot_scope: Option<String>,
    pub scoped_slots: Vec<(String, NodeId)>,
    /// The `is` override.
    pub component: Option<String>,
    pub inline_template: bool,

    pub static_class: Option<String>,
    pub class_binding: Option<String>,
    pub static_style: Option<String>,
    pub style_binding: Option<String>,

    pub wrap_data: Option<BindObject>,
    pub wrap_listeners: Option<String>,

    /// Free-form state attached by third-party hooks.
    pub extra: BTreeMap<String, Value>,

    pub is_static: bool,
    pub static_root: bool,
    pub static_in_for: bool,
    pub span: Span,

    pub(crate) processed: bool,
}

impl Element {
    pub fn new(tag: impl Into<String>, attrs_list: Vec<Attr>) -> Self {
        let attrs_map = attrs_list
            .iter()
            .map(|a| (a.name.clone(), a.value.clone()))
            .collect();
        Element {
            tag: tag.into(),
            attrs_list,
            attrs_map,
            ..Default::default()
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs_map.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs_map.contains_key(name)
    }

    /// Removes `name` from the pending attribute list and returns its value.
    /// The map keeps the entry so later lookups (e.g. `type`) still see it.
    pub fn get_and_remove_attr(&mut self, name: &str) -> Option<String> {
        let value = self.attrs_map.get(name).cloned();
        if value.is_some() {
            if let Some(pos) = self.attrs_list.iter().position(|a| a.name == name) {
                self.attrs_list.remove(pos);
            }
        }
        value
    }

    pub fn remove_attr_everywhere(&mut self, name: &str) -> Option<String> {
        let value = self.get_and_remove_attr(name);
        self.attrs_map.remove(name);
        value
    }

    /// Looks up `:name`, `{prefix}bind:name` then (if `get_static`) `name`,
    /// removing whichever matched. Static values come back JSON-quoted.
    pub fn take_binding_attr(&mut self, name: &str, prefix: &str, get_static: bool) -> Option<String> {
        let dynamic = self
            .get_and_remove_attr(&format!(":{name}"))
            .or_else(|| self.get_and_remove_attr(&format!("{prefix}bind:{name}")));
        if let Some(value) = dynamic {
            return Some(crate::filters::parse_filters(&value));
        }
        if get_static {
            return self
                .get_and_remove_attr(name)
                .map(|v| crate::util::json_string(&v));
        }
        None
    }

    pub fn add_raw_attr(&mut self, name: &str, value: &str) {
        self.attrs_map.insert(name.to_string(), value.to_string());
        self.attrs_list.push(Attr::new(name, value));
    }

    pub fn add_attr(&mut self, name: &str, value: String, dynamic: bool) {
        self.attrs.push(Binding {
            name: name.to_string(),
            value,
            dynamic,
        });
        self.plain = false;
    }

    pub fn add_prop(&mut self, name: &str, value: String, dynamic: bool) {
        self.props.push(Binding {
            name: name.to_string(),
            value,
            dynamic,
        });
        self.plain = false;
    }

    pub fn add_directive(&mut self, directive: Directive) {
        self.directives.push(directive);
        self.plain = false;
    }

    /// Registers a listener. `click.right`/`click.middle` are renamed and
    /// `capture`/`once` move from the modifier list onto the event key.
    pub fn add_handler(
        &mut self,
        name: &str,
        value: &str,
        modifiers: Option<Vec<String>>,
        important: bool,
        dynamic: bool,
    ) {
        let mut name = name.to_string();
        let mut capture = false;
        let mut once = false;
        let modifiers = modifiers.map(|mut mods| {
            let has = |mods: &[String], m: &str| mods.iter().any(|x| x == m);
            if has(&mods, "right") {
                if dynamic {
                    name = format!("({name})==='click'?'contextmenu':({name})");
                } else if name == "click" {
                    name = "contextmenu".to_string();
                    mods.retain(|m| m != "right");
                }
            } else if has(&mods, "middle") {
                if dynamic {
                    name = format!("({name})==='click'?'mouseup':({name})");
                } else if name == "click" {
                    name = "mouseup".to_string();
                }
            }
            capture = has(&mods, "capture");
            once = has(&mods, "once");
            mods.retain(|m| m != "capture" && m != "once");
            mods
        });

        let handler = Handler {
            value: value.trim().to_string(),
            modifiers,
        };
        let existing = self
            .events
            .iter_mut()
            .find(|e| e.name == name && e.dynamic == dynamic && e.capture == capture && e.once == once);
        match existing {
            Some(event) if important => event.handlers.insert(0, handler),
            Some(event) => event.handlers.push(handler),
            None => self.events.push(EventBinding {
                name,
                dynamic,
                capture,
                once,
                handlers: vec![handler],
            }),
        }
        self.plain = false;
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextNode {
    pub text: String,
    pub tokens: Option<Vec<TextToken>>,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommentNode {
    pub text: String,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element(Element),
    Text(TextNode),
    Comment(CommentNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    /// Back-reference for lookups only; children are owned through `children`.
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
}

/// Arena of template nodes. `root` is `None` for an empty template.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ast {
    pub nodes: Vec<AstNode>,
    pub root: Option<NodeId>,
}

impl Ast {
    pub fn alloc(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(AstNode { parent, kind });
        id
    }

    pub fn node(&self, id: NodeId) -> &AstNode {
        &self.nodes[id.0]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.nodes.get(id.0).map(|n| &n.kind) {
            Some(NodeKind::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(id.0).map(|n| &mut n.kind) {
            Some(NodeKind::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn root_element(&self) -> Option<&Element> {
        self.root.and_then(|id| self.element(id))
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.element(id).and_then(|el| el.children.get(index).copied())
    }

    pub fn is_static(&self, id: NodeId) -> bool {
        match &self.node(id).kind {
            NodeKind::Element(el) => el.is_static,
            NodeKind::Text(t) => t.is_static,
            NodeKind::Comment(c) => c.is_static,
        }
    }

    /// Walks parent links upwards, starting with `id`'s parent.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            ast: self,
            next: self.parent(id),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

pub struct Ancestors<'a> {
    ast: &'a Ast,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.ast.parent(current);
        Some(current)
    }
}
