use log::{debug, trace};

use crate::diagnostics::CompileContext;
use crate::directive_expr::parse_for;
use crate::error::CompileError;
use crate::filters::parse_filters;
use crate::html_tokenizer::{TokenSink, tokenize};
use crate::model::gen_assignment_code;
use crate::options::{CompilerOptions, Expansion, IfLink};
use crate::template_ast::{
    Ast, Attr, Binding, CommentNode, Directive, DirectiveArg, Element, IfCondition, NodeId, NodeKind, Span,
    TextNode,
};
use crate::text_parser::parse_text;
use crate::util::{camelize, decode_entities, is_blank, json_string};

const MULTI_ROOT: &str = "Component template should contain exactly one root element. \
If you are using r-if on multiple elements, use r-else-if to chain them instead.";

/// Parses `template` into an arena AST. Markup problems are recorded in
/// `ctx`; only hook failures abort.
pub fn parse(template: &str, ctx: &mut CompileContext<'_>) -> Result<Ast, CompileError> {
    let options = ctx.options;
    let mut builder = TreeBuilder {
        template,
        options,
        ctx,
        ast: Ast::default(),
        stack: Vec::new(),
        current_parent: None,
        in_v_pre: false,
        in_pre: false,
        root_warned: false,
        text_warned: false,
    };
    tokenize(template, &options.tags, options.comments, &mut builder)?;

    if builder.ast.root.is_none() && !builder.root_warned {
        builder.ctx.error("Component template requires a root element.", None);
    }
    debug!("parsed template into {} nodes", builder.ast.len());
    Ok(builder.ast)
}

struct TreeBuilder<'c, 'o> {
    template: &'c str,
    options: &'o CompilerOptions,
    ctx: &'c mut CompileContext<'o>,
    ast: Ast,
    stack: Vec<NodeId>,
    current_parent: Option<NodeId>,
    in_v_pre: bool,
    in_pre: bool,
    root_warned: bool,
    text_warned: bool,
}

/// Splits `name.mod1.mod2` into the bare name and its modifiers. Dots inside
/// a bracketed dynamic argument are not separators.
fn split_modifiers(name: &str) -> (&str, Option<Vec<String>>) {
    let scan_from = name.rfind(']').map_or(0, |i| i + 1);
    match name[scan_from..].find('.') {
        None => (name, None),
        Some(rel) => {
            let at = scan_from + rel;
            let modifiers = name[at + 1..]
                .split('.')
                .filter(|m| !m.is_empty())
                .map(String::from)
                .collect();
            (&name[..at], Some(modifiers))
        }
    }
}

/// `[expr]` names a dynamic argument.
fn dynamic_arg(name: &str) -> Option<&str> {
    name.strip_prefix('[').and_then(|n| n.strip_suffix(']'))
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for ch in text.chars() {
        if matches!(ch, ' ' | '\t' | '\n' | '\r' | '\u{c}') {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}

fn is_forbidden(el: &Element) -> bool {
    el.tag == "style"
        || (el.tag == "script" && el.attr("type").is_none_or(|t| t.is_empty() || t == "text/javascript"))
}

fn add_if_condition(el: &mut Element, exp: Option<String>, block: NodeId) {
    el.if_conditions.push(IfCondition { exp, block });
}

impl<'o> TreeBuilder<'_, 'o> {
    fn prefixed(&self, name: &str) -> String {
        format!("{}{name}", self.options.directive_prefix)
    }

    fn warn_root_once(&mut self, message: &str, span: Option<Span>) {
        if !self.root_warned {
            self.root_warned = true;
            self.ctx.error(message, span);
        }
    }

    fn check_root_constraints(&mut self, el: &Element) {
        if el.tag == "slot" || el.tag == "template" {
            self.warn_root_once(
                &format!(
                    "Cannot use <{}> as component root element because it may contain multiple nodes.",
                    el.tag
                ),
                Some(el.span),
            );
        }
        if el.has_attr(&self.prefixed("for")) {
            self.warn_root_once(
                &format!(
                    "Cannot use {} on stateful component root element because it renders multiple elements.",
                    self.prefixed("for")
                ),
                Some(el.span),
            );
        }
    }

    fn process_pre(&mut self, el: &mut Element) {
        if el.get_and_remove_attr(&self.prefixed("pre")).is_some() {
            el.pre = true;
        }
    }

    fn process_raw_attrs(&mut self, el: &mut Element) {
        if el.attrs_list.is_empty() {
            if !el.pre {
                el.plain = true;
            }
            return;
        }
        el.attrs = el
            .attrs_list
            .iter()
            .map(|a| Binding {
                name: a.name.clone(),
                value: json_string(&a.value),
                dynamic: false,
            })
            .collect();
    }

    /// Removes a structural directive, reporting it when its value is blank.
    fn take_valued(&mut self, el: &mut Element, name: &str) -> Option<String> {
        let raw = self.prefixed(name);
        let value = el.get_and_remove_attr(&raw)?;
        if value.trim().is_empty() {
            self.ctx.error(format!("Directive {raw} requires a value."), Some(el.span));
            return None;
        }
        Some(value)
    }

    fn process_for(&mut self, el: &mut Element) {
        if let Some(exp) = self.take_valued(el, "for") {
            match parse_for(&exp) {
                Some(descriptor) => el.for_loop = Some(descriptor),
                None => self.ctx.error(format!("Invalid r-for expression: {exp}"), Some(el.span)),
            }
        }
    }

    fn process_if(&mut self, el: &mut Element, id: NodeId) {
        if let Some(exp) = self.take_valued(el, "if") {
            el.if_exp = Some(exp.clone());
            add_if_condition(el, Some(exp), id);
        } else {
            if el.get_and_remove_attr(&self.prefixed("else")).is_some() {
                el.is_else = true;
            }
            if let Some(exp) = self.take_valued(el, "else-if") {
                el.else_if = Some(exp);
            }
        }
    }

    fn process_once(&mut self, el: &mut Element) {
        if el.get_and_remove_attr(&self.prefixed("once")).is_some() {
            el.once = true;
        }
    }

    fn process_key(&mut self, el: &mut Element) {
        let prefix = self.options.directive_prefix.clone();
        if let Some(exp) = el.take_binding_attr("key", &prefix, true) {
            if el.tag == "template" {
                self.ctx.error(
                    "<template> cannot be keyed. Place the key on real elements instead.",
                    Some(el.span),
                );
            }
            el.key = Some(exp);
        }
    }

    fn in_for(&self, el: &Element, id: NodeId) -> bool {
        el.for_loop.is_some()
            || self
                .ast
                .ancestors(id)
                .any(|a| self.ast.element(a).is_some_and(|p| p.for_loop.is_some()))
    }

    fn process_ref(&mut self, el: &mut Element, id: NodeId) {
        let prefix = self.options.directive_prefix.clone();
        if let Some(name) = el.take_binding_attr("ref", &prefix, true) {
            el.ref_name = Some(name);
            el.ref_in_for = self.in_for(el, id);
        }
    }

    fn process_slot(&mut self, el: &mut Element) {
        let prefix = self.options.directive_prefix.clone();
        if el.tag == "slot" {
            el.slot_name = el.take_binding_attr("name", &prefix, true);
            if el.key.is_some() {
                self.ctx.error(
                    "`key` does not work on <slot> because slots are abstract outlets and can possibly \
expand into multiple elements. Use the key on a wrapping element instead.",
                    Some(el.span),
                );
            }
            return;
        }

        let slot_scope = if el.tag == "template" {
            let legacy = el.get_and_remove_attr("scope");
            if legacy.is_some() {
                self.ctx.tip(
                    "the \"scope\" attribute for scoped slots have been deprecated and replaced by \
\"slot-scope\". The new \"slot-scope\" attribute can also be used on plain elements in addition to <template>.",
                    Some(el.span),
                );
            }
            legacy.or_else(|| el.get_and_remove_attr("slot-scope"))
        } else {
            let scope = el.get_and_remove_attr("slot-scope");
            if scope.is_some() && el.has_attr(&self.prefixed("for")) {
                self.ctx.tip(
                    format!(
                        "Ambiguous combined usage of slot-scope and {} on <{}> ({} takes higher priority). \
Use a wrapper <template> for the scoped slot to make it clearer.",
                        self.prefixed("for"),
                        el.tag,
                        self.prefixed("for"),
                    ),
                    Some(el.span),
                );
            }
            scope
        };
        el.slot_scope = slot_scope;

        if let Some(target) = el.take_binding_attr("slot", &prefix, true) {
            let target = if target == "\"\"" { "\"default\"".to_string() } else { target };
            if el.tag != "template" && el.slot_scope.is_none() {
                el.add_attr("slot", target.clone(), false);
            }
            el.slot_target = Some(target);
        }
    }

    fn process_component(&mut self, el: &mut Element) {
        let prefix = self.options.directive_prefix.clone();
        if let Some(binding) = el.take_binding_attr("is", &prefix, true) {
            el.component = Some(binding);
        }
        if el.get_and_remove_attr("inline-template").is_some() {
            el.inline_template = true;
        }
    }

    fn check_for_alias_model(&mut self, el: &Element, id: NodeId, value: &str, span: Span) {
        let aliased = |candidate: &Element| candidate.for_loop.as_ref().is_some_and(|f| f.alias == value);
        let bound_to_alias = aliased(el)
            || self
                .ast
                .ancestors(id)
                .any(|a| self.ast.element(a).is_some_and(aliased));
        if bound_to_alias {
            self.ctx.error(
                format!(
                    "<{} {}=\"{value}\">: You are binding {} directly to a {} iteration alias. \
This will not be able to modify the {} source array because writing to the alias is like \
modifying a function local variable. Consider using an array of objects and use {} on an \
object property instead.",
                    el.tag,
                    self.prefixed("model"),
                    self.prefixed("model"),
                    self.prefixed("for"),
                    self.prefixed("for"),
                    self.prefixed("model"),
                ),
                Some(span),
            );
        }
    }

    fn process_attrs(&mut self, el: &mut Element, id: NodeId) {
        let prefix = self.options.directive_prefix.clone();
        let bind_prefix = format!("{prefix}bind:");
        let on_prefix = format!("{prefix}on:");

        for attr in el.attrs_list.clone() {
            let raw_name = attr.name.as_str();
            let value = attr.value.as_str();
            let is_directive = raw_name.starts_with(&prefix) || raw_name.starts_with('@') || raw_name.starts_with(':');
            if !is_directive {
                self.process_literal_attr(el, &attr);
                continue;
            }

            el.has_bindings = true;
            let (name, modifiers) = split_modifiers(raw_name);
            let has_mod = |m: &str| modifiers.as_ref().is_some_and(|mods| mods.iter().any(|x| x == m));

            if let Some(name) = name.strip_prefix(':').or_else(|| name.strip_prefix(bind_prefix.as_str())) {
                if value.trim().is_empty() {
                    self.ctx.error(format!("Directive {raw_name} requires a value."), Some(attr.span));
                    continue;
                }
                let value = parse_filters(value);
                let (mut name, dynamic) = match dynamic_arg(name) {
                    Some(inner) => (inner.to_string(), true),
                    None => (name.to_string(), false),
                };
                if !dynamic {
                    if has_mod("prop") {
                        name = camelize(&name);
                        if name == "innerHtml" {
                            name = "innerHTML".to_string();
                        }
                    }
                    if has_mod("camel") {
                        name = camelize(&name);
                    }
                }
                if has_mod("sync") {
                    let sync = gen_assignment_code(&value, "$event");
                    if dynamic {
                        el.add_handler(&format!("\"update:\"+({name})"), &sync, None, false, true);
                    } else {
                        // Event keys are camelized, so one listener covers the hyphenated form too.
                        el.add_handler(&format!("update:{}", camelize(&name)), &sync, None, false, false);
                    }
                }
                let as_prop = has_mod("prop")
                    || (el.component.is_none() && self.options.must_use_prop(&el.tag, el.attr("type"), &name));
                if as_prop {
                    el.add_prop(&name, value, dynamic);
                } else {
                    el.add_attr(&name, value, dynamic);
                }
            } else if let Some(name) = name.strip_prefix('@').or_else(|| name.strip_prefix(on_prefix.as_str())) {
                let modifiers = modifiers.map(|mut mods| {
                    for ignored in ["native", "passive"] {
                        if mods.iter().any(|m| m == ignored) {
                            self.ctx.tip(
                                format!("The .{ignored} modifier on {raw_name} has no effect and was ignored."),
                                Some(attr.span),
                            );
                            mods.retain(|m| m != ignored);
                        }
                    }
                    mods
                });
                match dynamic_arg(name) {
                    Some(inner) => el.add_handler(inner, value, modifiers, false, true),
                    None => el.add_handler(name, value, modifiers, false, false),
                }
            } else {
                let bare = name.strip_prefix(prefix.as_str()).unwrap_or(name);
                let (dir_name, arg) = match bare.split_once(':') {
                    Some((dir_name, arg)) => {
                        let arg = match dynamic_arg(arg) {
                            Some(inner) => DirectiveArg::Dynamic(inner.to_string()),
                            None => DirectiveArg::Static(arg.to_string()),
                        };
                        (dir_name, Some(arg))
                    }
                    None => (bare, None),
                };
                if dir_name == "model" {
                    if value.trim().is_empty() {
                        self.ctx.error(format!("Directive {raw_name} requires a value."), Some(attr.span));
                        continue;
                    }
                    self.check_for_alias_model(el, id, value, attr.span);
                }
                el.add_directive(Directive {
                    name: dir_name.to_string(),
                    raw_name: raw_name.to_string(),
                    value: if value.is_empty() { None } else { Some(value.to_string()) },
                    arg,
                    modifiers: modifiers.unwrap_or_default(),
                    needs_runtime: true,
                    span: attr.span,
                });
            }
        }
    }

    fn process_literal_attr(&mut self, el: &mut Element, attr: &Attr) {
        if parse_text(&attr.value, self.options.delimiters.as_ref()).is_some() {
            self.ctx.tip(
                format!(
                    "{}=\"{}\": Interpolation inside attributes has been removed. Use {} or the colon \
shorthand instead. For example, instead of <div id=\"{{{{ val }}}}\">, use <div :id=\"val\">.",
                    attr.name,
                    attr.value,
                    self.prefixed("bind"),
                ),
                Some(attr.span),
            );
        }
        el.add_attr(&attr.name, json_string(&attr.value), false);
        if el.component.is_none() && attr.name == "muted" && self.options.must_use_prop(&el.tag, el.attr("type"), "muted") {
            el.add_prop("muted", "true".to_string(), false);
        }
    }

    /// Runs each directive's compile-time handler and records whether the
    /// runtime still needs it.
    fn run_directive_handlers(&mut self, el: &mut Element) -> Result<(), CompileError> {
        let options = self.options;
        let pending = std::mem::take(&mut el.directives);
        let mut handled = Vec::with_capacity(pending.len());
        for mut dir in pending {
            match options.directives.get(&dir.name) {
                Some(handler) => {
                    trace!("directive {} on <{}>", dir.name, el.tag);
                    dir.needs_runtime = handler.handle(el, &dir, self.ctx)?;
                }
                None => {
                    self.ctx.tip(
                        format!("Directive \"{}\" has no compile-time handler and is left to the runtime.", dir.raw_name),
                        Some(dir.span),
                    );
                    dir.needs_runtime = true;
                }
            }
            handled.push(dir);
        }
        let added = std::mem::replace(&mut el.directives, handled);
        el.directives.extend(added);
        Ok(())
    }

    fn process_element(&mut self, el: &mut Element, id: NodeId) -> Result<(), CompileError> {
        let options = self.options;
        self.process_key(el);
        el.plain = el.key.is_none() && el.scoped_slots.is_empty() && el.attrs_list.is_empty();
        self.process_ref(el, id);
        self.process_slot(el);
        self.process_component(el);
        for module in &options.modules {
            trace!("module {} transform_node on <{}>", module.name(), el.tag);
            module.transform_node(el, self.ctx)?;
        }
        self.process_attrs(el, id);
        self.run_directive_handlers(el)?;
        el.processed = true;
        Ok(())
    }

    /// Builds the typed clones of an expanded element. Branch 0 reuses
    /// `id`; the rest are allocated as detached if-chain blocks.
    fn apply_expansion(&mut self, template: &Element, expansion: Expansion, id: NodeId) -> Result<Element, CompileError> {
        let mut first: Option<Element> = None;
        for (index, branch) in expansion.branches.into_iter().enumerate() {
            let mut clone = Element::new(template.tag.clone(), branch.attrs);
            clone.ns = template.ns;
            clone.span = template.span;
            let block = if index == 0 {
                self.process_for(&mut clone);
                id
            } else {
                clone.remove_attr_everywhere(&self.prefixed("for"));
                self.ast.alloc(self.current_parent, NodeKind::Element(Element::default()))
            };
            self.process_once(&mut clone);
            self.process_element(&mut clone, block)?;

            match first.as_mut() {
                None => {
                    clone.if_exp = branch.condition.clone();
                    add_if_condition(&mut clone, branch.condition, block);
                    first = Some(clone);
                }
                Some(head) => {
                    add_if_condition(head, branch.condition, block);
                    if let Some(slot) = self.ast.element_mut(block) {
                        *slot = clone;
                    }
                }
            }
        }

        let mut head = first.unwrap_or_else(|| template.clone());
        match expansion.link {
            IfLink::None => {}
            IfLink::Else => head.is_else = true,
            IfLink::ElseIf(exp) => head.else_if = Some(exp),
        }
        Ok(head)
    }

    fn find_prev_element(&mut self, parent: NodeId) -> Option<NodeId> {
        loop {
            let last = *self.ast.element(parent)?.children.last()?;
            match &self.ast.node(last).kind {
                NodeKind::Element(_) => return Some(last),
                NodeKind::Text(text) => {
                    if text.text != " " {
                        let message = format!(
                            "text \"{}\" between {} and {}(-if) will be ignored.",
                            text.text.trim(),
                            self.prefixed("if"),
                            self.prefixed("else"),
                        );
                        self.ctx.error(message, None);
                    }
                }
                NodeKind::Comment(_) => {}
            }
            if let Some(p) = self.ast.element_mut(parent) {
                p.children.pop();
            }
        }
    }

    fn process_if_conditions(&mut self, id: NodeId, parent: NodeId) {
        let prev = self.find_prev_element(parent);
        let (else_if, tag, span) = match self.ast.element(id) {
            Some(el) => (el.else_if.clone(), el.tag.clone(), el.span),
            None => return,
        };
        match prev.and_then(|p| self.ast.element_mut(p)).filter(|p| p.if_exp.is_some()) {
            Some(prev) => add_if_condition(prev, else_if, id),
            None => {
                let directive = match &else_if {
                    Some(exp) => format!("{}=\"{exp}\"", self.prefixed("else-if")),
                    None => self.prefixed("else"),
                };
                self.ctx.error(
                    format!("{directive} used on element <{tag}> without corresponding {}.", self.prefixed("if")),
                    Some(span),
                );
            }
        }
    }

    fn trim_ending_whitespace(&mut self, id: NodeId) {
        if self.in_pre {
            return;
        }
        loop {
            let Some(last) = self.ast.element(id).and_then(|el| el.children.last().copied()) else {
                return;
            };
            let is_space = matches!(&self.ast.node(last).kind, NodeKind::Text(t) if t.text == " ");
            if !is_space {
                return;
            }
            if let Some(el) = self.ast.element_mut(id) {
                el.children.pop();
            }
        }
    }

    fn close_element(&mut self, id: NodeId) -> Result<(), CompileError> {
        self.trim_ending_whitespace(id);

        let Some(slot) = self.ast.element_mut(id) else {
            return Ok(());
        };
        let mut el = std::mem::take(slot);
        if !self.in_v_pre && !el.processed {
            self.process_element(&mut el, id)?;
        }

        if self.stack.is_empty() && self.ast.root != Some(id) {
            let chains_to_root = (el.else_if.is_some() || el.is_else)
                && self.ast.root_element().is_some_and(|root| root.if_exp.is_some());
            if chains_to_root {
                self.check_root_constraints(&el);
                let root = self.ast.root;
                if let Some(root) = root.and_then(|r| self.ast.element_mut(r)) {
                    add_if_condition(root, el.else_if.clone(), id);
                }
            } else {
                self.warn_root_once(MULTI_ROOT, Some(el.span));
            }
        }

        let forbidden = el.forbidden;
        let chained = el.else_if.is_some() || el.is_else;
        let scoped = el.slot_scope.is_some().then(|| {
            el.slot_target
                .clone()
                .unwrap_or_else(|| "\"default\"".to_string())
        });
        let (pre, tag) = (el.pre, el.tag.clone());
        if let Some(slot) = self.ast.element_mut(id) {
            *slot = el;
        }

        if let Some(parent) = self.current_parent {
            if !forbidden {
                if chained {
                    self.process_if_conditions(id, parent);
                } else if let Some(parent_el) = self.ast.element_mut(parent) {
                    match scoped {
                        Some(name) => {
                            parent_el.scoped_slots.retain(|(n, _)| *n != name);
                            parent_el.scoped_slots.push((name, id));
                        }
                        None => parent_el.children.push(id),
                    }
                }
            }
        }

        if pre {
            self.in_v_pre = false;
        }
        if self.options.tags.is_pre(&tag) {
            self.in_pre = false;
        }
        Ok(())
    }
}

impl TokenSink for TreeBuilder<'_, '_> {
    type Error = CompileError;

    fn start_tag(&mut self, tag: &str, attrs: Vec<Attr>, unary: bool, span: Span) -> Result<(), CompileError> {
        let options = self.options;
        let ns = self
            .current_parent
            .and_then(|p| self.ast.element(p))
            .and_then(|p| p.ns)
            .or_else(|| options.tags.namespace_of(tag));

        let mut seen = std::collections::HashSet::new();
        for attr in &attrs {
            if !seen.insert(attr.name.as_str()) {
                self.ctx.error(format!("duplicate attribute: {}", attr.name), Some(attr.span));
            }
        }

        let id = self.ast.alloc(self.current_parent, NodeKind::Element(Element::default()));
        let mut el = Element::new(tag, attrs);
        el.ns = ns;
        el.span = span;

        if is_forbidden(&el) {
            el.forbidden = true;
            self.ctx.error(
                format!(
                    "Templates should only be responsible for mapping the state to the UI. Avoid placing \
tags with side-effects in your templates, such as <{tag}>, as they will not be parsed."
                ),
                Some(span),
            );
        }

        for module in &options.modules {
            trace!("module {} pre_transform_node on <{tag}>", module.name());
            if let Some(expansion) = module.pre_transform_node(&el, self.ctx)? {
                el = self.apply_expansion(&el, expansion, id)?;
                break;
            }
        }

        if !self.in_v_pre {
            self.process_pre(&mut el);
            if el.pre {
                self.in_v_pre = true;
            }
        }
        if options.tags.is_pre(&el.tag) {
            self.in_pre = true;
        }
        if self.in_v_pre {
            self.process_raw_attrs(&mut el);
        } else if !el.processed {
            self.process_for(&mut el);
            self.process_if(&mut el, id);
            self.process_once(&mut el);
        }

        if self.ast.root.is_none() {
            self.ast.root = Some(id);
            self.check_root_constraints(&el);
        }

        if let Some(slot) = self.ast.element_mut(id) {
            *slot = el;
        }
        if unary {
            self.close_element(id)
        } else {
            self.current_parent = Some(id);
            self.stack.push(id);
            Ok(())
        }
    }

    fn end_tag(&mut self, _tag: &str, _span: Span) -> Result<(), CompileError> {
        let Some(id) = self.stack.pop() else {
            return Ok(());
        };
        self.current_parent = self.stack.last().copied();
        self.close_element(id)
    }

    fn chars(&mut self, text: &str, _span: Span) -> Result<(), CompileError> {
        let Some(parent) = self.current_parent else {
            if text == self.template {
                self.warn_root_once("Component template requires a root element, rather than just text.", None);
            } else if !is_blank(text) && !self.text_warned {
                self.text_warned = true;
                self.ctx.error(format!("text \"{}\" outside the template root will be ignored.", text.trim()), None);
            }
            return Ok(());
        };
        let Some(parent_el) = self.ast.element(parent) else {
            return Ok(());
        };

        let condense = self.options.whitespace == crate::options::WhitespaceMode::Condense;
        let mut text = if self.in_pre || !is_blank(text) {
            if parent_el.tag == "script" || parent_el.tag == "style" {
                text.to_string()
            } else {
                decode_entities(text)
            }
        } else if parent_el.children.is_empty() {
            String::new()
        } else if condense && text.contains(['\n', '\r']) {
            String::new()
        } else {
            " ".to_string()
        };
        if text.is_empty() {
            return Ok(());
        }
        if !self.in_pre && condense {
            text = collapse_whitespace(&text);
        }

        let tokens = if !self.in_v_pre && text != " " {
            parse_text(&text, self.options.delimiters.as_ref())
        } else {
            None
        };
        if tokens.is_none() && text == " " {
            let last_is_space = parent_el
                .children
                .last()
                .is_some_and(|&c| matches!(&self.ast.node(c).kind, NodeKind::Text(t) if t.text == " "));
            if last_is_space {
                return Ok(());
            }
        }

        let child = self.ast.alloc(
            Some(parent),
            NodeKind::Text(TextNode {
                text,
                tokens,
                is_static: false,
            }),
        );
        if let Some(parent_el) = self.ast.element_mut(parent) {
            parent_el.children.push(child);
        }
        Ok(())
    }

    fn comment(&mut self, text: &str, _span: Span) -> Result<(), CompileError> {
        if let Some(parent) = self.current_parent {
            let child = self.ast.alloc(
                Some(parent),
                NodeKind::Comment(CommentNode {
                    text: text.to_string(),
                    is_static: false,
                }),
            );
            if let Some(parent_el) = self.ast.element_mut(parent) {
                parent_el.children.push(child);
            }
        }
        Ok(())
    }

    fn warn(&mut self, message: String, span: Option<Span>) {
        self.ctx.error(message, span);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_skip_dynamic_argument() {
        assert_eq!(split_modifiers(":[a.b].prop"), (":[a.b]", Some(vec!["prop".to_string()])));
        assert_eq!(split_modifiers("@click"), ("@click", None));
        assert_eq!(
            split_modifiers("r-custom1:arg1.modifier"),
            ("r-custom1:arg1", Some(vec!["modifier".to_string()]))
        );
    }

    #[test]
    fn collapses_runs() {
        assert_eq!(collapse_whitespace("a \n\t b"), "a b");
    }
}
