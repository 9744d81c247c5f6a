use log::{debug, trace};
use serde_json::{Map, Value};

use crate::diagnostics::CompileContext;
use crate::error::CompileError;
use crate::events::gen_handlers;
use crate::options::{CompilerOptions, TagTable};
use crate::template_ast::{Ast, Binding, DirectiveArg, Element, IfCondition, NodeId, NodeKind};
use crate::text_parser::tokens_to_expression;
use crate::util::{camelize, json_string};

/// Render-function bodies produced for one tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CodegenResult {
    pub main_body: String,
    pub static_bodies: Vec<String>,
}

/// How the runtime must flatten a children list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Normalization {
    None,
    /// A child may be a component returning an array.
    ShallowFlatten,
    /// A child may produce nested arrays (`for`, `<template>`, `<slot>`).
    DeepFlatten,
}

impl Normalization {
    fn suffix(self) -> &'static str {
        match self {
            Normalization::None => "",
            Normalization::ShallowFlatten => ",1",
            Normalization::DeepFlatten => ",2",
        }
    }
}

fn needs_normalization(el: &Element) -> bool {
    el.for_loop.is_some() || el.tag == "template" || el.tag == "slot"
}

fn maybe_component(el: &Element, tags: &TagTable) -> bool {
    el.component.is_some() || !tags.is_reserved(&el.tag)
}

/// Normalization for a children list: deep when any element child (or one
/// of its if-branches) can expand to several nodes, shallow when any may
/// be a component.
pub fn normalization_for(ast: &Ast, children: &[NodeId], tags: &TagTable) -> Normalization {
    let mut result = Normalization::None;
    for &child in children {
        let Some(el) = ast.element(child) else {
            continue;
        };
        let branches = || el.if_conditions.iter().filter_map(|c| ast.element(c.block));
        if needs_normalization(el) || branches().any(needs_normalization) {
            return Normalization::DeepFlatten;
        }
        if maybe_component(el, tags) || branches().any(|b| maybe_component(b, tags)) {
            result = Normalization::ShallowFlatten;
        }
    }
    result
}

const STATIC_DONE: u8 = 1;
const ONCE_DONE: u8 = 1 << 1;
const FOR_DONE: u8 = 1 << 2;
const IF_DONE: u8 = 1 << 3;

struct CodegenState<'a, 'o> {
    ast: &'a Ast,
    options: &'o CompilerOptions,
    ctx: &'a mut CompileContext<'o>,
    static_bodies: Vec<String>,
    once_id: usize,
    /// Per-node flags: which wrapper has already been emitted.
    processed: Vec<u8>,
}

/// Generates the render body and hoisted static bodies for `ast`.
pub fn generate(ast: &Ast, ctx: &mut CompileContext<'_>) -> Result<CodegenResult, CompileError> {
    let mut state = CodegenState::new(ast, ctx);
    let code = match ast.root {
        Some(root) => state.gen_element(root)?,
        None => "_c(\"div\")".to_string(),
    };
    debug!("generated render body with {} static bodies", state.static_bodies.len());
    Ok(CodegenResult {
        main_body: format!("with(this){{return {code}}}"),
        static_bodies: state.static_bodies,
    })
}

impl<'a, 'o> CodegenState<'a, 'o> {
    fn new(ast: &'a Ast, ctx: &'a mut CompileContext<'o>) -> Self {
        let options = ctx.options;
        CodegenState {
            ast,
            options,
            ctx,
            static_bodies: Vec::new(),
            once_id: 0,
            processed: vec![0; ast.len()],
        }
    }

    fn is_done(&self, id: NodeId, flag: u8) -> bool {
        self.processed[id.0] & flag != 0
    }

    fn mark(&mut self, id: NodeId, flag: u8) {
        self.processed[id.0] |= flag;
    }

    fn element(&self, id: NodeId) -> &'a Element {
        let ast: &'a Ast = self.ast;
        match &ast.node(id).kind {
            NodeKind::Element(el) => el,
            _ => unreachable!("codegen dispatched a non-element node as an element"),
        }
    }

    fn gen_element(&mut self, id: NodeId) -> Result<String, CompileError> {
        let el = self.element(id);
        if el.static_root && !self.is_done(id, STATIC_DONE) {
            return self.gen_static(id);
        }
        if el.once && !self.is_done(id, ONCE_DONE) {
            return self.gen_once(id);
        }
        if el.for_loop.is_some() && !self.is_done(id, FOR_DONE) {
            return self.gen_for(id);
        }
        if el.if_exp.is_some() && !self.is_done(id, IF_DONE) {
            return self.gen_if(id);
        }
        if el.tag == "template" && el.slot_target.is_none() {
            return Ok(self.gen_children_value(id)?.unwrap_or_else(|| "_e()".to_string()));
        }
        if el.tag == "slot" {
            return self.gen_slot(id);
        }

        let mut code = match &el.component {
            Some(component) => {
                let data = self.gen_data(id)?;
                let children = if el.inline_template { None } else { self.gen_children(id)? };
                match children {
                    Some(children) => format!("_c({component},{data},{children})"),
                    None => format!("_c({component},{data})"),
                }
            }
            None => {
                let data = if el.plain { None } else { Some(self.gen_data(id)?) };
                let children = if el.inline_template { None } else { self.gen_children(id)? };
                let mut code = format!("_c('{}'", el.tag);
                if let Some(data) = data {
                    code.push(',');
                    code.push_str(&data);
                }
                if let Some(children) = children {
                    code.push(',');
                    code.push_str(&children);
                }
                code.push(')');
                code
            }
        };
        for module in &self.options.modules {
            trace!("module {} transform_code on <{}>", module.name(), el.tag);
            code = module.transform_code(el, code)?;
        }
        Ok(code)
    }

    /// Hoists the subtree into its own render body.
    fn gen_static(&mut self, id: NodeId) -> Result<String, CompileError> {
        // A hoisted body is rendered once already.
        self.mark(id, STATIC_DONE | ONCE_DONE);
        let body = self.gen_element(id)?;
        self.static_bodies.push(format!("with(this){{return {body}}}"));
        let index = self.static_bodies.len() - 1;
        Ok(if self.element(id).static_in_for {
            format!("_m({index},true)")
        } else {
            format!("_m({index})")
        })
    }

    fn gen_once(&mut self, id: NodeId) -> Result<String, CompileError> {
        self.mark(id, ONCE_DONE);
        let el = self.element(id);
        if el.if_exp.is_some() && !self.is_done(id, IF_DONE) {
            return self.gen_if(id);
        }
        if !el.static_in_for {
            return self.gen_static(id);
        }

        let key = self
            .ast
            .ancestors(id)
            .filter_map(|a| self.ast.element(a))
            .find(|a| a.for_loop.is_some())
            .and_then(|a| a.key.clone());
        match key {
            Some(key) => {
                let code = self.gen_element(id)?;
                let once_id = self.once_id;
                self.once_id += 1;
                Ok(format!("_o({code},{once_id},{key})"))
            }
            None => {
                self.ctx.error("r-once can only be used inside r-for that is keyed.", Some(el.span));
                self.gen_element(id)
            }
        }
    }

    fn gen_if(&mut self, id: NodeId) -> Result<String, CompileError> {
        self.mark(id, IF_DONE);
        let conditions = &self.element(id).if_conditions;
        self.gen_if_conditions(conditions)
    }

    fn gen_if_conditions(&mut self, conditions: &'a [IfCondition]) -> Result<String, CompileError> {
        let Some((first, rest)) = conditions.split_first() else {
            return Ok("_e()".to_string());
        };
        let branch = if self.element(first.block).once {
            self.gen_once(first.block)?
        } else {
            self.gen_element(first.block)?
        };
        match &first.exp {
            Some(exp) => Ok(format!("({exp})?{branch}:{}", self.gen_if_conditions(rest)?)),
            None => Ok(branch),
        }
    }

    fn gen_for(&mut self, id: NodeId) -> Result<String, CompileError> {
        self.mark(id, FOR_DONE);
        let el = self.element(id);
        let Some(for_loop) = &el.for_loop else {
            return self.gen_element(id);
        };
        if maybe_component(el, &self.options.tags) && el.tag != "slot" && el.tag != "template" && el.key.is_none() {
            self.ctx.tip(
                format!(
                    "<{} r-for=\"{} in {}\">: component lists rendered with r-for should have explicit keys.",
                    el.tag, for_loop.alias, for_loop.source
                ),
                Some(el.span),
            );
        }
        let body = self.gen_element(id)?;
        Ok(format!(
            "_l(({}),function({}){{return {body}}})",
            for_loop.source,
            for_params(el)
        ))
    }

    fn gen_node(&mut self, id: NodeId) -> Result<String, CompileError> {
        let ast: &'a Ast = self.ast;
        match &ast.node(id).kind {
            NodeKind::Element(_) => self.gen_element(id),
            NodeKind::Text(text) => Ok(match &text.tokens {
                Some(tokens) => tokens_to_expression(tokens),
                None => json_string(&text.text),
            }),
            NodeKind::Comment(comment) => Ok(format!("_e({})", json_string(&comment.text))),
        }
    }

    /// Children as trailing call arguments, with the normalization marker.
    fn gen_children(&mut self, id: NodeId) -> Result<Option<String>, CompileError> {
        let children = &self.element(id).children;
        match children.as_slice() {
            [] => Ok(None),
            [only] if self
                .ast
                .element(*only)
                .is_some_and(|c| c.for_loop.is_some() && c.tag != "template" && c.tag != "slot") =>
            {
                self.gen_element(*only).map(Some)
            }
            _ => {
                let normalization = normalization_for(self.ast, children, &self.options.tags);
                let mut parts = Vec::with_capacity(children.len());
                for &child in children {
                    parts.push(self.gen_node(child)?);
                }
                Ok(Some(format!("{}{}", parts.join(","), normalization.suffix())))
            }
        }
    }

    /// Children as one expression: a lone child bare, several as an array.
    fn gen_children_value(&mut self, id: NodeId) -> Result<Option<String>, CompileError> {
        let children = &self.element(id).children;
        let mut parts = Vec::with_capacity(children.len());
        for &child in children {
            parts.push(self.gen_node(child)?);
        }
        Ok(match parts.len() {
            0 => None,
            1 => parts.pop(),
            _ => Some(format!("[{}]", parts.join(","))),
        })
    }

    fn gen_slot(&mut self, id: NodeId) -> Result<String, CompileError> {
        let el = self.element(id);
        let name = el.slot_name.clone().unwrap_or_else(|| "\"default\"".to_string());
        let fallback = self.gen_children_value(id)?;
        let attrs = (!el.attrs.is_empty()).then(|| {
            let entries: Vec<String> = el
                .attrs
                .iter()
                .map(|a| format!("{}:{}", json_string(&camelize(&a.name)), a.value))
                .collect();
            format!("{{{}}}", entries.join(","))
        });
        let bind = el.wrap_data.as_ref().map(|b| b.value.clone());

        let mut code = format!("_t({name}");
        match fallback {
            Some(fallback) => {
                code.push(',');
                code.push_str(&fallback);
            }
            None if attrs.is_some() || bind.is_some() => code.push_str(",null"),
            None => {}
        }
        match (&attrs, &bind) {
            (Some(attrs), _) => {
                code.push(',');
                code.push_str(attrs);
            }
            (None, Some(_)) => code.push_str(",null"),
            (None, None) => {}
        }
        if let Some(bind) = bind {
            code.push(',');
            code.push_str(&bind);
        }
        code.push(')');
        Ok(code)
    }

    fn gen_data(&mut self, id: NodeId) -> Result<String, CompileError> {
        let el = self.element(id);
        let mut data = String::from("{");

        if let Some(directives) = gen_directives(el) {
            data.push_str(&directives);
            data.push(',');
        }
        if let Some(key) = &el.key {
            data.push_str(&format!("key:{key},"));
        }
        if let Some(ref_name) = &el.ref_name {
            data.push_str(&format!("ref:{ref_name},"));
            if el.ref_in_for {
                data.push_str("refInFor:true,");
            }
        }
        if el.pre {
            data.push_str("pre:true,");
        }
        if !el.attrs.is_empty() {
            data.push_str(&format!("attrs:{{{}}},", gen_props(&el.attrs)));
        }
        if !el.props.is_empty() {
            data.push_str(&gen_props(&el.props));
            data.push(',');
        }
        for module in &self.options.modules {
            trace!("module {} gen_data on <{}>", module.name(), el.tag);
            data.push_str(&module.gen_data(el)?);
        }
        if !el.events.is_empty() {
            data.push_str(&gen_handlers(&el.events));
        }
        if let Some(target) = &el.slot_target {
            if el.slot_scope.is_none() {
                data.push_str(&format!("slot:{target},"));
            }
        }
        if !el.scoped_slots.is_empty() {
            let scoped = self.gen_scoped_slots(&el.scoped_slots)?;
            data.push_str(&scoped);
            data.push(',');
        }
        if el.component.is_some() {
            data.push_str(&format!("tag:{},", json_string(&el.tag)));
        }
        if el.inline_template {
            if let Some(inline) = self.gen_inline_template(id)? {
                data.push_str(&inline);
                data.push(',');
            }
        }

        if data.ends_with(',') {
            data.pop();
        }
        data.push('}');

        if let Some(bind) = &el.wrap_data {
            data = format!(
                "_b({data},'{}',{},{}{})",
                el.tag,
                bind.value,
                bind.is_prop,
                if bind.is_sync { ",true" } else { "" }
            );
        }
        if let Some(listeners) = &el.wrap_listeners {
            data = format!("_g({data},{listeners})");
        }
        Ok(data)
    }

    fn gen_inline_template(&mut self, id: NodeId) -> Result<Option<String>, CompileError> {
        let el = self.element(id);
        let first = el.children.first().copied();
        let first_is_element = first.is_some_and(|c| self.ast.element(c).is_some());
        if el.children.len() != 1 || !first_is_element {
            self.ctx.error(
                "Inline-template components must have exactly one child element.",
                Some(el.span),
            );
        }
        let Some(child) = first.filter(|_| first_is_element) else {
            return Ok(None);
        };

        let mut inline = CodegenState::new(self.ast, self.ctx);
        let render = inline.gen_element(child)?;
        let fns: Vec<String> = inline
            .static_bodies
            .iter()
            .map(|code| format!("function(){{{code}}}"))
            .collect();
        Ok(Some(format!(
            "inlineTemplate:{{render:function(){{with(this){{return {render}}}}},staticRenderFns:[{}]}}",
            fns.join(",")
        )))
    }

    fn gen_scoped_slots(&mut self, slots: &'a [(String, NodeId)]) -> Result<String, CompileError> {
        let mut entries = Vec::with_capacity(slots.len());
        for (key, id) in slots {
            entries.push(self.gen_scoped_slot(key, *id)?);
        }
        Ok(format!("scopedSlots:_u([{}])", entries.join(",")))
    }

    fn gen_scoped_slot(&mut self, key: &str, id: NodeId) -> Result<String, CompileError> {
        let el = self.element(id);
        if let Some(for_loop) = &el.for_loop {
            if !self.is_done(id, FOR_DONE) {
                self.mark(id, FOR_DONE);
                let body = self.gen_scoped_slot(key, id)?;
                return Ok(format!(
                    "_l(({}),function({}){{return {body}}})",
                    for_loop.source,
                    for_params(el)
                ));
            }
        }

        let body = if el.tag == "template" {
            let children = self.gen_children_value(id)?.unwrap_or_else(|| "undefined".to_string());
            match &el.if_exp {
                Some(exp) => format!("({exp})?{children}:undefined"),
                None => children,
            }
        } else {
            self.gen_element(id)?
        };
        let scope = el.slot_scope.as_deref().unwrap_or_default();
        Ok(format!("{{key:{key},fn:function({scope}){{return {body}}}}}"))
    }
}

pub(crate) fn for_params(el: &Element) -> String {
    let Some(for_loop) = &el.for_loop else {
        return String::new();
    };
    let mut params = for_loop.alias.clone();
    for iterator in [&for_loop.iterator1, &for_loop.iterator2].into_iter().flatten() {
        params.push(',');
        params.push_str(iterator);
    }
    params
}

fn binding_key(binding: &Binding) -> String {
    if binding.dynamic {
        format!("[{}]", binding.name)
    } else {
        json_string(&binding.name)
    }
}

/// `"name":value` pairs, comma separated.
pub(crate) fn gen_props(bindings: &[Binding]) -> String {
    bindings
        .iter()
        .map(|b| format!("{}:{}", binding_key(b), crate::util::transform_special_newlines(&b.value)))
        .collect::<Vec<_>>()
        .join(",")
}

/// `directives:[...]` for the directives the runtime still has to apply.
pub(crate) fn gen_directives(el: &Element) -> Option<String> {
    let entries: Vec<String> = el
        .directives
        .iter()
        .filter(|d| d.needs_runtime)
        .map(|dir| {
            let mut entry = format!(
                "{{name:{},rawName:{}",
                json_string(&dir.name),
                json_string(&dir.raw_name)
            );
            if let Some(value) = &dir.value {
                entry.push_str(&format!(",value:({value}),expression:{}", json_string(value)));
            }
            match &dir.arg {
                Some(DirectiveArg::Static(arg)) => entry.push_str(&format!(",arg:{}", json_string(arg))),
                Some(DirectiveArg::Dynamic(arg)) => entry.push_str(&format!(",arg:{arg}")),
                None => {}
            }
            if !dir.modifiers.is_empty() {
                let modifiers: Map<String, Value> = dir
                    .modifiers
                    .iter()
                    .map(|m| (m.clone(), Value::Bool(true)))
                    .collect();
                entry.push_str(&format!(",modifiers:{}", Value::Object(modifiers)));
            }
            entry.push('}');
            entry
        })
        .collect();
    if entries.is_empty() {
        None
    } else {
        Some(format!("directives:[{}]", entries.join(",")))
    }
}
