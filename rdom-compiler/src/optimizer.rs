//! Static analysis over the parsed tree.
//!
//! `mark_static` runs bottom-up and flags subtrees whose output never
//! changes. `mark_static_roots` then picks the subtrees worth hoisting into
//! their own render functions, tracking whether a node sits inside a loop.

use log::debug;

use crate::diagnostics::CompileContext;
use crate::options::CompilerOptions;
use crate::template_ast::{Ast, Element, NodeId, NodeKind};

pub fn optimize(ast: &mut Ast, ctx: &CompileContext<'_>) {
    let Some(root) = ast.root else {
        return;
    };
    mark_static(ast, root, ctx.options);
    mark_static_roots(ast, root, false);
    debug!(
        "optimized tree, {} static roots",
        ast.nodes
            .iter()
            .filter(|n| matches!(&n.kind, NodeKind::Element(el) if el.static_root))
            .count()
    );
}

fn is_built_in_tag(tag: &str) -> bool {
    tag == "slot" || tag == "component"
}

fn is_direct_child_of_template_for(ast: &Ast, id: NodeId) -> bool {
    for ancestor in ast.ancestors(id) {
        match ast.element(ancestor) {
            Some(el) if el.tag == "template" => {
                if el.for_loop.is_some() {
                    return true;
                }
            }
            _ => return false,
        }
    }
    false
}

fn element_is_static(ast: &Ast, id: NodeId, el: &Element, options: &CompilerOptions) -> bool {
    if el.pre {
        return true;
    }
    !el.has_bindings
        && el.if_exp.is_none()
        && el.else_if.is_none()
        && !el.is_else
        && el.for_loop.is_none()
        && !is_built_in_tag(&el.tag)
        && options.tags.is_reserved(&el.tag)
        && !is_direct_child_of_template_for(ast, id)
        && el.key.is_none()
        && el.ref_name.is_none()
        && el.slot_target.is_none()
        && el.slot_scope.is_none()
        && el.scoped_slots.is_empty()
        && el.component.is_none()
        && !el.inline_template
        && el.directives.is_empty()
        && el.events.is_empty()
        && el.props.is_empty()
        && el.class_binding.is_none()
        && el.style_binding.is_none()
        && el.wrap_data.is_none()
        && el.wrap_listeners.is_none()
        && el.extra.keys().all(|k| options.is_static_key(k))
}

fn set_static(ast: &mut Ast, id: NodeId, value: bool) {
    match &mut ast.nodes[id.0].kind {
        NodeKind::Element(el) => el.is_static = value,
        NodeKind::Text(t) => t.is_static = value,
        NodeKind::Comment(c) => c.is_static = value,
    }
}

fn mark_static(ast: &mut Ast, id: NodeId, options: &CompilerOptions) {
    let (children, branches) = match &ast.node(id).kind {
        NodeKind::Text(t) => {
            let is_static = t.tokens.is_none();
            set_static(ast, id, is_static);
            return;
        }
        NodeKind::Comment(_) => {
            set_static(ast, id, true);
            return;
        }
        NodeKind::Element(el) => {
            let is_static = element_is_static(ast, id, el, options);
            // Component slot content stays dynamic.
            let descend = options.tags.is_reserved(&el.tag) || el.tag == "slot" || el.inline_template;
            let children = if descend { el.children.clone() } else { Vec::new() };
            let branches: Vec<NodeId> = if descend {
                el.if_conditions.iter().skip(1).map(|c| c.block).collect()
            } else {
                Vec::new()
            };
            set_static(ast, id, is_static);
            (children, branches)
        }
    };

    let mut all_static = true;
    for child in children.into_iter().chain(branches) {
        mark_static(ast, child, options);
        all_static &= ast.is_static(child);
    }
    if !all_static {
        set_static(ast, id, false);
    }
}

fn mark_static_roots(ast: &mut Ast, id: NodeId, is_in_for: bool) {
    let (children, branches, child_in_for) = {
        let Some(el) = ast.element(id) else {
            return;
        };
        let lone_text = match el.children.as_slice() {
            [only] => matches!(ast.node(*only).kind, NodeKind::Text(_) | NodeKind::Comment(_)),
            _ => false,
        };
        let static_root = el.is_static && !el.children.is_empty() && !lone_text && (!is_in_for || el.once);
        let children = el.children.clone();
        let branches: Vec<NodeId> = el.if_conditions.iter().skip(1).map(|c| c.block).collect();
        let child_in_for = is_in_for || el.for_loop.is_some();

        if let Some(el) = ast.element_mut(id) {
            el.static_in_for = is_in_for;
            el.static_root = static_root;
        }
        if static_root {
            return;
        }
        (children, branches, child_in_for)
    };

    for child in children {
        mark_static_roots(ast, child, child_in_for);
    }
    for branch in branches {
        mark_static_roots(ast, branch, is_in_for);
    }
}
