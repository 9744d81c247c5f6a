use rdom_compiler::optimizer::optimize;
use rdom_compiler::platform::web::base_options;
use rdom_compiler::{Ast, CompileContext, CompilerOptions, Element, NodeId, parse};

fn optimized(template: &str, options: &CompilerOptions) -> Ast {
    let mut ctx = CompileContext::new(options);
    let mut ast = parse(template, &mut ctx).expect("parse");
    optimize(&mut ast, &ctx);
    ast
}

fn root(ast: &Ast) -> NodeId {
    ast.root.expect("root element")
}

fn el(ast: &Ast, id: NodeId) -> &Element {
    ast.element(id).expect("element node")
}

/// Follows a path of child indices from the root.
fn at(ast: &Ast, path: &[usize]) -> NodeId {
    path.iter()
        .fold(root(ast), |id, &index| ast.child(id, index).expect("child"))
}

#[test]
fn static_subtree_becomes_a_root() {
    let ast = optimized(r#"<h1 id="section1"><span>hello world</span></h1>"#, &base_options());
    let h1 = el(&ast, root(&ast));
    assert!(h1.is_static);
    assert!(h1.static_root);
    let span = at(&ast, &[0]);
    assert!(el(&ast, span).is_static);
    assert!(!el(&ast, span).static_root);
}

#[test]
fn lone_text_child_is_not_worth_hoisting() {
    let ast = optimized("<p>hello</p>", &base_options());
    let p = el(&ast, root(&ast));
    assert!(p.is_static);
    assert!(!p.static_root);
}

#[test]
fn interpolation_is_dynamic() {
    let ast = optimized("<h1>{{ msg }}</h1>", &base_options());
    assert!(!el(&ast, root(&ast)).is_static);
    assert!(!ast.is_static(at(&ast, &[0])));
}

#[test]
fn dynamic_child_taints_the_parent() {
    let ast = optimized("<div><p>static</p><p>{{ dynamic }}</p></div>", &base_options());
    assert!(!el(&ast, root(&ast)).is_static);
    assert!(el(&ast, at(&ast, &[0])).is_static);
    assert!(!el(&ast, at(&ast, &[1])).is_static);
}

#[test]
fn for_loops_are_dynamic() {
    let ast = optimized(r#"<ul><li r-for="item in items">hello world {{ $index }}</li></ul>"#, &base_options());
    assert!(!el(&ast, root(&ast)).is_static);
    assert!(!el(&ast, at(&ast, &[0])).is_static);
}

#[test]
fn static_content_inside_for_is_flagged_but_not_hoisted() {
    let ast = optimized(r#"<ul><li r-for="i in list"><p><span>hi</span></p></li></ul>"#, &base_options());
    let p = el(&ast, at(&ast, &[0, 0]));
    assert!(p.is_static);
    assert!(p.static_in_for);
    assert!(!p.static_root);
}

#[test]
fn conditional_branches_are_dynamic() {
    let ast = optimized(r#"<div><p r-if="show">hello</p><p r-else>bye</p></div>"#, &base_options());
    assert!(!el(&ast, root(&ast)).is_static);
    let head = el(&ast, at(&ast, &[0]));
    assert!(!head.is_static);
    let else_block = head.if_conditions[1].block;
    assert!(!el(&ast, else_block).is_static);
}

#[test]
fn static_branch_content_is_still_hoisted() {
    let ast = optimized(r#"<div><div r-if="a"><p><b>x</b></p></div><div r-else><p><b>y</b></p></div></div>"#, &base_options());
    let head = at(&ast, &[0]);
    let else_block = el(&ast, head).if_conditions[1].block;
    let if_p = ast.child(head, 0).expect("p in if branch");
    let else_p = ast.child(else_block, 0).expect("p in else branch");
    assert!(el(&ast, if_p).static_root);
    assert!(el(&ast, else_p).static_root);
}

#[test]
fn bindings_keys_and_listeners_are_dynamic() {
    for template in [
        r#"<p :id="id">hi</p>"#,
        r#"<p :key="k">hi</p>"#,
        r#"<p ref="r">hi</p>"#,
        r#"<p @click="go">hi</p>"#,
        r#"<p :class="c">hi</p>"#,
        r#"<p r-custom="x">hi</p>"#,
    ] {
        let ast = optimized(template, &base_options());
        assert!(!el(&ast, root(&ast)).is_static, "{template} should not be static");
    }
}

#[test]
fn static_class_and_style_stay_static() {
    let ast = optimized(r#"<div class="a" style="color: red"><p>x</p></div>"#, &base_options());
    let div = el(&ast, root(&ast));
    assert!(div.is_static);
    assert!(div.static_root);
}

#[test]
fn components_and_slots_are_dynamic() {
    let ast = optimized("<my-comp><p>hi</p></my-comp>", &base_options());
    assert!(!el(&ast, root(&ast)).is_static);

    let ast = optimized("<div><slot></slot></div>", &base_options());
    assert!(!el(&ast, root(&ast)).is_static);
    assert!(!el(&ast, at(&ast, &[0])).is_static);
}

#[test]
fn pre_subtree_is_static() {
    let ast = optimized(r#"<div r-pre><p>{{ msg }}</p></div>"#, &base_options());
    let div = el(&ast, root(&ast));
    assert!(div.is_static);
    assert!(div.static_root);
}

#[test]
fn once_inside_keyed_for() {
    let ast = optimized(
        r#"<div><div r-for="i in list" :key="i"><p r-once><b>x</b></p></div></div>"#,
        &base_options(),
    );
    let p = el(&ast, at(&ast, &[0, 0]));
    assert!(p.once);
    assert!(p.is_static);
    assert!(p.static_in_for);
    assert!(p.static_root);
}

#[test]
fn comments_are_static() {
    let ast = optimized("<div><!-- note --><p>x</p></div>", &base_options().with_comments(true));
    assert!(el(&ast, root(&ast)).static_root);
}

#[test]
fn unknown_tags_are_never_static_without_a_platform() {
    let ast = optimized("<div><p>hi</p></div>", &CompilerOptions::default());
    assert!(!el(&ast, root(&ast)).is_static);
    assert!(!el(&ast, root(&ast)).static_root);
}

#[test]
fn empty_template_is_a_no_op() {
    let options = base_options();
    let ctx = CompileContext::new(&options);
    let mut ast = Ast::default();
    optimize(&mut ast, &ctx);
    assert!(ast.root.is_none());
}

#[test]
fn scoped_slot_host_is_dynamic() {
    let ast = optimized(
        r#"<section><div><p slot-scope="s">{{ s.a }}</p><span>x</span></div>{{ y }}</section>"#,
        &base_options(),
    );
    let host = el(&ast, at(&ast, &[0]));
    assert_eq!(host.scoped_slots.len(), 1);
    assert!(!host.is_static);
    assert!(!host.static_root);

    let out = rdom_compiler::compile(
        r#"<section><div><p slot-scope="s">{{ s.a }}</p><span>x</span></div>{{ y }}</section>"#,
        &base_options(),
    )
    .expect("compile");
    assert!(out.static_bodies.is_empty());
    assert!(out.main_body.contains("scopedSlots:_u("));
}
