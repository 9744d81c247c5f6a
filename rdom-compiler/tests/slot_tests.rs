use rdom_compiler::compile;
use rdom_compiler::platform::web::base_options;

fn render(template: &str) -> String {
    compile(template, &base_options()).expect("compile").main_body
}

#[test]
fn default_and_named_slots() {
    assert_eq!(render("<div><slot></slot></div>"), r#"with(this){return _c('div',_t("default"),2)}"#);
    assert_eq!(render(r#"<div><slot name="one"></slot></div>"#), r#"with(this){return _c('div',_t("one"),2)}"#);
}

#[test]
fn slot_fallback_content() {
    assert_eq!(
        render("<div><slot><div>hi</div></slot></div>"),
        r#"with(this){return _c('div',_t("default",_c('div',"hi")),2)}"#
    );
}

#[test]
fn slot_attrs_and_bind() {
    assert_eq!(
        render(r#"<div><slot :item-data="item"></slot></div>"#),
        r#"with(this){return _c('div',_t("default",null,{"itemData":item}),2)}"#
    );
    assert_eq!(
        render(r#"<div><slot r-bind="props"></slot></div>"#),
        r#"with(this){return _c('div',_t("default",null,null,props),2)}"#
    );
}

#[test]
fn slot_target() {
    assert_eq!(
        render(r#"<p slot="one">hello world</p>"#),
        r#"with(this){return _c('p',{attrs:{"slot":"one"},slot:"one"},"hello world")}"#
    );
}

#[test]
fn scoped_slots() {
    assert_eq!(
        render(r#"<foo><template slot-scope="bar">{{ bar }}</template></foo>"#),
        r#"with(this){return _c('foo',{scopedSlots:_u([{key:"default",fn:function(bar){return _s(bar)}}])})}"#
    );
    assert_eq!(
        render(r#"<foo><div slot-scope="bar">{{ bar }}</div></foo>"#),
        r#"with(this){return _c('foo',{scopedSlots:_u([{key:"default",fn:function(bar){return _c('div',{},_s(bar))}}])})}"#
    );
}

#[test]
fn named_scoped_slots() {
    assert_eq!(
        render(r#"<foo><template slot="foo" slot-scope="bar">{{ bar }}</template></foo>"#),
        r#"with(this){return _c('foo',{scopedSlots:_u([{key:"foo",fn:function(bar){return _s(bar)}}])})}"#
    );
    assert_eq!(
        render(r#"<foo><div slot="foo" slot-scope="bar">{{ bar }}</div></foo>"#),
        r#"with(this){return _c('foo',{scopedSlots:_u([{key:"foo",fn:function(bar){return _c('div',{},_s(bar))}}])})}"#
    );
}

#[test]
fn legacy_scope_attribute_gets_a_tip() {
    let out = compile(r#"<foo><template scope="bar">{{ bar }}</template></foo>"#, &base_options()).expect("compile");
    assert_eq!(out.tips.len(), 1);
    assert!(out.tips[0].contains("\"scope\" attribute for scoped slots have been deprecated"));
    assert_eq!(
        out.main_body,
        r#"with(this){return _c('foo',{scopedSlots:_u([{key:"default",fn:function(bar){return _s(bar)}}])})}"#
    );
}

#[test]
fn slot_as_root_is_an_error() {
    let out = compile("<slot></slot>", &base_options()).expect("compile");
    assert_eq!(out.errors.len(), 1);
    assert!(out.errors[0].contains("Cannot use <slot> as component root element"));
}

#[test]
fn keyed_slot_is_an_error() {
    let out = compile(r#"<div><slot :key="k"></slot></div>"#, &base_options()).expect("compile");
    assert_eq!(out.errors.len(), 1);
    assert!(out.errors[0].contains("`key` does not work on <slot>"));
}
