use rdom_compiler::compile;
use rdom_compiler::platform::web::base_options;

fn render(template: &str) -> String {
    compile(template, &base_options()).expect("compile").main_body
}

#[test]
fn keyed_for() {
    assert_eq!(
        render(r#"<div><li r-for="item in items" :key="item.uid"></li></div>"#),
        "with(this){return _c('div',_l((items),function(item){return _c('li',{key:item.uid})}))}"
    );
}

#[test]
fn for_with_iterators() {
    assert_eq!(
        render(r#"<div><li r-for="(item, i) in items"></li></div>"#),
        "with(this){return _c('div',_l((items),function(item,i){return _c('li')}))}"
    );
    assert_eq!(
        render(r#"<div><li r-for="(item, key, index) in items"></li></div>"#),
        "with(this){return _c('div',_l((items),function(item,key,index){return _c('li')}))}"
    );
}

#[test]
fn for_with_destructuring() {
    assert_eq!(
        render(r#"<div><li r-for="{ a, b } in items"></li></div>"#),
        "with(this){return _c('div',_l((items),function({ a, b }){return _c('li')}))}"
    );
    assert_eq!(
        render(r#"<div><li r-for="({ a, b }, key, index) in items"></li></div>"#),
        "with(this){return _c('div',_l((items),function({ a, b },key,index){return _c('li')}))}"
    );
}

#[test]
fn for_among_siblings_is_deep_normalized() {
    assert_eq!(
        render(r#"<div><p></p><li r-for="item in items"></li></div>"#),
        "with(this){return _c('div',_c('p'),_l((items),function(item){return _c('li')}),2)}"
    );
}

#[test]
fn template_for_renders_children() {
    assert_eq!(
        render(r#"<div><child></child><template r-for="item in list">{{ item }}</template></div>"#),
        "with(this){return _c('div',_c('child'),_l((list),function(item){return _s(item)}),2)}"
    );
}

#[test]
fn unkeyed_component_list_gets_a_tip() {
    let out = compile(r#"<div><my-item r-for="x in xs"></my-item></div>"#, &base_options()).expect("compile");
    assert_eq!(out.tips.len(), 1);
    assert!(out.tips[0].contains("component lists rendered with r-for should have explicit keys."));
}

#[test]
fn invalid_for_expression_is_reported() {
    let out = compile(r#"<div><li r-for="items"></li></div>"#, &base_options()).expect("compile");
    assert_eq!(out.errors.len(), 1);
    assert!(out.errors[0].contains("Invalid r-for expression: items"));
}

#[test]
fn for_on_root_is_an_error() {
    let out = compile(r#"<li r-for="x in xs"></li>"#, &base_options()).expect("compile");
    assert_eq!(out.errors.len(), 1);
    assert!(out.errors[0].contains("Cannot use r-for on stateful component root element"));
}

#[test]
fn model_on_for_alias_is_an_error() {
    let out = compile(r#"<div><input r-for="item in items" r-model="item"></div>"#, &base_options())
        .expect("compile");
    assert!(out.errors.iter().any(|e| e.contains("You are binding r-model directly to a r-for iteration alias")));
}
