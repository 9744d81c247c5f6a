use rdom_compiler::compile;
use rdom_compiler::platform::web::base_options;

fn render(template: &str) -> String {
    compile(template, &base_options()).expect("compile").main_body
}

fn assert_handler(template: &str, data: &str) {
    assert_eq!(render(template), format!("with(this){{return _c('input',{data})}}"));
}

#[test]
fn method_path_handler() {
    assert_handler(r#"<input @input="onInput">"#, r#"{"onInput":onInput}"#);
    assert_handler(r#"<input r-on:input="onInput">"#, r#"{"onInput":onInput}"#);
    assert_handler(r#"<input @input=" onInput ">"#, r#"{"onInput":onInput}"#);
}

#[test]
fn method_calls_are_wrapped() {
    assert_handler(r#"<input @input="onInput($event);">"#, r#"{"onInput":function($event){onInput($event);}}"#);
    assert_handler(r#"<input @input="onInput();">"#, r#"{"onInput":function($event){onInput();}}"#);
    assert_handler(
        r#"<input @input="onInput($event, 'abc', 5);">"#,
        r#"{"onInput":function($event){onInput($event, 'abc', 5);}}"#,
    );
    assert_handler(
        r#"<input @input="onInput1();onInput2()">"#,
        r#"{"onInput":function($event){onInput1();onInput2()}}"#,
    );
    assert_handler(r#"<input @input="current++">"#, r#"{"onInput":function($event){current++}}"#);
}

#[test]
fn function_expressions_pass_through() {
    assert_handler(r#"<input @input="function () { current++ }">"#, r#"{"onInput":function () { current++ }}"#);
    assert_handler(r#"<input @input="()=>current++">"#, r#"{"onInput":()=>current++}"#);
    assert_handler(r#"<input @input="(a, b, c) => current++">"#, r#"{"onInput":(a, b, c) => current++}"#);
    assert_handler(r#"<input @input="e=>current++">"#, r#"{"onInput":e=>current++}"#);
    assert_handler(
        r#"<input @keyup.enter="e=>current++">"#,
        r#"{"onKeyup":function($event){if(!('button' in $event)&&_k($event.keyCode,"enter",13,$event.key,"Enter"))return null;return (e=>current++)($event)}}"#,
    );
}

#[test]
fn key_modifiers() {
    assert_handler(
        r#"<input @input.enter="onInput">"#,
        r#"{"onInput":function($event){if(!('button' in $event)&&_k($event.keyCode,"enter",13,$event.key,"Enter"))return null;return onInput($event)}}"#,
    );
    assert_handler(
        r#"<input @input.delete="onInput">"#,
        r#"{"onInput":function($event){if(!('button' in $event)&&_k($event.keyCode,"delete",[8,46],$event.key,["Backspace","Delete"]))return null;return onInput($event)}}"#,
    );
    assert_handler(
        r#"<input @keydown.enter.delete="onInput">"#,
        r#"{"onKeydown":function($event){if(!('button' in $event)&&_k($event.keyCode,"enter",13,$event.key,"Enter")&&_k($event.keyCode,"delete",[8,46],$event.key,["Backspace","Delete"]))return null;return onInput($event)}}"#,
    );
    assert_handler(
        r#"<input @input.13="onInput">"#,
        r#"{"onInput":function($event){if(!('button' in $event)&&$event.keyCode!==13)return null;return onInput($event)}}"#,
    );
    assert_handler(
        r#"<input @input.custom="onInput">"#,
        r#"{"onInput":function($event){if(!('button' in $event)&&_k($event.keyCode,"custom",undefined,$event.key,undefined))return null;return onInput($event)}}"#,
    );
}

#[test]
fn propagation_modifiers_keep_declared_order() {
    assert_handler(
        r#"<input @input.stop.prevent.self="onInput">"#,
        r#"{"onInput":function($event){$event.stopPropagation();$event.preventDefault();if($event.target !== $event.currentTarget)return null;return onInput($event)}}"#,
    );
    assert_handler(
        r#"<input @keydown.enter.prevent="onInput">"#,
        r#"{"onKeydown":function($event){if(!('button' in $event)&&_k($event.keyCode,"enter",13,$event.key,"Enter"))return null;$event.preventDefault();return onInput($event)}}"#,
    );
}

#[test]
fn system_modifiers() {
    assert_handler(
        r#"<input @click.ctrl="onClick">"#,
        r#"{"onClick":function($event){if(!$event.ctrlKey)return null;return onClick($event)}}"#,
    );
    assert_handler(
        r#"<input @click.exact="onClick">"#,
        r#"{"onClick":function($event){if($event.ctrlKey||$event.shiftKey||$event.altKey||$event.metaKey)return null;return onClick($event)}}"#,
    );
    assert_handler(
        r#"<input @click.ctrl.exact="onClick">"#,
        r#"{"onClick":function($event){if(!$event.ctrlKey)return null;if($event.shiftKey||$event.altKey||$event.metaKey)return null;return onClick($event)}}"#,
    );
}

#[test]
fn mouse_button_renames() {
    assert_handler(
        r#"<input @click.right="onClick">"#,
        r#"{"onContextmenu":function($event){return onClick($event)}}"#,
    );
    assert_handler(
        r#"<input @click.middle="onClick">"#,
        r#"{"onMouseup":function($event){if('button' in $event && $event.button !== 1)return null;return onClick($event)}}"#,
    );
}

#[test]
fn capture_and_once_change_the_key() {
    assert_handler(r#"<input @input.capture="onInput">"#, r#"{"onInputCapture":function($event){return onInput($event)}}"#);
    assert_handler(r#"<input @input.once="onInput">"#, r#"{"onInputOnce":function($event){return onInput($event)}}"#);
    assert_handler(
        r#"<input @input.once.capture="onInput">"#,
        r#"{"onInputCaptureOnce":function($event){return onInput($event)}}"#,
    );
}

#[test]
fn multiple_handlers_share_one_key() {
    assert_handler(
        r#"<input @input="current++" @input.stop="onInput">"#,
        r#"{"onInput":_p(function($event){current++},function($event){$event.stopPropagation();return onInput($event)})}"#,
    );
}

#[test]
fn hyphenated_event_names_are_camelized() {
    assert_handler(r#"<input @custom-event="onCustom">"#, r#"{"onCustomEvent":onCustom}"#);
}

#[test]
fn dynamic_event_name() {
    assert_handler(r#"<input @[name]="onAny">"#, "{[_ek(name)]:onAny}");
}

#[test]
fn native_and_passive_are_ignored_with_a_tip() {
    let out = compile(r#"<input @input.native.passive="onInput">"#, &base_options()).expect("compile");
    assert_eq!(out.main_body, r#"with(this){return _c('input',{"onInput":function($event){return onInput($event)}})}"#);
    assert_eq!(out.tips.len(), 2);
}

#[test]
fn object_on_with_modifiers_is_an_error() {
    let out = compile(r#"<div r-on.stop="listeners"></div>"#, &base_options()).expect("compile");
    assert_eq!(out.errors.len(), 1);
    assert!(out.errors[0].contains("r-on without argument does not support modifiers."));
}
