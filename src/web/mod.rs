//! Browser bindings: jQuery/jstree and StrikeOne globals, DOM forms, event wiring.

use crate::api::ReqwestTransport;
use crate::config::EnvConfig;
use crate::controller::{Bookmaker, Handled};
use crate::dom::{
    EventOutcome, Selector, Transition, UiBinding, BOOK_TITLE, BOOK_TREE, BUTTON, CHANGE_PANEL,
    CONTRACT_CONTROL, TOPIC_ATTR,
};
use crate::form::{FormElement, KeyDeriver, VALIDATION_KEY_FIELD};
use crate::models::{MovePayload, TreeOptions};
use crate::tree::TreeWidget;
use leptos::logging::{error, log, warn};
use leptos::task::spawn_local;
use serde::Serialize;
use std::future::Future;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, DocumentReadyState, Element, Event, HtmlFormElement, HtmlInputElement};

const MOVE_EVENT: &str = "move_node.jstree";

#[wasm_bindgen]
extern "C" {
    type JQuery;

    #[wasm_bindgen(js_name = jQuery)]
    fn jquery(selector: &str) -> JQuery;

    #[wasm_bindgen(method, js_name = jstree)]
    fn jstree(this: &JQuery, arg: &JsValue) -> JsValue;

    #[wasm_bindgen(method)]
    fn bind(this: &JQuery, event: &str, handler: &js_sys::Function) -> JQuery;

    #[wasm_bindgen(method)]
    fn attr(this: &JQuery, name: &str) -> Option<String>;

    #[wasm_bindgen(method, js_name = toArray)]
    fn to_array(this: &JQuery) -> js_sys::Array;

    #[wasm_bindgen(js_namespace = ["jQuery", "jstree"], js_name = rollback)]
    fn jstree_rollback(handle: &JsValue);

    #[wasm_bindgen(catch, js_namespace = StrikeOne, js_name = calculateNewKey)]
    fn strikeone_calculate_new_key(key: &str) -> Result<String, JsValue>;
}

/// Visibility through jQuery effects (the page already loads jQuery for jstree).
pub(crate) struct JQueryUi;

impl UiBinding for JQueryUi {
    fn apply(&self, target: Selector, transition: Transition) {
        let el = jquery(&target.css());
        let effect = transition.to_string();
        let res = js_sys::Reflect::get(&el, &effect.as_str().into())
            .and_then(|f| f.dyn_into::<js_sys::Function>().map_err(JsValue::from))
            .and_then(|f| f.call0(&el));
        if let Err(e) = res {
            warn!("[Bookmaker] {}.{}() failed: {:?}", target.css(), effect, e);
        }
    }

    fn alert(&self, message: &str) {
        if let Some(w) = web_sys::window() {
            let _ = w.alert_with_message(message);
        }
    }

    fn run_script(&self, script: &str) -> Result<(), String> {
        js_sys::eval(script)
            .map(|_| ())
            .map_err(|e| e.as_string().unwrap_or_else(|| format!("{e:?}")))
    }
}

#[derive(Clone)]
pub(crate) struct WebForm(pub HtmlFormElement);

impl WebForm {
    fn key_input(&self) -> Option<HtmlInputElement> {
        self.0
            .query_selector(&format!("input[name={VALIDATION_KEY_FIELD}]"))
            .ok()
            .flatten()
            .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
    }

    fn enclosing(el: &Element) -> Option<Self> {
        el.closest("form")
            .ok()
            .flatten()
            .and_then(|f| f.dyn_into::<HtmlFormElement>().ok())
            .map(Self)
    }
}

impl FormElement for WebForm {
    fn method(&self) -> String {
        self.0.get_attribute("method").unwrap_or_default()
    }

    fn action(&self) -> String {
        self.0.action()
    }

    fn serialize(&self) -> Vec<(String, String)> {
        let Ok(data) = web_sys::FormData::new_with_form(&self.0) else {
            return Vec::new();
        };
        let Ok(Some(entries)) = js_sys::try_iter(&data) else {
            return Vec::new();
        };

        // File entries are not strings and are skipped, as jQuery's serialize() does.
        entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let pair = js_sys::Array::from(&entry);
                Some((pair.get(0).as_string()?, pair.get(1).as_string()?))
            })
            .collect()
    }

    fn validation_key(&self) -> Option<String> {
        self.key_input().map(|input| input.value())
    }

    fn set_validation_key(&self, value: &str) {
        if let Some(input) = self.key_input() {
            input.set_value(value);
        }
    }
}

/// The wiki's StrikeOne request-signing script.
pub(crate) struct StrikeOne;

impl KeyDeriver for StrikeOne {
    fn derive(&self, current: &str) -> String {
        match strikeone_calculate_new_key(current) {
            Ok(key) => key,
            Err(e) => {
                warn!("[Bookmaker] StrikeOne unavailable, sending key as-is: {:?}", e);
                current.to_string()
            }
        }
    }
}

pub(crate) struct JsTree {
    el: JQuery,
}

impl TreeWidget for JsTree {
    type Rollback = JsValue;

    fn move_url(&self) -> Option<String> {
        let settings = self.el.jstree(&"get_settings".into());
        js_sys::Reflect::get(&settings, &"move_url".into())
            .ok()
            .and_then(|v| v.as_string())
    }

    fn rollback(&self, handle: &JsValue) {
        jstree_rollback(handle);
    }
}

/// Read the `move_node.jstree` event data: `rslt.o` (moved nodes), `rslt.np`
/// (new parent), `rslt.cp` (drop position) and `rlbk` (rollback handle).
fn parse_move_event(data: &JsValue) -> Result<(MovePayload, JsValue), String> {
    let get = |obj: &JsValue, key: &str| {
        js_sys::Reflect::get(obj, &key.into())
            .ok()
            .filter(|v| !v.is_undefined() && !v.is_null())
            .ok_or_else(|| format!("move event is missing {key}"))
    };

    let rslt = get(data, "rslt")?;

    let moved = get(&rslt, "o")?
        .unchecked_into::<JQuery>()
        .to_array()
        .iter()
        .map(|node| {
            node.dyn_into::<Element>()
                .ok()
                .and_then(|e| e.get_attribute(TOPIC_ATTR))
                .unwrap_or_default()
        })
        .collect();

    let new_parent = get(&rslt, "np")?
        .unchecked_into::<JQuery>()
        .attr(TOPIC_ATTR)
        .unwrap_or_default();

    let base_position = get(&rslt, "cp")?
        .as_f64()
        .ok_or_else(|| "move event position is not a number".to_string())?
        as i64;

    let rollback = get(data, "rlbk")?;

    Ok((
        MovePayload {
            moved,
            new_parent,
            base_position,
        },
        rollback,
    ))
}

type PageController = Bookmaker<JQueryUi, ReqwestTransport, StrikeOne, JsTree>;

/// Bind the controller to the page once the document has been parsed.
pub(crate) fn mount() -> Result<(), String> {
    let window = web_sys::window().ok_or_else(|| "window is unavailable".to_string())?;
    let document = window
        .document()
        .ok_or_else(|| "document is unavailable".to_string())?;

    if document.ready_state() != DocumentReadyState::Loading {
        return bind_page(&document);
    }

    let doc = document.clone();
    let on_ready = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
        if let Err(e) = bind_page(&doc) {
            error!("[Bookmaker] {}", e);
        }
    });
    document
        .add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref())
        .map_err(|_| "failed to wait for DOMContentLoaded".to_string())?;
    on_ready.forget();
    Ok(())
}

fn bind_page(document: &Document) -> Result<(), String> {
    let config = EnvConfig::new();
    let options = TreeOptions::from_config(&config);
    log!(
        "[Bookmaker] Starting (theme={}, move_url={:?})",
        options.themes.theme,
        options.move_url
    );

    let tree_el = jquery(&BOOK_TREE.css());
    let js_options = options
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| format!("failed to encode tree options: {e}"))?;
    tree_el.jstree(&js_options);

    let page_url = web_sys::window()
        .and_then(|w| w.location().href().ok())
        .unwrap_or_default();

    let controller: Rc<PageController> = Rc::new(Bookmaker::new(
        JQueryUi,
        ReqwestTransport::new(page_url),
        StrikeOne,
        JsTree {
            el: tree_el.clone(),
        },
    ));
    controller.start();

    let c = Rc::clone(&controller);
    listen(document, CONTRACT_CONTROL, "click", move |_, ev| {
        apply_outcome(ev, c.on_contract_click());
    })?;

    let c = Rc::clone(&controller);
    listen(document, BOOK_TITLE, "change", move |el, ev| {
        finish(ev, c.on_book_title_change(WebForm::enclosing(el)));
    })?;

    let c = Rc::clone(&controller);
    listen(document, CHANGE_PANEL, "click", move |_, ev| {
        apply_outcome(ev, c.on_change_click());
    })?;

    let c = Rc::clone(&controller);
    listen(document, BUTTON, "click", move |el, ev| {
        finish(
            ev,
            c.on_button_click(WebForm::enclosing(el), el.get_attribute("href")),
        );
    })?;

    let c = Rc::clone(&controller);
    let on_move = Closure::<dyn FnMut(JsValue, JsValue)>::new(move |_ev: JsValue, data: JsValue| {
        match parse_move_event(&data) {
            Ok((payload, rollback)) => {
                let c = Rc::clone(&c);
                spawn_local(async move { c.on_tree_move(payload, rollback).await });
            }
            Err(e) => error!("[BookTree] {}", e),
        }
    });
    tree_el.bind(MOVE_EVENT, on_move.as_ref().unchecked_ref());
    on_move.forget();

    Ok(())
}

/// Attach `handler` to every element matching `target`; a missing element is not an error.
fn listen<H>(document: &Document, target: Selector, event: &str, handler: H) -> Result<(), String>
where
    H: Fn(&Element, &Event) + Clone + 'static,
{
    let nodes = document
        .query_selector_all(&target.css())
        .map_err(|_| format!("invalid selector {}", target.css()))?;

    for i in 0..nodes.length() {
        let Some(el) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        let handler = handler.clone();
        let target_el = el.clone();
        let cb = Closure::<dyn FnMut(Event)>::new(move |ev: Event| handler(&target_el, &ev));
        el.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())
            .map_err(|_| format!("failed to listen for {event} on {}", target.css()))?;
        cb.forget();
    }
    Ok(())
}

fn apply_outcome(ev: &Event, outcome: EventOutcome) {
    if outcome == EventOutcome::PreventDefault {
        ev.prevent_default();
        ev.stop_propagation();
    }
}

fn finish<F>(ev: &Event, handled: Handled<F>)
where
    F: Future<Output = ()> + 'static,
{
    apply_outcome(ev, handled.outcome);
    if let Some(task) = handled.task {
        spawn_local(task);
    }
}

#[cfg(test)]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn make_form(html: &str) -> WebForm {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .expect("document");
        let form = document
            .create_element("form")
            .expect("create form")
            .dyn_into::<HtmlFormElement>()
            .expect("form element");
        form.set_inner_html(html);
        document
            .body()
            .expect("body")
            .append_child(&form)
            .expect("append");
        WebForm(form)
    }

    #[wasm_bindgen_test]
    fn test_web_form_serializes_named_controls() {
        let form = make_form(
            r#"<input name="validation_key" value="?k1">
               <input name="title" value="My Book">
               <input value="unnamed">"#,
        );
        form.0.set_attribute("method", "post").expect("method");

        assert_eq!(form.method(), "post");
        assert_eq!(
            form.serialize(),
            vec![
                ("validation_key".to_string(), "?k1".to_string()),
                ("title".to_string(), "My Book".to_string()),
            ]
        );
    }

    #[wasm_bindgen_test]
    fn test_web_form_validation_key_roundtrip() {
        let form = make_form(r#"<input type="hidden" name="validation_key" value="?k1">"#);
        assert_eq!(form.validation_key().as_deref(), Some("?k1"));
        form.set_validation_key("derived");
        assert_eq!(form.validation_key().as_deref(), Some("derived"));
    }

    #[wasm_bindgen_test]
    fn test_web_form_without_key_field() {
        let form = make_form(r#"<input name="title" value="x">"#);
        assert!(form.validation_key().is_none());
    }

    #[wasm_bindgen_test]
    fn test_enclosing_form_lookup() {
        let form = make_form(r#"<a class="bookmaker_button" href="/rest/add?a=1">add</a>"#);
        let link = form
            .0
            .query_selector(".bookmaker_button")
            .expect("query")
            .expect("link");
        assert!(WebForm::enclosing(&link).is_some());
    }

    fn set(obj: &JsValue, key: &str, value: &JsValue) {
        js_sys::Reflect::set(obj, &key.into(), value).expect("set");
    }

    fn node(topic: Option<&str>) -> JsValue {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .expect("document");
        let li = document.create_element("li").expect("create li");
        if let Some(topic) = topic {
            li.set_attribute(TOPIC_ATTR, topic).expect("topic");
        }
        li.into()
    }

    /// A jQuery-shaped stand-in: `toArray()` returns `nodes`, `attr()` returns `topic`.
    fn collection(nodes: &[JsValue], topic: Option<&str>) -> JsValue {
        let obj: JsValue = js_sys::Object::new().into();
        let array = js_sys::Array::new();
        for n in nodes {
            array.push(n);
        }
        set(&obj, "nodes", &array);
        set(
            &obj,
            "toArray",
            &js_sys::Function::new_no_args("return this.nodes;"),
        );
        match topic {
            Some(t) => set(&obj, "topic", &t.into()),
            None => set(&obj, "topic", &JsValue::UNDEFINED),
        }
        set(
            &obj,
            "attr",
            &js_sys::Function::new_with_args("name", "return name === 'topic' ? this.topic : undefined;"),
        );
        obj
    }

    fn move_event(cp: &JsValue) -> JsValue {
        let rslt: JsValue = js_sys::Object::new().into();
        set(
            &rslt,
            "o",
            &collection(&[node(Some("Web.ChapterOne")), node(None)], None),
        );
        set(&rslt, "np", &collection(&[], Some("Web.MyBook")));
        set(&rslt, "cp", cp);

        let data: JsValue = js_sys::Object::new().into();
        set(&data, "rslt", &rslt);
        set(&data, "rlbk", &"rollback-1".into());
        data
    }

    #[wasm_bindgen_test]
    fn test_parse_move_event_reads_nodes_parent_and_position() {
        let (payload, rollback) =
            parse_move_event(&move_event(&JsValue::from_f64(3.0))).expect("well-formed event");
        assert_eq!(
            payload,
            MovePayload {
                moved: vec!["Web.ChapterOne".to_string(), String::new()],
                new_parent: "Web.MyBook".to_string(),
                base_position: 3,
            }
        );
        assert_eq!(rollback.as_string().as_deref(), Some("rollback-1"));
    }

    #[wasm_bindgen_test]
    fn test_parse_move_event_parent_without_topic_is_empty() {
        let data = move_event(&JsValue::from_f64(0.0));
        let rslt = js_sys::Reflect::get(&data, &"rslt".into()).expect("rslt");
        set(&rslt, "np", &collection(&[], None));
        let (payload, _) = parse_move_event(&data).expect("well-formed event");
        assert_eq!(payload.new_parent, "");
    }

    #[wasm_bindgen_test]
    fn test_parse_move_event_without_result_fails() {
        let data: JsValue = js_sys::Object::new().into();
        set(&data, "rlbk", &"rollback-1".into());
        let err = parse_move_event(&data).expect_err("missing rslt");
        assert_eq!(err, "move event is missing rslt");
    }

    #[wasm_bindgen_test]
    fn test_parse_move_event_rejects_non_numeric_position() {
        let err = parse_move_event(&move_event(&"last".into())).expect_err("bad cp");
        assert_eq!(err, "move event position is not a number");
    }

    #[wasm_bindgen_test]
    fn test_parse_move_event_without_rollback_fails() {
        let data = move_event(&JsValue::from_f64(1.0));
        set(&data, "rlbk", &JsValue::UNDEFINED);
        let err = parse_move_event(&data).expect_err("missing rlbk");
        assert_eq!(err, "move event is missing rlbk");
    }
}
