//! WASM bindings.
//!
//! Exposes stylesheet rendering to JavaScript with JS functions as plugin handlers.
//! Build with: `wasm-pack build --target web --features wasm`

use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::prelude::*;

use crate::invocation::Literal;
use crate::registry::PluginRegistry;

/// Render `css` with plugins from `{ rule: { name: fn }, stylesheet: { name: fn } }`.
///
/// Rule plugins are called as `fn(selector, ...args, declarations)`, stylesheet plugins as
/// `fn(...args, body)`. Each must return a string. Returns the load-time CSS, or throws
/// on malformed stylesheet text or plugin arguments.
#[wasm_bindgen]
pub fn render(css: &str, plugins: JsValue) -> Result<String, JsError> {
    let registry = registry_from_js(&plugins)?;
    crate::render_css(&[css], &registry).map_err(|e| JsError::new(&e.to_string()))
}

/// Decode every plugin invocation in `css` and return them as a JSON string.
#[wasm_bindgen]
pub fn inspect(css: &str) -> Result<String, JsError> {
    let sheet = crate::reader::read_stylesheet(css).map_err(|e| JsError::new(&e.to_string()))?;
    let invocations = crate::inspect(&[sheet]).map_err(|e| JsError::new(&e.to_string()))?;
    serde_json::to_string(&invocations).map_err(|e| JsError::new(&e.to_string()))
}

fn registry_from_js(plugins: &JsValue) -> Result<PluginRegistry, JsError> {
    let mut registry = PluginRegistry::new();

    for (name, func) in functions(plugins, "rule")? {
        registry.insert_rule(&name, move |selector, args, body| {
            let call_args = Array::new();
            call_args.push(&JsValue::from_str(selector));
            push_literals(&call_args, args);
            call_args.push(&JsValue::from_str(body));
            call(&func, &call_args)
        });
    }

    for (name, func) in functions(plugins, "stylesheet")? {
        registry.insert_stylesheet(&name, move |args, body| {
            let call_args = Array::new();
            push_literals(&call_args, args);
            call_args.push(&JsValue::from_str(body));
            call(&func, &call_args)
        });
    }

    Ok(registry)
}

/// `(name, function)` pairs of one plugin table. A missing table is empty.
fn functions(plugins: &JsValue, table: &str) -> Result<Vec<(String, Function)>, JsError> {
    if plugins.is_undefined() || plugins.is_null() {
        return Ok(Vec::new());
    }
    let section = Reflect::get(plugins, &JsValue::from_str(table))
        .map_err(|_| JsError::new(&format!("cannot read plugins.{table}")))?;
    if section.is_undefined() || section.is_null() {
        return Ok(Vec::new());
    }
    let section: Object = section
        .dyn_into()
        .map_err(|_| JsError::new(&format!("plugins.{table} must be an object")))?;

    let mut out = Vec::new();
    for entry in Object::entries(&section).iter() {
        let pair: Array = entry.unchecked_into();
        let name = pair
            .get(0)
            .as_string()
            .ok_or_else(|| JsError::new(&format!("plugins.{table}: key is not a string")))?;
        let func: Function = pair
            .get(1)
            .dyn_into()
            .map_err(|_| JsError::new(&format!("plugins.{table}.{name} is not a function")))?;
        out.push((name, func));
    }
    Ok(out)
}

fn push_literals(array: &Array, args: &[Literal]) {
    for arg in args {
        let value = match arg {
            Literal::String(s) => JsValue::from_str(s),
            Literal::Number(n) => JsValue::from_f64(*n),
            Literal::Bool(b) => JsValue::from_bool(*b),
        };
        array.push(&value);
    }
}

/// Call a plugin, rethrowing anything it throws. Non-string results render as empty.
fn call(func: &Function, args: &Array) -> String {
    match func.apply(&JsValue::NULL, args) {
        Ok(value) => value.as_string().unwrap_or_default(),
        Err(err) => wasm_bindgen::throw_val(err),
    }
}
