//! Plugin registry and the JSON plugin configuration that can build one.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{HookError, Result};
use crate::invocation::{InvocationKind, Literal};
use crate::marker::plugin_key;
use crate::template::{PluginTemplate, TemplateSet};

/// `(selector, args, declarations) -> css`
pub type RuleHandler = Rc<dyn Fn(&str, &[Literal], &str) -> String>;
/// `(args, body) -> css`
pub type StylesheetHandler = Rc<dyn Fn(&[Literal], &str) -> String>;

/// Handlers keyed by identifier-cased plugin name.
///
/// Names are folded with [`plugin_key`] on insertion, so `my-plugin` and `myPlugin`
/// register the same entry.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    rule: HashMap<String, RuleHandler>,
    stylesheet: HashMap<String, StylesheetHandler>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_rule<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&str, &[Literal], &str) -> String + 'static,
    {
        self.rule.insert(plugin_key(name), Rc::new(handler));
    }

    pub fn insert_stylesheet<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&[Literal], &str) -> String + 'static,
    {
        self.stylesheet.insert(plugin_key(name), Rc::new(handler));
    }

    /// Builder form of [`insert_rule`](Self::insert_rule).
    pub fn with_rule<F>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(&str, &[Literal], &str) -> String + 'static,
    {
        self.insert_rule(name, handler);
        self
    }

    /// Builder form of [`insert_stylesheet`](Self::insert_stylesheet).
    pub fn with_stylesheet<F>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(&[Literal], &str) -> String + 'static,
    {
        self.insert_stylesheet(name, handler);
        self
    }

    pub fn rule_handler(&self, key: &str) -> Option<&RuleHandler> {
        self.rule.get(key)
    }

    pub fn stylesheet_handler(&self, key: &str) -> Option<&StylesheetHandler> {
        self.stylesheet.get(key)
    }

    pub fn contains(&self, kind: InvocationKind, key: &str) -> bool {
        match kind {
            InvocationKind::Rule => self.rule.contains_key(key),
            InvocationKind::Stylesheet => self.stylesheet.contains_key(key),
        }
    }

    pub fn len(&self) -> usize {
        self.rule.len() + self.stylesheet.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rule: Vec<_> = self.rule.keys().collect();
        let mut stylesheet: Vec<_> = self.stylesheet.keys().collect();
        rule.sort();
        stylesheet.sort();
        f.debug_struct("PluginRegistry")
            .field("rule", &rule)
            .field("stylesheet", &stylesheet)
            .finish()
    }
}

/// Plugin configuration file: `{ "rule": { name: template }, "stylesheet": { ... } }`,
/// with minijinja templates as handlers.
///
/// Both sections are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginConfig {
    #[serde(default)]
    pub rule: BTreeMap<String, PluginTemplate>,
    #[serde(default)]
    pub stylesheet: BTreeMap<String, PluginTemplate>,
}

impl PluginConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| HookError::config(&e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let origin = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|e| HookError::from(e).in_origin(&origin))?;
        Self::from_json(&text).map_err(|e| e.in_origin(&origin))
    }

    /// Compile every template and build a registry whose handlers render them.
    ///
    /// A template that fails to compile is an error. One that fails to render logs a
    /// warning and produces no CSS.
    pub fn into_registry(self) -> Result<PluginRegistry> {
        let mut templates = TemplateSet::new();
        for (name, template) in &self.rule {
            templates.add(&template_id(InvocationKind::Rule, name), template)?;
        }
        for (name, template) in &self.stylesheet {
            templates.add(&template_id(InvocationKind::Stylesheet, name), template)?;
        }
        let templates = Rc::new(templates);

        let mut registry = PluginRegistry::new();
        for name in self.rule.keys() {
            let id = template_id(InvocationKind::Rule, name);
            let templates = Rc::clone(&templates);
            registry.insert_rule(name, move |selector, args, body| {
                render_or_warn(&templates, &id, Some(selector), args, body)
            });
        }
        for name in self.stylesheet.keys() {
            let id = template_id(InvocationKind::Stylesheet, name);
            let templates = Rc::clone(&templates);
            registry.insert_stylesheet(name, move |args, body| {
                render_or_warn(&templates, &id, None, args, body)
            });
        }
        Ok(registry)
    }
}

fn template_id(kind: InvocationKind, name: &str) -> String {
    match kind {
        InvocationKind::Rule => format!("rule/{name}"),
        InvocationKind::Stylesheet => format!("stylesheet/{name}"),
    }
}

fn render_or_warn(
    templates: &TemplateSet,
    id: &str,
    selector: Option<&str>,
    args: &[Literal],
    body: &str,
) -> String {
    templates
        .render(id, selector, args, body)
        .unwrap_or_else(|e| {
            warn!("{e}");
            String::new()
        })
}
