//! Event-driven CSS plugin rules.
//!
//! Style rules whose selector carries a `[--name]` or `[--name="args"]` marker, and
//! `@supports --name(args) { ... }` grouping rules, are calls to plugins registered in a
//! [`PluginRegistry`]. A scan decodes them into [`Invocation`]s and registers
//! producers with a [`RenderScheduler`]: one per event-bound invocation, plus one for
//! all generic invocations together.

pub mod binding;
pub mod cssom;
pub mod decoder;
pub mod dispatch;
pub mod error;
pub mod invocation;
pub mod lexer;
pub mod marker;
pub mod parser;
pub mod reader;
pub mod registry;
pub mod scanner;
pub mod scheduler;
pub mod template;
pub mod token;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use cssom::{CssRule, Declarations, GroupRule, StyleRule, Stylesheet};
pub use dispatch::{Producer, Registration, RenderScheduler};
pub use error::{ErrorKind, HookError, Result};
pub use invocation::{EventBinding, EventTarget, Invocation, InvocationKind, Literal};
pub use registry::{PluginConfig, PluginRegistry};
pub use scanner::{inspect, run, scan};
pub use scheduler::LiveStylesheet;

/// Scan stylesheets into a fresh [`LiveStylesheet`] and return its load-time CSS.
pub fn render_stylesheets(stylesheets: &[Stylesheet], registry: &PluginRegistry) -> Result<String> {
    let mut live = LiveStylesheet::new();
    scanner::run(stylesheets, registry, &mut live)?;
    Ok(live.css())
}

/// Read each source as one stylesheet, then render them together.
pub fn render_css(sources: &[&str], registry: &PluginRegistry) -> Result<String> {
    let stylesheets = sources
        .iter()
        .map(|source| reader::read_stylesheet(source))
        .collect::<Result<Vec<_>>>()?;
    render_stylesheets(&stylesheets, registry)
}
