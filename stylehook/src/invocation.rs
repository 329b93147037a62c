//! Decoded plugin invocations.
//!
//! An [`Invocation`] is the contract between the decoder and the dispatcher: every
//! recognized, registered rule becomes exactly one of these, lives for one dispatch,
//! and is then frozen into a producer closure.

use std::fmt;

use serde::{Serialize, Serializer};

/// One positional plugin argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    String(String),
    Number(f64),
    Bool(bool),
}

impl Literal {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Literal::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => f.write_str(s),
            Literal::Number(n) => write!(f, "{n}"),
            Literal::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Literal::Number(n)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

/// Which handler table an invocation is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationKind {
    /// A style rule: `.card[--grid="3"] { ... }`
    Rule,
    /// A grouping rule: `@supports --grid(3) { ... }`
    Stylesheet,
}

/// Where a bound producer listens for events.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// The global event target.
    Window,
    /// Every element matching the selector.
    Selector(String),
}

impl EventTarget {
    /// `window` names the global target; anything else is a selector.
    pub fn parse(text: &str) -> Self {
        if text == "window" {
            EventTarget::Window
        } else {
            EventTarget::Selector(text.to_string())
        }
    }
}

impl fmt::Display for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTarget::Window => f.write_str("window"),
            EventTarget::Selector(s) => f.write_str(s),
        }
    }
}

impl Serialize for EventTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A `(target, events)` pair; `events` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventBinding {
    pub target: EventTarget,
    pub events: Vec<String>,
}

impl EventBinding {
    pub fn listens_to(&self, target: &EventTarget, event: &str) -> bool {
        &self.target == target && self.events.iter().any(|e| e == event)
    }
}

/// A decoded plugin call, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invocation {
    pub kind: InvocationKind,
    pub plugin_key: String,
    /// Target selector; only rule invocations carry one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    pub args: Vec<Literal>,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<EventBinding>,
}

impl Invocation {
    pub fn is_event_bound(&self) -> bool {
        self.binding.is_some()
    }
}
