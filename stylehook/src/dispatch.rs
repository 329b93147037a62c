//! Dispatcher and generic aggregator.
//!
//! Event-bound invocations become one registration each. Generic invocations are
//! collected in a [`GenericBatch`] and registered once, after the scan, as a single
//! producer that concatenates their outputs.

use std::fmt;

use log::{debug, trace};

use crate::invocation::{EventBinding, Invocation, InvocationKind};
use crate::registry::PluginRegistry;

/// Zero-argument function producing CSS text. Re-running it re-runs the handler with
/// the arguments frozen at scan time.
pub type Producer = Box<dyn Fn() -> String>;

/// A producer plus the events that re-run it. `None` fires once, on load.
pub struct Registration {
    pub producer: Producer,
    pub binding: Option<EventBinding>,
}

impl Registration {
    pub fn render(&self) -> String {
        (self.producer)()
    }

    pub fn is_event_bound(&self) -> bool {
        self.binding.is_some()
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}

/// The collaborator that owns when producers run and where their output goes.
pub trait RenderScheduler {
    fn register(&mut self, producer: Producer, binding: Option<EventBinding>);
}

/// Plain recording: registrations are kept in order, never run.
impl RenderScheduler for Vec<Registration> {
    fn register(&mut self, producer: Producer, binding: Option<EventBinding>) {
        self.push(Registration { producer, binding });
    }
}

/// Ordered producers of generic invocations, consumed once.
#[derive(Default)]
pub struct GenericBatch {
    producers: Vec<Producer>,
}

impl GenericBatch {
    pub fn push(&mut self, producer: Producer) {
        self.producers.push(producer);
    }

    pub fn len(&self) -> usize {
        self.producers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }

    /// One producer concatenating every batched output in order, with no separator.
    /// `None` for an empty batch.
    pub fn into_producer(self) -> Option<Producer> {
        if self.producers.is_empty() {
            return None;
        }
        let producers = self.producers;
        Some(Box::new(move || producers.iter().map(|p| p()).collect::<String>()))
    }
}

/// Bind an invocation to its handler. `None` if the plugin is not registered.
pub fn bind_producer(invocation: &Invocation, registry: &PluginRegistry) -> Option<Producer> {
    let args = invocation.args.clone();
    let body = invocation.body.clone();

    match invocation.kind {
        InvocationKind::Rule => {
            let handler = registry.rule_handler(&invocation.plugin_key)?.clone();
            let selector = invocation
                .selector
                .clone()
                .unwrap_or_else(|| "*".to_string());
            Some(Box::new(move || handler(&selector, &args, &body)))
        }
        InvocationKind::Stylesheet => {
            let handler = registry.stylesheet_handler(&invocation.plugin_key)?.clone();
            Some(Box::new(move || handler(&args, &body)))
        }
    }
}

/// Routes decoded invocations during one scan.
pub struct Dispatcher<'a> {
    registry: &'a PluginRegistry,
    batch: GenericBatch,
    registered: usize,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a PluginRegistry) -> Self {
        Self {
            registry,
            batch: GenericBatch::default(),
            registered: 0,
        }
    }

    /// Register an event-bound invocation now, or batch a generic one.
    pub fn dispatch<S>(&mut self, invocation: Invocation, scheduler: &mut S)
    where
        S: RenderScheduler + ?Sized,
    {
        let Some(producer) = bind_producer(&invocation, self.registry) else {
            debug!("no handler for plugin '{}', skipping", invocation.plugin_key);
            return;
        };

        match invocation.binding {
            Some(binding) => {
                trace!(
                    "plugin '{}' bound to {} on {:?}",
                    invocation.plugin_key,
                    binding.target,
                    binding.events
                );
                scheduler.register(producer, Some(binding));
                self.registered += 1;
            }
            None => {
                trace!("plugin '{}' batched as generic", invocation.plugin_key);
                self.batch.push(producer);
            }
        }
    }

    /// Register the aggregate of all generic invocations. Returns the number of
    /// registrations made during the scan.
    pub fn finish<S>(self, scheduler: &mut S) -> usize
    where
        S: RenderScheduler + ?Sized,
    {
        let generic = self.batch.len();
        match self.batch.into_producer() {
            Some(producer) => {
                debug!("registering {generic} generic invocation(s) as one producer");
                scheduler.register(producer, None);
                self.registered + 1
            }
            None => self.registered,
        }
    }
}
