//! In-memory render scheduler.
//!
//! Stands in for a page: every registration renders once when registered ("load"), and
//! event-bound ones render again each time a matching event is emitted. The combined
//! output is what the page's injected style element would contain.

use log::{debug, trace};

use crate::dispatch::{Producer, Registration, RenderScheduler};
use crate::invocation::{EventBinding, EventTarget};

struct Slot {
    registration: Registration,
    output: String,
}

#[derive(Default)]
pub struct LiveStylesheet {
    slots: Vec<Slot>,
}

impl LiveStylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-render every registration bound to `(target, event)`, in registration order.
    /// Returns how many re-rendered.
    pub fn emit(&mut self, target: &EventTarget, event: &str) -> usize {
        let mut fired = 0;
        for slot in &mut self.slots {
            let bound = slot
                .registration
                .binding
                .as_ref()
                .is_some_and(|b| b.listens_to(target, event));
            if bound {
                slot.output = slot.registration.render();
                fired += 1;
            }
        }
        debug!("{event} on {target}: {fired} producer(s) re-rendered");
        fired
    }

    /// Latest output of each registration, in registration order.
    pub fn outputs(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.output.as_str())
    }

    /// Current stylesheet text: non-empty outputs joined by newlines.
    pub fn css(&self) -> String {
        self.outputs()
            .filter(|o| !o.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl RenderScheduler for LiveStylesheet {
    fn register(&mut self, producer: Producer, binding: Option<EventBinding>) {
        let registration = Registration { producer, binding };
        let output = registration.render();
        trace!("load render: {} byte(s)", output.len());
        self.slots.push(Slot {
            registration,
            output,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counter(label: &'static str) -> (Producer, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let producer: Producer = Box::new(move || {
            seen.set(seen.get() + 1);
            format!("{label}{}", seen.get())
        });
        (producer, calls)
    }

    fn on(target: EventTarget, events: &[&str]) -> Option<EventBinding> {
        Some(EventBinding {
            target,
            events: events.iter().map(|e| e.to_string()).collect(),
        })
    }

    #[test]
    fn register_renders_on_load() {
        let mut sheet = LiveStylesheet::new();
        let (producer, calls) = counter("a");
        sheet.register(producer, None);
        assert_eq!(calls.get(), 1);
        assert_eq!(sheet.css(), "a1");
    }

    #[test]
    fn emit_rerenders_only_matching_bindings() {
        let mut sheet = LiveStylesheet::new();
        let (resize, resize_calls) = counter("r");
        let (click, click_calls) = counter("c");
        sheet.register(resize, on(EventTarget::Window, &["resize", "load"]));
        sheet.register(click, on(EventTarget::Selector("button".into()), &["click"]));

        assert_eq!(sheet.emit(&EventTarget::Window, "resize"), 1);
        assert_eq!(sheet.emit(&EventTarget::Window, "click"), 0);
        assert_eq!(resize_calls.get(), 2);
        assert_eq!(click_calls.get(), 1);
        assert_eq!(sheet.css(), "r2\nc1");
    }

    #[test]
    fn generic_registrations_never_rerender() {
        let mut sheet = LiveStylesheet::new();
        let (producer, calls) = counter("g");
        sheet.register(producer, None);
        sheet.emit(&EventTarget::Window, "load");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn empty_outputs_are_skipped() {
        let mut sheet = LiveStylesheet::new();
        sheet.register(Box::new(String::new), None);
        sheet.register(Box::new(|| "x".to_string()), None);
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.outputs().collect::<Vec<_>>(), vec!["", "x"]);
        assert_eq!(sheet.css(), "x");
    }
}
