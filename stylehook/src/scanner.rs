//! Rule scanner: one synchronous pass over every stylesheet.

use log::{debug, trace};

use crate::cssom::Stylesheet;
use crate::decoder::recognize;
use crate::dispatch::{Dispatcher, Registration, RenderScheduler};
use crate::error::Result;
use crate::invocation::Invocation;
use crate::registry::PluginRegistry;

/// Scan stylesheets and return the registrations they produce, in order.
///
/// Event-bound invocations come first, one registration each, in stylesheet then rule
/// order; the aggregate of all generic invocations, if any, comes last. A malformed
/// argument or event list aborts the whole scan and nothing is returned.
pub fn scan(stylesheets: &[Stylesheet], registry: &PluginRegistry) -> Result<Vec<Registration>> {
    let mut registrations = Vec::new();
    let mut dispatcher = Dispatcher::new(registry);

    for (index, sheet) in stylesheets.iter().enumerate() {
        let name = sheet_name(sheet, index);
        trace!("scanning {name} ({} rules)", sheet.rules.len());

        for rule in &sheet.rules {
            let Some(candidate) = recognize(rule) else {
                continue;
            };

            let key = candidate.plugin_key();
            if !registry.contains(candidate.kind(), &key) {
                debug!(
                    "{name}: no {:?} plugin '{key}' for `{}`",
                    candidate.kind(),
                    candidate.source_text()
                );
                continue;
            }

            let invocation = candidate.decode().map_err(|e| e.in_origin(&name))?;
            dispatcher.dispatch(invocation, &mut registrations);
        }
    }

    let total = dispatcher.finish(&mut registrations);
    debug!("scan produced {total} registration(s)");
    Ok(registrations)
}

/// Scan, then hand every registration to `scheduler`. Nothing is registered if the
/// scan fails. Returns the number of registrations.
pub fn run<S>(stylesheets: &[Stylesheet], registry: &PluginRegistry, scheduler: &mut S) -> Result<usize>
where
    S: RenderScheduler + ?Sized,
{
    let registrations = scan(stylesheets, registry)?;
    let count = registrations.len();
    for Registration { producer, binding } in registrations {
        scheduler.register(producer, binding);
    }
    Ok(count)
}

/// Decode every recognized invocation, registered or not, without dispatching.
pub fn inspect(stylesheets: &[Stylesheet]) -> Result<Vec<Invocation>> {
    let mut invocations = Vec::new();
    for (index, sheet) in stylesheets.iter().enumerate() {
        for rule in &sheet.rules {
            if let Some(candidate) = recognize(rule) {
                let invocation = candidate
                    .decode()
                    .map_err(|e| e.in_origin(&sheet_name(sheet, index)))?;
                invocations.push(invocation);
            }
        }
    }
    Ok(invocations)
}

fn sheet_name(sheet: &Stylesheet, index: usize) -> String {
    match &sheet.href {
        Some(href) => href.clone(),
        None => format!("stylesheet #{index}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cssom::{CssRule, Declarations, GroupRule, StyleRule};
    use crate::error::ErrorKind;
    use crate::invocation::{EventTarget, InvocationKind};

    fn style_rule(selector: &str, pairs: &[(&str, &str)]) -> CssRule {
        CssRule::Style(StyleRule::new(selector, pairs.iter().copied().collect()))
    }

    fn echo_registry() -> PluginRegistry {
        PluginRegistry::new()
            .with_rule("echo", |selector, args, body| {
                let args: Vec<_> = args.iter().map(|a| a.to_string()).collect();
                format!("[{selector}|{}|{body}]", args.join(","))
            })
            .with_stylesheet("wrap", |args, body| format!("<{}:{body}>", args.len()))
    }

    #[test]
    fn generic_rules_concatenate_in_document_order() {
        let sheets = vec![
            Stylesheet::new(vec![style_rule(".a[--echo]", &[("x", "1")])]),
            Stylesheet::new(vec![
                style_rule(".plain", &[]),
                style_rule(r#".b[--echo="2"]"#, &[]),
            ]),
        ];
        let registrations = scan(&sheets, &echo_registry()).unwrap();
        assert_eq!(registrations.len(), 1);
        assert_eq!(registrations[0].binding, None);
        assert_eq!(registrations[0].render(), "[.a||x: 1;][.b|2|]");
    }

    #[test]
    fn bound_rules_register_individually_before_the_aggregate() {
        let sheets = vec![Stylesheet::new(vec![
            style_rule("[--echo]", &[]),
            style_rule(
                "input[--echo]",
                &[("--selector", "input"), ("--events", "[\"input\", \"change\"]")],
            ),
            style_rule("[--echo]", &[("--selector", "window"), ("--events", "resize")]),
        ])];
        let registrations = scan(&sheets, &echo_registry()).unwrap();
        assert_eq!(registrations.len(), 3);

        let first = registrations[0].binding.as_ref().unwrap();
        assert_eq!(first.target, EventTarget::Selector("input".to_string()));
        assert_eq!(first.events, vec!["input", "change"]);
        assert_eq!(registrations[1].binding.as_ref().unwrap().target, EventTarget::Window);
        assert_eq!(registrations[2].binding, None);
        assert_eq!(registrations[2].render(), "[*||]");
    }

    #[test]
    fn group_rules_dispatch_to_stylesheet_handlers() {
        let group = GroupRule::new(r#"--wrap(1, "x")"#, vec![style_rule(".a", &[("b", "c")])]);
        let sheets = vec![Stylesheet::new(vec![CssRule::Group(group)])];
        let registrations = scan(&sheets, &echo_registry()).unwrap();
        assert_eq!(registrations.len(), 1);
        assert_eq!(registrations[0].render(), "<2:.a { b: c; }>");
    }

    #[test]
    fn rule_and_stylesheet_tables_are_separate() {
        let group = GroupRule::new("--echo()", vec![]);
        let sheets = vec![Stylesheet::new(vec![
            CssRule::Group(group),
            style_rule("[--wrap]", &[]),
        ])];
        assert!(scan(&sheets, &echo_registry()).unwrap().is_empty());
    }

    #[test]
    fn empty_registry_registers_nothing() {
        let sheets = vec![Stylesheet::new(vec![
            style_rule("[--echo]", &[("--selector", "window"), ("--events", "load")]),
            style_rule(".a[--echo=\"1\"]", &[]),
        ])];
        assert!(scan(&sheets, &PluginRegistry::new()).unwrap().is_empty());
    }

    #[test]
    fn children_of_grouping_rules_are_not_scanned() {
        let group = GroupRule::new("(display: grid)", vec![style_rule("[--echo]", &[])]);
        let sheets = vec![Stylesheet::new(vec![CssRule::Group(group)])];
        assert!(scan(&sheets, &echo_registry()).unwrap().is_empty());
    }

    #[test]
    fn malformed_args_abort_the_scan() {
        let sheets = vec![Stylesheet::new(vec![
            style_rule("[--echo]", &[("--selector", "window"), ("--events", "load")]),
            style_rule(r#"[--echo="1 2"]"#, &[]),
        ])
        .with_href("site.css")];
        let err = scan(&sheets, &echo_registry()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnexpectedToken { .. }));
        assert_eq!(err.context.as_deref(), Some(r#"[--echo="1 2"]"#));
        assert_eq!(err.origin.as_deref(), Some("site.css"));
        assert!(err.to_string().starts_with("site.css: "));
    }

    #[test]
    fn unnamed_stylesheets_are_reported_by_position() {
        let sheets = vec![
            Stylesheet::new(vec![]),
            Stylesheet::new(vec![style_rule(r#"[--echo="1 2"]"#, &[])]),
        ];
        let err = inspect(&sheets).unwrap_err();
        assert_eq!(err.origin.as_deref(), Some("stylesheet #1"));
    }

    #[test]
    fn malformed_args_of_unregistered_plugins_are_ignored() {
        let sheets = vec![Stylesheet::new(vec![style_rule(r#"[--other="1 2"]"#, &[])])];
        assert!(scan(&sheets, &echo_registry()).unwrap().is_empty());
    }

    #[test]
    fn run_forwards_nothing_on_failure() {
        let sheets = vec![Stylesheet::new(vec![
            style_rule("[--echo]", &[("--selector", "window"), ("--events", "load")]),
            style_rule("[--echo]", &[("--selector", "window"), ("--events", "[load")]),
        ])];
        let mut scheduler: Vec<Registration> = Vec::new();
        assert!(run(&sheets, &echo_registry(), &mut scheduler).is_err());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn inspect_ignores_the_registry() {
        let sheets = vec![Stylesheet::new(vec![
            style_rule("nav [--sticky]", &[]),
            CssRule::Group(GroupRule::new("--grid(3)", vec![])),
            CssRule::Style(StyleRule::new(".x", Declarations::new())),
        ])];
        let invocations = inspect(&sheets).unwrap();
        assert_eq!(invocations.len(), 2);
        assert_eq!(invocations[0].plugin_key, "sticky");
        assert_eq!(invocations[0].selector.as_deref(), Some("nav *"));
        assert_eq!(invocations[1].kind, InvocationKind::Stylesheet);
    }
}
