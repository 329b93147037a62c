//! Plugin handlers written as minijinja templates.
//!
//! Every template sees `body` and `args` (each argument in its source text form). Rule
//! templates also see `selector`. Single CSS braces need no escaping:
//!
//! ```text
//! @media (min-width: {{ args[0] }}px) { {{ selector }} { {{ body }} } }
//! ```

use minijinja::{context, Environment};
use serde::{Deserialize, Serialize};

use crate::error::{HookError, Result};
use crate::invocation::Literal;

/// Template source as written in a plugin configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginTemplate {
    source: String,
}

impl PluginTemplate {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Compiled plugin templates sharing one environment.
pub struct TemplateSet {
    env: Environment<'static>,
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateSet {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        Self { env }
    }

    /// Compile `template` under `id`. Syntax errors are reported here, not at render time.
    pub fn add(&mut self, id: &str, template: &PluginTemplate) -> Result<()> {
        self.env
            .add_template_owned(id.to_string(), template.source.clone())
            .map_err(|e| HookError::from(e).in_context(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.env.get_template(id).is_ok()
    }

    pub fn render(
        &self,
        id: &str,
        selector: Option<&str>,
        args: &[Literal],
        body: &str,
    ) -> Result<String> {
        let template = self.env.get_template(id)?;
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let ctx = match selector {
            Some(selector) => context! { selector => selector, body => body, args => args },
            None => context! { body => body, args => args },
        };
        template
            .render(ctx)
            .map_err(|e| HookError::from(e).in_context(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn render(source: &str, selector: Option<&str>, args: &[Literal], body: &str) -> String {
        let mut set = TemplateSet::new();
        set.add("t", &PluginTemplate::new(source)).unwrap();
        set.render("t", selector, args, body).unwrap()
    }

    #[test]
    fn context_is_substituted() {
        let out = render(
            "{{ selector }}:hover { {{ body }} } /* {{ args | join(', ') }} */",
            Some(".a"),
            &[Literal::from(1.0), Literal::from(true)],
            "color: red;",
        );
        assert_eq!(out, ".a:hover { color: red; } /* 1, true */");
    }

    #[test]
    fn css_braces_pass_through() {
        let out = render("@media print { {{ selector }} { display: none } }", Some("nav"), &[], "");
        assert_eq!(out, "@media print { nav { display: none } }");
    }

    #[test]
    fn numbers_render_in_source_form() {
        let out = render("{{ args[0] }}px", Some("a"), &[Literal::from(600.0)], "");
        assert_eq!(out, "600px");
    }

    #[test]
    fn missing_positional_argument_is_empty() {
        let out = render("[{{ args[0] }}|{{ args[3] }}]", None, &[Literal::from("x")], "");
        assert_eq!(out, "[x|]");
    }

    #[test]
    fn stylesheet_templates_have_no_selector() {
        assert_eq!(render("{{ selector }}|{{ body }}", None, &[], "x"), "|x");
    }

    #[test]
    fn control_flow_is_available() {
        let source = "{% if args %}{{ args[0] }}{% else %}none{% endif %}";
        assert_eq!(render(source, None, &[], ""), "none");
        assert_eq!(render(source, None, &[Literal::from("a")], ""), "a");
    }

    #[test]
    fn syntax_errors_surface_on_add() {
        let mut set = TemplateSet::new();
        let err = set.add("broken", &PluginTemplate::new("{{ body")).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Template(_)));
        assert_eq!(err.context.as_deref(), Some("broken"));
        assert!(!set.contains("broken"));
    }
}
