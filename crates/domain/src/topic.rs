//! Topic template rendering.
//!
//! Topics are addressed through templates with positional `{}` placeholders
//! (`"lights/{}/toggle"`). Rendering happens before any lookup or equality
//! comparison, so the bus only ever stores and compares final topic strings.

use std::fmt::Display;

/// Render a topic template by substituting each `{}` placeholder with the
/// next argument, in order.
///
/// Placeholders without a matching argument are kept literally; surplus
/// arguments are ignored.
#[must_use]
pub fn render(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut next = args.iter();

    while let Some(pos) = rest.find("{}") {
        out.push_str(&rest[..pos]);
        match next.next() {
            Some(arg) => out.push_str(&arg.to_string()),
            None => out.push_str("{}"),
        }
        rest = &rest[pos + 2..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_template_without_placeholders_verbatim() {
        assert_eq!(render("home/lights", &[]), "home/lights");
    }

    #[test]
    fn should_substitute_single_placeholder() {
        assert_eq!(render("lights/{}/toggle", &[&"kitchen"]), "lights/kitchen/toggle");
    }

    #[test]
    fn should_substitute_placeholders_in_order() {
        assert_eq!(
            render("{}/{}/state", &[&"lights", &42]),
            "lights/42/state"
        );
    }

    #[test]
    fn should_keep_unmatched_placeholders_literal() {
        assert_eq!(render("lights/{}/{}", &[&"kitchen"]), "lights/kitchen/{}");
    }

    #[test]
    fn should_ignore_surplus_arguments() {
        assert_eq!(render("lights/{}", &[&"kitchen", &"extra"]), "lights/kitchen");
    }

    #[test]
    fn should_render_numeric_arguments() {
        assert_eq!(render("sensors/{}/reading", &[&7u32]), "sensors/7/reading");
    }
}
