//! Named rewrite rules.

/// A single stateless text rewrite step.
///
/// Converters keep their rules in a fixed-order slice so the ordering
/// constraints between rules are visible in one place.
#[derive(Clone, Copy)]
pub struct Rule {
    /// Short identifier, used in logs and tests.
    pub name: &'static str,
    apply: fn(&str) -> String,
}

impl Rule {
    pub(crate) const fn new(name: &'static str, apply: fn(&str) -> String) -> Self {
        Self { name, apply }
    }

    /// Run this rule on `input`.
    #[must_use]
    pub fn apply(&self, input: &str) -> String {
        (self.apply)(input)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Apply every rule in order, feeding each output into the next rule.
pub(crate) fn apply_all(rules: &[Rule], input: &str) -> String {
    rules.iter().fold(input.to_owned(), |text, rule| {
        tracing::trace!(rule = rule.name, "Applying rewrite rule");
        rule.apply(&text)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper(s: &str) -> String {
        s.to_uppercase()
    }

    fn exclaim(s: &str) -> String {
        format!("{s}!")
    }

    #[test]
    fn test_apply_all_runs_in_order() {
        let rules = [Rule::new("upper", upper), Rule::new("exclaim", exclaim)];
        assert_eq!(apply_all(&rules, "hi"), "HI!");
    }

    #[test]
    fn test_apply_all_empty_rules_is_identity() {
        assert_eq!(apply_all(&[], "text"), "text");
    }

    #[test]
    fn test_rule_debug_shows_name() {
        let rule = Rule::new("upper", upper);
        assert_eq!(format!("{rule:?}"), r#"Rule { name: "upper" }"#);
    }
}
