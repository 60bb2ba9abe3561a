use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

/// Explicit placeholder -> value mapping for one render.
///
/// A placeholder with no mapped value renders as the configured default
/// instead of failing; one bad record never aborts a batch.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    values: BTreeMap<String, String>,
    default_value: String,
}

impl TemplateContext {
    pub fn new(default_value: impl Into<String>) -> Self {
        Self {
            values: BTreeMap::new(),
            default_value: default_value.into(),
        }
    }

    pub fn set(mut self, name: &str, value: impl Into<String>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([a-zA-Z0-9_]+)\}").unwrap())
}

/// Substitute `{name}` placeholders from the context.
///
/// Pure: same (template, context) always yields the same text. Brace
/// content that is not a plain identifier is left untouched.
pub fn render(template: &str, ctx: &TemplateContext) -> String {
    placeholder_re()
        .replace_all(template, |caps: &regex::Captures<'_>| {
            ctx.values
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| ctx.default_value.clone())
        })
        .into_owned()
}
