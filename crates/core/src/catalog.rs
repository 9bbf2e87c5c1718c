use std::collections::BTreeMap;

/// Locale-aware prompt lookup. Injected into the orchestrator explicitly;
/// there is no ambient locale state, so lifecycle is scoped to one
/// deployment and lookups are scoped to one invocation's locale.
pub trait MessageCatalog: Send + Sync {
    fn lookup(&self, key: &str, locale: &str) -> Option<String>;
}

/// In-memory catalog with a language fallback chain: the exact locale is
/// tried first (`en_GB`), then its language part (`en`), then the default
/// locale the catalog was built with.
#[derive(Clone, Debug)]
pub struct StaticCatalog {
    default_locale: String,
    entries: BTreeMap<String, BTreeMap<String, String>>,
}

impl StaticCatalog {
    pub fn new(default_locale: impl Into<String>) -> Self {
        Self { default_locale: default_locale.into(), entries: BTreeMap::new() }
    }

    pub fn with_message(
        mut self,
        locale: impl Into<String>,
        key: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.insert(locale, key, text);
        self
    }

    pub fn insert(
        &mut self,
        locale: impl Into<String>,
        key: impl Into<String>,
        text: impl Into<String>,
    ) {
        self.entries.entry(locale.into()).or_default().insert(key.into(), text.into());
    }

    fn lookup_exact(&self, key: &str, locale: &str) -> Option<String> {
        self.entries.get(locale).and_then(|messages| messages.get(key)).cloned()
    }
}

impl MessageCatalog for StaticCatalog {
    fn lookup(&self, key: &str, locale: &str) -> Option<String> {
        if let Some(text) = self.lookup_exact(key, locale) {
            return Some(text);
        }
        if let Some(language) = language_part(locale) {
            if let Some(text) = self.lookup_exact(key, language) {
                return Some(text);
            }
        }
        self.lookup_exact(key, &self.default_locale)
    }
}

fn language_part(locale: &str) -> Option<&str> {
    locale.split(['_', '-']).next().filter(|language| *language != locale)
}
