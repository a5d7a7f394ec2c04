//! Local ↔ provider symbol conventions.

use std::collections::HashMap;

/// Maps local ticker symbols to the provider's convention before lookup.
///
/// Explicit entries win; otherwise share-class periods become hyphens (`BRK.B` → `BRK-B`).
#[derive(Debug, Clone)]
pub struct SymbolMap {
    overrides: HashMap<String, String>,
    hyphenate_periods: bool,
}

impl Default for SymbolMap {
    fn default() -> Self {
        let overrides = [("BRK.B", "BRK-B"), ("BRK.A", "BRK-A")]
            .into_iter()
            .map(|(l, r)| (l.to_string(), r.to_string()))
            .collect();
        Self {
            overrides,
            hyphenate_periods: true,
        }
    }
}

impl SymbolMap {
    /// A map with no overrides and no generic rewriting.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            overrides: HashMap::new(),
            hyphenate_periods: false,
        }
    }

    /// Adds or replaces an explicit mapping.
    #[must_use]
    pub fn with(mut self, local: impl Into<String>, remote: impl Into<String>) -> Self {
        self.overrides.insert(local.into(), remote.into());
        self
    }

    /// Toggles the generic period → hyphen rule.
    #[must_use]
    pub fn hyphenate_periods(mut self, on: bool) -> Self {
        self.hyphenate_periods = on;
        self
    }

    /// The provider symbol for a local ticker.
    #[must_use]
    pub fn remote(&self, local: &str) -> String {
        if let Some(r) = self.overrides.get(local) {
            return r.clone();
        }
        if self.hyphenate_periods && local.contains('.') {
            return local.replace('.', "-");
        }
        local.to_string()
    }
}
