//! Structured merging of component CSS variables into a project stylesheet.
//!
//! The three variable scopes (root theme, light, dark) are held as maps
//! and merged by key before serialization, so incoming variables replace
//! same-named ones instead of being spliced into the text of an existing
//! file.

use std::collections::BTreeMap;

use scm_schema::CssVars;

/// In-memory model of the generated variables stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    /// Variables emitted into `:root`.
    pub root: BTreeMap<String, String>,
    /// Variables emitted into the light scope (`:root` under `.light`).
    pub light: BTreeMap<String, String>,
    /// Variables emitted into `.dark`.
    pub dark: BTreeMap<String, String>,
    /// Raw CSS blocks appended verbatim after the variable scopes.
    pub raw: Vec<String>,
}

impl StyleSheet {
    /// Merge a component's variable bundle; same-named keys are replaced.
    pub fn merge_vars(&mut self, vars: &CssVars) {
        for (k, v) in &vars.theme {
            self.root.insert(normalize_key(k), v.clone());
        }
        for (k, v) in &vars.light {
            self.light.insert(normalize_key(k), v.clone());
        }
        for (k, v) in &vars.dark {
            self.dark.insert(normalize_key(k), v.clone());
        }
    }

    /// Append a raw CSS block, skipping exact duplicates.
    pub fn append_raw(&mut self, css: &str) {
        let css = css.trim();
        if css.is_empty() {
            return;
        }
        if !self.raw.iter().any(|existing| existing == css) {
            self.raw.push(css.to_string());
        }
    }

    /// Whether nothing has been merged in.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty() && self.light.is_empty() && self.dark.is_empty() && self.raw.is_empty()
    }

    /// Serialize to CSS text.
    pub fn render(&self) -> String {
        let mut out = String::new();

        let mut block = |selector: &str, vars: &BTreeMap<String, String>| {
            if vars.is_empty() {
                return;
            }
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(selector);
            out.push_str(" {\n");
            for (k, v) in vars {
                out.push_str(&format!("  {k}: {v};\n"));
            }
            out.push_str("}\n");
        };

        // Light variables live in :root alongside the theme scope; the
        // dark scope overrides them under the .dark class.
        let mut root = self.root.clone();
        for (k, v) in &self.light {
            root.insert(k.clone(), v.clone());
        }

        block(":root", &root);
        block(".dark", &self.dark);

        for raw in &self.raw {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(raw);
            out.push('\n');
        }

        out
    }
}

/// Ensure a variable key carries the custom-property prefix.
fn normalize_key(key: &str) -> String {
    if key.starts_with("--") {
        key.to_string()
    } else {
        format!("--{key}")
    }
}
