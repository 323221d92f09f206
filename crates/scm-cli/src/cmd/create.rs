//! Create command: scaffold a new component directory.

use std::fs;
use std::path::Path;

use anyhow::{Result, bail};
use scm_schema::ident::validate_new_name;
use scm_schema::registry::{ComponentKind, FileEntry, RegistryItem};
use scm_schema::MANIFEST_FILE;

use crate::ui::Output;

pub fn create(name: &str, parent_dir: &Path, dry_run: bool) -> Result<()> {
    let output = Output::new();

    // Shape rule plus the reserved-name guard.
    validate_new_name(name)?;

    let dir = parent_dir.join(name);
    if dir.exists() {
        bail!("directory '{name}' already exists");
    }

    if dry_run {
        output.info(&format!("Would scaffold component '{name}' in {}", dir.display()));
        return Ok(());
    }

    fs::create_dir_all(&dir)?;

    let source_file = format!("{name}.tsx");
    let item = RegistryItem {
        name: name.to_string(),
        kind: ComponentKind::Ui,
        title: title_case(name),
        description: String::new(),
        author: String::new(),
        version: "0.1.0".to_string(),
        published_at: None,
        publisher: String::new(),
        dependencies: vec![],
        dev_dependencies: vec![],
        registry_dependencies: vec![],
        categories: vec![],
        files: vec![FileEntry {
            path: source_file.clone(),
            kind: ComponentKind::Ui,
            content: None,
            target: None,
        }],
        css_vars: None,
        css: None,
        docs: None,
        meta: None,
    };

    fs::write(
        dir.join(MANIFEST_FILE),
        serde_json::to_string_pretty(&item)?,
    )?;
    fs::write(
        dir.join(&source_file),
        format!(
            "export function {}() {{\n  return null;\n}}\n",
            pascal_case(name)
        ),
    )?;

    output.success(&format!("Created '{name}'"));
    output.info(&format!("Edit {source_file}, then run 'scm publish {name}'"));
    Ok(())
}

/// `my-button` → `My Button`
fn title_case(name: &str) -> String {
    name.split('-')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `my-button` → `MyButton`
fn pascal_case(name: &str) -> String {
    name.split('-').map(capitalize).collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
