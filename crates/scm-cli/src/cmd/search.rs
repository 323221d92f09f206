//! Search command: keyword search over the registry index.

use anyhow::Result;
use scm_core::cache::DEFAULT_TTL;
use scm_schema::RegistryIndexEntry;

use crate::ui::Output;

pub async fn search(keyword: &str, json: bool) -> Result<()> {
    let output = Output::new();
    let start = std::time::Instant::now();
    let ctx = super::build_context(false, false, false)?;

    let index: Vec<RegistryIndexEntry> = match ctx.cache.get("registry:index") {
        Some(cached) => cached,
        None => {
            let fetched = ctx.registry.fetch_index().await?;
            if let Err(e) = ctx.cache.put("registry:index", &fetched, DEFAULT_TTL) {
                tracing::warn!("Failed to cache registry index: {e}");
            }
            fetched
        }
    };

    let needle = keyword.to_lowercase();
    let results: Vec<&RegistryIndexEntry> = index
        .iter()
        .filter(|entry| {
            entry.name.to_lowercase().contains(&needle)
                || entry.description.to_lowercase().contains(&needle)
                || entry
                    .categories
                    .iter()
                    .any(|c| c.to_lowercase().contains(&needle))
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        output.info(&format!("No components found matching '{keyword}'"));
        return Ok(());
    }

    println!();
    for entry in &results {
        output.row(&entry.name, &entry.version, &entry.description);
    }
    println!();
    println!(
        "{} result(s), elapsed {:.2}s",
        results.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
