use crate::config;
use anyhow::Result;
use ssoconfig::{Document, prune};
use std::path::PathBuf;

/// Remove generated sections for `start_urls`; returns the new text and the
/// removed section names.
fn prune_text(doc: &mut Document, start_urls: &[String]) -> (String, Vec<String>) {
    let removed = prune(doc, start_urls);
    (doc.to_string(), removed)
}

pub fn run(config: Option<PathBuf>, start_urls: Vec<String>, dry_run: bool) -> Result<()> {
    let path = config::resolve_config_path(config)?;
    let original = config::read_config(&path)?;
    let mut doc = config::parse_config(&original, &path)?;

    let (updated, removed) = prune_text(&mut doc, &start_urls);
    for name in &removed {
        tracing::info!("removing [{}]", name);
    }
    if let Some(diff) = config::commit(&path, &original, &updated, dry_run)? {
        print!("{}", diff);
    }

    eprintln!("{}: {} sections pruned", path.display(), removed.len());
    Ok(())
}
