use crate::config;
use anyhow::{Context, Result};
use serde::Serialize;
use ssoconfig::{Document, is_generated, keys, section_start_url};
use std::path::PathBuf;

/// One section of the config, classified by ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct SectionSummary {
    name: String,
    generated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    generated_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_url: Option<String>,
}

fn summarize(doc: &Document) -> Vec<SectionSummary> {
    doc.sections()
        .map(|section| {
            let generated = is_generated(section);
            SectionSummary {
                name: section.name().to_string(),
                generated,
                generated_from: section.get(keys::GENERATED_FROM).map(str::to_string),
                start_url: generated
                    .then(|| section_start_url(section).map(str::to_string))
                    .flatten(),
            }
        })
        .collect()
}

fn format_text(sections: &[SectionSummary]) -> String {
    let mut out = String::new();
    for s in sections {
        let owner = if s.generated { "generated" } else { "user" };
        out.push_str(&format!("{:<9}  [{}]", owner, s.name));
        if let Some(from) = &s.generated_from {
            out.push_str(&format!("  from {}", from));
        }
        if let Some(url) = &s.start_url {
            out.push_str(&format!("  {}", url));
        }
        out.push('\n');
    }
    out
}

pub fn run(config: Option<PathBuf>, json: bool) -> Result<()> {
    let path = config::resolve_config_path(config)?;
    let text = config::read_config(&path)?;
    let doc = config::parse_config(&text, &path)?;
    let sections = summarize(&doc);

    if json {
        let out = serde_json::to_string_pretty(&sections)
            .context("failed to serialize section list")?;
        println!("{}", out);
    } else {
        print!("{}", format_text(&sections));
        let generated = sections.iter().filter(|s| s.generated).count();
        eprintln!(
            "{}: valid, {} sections ({} generated)",
            path.display(),
            sections.len(),
            generated
        );
    }
    Ok(())
}
