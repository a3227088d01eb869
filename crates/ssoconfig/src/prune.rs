use crate::profile::keys;
use ssoconfig_ini::{Document, Section};
use std::collections::HashSet;

/// The start URL a section authenticates against, checking the
/// credential-process key before the session key.
pub fn section_start_url(section: &Section) -> Option<&str> {
    section
        .get(keys::GRANTED_SSO_START_URL)
        .or_else(|| section.get(keys::SSO_START_URL))
}

/// True if the section was written by a previous generation run.
pub fn is_generated(section: &Section) -> bool {
    section.has_key(keys::GENERATED_FROM)
}

/// Delete every generated section whose start URL is in `start_urls`.
///
/// Sections without the generated marker are never removed, whatever URL they
/// carry. Returns the names of the removed sections in document order.
pub fn prune(doc: &mut Document, start_urls: &[String]) -> Vec<String> {
    if start_urls.is_empty() {
        return Vec::new();
    }
    let stale: HashSet<&str> = start_urls.iter().map(String::as_str).collect();

    let mut pruned = Vec::new();
    doc.retain_sections(|section| {
        let remove = is_generated(section)
            && section_start_url(section).is_some_and(|url| stale.contains(url));
        if remove {
            pruned.push(section.name().to_string());
        }
        !remove
    });
    pruned
}
