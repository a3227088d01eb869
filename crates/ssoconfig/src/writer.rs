use crate::error::Result;
use crate::profile::{RenderMode, ToSection};
use crate::report::{Duplicate, Reporter};
use ssoconfig_ini::Document;

/// Replace (or create) the section for `item`, populated in field order.
///
/// The old section is removed first, so the rewritten section moves to the
/// end of the document. Returns the section name.
pub fn write_section(
    doc: &mut Document,
    item: &dyn ToSection,
    profile_name: &str,
    mode: &RenderMode,
) -> Result<String> {
    let name = item.section_name(profile_name);
    doc.delete_section(&name);
    let section = doc.new_section(&name)?;
    for (key, value) in item.section_fields(profile_name, mode) {
        section.set(key, value)?;
    }
    Ok(name)
}

/// Emit one warning per duplicated profile name.
pub fn report_duplicates(duplicates: &[Duplicate], reporter: &dyn Reporter) {
    for duplicate in duplicates {
        reporter.warn(&duplicate.warning());
    }
}
