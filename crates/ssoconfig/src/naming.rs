use crate::error::{Error, Result};
use crate::profile::AccountProfile;
use handlebars::{Handlebars, handlebars_helper};
use serde::Serialize;

/// Template used when none is configured.
pub const DEFAULT_TEMPLATE: &str = "{{ AccountName }}/{{ RoleName }}";

const TEMPLATE_NAME: &str = "profile_name";

/// Fields exposed to the profile name template.
#[derive(Debug, Serialize)]
struct TemplateContext<'a> {
    #[serde(rename = "AccountName")]
    account_name: &'a str,
    #[serde(rename = "AccountID")]
    account_id: &'a str,
    #[serde(rename = "RoleName")]
    role_name: &'a str,
    #[serde(rename = "SessionName")]
    session_name: &'a str,
    #[serde(rename = "Region")]
    region: &'a str,
    #[serde(rename = "GeneratedFrom")]
    generated_from: &'a str,
}

impl<'a> From<&'a AccountProfile> for TemplateContext<'a> {
    fn from(profile: &'a AccountProfile) -> Self {
        Self {
            account_name: &profile.account_name,
            account_id: &profile.account_id,
            role_name: &profile.role_name,
            session_name: profile.session_name().unwrap_or_default(),
            region: profile.region().unwrap_or_default(),
            generated_from: &profile.generated_from,
        }
    }
}

/// Renders the profile name for each account from a compiled template.
///
/// The template is compiled once, in strict mode: referencing a field that
/// does not exist is a render error rather than an empty string.
pub struct NameResolver {
    registry: Handlebars<'static>,
    prefix: String,
}

impl NameResolver {
    pub fn new(template: &str, prefix: impl Into<String>) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        register_string_helpers(&mut registry);
        registry
            .register_template_string(TEMPLATE_NAME, template)
            .map_err(|e| Error::TemplateCompile(Box::new(e)))?;

        Ok(Self {
            registry,
            prefix: prefix.into(),
        })
    }

    /// Render `prefix + template(profile)` and check it can be used as a
    /// section name.
    pub fn resolve(&self, profile: &AccountProfile) -> Result<String> {
        let rendered = self
            .registry
            .render(TEMPLATE_NAME, &TemplateContext::from(profile))
            .map_err(|e| Error::TemplateRender {
                profile: profile.combined_name(),
                source: Box::new(e),
            })?;

        let name = format!("{}{}", self.prefix, rendered);
        validate_profile_name(&name)?;
        Ok(name)
    }
}

/// Reject names the config format cannot represent in a `[profile <name>]`
/// header.
pub fn validate_profile_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.trim() != name {
        "name has leading or trailing whitespace"
    } else if name.contains(';') {
        "name contains ';'"
    } else if name.contains(['[', ']']) {
        "name contains a bracket"
    } else if name.contains(['\n', '\r']) {
        "name contains a line break"
    } else {
        return Ok(());
    };
    Err(Error::InvalidSectionName {
        name: name.to_string(),
        reason,
    })
}

// ── String helpers ───────────────────────────────────────────────────

handlebars_helper!(lower: |s: str| s.to_lowercase());
handlebars_helper!(upper: |s: str| s.to_uppercase());
handlebars_helper!(trim: |s: str| s.trim().to_string());
handlebars_helper!(replace: |s: str, from: str, to: str| s.replace(from, to));
handlebars_helper!(trim_prefix: |s: str, prefix: str| {
    s.strip_prefix(prefix).unwrap_or(s).to_string()
});
handlebars_helper!(trim_suffix: |s: str, suffix: str| {
    s.strip_suffix(suffix).unwrap_or(s).to_string()
});
handlebars_helper!(trunc: |s: str, n: u64| s.chars().take(n as usize).collect::<String>());
handlebars_helper!(kebab: |s: str| {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
});

fn register_string_helpers(registry: &mut Handlebars<'static>) {
    registry.register_helper("lower", Box::new(lower));
    registry.register_helper("upper", Box::new(upper));
    registry.register_helper("trim", Box::new(trim));
    registry.register_helper("replace", Box::new(replace));
    registry.register_helper("trimPrefix", Box::new(trim_prefix));
    registry.register_helper("trimSuffix", Box::new(trim_suffix));
    registry.register_helper("trunc", Box::new(trunc));
    registry.register_helper("kebab", Box::new(kebab));
}
