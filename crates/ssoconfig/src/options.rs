use crate::naming::DEFAULT_TEMPLATE;
use crate::profile::RenderMode;
use serde::{Deserialize, Serialize};

/// Settings for one merge run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Handlebars template for profile names.
    pub template: String,
    pub mode: RenderMode,
    /// Prepended to every rendered profile name.
    pub prefix: String,
    /// Generated sections pointing at these start URLs are removed first.
    pub prune_start_urls: Vec<String>,
    /// Ordered role regexes used to pick a winner when two profiles render
    /// to the same name. Earlier patterns take priority.
    pub prefer_roles: Vec<String>,
    /// Region for profiles that do not carry their own.
    pub default_region: Option<String>,
    /// Session assigned to profiles without one in session-reference mode.
    pub session_name: String,
    /// Registration scopes written into synthesized sessions.
    pub sso_scopes: Vec<String>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            mode: RenderMode::default(),
            prefix: String::new(),
            prune_start_urls: Vec::new(),
            prefer_roles: Vec::new(),
            default_region: None,
            session_name: "granted".to_string(),
            sso_scopes: vec!["sso:account:access".to_string()],
        }
    }
}

impl MergeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_prune_start_url(mut self, url: impl Into<String>) -> Self {
        self.prune_start_urls.push(url.into());
        self
    }

    pub fn with_prefer_role(mut self, pattern: impl Into<String>) -> Self {
        self.prefer_roles.push(pattern.into());
        self
    }

    pub fn with_default_region(mut self, region: impl Into<String>) -> Self {
        self.default_region = Some(region.into());
        self
    }

    pub fn with_session_name(mut self, session_name: impl Into<String>) -> Self {
        self.session_name = session_name.into();
        self
    }

    pub fn with_sso_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sso_scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_session_reference(&self) -> bool {
        self.mode == RenderMode::SessionReference
    }

    pub(crate) fn default_region(&self) -> Option<&str> {
        self.default_region.as_deref().filter(|r| !r.is_empty())
    }
}
