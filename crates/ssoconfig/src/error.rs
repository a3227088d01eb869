use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to compile profile name template: {0}")]
    TemplateCompile(#[source] Box<handlebars::TemplateError>),

    #[error("failed to render profile name for {profile}: {source}")]
    TemplateRender {
        profile: String,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    #[error("invalid profile name {name:?}: {reason}")]
    InvalidSectionName { name: String, reason: &'static str },

    #[error("config section operation failed: {0}")]
    Section(#[from] ssoconfig_ini::IniError),

    #[error("invalid role preference pattern {pattern:?}: {source}")]
    InvalidPreferencePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("profile {profile} has no SSO session and no implicit session name is configured")]
    MissingSessionName { profile: String },

    #[error("profile source {source_name} failed: {source}")]
    Source {
        source_name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
