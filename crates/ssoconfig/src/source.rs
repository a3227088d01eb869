use crate::profile::Profile;
use std::path::PathBuf;

pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// Somewhere profiles are discovered, e.g. an identity provider or an export
/// file.
pub trait Source {
    /// Short label used in errors and logs.
    fn name(&self) -> &str;

    /// Fetch the current list of profiles. Called once per generation run.
    fn fetch_profiles(&self) -> Result<Vec<Profile>, SourceError>;
}

/// A fixed list of profiles.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    name: String,
    profiles: Vec<Profile>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, profiles: Vec<Profile>) -> Self {
        Self {
            name: name.into(),
            profiles,
        }
    }
}

impl Source for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_profiles(&self) -> Result<Vec<Profile>, SourceError> {
        Ok(self.profiles.clone())
    }
}

#[derive(Debug, Clone)]
enum JsonInput {
    File(PathBuf),
    Text(String),
}

/// Profiles stored as a JSON array of tagged objects:
///
/// ```json
/// [
///   {"type": "sso_session", "session_name": "company", "start_url": "https://example.awsapps.com/start", "region": "us-east-1"},
///   {"type": "account", "account_name": "prod", "account_id": "123456789012", "role_name": "DevRole", "session_name": "company"}
/// ]
/// ```
#[derive(Debug, Clone)]
pub struct JsonSource {
    name: String,
    input: JsonInput,
}

impl JsonSource {
    /// Read the file when profiles are fetched.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: path.display().to_string(),
            input: JsonInput::File(path),
        }
    }

    /// Parse already-loaded JSON text, e.g. from stdin.
    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: JsonInput::Text(text.into()),
        }
    }
}

impl Source for JsonSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_profiles(&self) -> Result<Vec<Profile>, SourceError> {
        let profiles: Vec<Profile> = match &self.input {
            JsonInput::File(path) => {
                let content = std::fs::read_to_string(path)?;
                serde_json::from_str(&content)?
            }
            JsonInput::Text(text) => serde_json::from_str(text)?,
        };
        Ok(profiles)
    }
}
