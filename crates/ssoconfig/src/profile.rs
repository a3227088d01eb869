use serde::{Deserialize, Serialize};

/// Key names written into generated config sections.
pub mod keys {
    /// Marks a section as machine-written; user sections never carry it.
    pub const GENERATED_FROM: &str = "common_fate_generated_from";

    pub const SSO_START_URL: &str = "sso_start_url";
    pub const SSO_REGISTRATION_SCOPES: &str = "sso_registration_scopes";
    pub const SSO_REGION: &str = "sso_region";
    pub const SSO_SESSION: &str = "sso_session";
    pub const SSO_ACCOUNT_ID: &str = "sso_account_id";
    pub const SSO_ROLE_NAME: &str = "sso_role_name";

    pub const GRANTED_SSO_START_URL: &str = "granted_sso_start_url";
    pub const GRANTED_SSO_REGION: &str = "granted_sso_region";
    pub const GRANTED_SSO_ACCOUNT_ID: &str = "granted_sso_account_id";
    pub const GRANTED_SSO_ROLE_NAME: &str = "granted_sso_role_name";
    pub const CREDENTIAL_PROCESS: &str = "credential_process";

    pub const REGION: &str = "region";
}

/// Ordered `(key, value)` pairs for one config section.
pub type SectionFields = Vec<(&'static str, String)>;

/// How account profiles are written into the config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RenderMode {
    /// Profiles call back into `tool` through `credential_process`.
    CredentialProcess { tool: String },
    /// Profiles reference an `[sso-session]` block via `sso_session`.
    SessionReference,
}

impl Default for RenderMode {
    fn default() -> Self {
        RenderMode::CredentialProcess {
            tool: "granted".to_string(),
        }
    }
}

/// Replace spaces with hyphens so the name is usable inside a section header.
pub fn normalize_name(name: &str) -> String {
    name.replace(' ', "-")
}

/// Something that can be written as a config section.
pub trait ToSection {
    /// The full section header text, e.g. `profile prod/DevRole`.
    fn section_name(&self, profile_name: &str) -> String;

    /// Fields in the order they are written.
    fn section_fields(&self, profile_name: &str, mode: &RenderMode) -> SectionFields;
}

// ============================================================================
// Profile
// ============================================================================

/// A discoverable identity unit fetched from a profile source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Profile {
    SsoSession(SsoSession),
    Account(AccountProfile),
}

impl From<SsoSession> for Profile {
    fn from(session: SsoSession) -> Self {
        Profile::SsoSession(session)
    }
}

impl From<AccountProfile> for Profile {
    fn from(account: AccountProfile) -> Self {
        Profile::Account(account)
    }
}

// ============================================================================
// SSO session
// ============================================================================

/// A reusable SSO authentication endpoint, written as `[sso-session <name>]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsoSession {
    pub session_name: String,
    #[serde(default)]
    pub start_url: String,
    #[serde(default)]
    pub registration_scopes: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub generated_from: String,
}

impl SsoSession {
    pub fn new(session_name: impl Into<String>, start_url: impl Into<String>) -> Self {
        Self {
            session_name: session_name.into(),
            start_url: start_url.into(),
            ..Default::default()
        }
    }

    pub fn with_registration_scopes(mut self, scopes: impl Into<String>) -> Self {
        self.registration_scopes = scopes.into();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_generated_from(mut self, generated_from: impl Into<String>) -> Self {
        self.generated_from = generated_from.into();
        self
    }

    /// A copy with the session name normalized.
    pub fn normalized(&self) -> Self {
        Self {
            session_name: normalize_name(&self.session_name),
            ..self.clone()
        }
    }
}

impl ToSection for SsoSession {
    fn section_name(&self, _profile_name: &str) -> String {
        format!("sso-session {}", self.session_name)
    }

    fn section_fields(&self, _profile_name: &str, _mode: &RenderMode) -> SectionFields {
        let mut fields = vec![
            (keys::SSO_START_URL, self.start_url.clone()),
            (keys::SSO_REGISTRATION_SCOPES, self.registration_scopes.clone()),
            (keys::SSO_REGION, self.region.clone()),
        ];
        push_non_empty(&mut fields, keys::GENERATED_FROM, &self.generated_from);
        fields
    }
}

// ============================================================================
// Account profile
// ============================================================================

/// A single account + role, reachable through an SSO session or through the
/// legacy `start_url`/`sso_region` fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub account_name: String,
    pub account_id: String,
    pub role_name: String,
    /// Name of the `[sso-session]` this profile authenticates through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default)]
    pub generated_from: String,
    /// Custom Common Fate deployment URL passed through to the credential process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_fate_url: Option<String>,
    #[serde(default)]
    pub start_url: String,
    #[serde(default)]
    pub sso_region: String,
}

impl AccountProfile {
    pub fn new(
        account_name: impl Into<String>,
        role_name: impl Into<String>,
        account_id: impl Into<String>,
    ) -> Self {
        Self {
            account_name: account_name.into(),
            role_name: role_name.into(),
            account_id: account_id.into(),
            ..Default::default()
        }
    }

    pub fn with_session(mut self, session_name: impl Into<String>) -> Self {
        self.session_name = Some(session_name.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_generated_from(mut self, generated_from: impl Into<String>) -> Self {
        self.generated_from = generated_from.into();
        self
    }

    pub fn with_common_fate_url(mut self, url: impl Into<String>) -> Self {
        self.common_fate_url = Some(url.into());
        self
    }

    /// Legacy direct-URL fields, used when no session is referenced.
    pub fn with_start_url(
        mut self,
        start_url: impl Into<String>,
        sso_region: impl Into<String>,
    ) -> Self {
        self.start_url = start_url.into();
        self.sso_region = sso_region.into();
        self
    }

    /// `account_name/role_name`, the sort key for generated profiles.
    pub fn combined_name(&self) -> String {
        format!("{}/{}", self.account_name, self.role_name)
    }

    pub fn session_name(&self) -> Option<&str> {
        self.session_name.as_deref().filter(|s| !s.is_empty())
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref().filter(|s| !s.is_empty())
    }

    fn credential_process(&self, tool: &str, profile_name: &str) -> String {
        let mut command = format!("{} credential-process --profile {}", tool, profile_name);
        if let Some(url) = self.common_fate_url.as_deref().filter(|u| !u.is_empty()) {
            command.push_str(" --url ");
            command.push_str(url);
        }
        command
    }
}

impl ToSection for AccountProfile {
    fn section_name(&self, profile_name: &str) -> String {
        format!("profile {}", profile_name)
    }

    fn section_fields(&self, profile_name: &str, mode: &RenderMode) -> SectionFields {
        let region = self.region().unwrap_or_default();

        match mode {
            RenderMode::CredentialProcess { tool } => {
                let mut fields = vec![(keys::GRANTED_SSO_START_URL, self.start_url.clone())];
                push_non_empty(&mut fields, keys::GRANTED_SSO_REGION, &self.sso_region);
                fields.extend([
                    (keys::GRANTED_SSO_ACCOUNT_ID, self.account_id.clone()),
                    (keys::GRANTED_SSO_ROLE_NAME, self.role_name.clone()),
                    (keys::GENERATED_FROM, self.generated_from.clone()),
                    (
                        keys::CREDENTIAL_PROCESS,
                        self.credential_process(tool, profile_name),
                    ),
                ]);
                push_non_empty(&mut fields, keys::REGION, region);
                fields
            }
            RenderMode::SessionReference => {
                let mut fields = vec![
                    (
                        keys::SSO_SESSION,
                        self.session_name().unwrap_or_default().to_string(),
                    ),
                    (keys::SSO_ACCOUNT_ID, self.account_id.clone()),
                    (keys::GENERATED_FROM, self.generated_from.clone()),
                    (keys::SSO_ROLE_NAME, self.role_name.clone()),
                ];
                push_non_empty(&mut fields, keys::REGION, region);
                fields
            }
        }
    }
}

fn push_non_empty(fields: &mut SectionFields, key: &'static str, value: &str) {
    if !value.is_empty() {
        fields.push((key, value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn legacy_profile() -> AccountProfile {
        AccountProfile::new("prod", "DevRole", "123456789012")
            .with_start_url("https://example.awsapps.com/start", "ap-southeast-2")
            .with_generated_from("aws-sso")
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("my prod account"), "my-prod-account");
        assert_eq!(normalize_name("already-fine"), "already-fine");
    }

    #[test]
    fn test_combined_name() {
        assert_eq!(legacy_profile().combined_name(), "prod/DevRole");
    }

    #[test]
    fn test_session_fields() {
        let session = SsoSession::new("company", "https://example.awsapps.com/start")
            .with_registration_scopes("sso:account:access")
            .with_region("ap-southeast-2")
            .with_generated_from("aws-sso");
        assert_eq!(session.section_name("ignored"), "sso-session company");
        assert_eq!(
            session.section_fields("ignored", &RenderMode::SessionReference),
            vec![
                ("sso_start_url", "https://example.awsapps.com/start".to_string()),
                ("sso_registration_scopes", "sso:account:access".to_string()),
                ("sso_region", "ap-southeast-2".to_string()),
                ("common_fate_generated_from", "aws-sso".to_string()),
            ]
        );
    }

    #[test]
    fn test_session_fields_omit_empty_marker() {
        let session = SsoSession::new("company", "https://example.awsapps.com/start");
        let fields = session.section_fields("ignored", &RenderMode::SessionReference);
        assert_eq!(
            fields.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
            vec!["sso_start_url", "sso_registration_scopes", "sso_region"]
        );
    }

    #[test]
    fn test_session_normalized() {
        let session = SsoSession::new("my company", "https://x").normalized();
        assert_eq!(session.session_name, "my-company");
    }

    #[test]
    fn test_credential_process_fields() {
        let fields = legacy_profile().section_fields("prod/DevRole", &RenderMode::default());
        assert_eq!(
            fields,
            vec![
                ("granted_sso_start_url", "https://example.awsapps.com/start".to_string()),
                ("granted_sso_region", "ap-southeast-2".to_string()),
                ("granted_sso_account_id", "123456789012".to_string()),
                ("granted_sso_role_name", "DevRole".to_string()),
                ("common_fate_generated_from", "aws-sso".to_string()),
                (
                    "credential_process",
                    "granted credential-process --profile prod/DevRole".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_credential_process_with_url_and_region() {
        let profile = legacy_profile()
            .with_common_fate_url("https://cf.example.com")
            .with_region("us-west-2");
        let mode = RenderMode::CredentialProcess {
            tool: "assume".into(),
        };
        let fields = profile.section_fields("prod/DevRole", &mode);
        assert_eq!(
            fields[5],
            (
                "credential_process",
                "assume credential-process --profile prod/DevRole --url https://cf.example.com"
                    .to_string()
            )
        );
        assert_eq!(fields[6], ("region", "us-west-2".to_string()));
    }

    #[test]
    fn test_credential_process_omits_empty_sso_region() {
        let profile = AccountProfile::new("prod", "DevRole", "123456789012")
            .with_start_url("https://x/start", "");
        let keys: Vec<_> = profile
            .section_fields("prod/DevRole", &RenderMode::default())
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert!(!keys.contains(&"granted_sso_region"));
        assert!(!keys.contains(&"region"));
    }

    #[test]
    fn test_session_reference_fields() {
        let profile = AccountProfile::new("prod", "DevRole", "123456789012")
            .with_session("company")
            .with_generated_from("aws-sso")
            .with_region("us-west-2");
        assert_eq!(
            profile.section_fields("prod/DevRole", &RenderMode::SessionReference),
            vec![
                ("sso_session", "company".to_string()),
                ("sso_account_id", "123456789012".to_string()),
                ("common_fate_generated_from", "aws-sso".to_string()),
                ("sso_role_name", "DevRole".to_string()),
                ("region", "us-west-2".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_region_is_absent() {
        let profile = legacy_profile().with_region("");
        assert_eq!(profile.region(), None);
    }

    #[test]
    fn test_profile_json_tagging() {
        let json = r#"[
            {"type": "sso_session", "session_name": "company", "start_url": "https://x"},
            {"type": "account", "account_name": "prod", "account_id": "1", "role_name": "Dev", "session_name": "company"}
        ]"#;
        let profiles: Vec<Profile> = serde_json::from_str(json).unwrap();
        assert!(matches!(&profiles[0], Profile::SsoSession(s) if s.session_name == "company"));
        assert!(
            matches!(&profiles[1], Profile::Account(a) if a.session_name() == Some("company"))
        );
    }

    #[test]
    fn test_profile_json_rejects_unknown_type() {
        let json = r#"[{"type": "iam_user", "name": "bob"}]"#;
        assert!(serde_json::from_str::<Vec<Profile>>(json).is_err());
    }
}
