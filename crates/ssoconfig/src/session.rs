use crate::error::{Error, Result};
use crate::options::MergeOptions;
use crate::profile::{AccountProfile, SsoSession, normalize_name};
use crate::report::Reporter;
use std::collections::HashSet;

/// Resolves account profiles against SSO sessions without touching the
/// caller's profiles.
///
/// Every account gets a normalized account name, and later its effective
/// region. In session-reference mode, accounts with no session are pointed at the
/// implicit session, which is synthesized from the first such account the
/// first time its name is needed.
pub struct SessionAssigner<'a> {
    options: &'a MergeOptions,
    /// Session names that already have a section planned in this run.
    known: HashSet<String>,
    sessions: Vec<SsoSession>,
}

impl<'a> SessionAssigner<'a> {
    pub fn new(options: &'a MergeOptions) -> Self {
        Self {
            options,
            known: HashSet::new(),
            sessions: Vec::new(),
        }
    }

    /// Plan an explicitly supplied session for writing.
    pub fn add_explicit(&mut self, session: &SsoSession) {
        let session = session.normalized();
        self.known.insert(session.session_name.clone());
        self.sessions.push(session);
    }

    /// Normalize the account and session names.
    pub fn normalize(&self, account: &AccountProfile) -> AccountProfile {
        let mut resolved = account.clone();
        resolved.account_name = normalize_name(&account.account_name);
        resolved.session_name = account.session_name().map(normalize_name);
        resolved
    }

    /// Fill in the default region for accounts without one. Applied after the
    /// profile name is rendered, so `{{ Region }}` only sees the account's own
    /// region.
    pub fn apply_default_region(&self, mut account: AccountProfile) -> AccountProfile {
        if account.region().is_none() {
            account.region = self.options.default_region().map(str::to_string);
        }
        account
    }

    /// Point the account at a session, synthesizing the implicit session if
    /// this is the first account to need it.
    pub fn assign(
        &mut self,
        account: AccountProfile,
        reporter: &dyn Reporter,
    ) -> Result<AccountProfile> {
        if !self.options.is_session_reference() || account.session_name().is_some() {
            return Ok(account);
        }

        let session_name = self.implicit_session_name();
        if session_name.is_empty() {
            return Err(Error::MissingSessionName {
                profile: account.combined_name(),
            });
        }

        if self.known.insert(session_name.clone()) {
            reporter.debug(&format!(
                "synthesizing sso-session {} from {}",
                session_name,
                account.combined_name()
            ));
            self.sessions.push(SsoSession {
                session_name: session_name.clone(),
                start_url: account.start_url.clone(),
                registration_scopes: self.options.sso_scopes.join(" "),
                region: account.sso_region.clone(),
                generated_from: account.generated_from.clone(),
            });
        }

        Ok(AccountProfile {
            session_name: Some(session_name),
            ..account
        })
    }

    fn implicit_session_name(&self) -> String {
        if self.options.prefix.is_empty() {
            self.options.session_name.clone()
        } else {
            normalize_name(&format!("{}{}", self.options.prefix, self.options.session_name))
        }
    }

    /// Sessions to write, explicit ones first, in planning order.
    pub fn into_sessions(self) -> Vec<SsoSession> {
        self.sessions
    }
}
