use crate::conflict::{ConflictResolver, Decision};
use crate::error::Result;
use crate::naming::NameResolver;
use crate::options::MergeOptions;
use crate::profile::{AccountProfile, Profile, SsoSession};
use crate::prune::prune;
use crate::report::{MergeReport, Reporter, SkippedProfile};
use crate::session::SessionAssigner;
use crate::writer::{report_duplicates, write_section};
use ssoconfig_ini::Document;

/// An account profile with its final name and conflict decision.
struct PlannedProfile {
    account: AccountProfile,
    profile_name: String,
    decision: Decision,
}

/// Merge `profiles` into `doc`.
///
/// The run is planned in full before the document is touched, so template,
/// naming, pattern, and session errors leave `doc` unchanged. Once writing
/// starts, a failing section operation aborts the run without rolling back
/// the sections already written.
pub fn merge(
    doc: &mut Document,
    profiles: &[Profile],
    options: &MergeOptions,
    reporter: &dyn Reporter,
) -> Result<MergeReport> {
    let names = NameResolver::new(&options.template, options.prefix.clone())?;
    let mut conflicts = ConflictResolver::new(&options.prefer_roles)?;
    let mut assigner = SessionAssigner::new(options);

    let (sessions, accounts) = partition(profiles);
    for session in sessions {
        assigner.add_explicit(session);
    }

    let mut resolved: Vec<AccountProfile> =
        accounts.iter().map(|a| assigner.normalize(a)).collect();
    // sort_by is stable: equal keys keep their input order.
    resolved.sort_by(|a, b| a.combined_name().cmp(&b.combined_name()));

    let mut planned = Vec::with_capacity(resolved.len());
    for account in resolved {
        let account = assigner.assign(account, reporter)?;
        reporter.debug(&format!("processing account profile {}", account.combined_name()));
        let profile_name = names.resolve(&account)?;
        let account = assigner.apply_default_region(account);
        let decision = conflicts.decide(&profile_name, &account.role_name);
        planned.push(PlannedProfile {
            account,
            profile_name,
            decision,
        });
    }
    let sessions = assigner.into_sessions();

    let mut report = MergeReport {
        pruned: prune(doc, &options.prune_start_urls),
        ..Default::default()
    };
    for name in &report.pruned {
        reporter.debug(&format!("pruned stale section [{}]", name));
    }

    for session in &sessions {
        let name = write_section(doc, session, &session.session_name, &options.mode)?;
        push_unique(&mut report.sessions, name);
    }

    for plan in planned {
        match &plan.decision {
            Decision::Skip { occupant, pattern } => {
                reporter.info(&format!(
                    "skipping profile {} ({}): existing role {} is preferred by {:?}",
                    plan.profile_name, plan.account.role_name, occupant, pattern
                ));
                report.skipped.push(SkippedProfile {
                    profile_name: plan.profile_name.clone(),
                    role: plan.account.role_name.clone(),
                    kept_role: occupant.clone(),
                    pattern: pattern.clone(),
                });
                continue;
            }
            Decision::Overwrite { previous } => reporter.debug(&format!(
                "[{}] overwriting role {} with {}",
                plan.profile_name, previous, plan.account.role_name
            )),
            Decision::Claim => {}
        }

        let name = write_section(doc, &plan.account, &plan.profile_name, &options.mode)?;
        push_unique(&mut report.profiles, name);
    }

    report.duplicates = conflicts.duplicates();
    report_duplicates(&report.duplicates, reporter);
    Ok(report)
}

fn partition(profiles: &[Profile]) -> (Vec<&SsoSession>, Vec<&AccountProfile>) {
    let mut sessions = Vec::new();
    let mut accounts = Vec::new();
    for profile in profiles {
        match profile {
            Profile::SsoSession(s) => sessions.push(s),
            Profile::Account(a) => accounts.push(a),
        }
    }
    (sessions, accounts)
}

fn push_unique(names: &mut Vec<String>, name: String) {
    if !names.contains(&name) {
        names.push(name);
    }
}
