use crate::error::{Error, Result};
use crate::report::Duplicate;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};

/// What to do with a profile whose name has been rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// First profile to use this name.
    Claim,
    /// The name is taken; replace the occupant.
    Overwrite { previous: String },
    /// The name is taken by a role a preference pattern ranks higher.
    Skip { occupant: String, pattern: String },
}

impl Decision {
    pub fn writes(&self) -> bool {
        !matches!(self, Decision::Skip { .. })
    }
}

/// Decides which account profile occupies a contested profile name.
///
/// Without preference patterns the last profile processed wins. With
/// patterns, the first pattern that matches exactly one of the two roles picks
/// the winner; if none does, the newer profile wins.
#[derive(Debug)]
pub struct ConflictResolver {
    patterns: Vec<Regex>,
    /// Profile name -> role currently written to that section.
    occupants: HashMap<String, String>,
    /// Profile name -> every role that rendered to it, in processing order.
    targets: BTreeMap<String, Vec<String>>,
}

impl ConflictResolver {
    pub fn new(prefer_roles: &[String]) -> Result<Self> {
        let patterns = prefer_roles
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| Error::InvalidPreferencePattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            patterns,
            occupants: HashMap::new(),
            targets: BTreeMap::new(),
        })
    }

    pub fn decide(&mut self, profile_name: &str, role: &str) -> Decision {
        self.targets
            .entry(profile_name.to_string())
            .or_default()
            .push(role.to_string());

        let Some(occupant) = self.occupants.get(profile_name).cloned() else {
            self.occupants
                .insert(profile_name.to_string(), role.to_string());
            return Decision::Claim;
        };

        if let Some(pattern) = self.preferred_existing(role, &occupant) {
            return Decision::Skip { occupant, pattern };
        }

        self.occupants
            .insert(profile_name.to_string(), role.to_string());
        Decision::Overwrite { previous: occupant }
    }

    /// The pattern that ranks `existing` above `incoming`, if the first
    /// distinguishing pattern does so.
    fn preferred_existing(&self, incoming: &str, existing: &str) -> Option<String> {
        for pattern in &self.patterns {
            let matches_incoming = pattern.is_match(incoming);
            let matches_existing = pattern.is_match(existing);
            match (matches_incoming, matches_existing) {
                (true, false) => return None,
                (false, true) => return Some(pattern.as_str().to_string()),
                _ => continue,
            }
        }
        None
    }

    /// Names that more than one profile rendered to, sorted by name.
    pub fn duplicates(&self) -> Vec<Duplicate> {
        self.targets
            .iter()
            .filter(|(_, roles)| roles.len() > 1)
            .map(|(name, roles)| {
                let mut roles = roles.clone();
                roles.sort();
                roles.dedup();
                Duplicate {
                    profile_name: name.clone(),
                    roles,
                    winner: self.occupants.get(name).cloned().unwrap_or_default(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn resolver(patterns: &[&str]) -> ConflictResolver {
        let patterns: Vec<String> = patterns.iter().map(|s| s.to_string()).collect();
        ConflictResolver::new(&patterns).unwrap()
    }

    #[test]
    fn test_first_use_claims() {
        let mut r = resolver(&[]);
        assert_eq!(r.decide("prod/Dev", "DevRole"), Decision::Claim);
        assert_eq!(r.decide("prod/Admin", "AdminRole"), Decision::Claim);
        assert!(r.duplicates().is_empty());
    }

    #[test]
    fn test_no_patterns_last_wins() {
        let mut r = resolver(&[]);
        r.decide("prod", "DevRoleOne");
        assert_eq!(
            r.decide("prod", "DevRoleTwo"),
            Decision::Overwrite {
                previous: "DevRoleOne".into()
            }
        );
        let dups = r.duplicates();
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].roles, vec!["DevRoleOne", "DevRoleTwo"]);
        assert_eq!(dups[0].winner, "DevRoleTwo");
    }

    #[test]
    fn test_pattern_keeps_existing() {
        let mut r = resolver(&["DevRoleOne"]);
        r.decide("prod", "DevRoleOne");
        assert_eq!(
            r.decide("prod", "DevRoleTwo"),
            Decision::Skip {
                occupant: "DevRoleOne".into(),
                pattern: "DevRoleOne".into()
            }
        );
        let dups = r.duplicates();
        assert_eq!(dups[0].roles, vec!["DevRoleOne", "DevRoleTwo"]);
        assert_eq!(dups[0].winner, "DevRoleOne");
    }

    #[test]
    fn test_pattern_prefers_incoming() {
        let mut r = resolver(&["DevRoleTwo"]);
        r.decide("prod", "DevRoleOne");
        assert!(r.decide("prod", "DevRoleTwo").writes());
        assert_eq!(r.duplicates()[0].winner, "DevRoleTwo");
    }

    #[test]
    fn test_undistinguishing_patterns_overwrite() {
        let mut r = resolver(&["DevRole", "Nothing"]);
        r.decide("prod", "DevRoleOne");
        assert!(matches!(
            r.decide("prod", "DevRoleTwo"),
            Decision::Overwrite { .. }
        ));
    }

    #[test]
    fn test_earlier_pattern_has_priority() {
        let mut r = resolver(&["Admin", "Dev"]);
        r.decide("prod", "DevRole");
        // Admin matches only the incoming role, so it wins before "Dev" is tried.
        assert!(r.decide("prod", "AdminRole").writes());
        // A later Dev role loses to the Admin occupant.
        assert!(!r.decide("prod", "DevRoleTwo").writes());
        assert_eq!(r.duplicates()[0].winner, "AdminRole");
    }

    #[test]
    fn test_later_profile_can_displace_earlier_winner() {
        let mut r = resolver(&["Admin", "ReadOnly"]);
        r.decide("prod", "Billing");
        assert!(r.decide("prod", "ReadOnly").writes());
        assert!(r.decide("prod", "Admin").writes());
        assert_eq!(r.duplicates()[0].winner, "Admin");
        assert_eq!(
            r.duplicates()[0].roles,
            vec!["Admin", "Billing", "ReadOnly"]
        );
    }

    #[test]
    fn test_regex_patterns() {
        let mut r = resolver(&["^Admin.*Access$"]);
        r.decide("prod", "AdministratorAccess");
        assert!(!r.decide("prod", "PowerUserAccess").writes());
    }

    #[test]
    fn test_invalid_pattern() {
        let err = ConflictResolver::new(&["(".to_string()]).unwrap_err();
        assert!(matches!(err, Error::InvalidPreferencePattern { ref pattern, .. } if pattern == "("));
    }

    #[test]
    fn test_duplicate_roles_deduplicated() {
        let mut r = resolver(&[]);
        r.decide("prod", "Dev");
        r.decide("prod", "Dev");
        let dups = r.duplicates();
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].roles, vec!["Dev"]);
    }

    #[test]
    fn test_duplicates_sorted_by_name() {
        let mut r = resolver(&[]);
        for name in ["zeta", "alpha", "zeta", "alpha"] {
            r.decide(name, "Role");
        }
        let names: Vec<_> = r
            .duplicates()
            .into_iter()
            .map(|d| d.profile_name)
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
