//! Company-set narrowing applied before analysis.
//!
//! The analytics engine always works on whatever companies it is handed;
//! selecting a single company, a set of user types or active-only records
//! is done here, up front.

use crate::error::{Error, Result};
use crate::types::{Company, Snapshot};
use std::collections::BTreeSet;

/// Selection criteria for the company set.
#[derive(Debug, Clone, Default)]
pub struct SnapshotFilter {
    /// Keep only the company with exactly this name
    pub company: Option<String>,
    /// Keep only users of these types (empty = all types)
    pub user_types: Vec<String>,
    /// Keep only active companies, users, instances and channels
    pub active_only: bool,
}

impl SnapshotFilter {
    /// Whether this filter keeps everything.
    pub fn is_empty(&self) -> bool {
        self.company.is_none() && self.user_types.is_empty() && !self.active_only
    }

    /// Apply the filter, returning narrowed copies of the matching companies.
    pub fn apply(&self, companies: &[Company]) -> Result<Vec<Company>> {
        let selected: Vec<&Company> = match &self.company {
            Some(name) => {
                let matches: Vec<&Company> =
                    companies.iter().filter(|c| &c.name == name).collect();
                if matches.is_empty() {
                    return Err(Error::CompanyNotFound(name.clone()));
                }
                matches
            }
            None => companies.iter().collect(),
        };

        let narrowed: Vec<Company> = selected
            .into_iter()
            .filter(|c| !self.active_only || c.is_active)
            .map(|c| self.narrow(c))
            .collect();

        tracing::debug!(
            input = companies.len(),
            output = narrowed.len(),
            company = ?self.company,
            user_types = ?self.user_types,
            active_only = self.active_only,
            "Applied snapshot filter"
        );
        Ok(narrowed)
    }

    fn narrow(&self, company: &Company) -> Company {
        let mut company = company.clone();

        if !self.user_types.is_empty() {
            company
                .users
                .retain(|u| self.user_types.iter().any(|t| t == &u.user_type_name));
        }

        if self.active_only {
            company.users.retain(|u| u.is_active());
            company.instances.retain(|i| i.active);
            company.channels.retain(|ch| ch.is_active);
        }

        company
    }

    /// Distinct user types present in a snapshot, sorted.
    pub fn available_user_types(snapshot: &Snapshot) -> Vec<String> {
        snapshot
            .companies
            .iter()
            .flat_map(|c| c.users.iter().map(|u| u.user_type_name.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Channel, Instance, User};

    fn sample() -> Vec<Company> {
        let mut acme = Company::new("Acme");
        acme.is_active = true;
        acme.users = vec![
            User::new("ann", "Agent", true),
            User::new("bob", "Admin", false),
            User::new("cy", "AI", true),
        ];
        acme.instances = vec![Instance::new("wa-1", true), Instance::new("wa-2", false)];
        acme.channels = vec![Channel::new("sales", true), Channel::new("old", false)];

        let mut dormant = Company::new("Dormant");
        dormant.users = vec![User::new("dee", "Agent", false)];

        vec![acme, dormant]
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let companies = sample();
        let filter = SnapshotFilter::default();
        assert!(filter.is_empty());
        let out = filter.apply(&companies).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].users.len(), 3);
    }

    #[test]
    fn test_company_filter() {
        let filter = SnapshotFilter {
            company: Some("Dormant".to_string()),
            ..Default::default()
        };
        let out = filter.apply(&sample()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Dormant");

        let filter = SnapshotFilter {
            company: Some("Nobody".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            filter.apply(&sample()),
            Err(Error::CompanyNotFound(name)) if name == "Nobody"
        ));
    }

    #[test]
    fn test_user_type_filter() {
        let filter = SnapshotFilter {
            user_types: vec!["Agent".to_string()],
            ..Default::default()
        };
        let out = filter.apply(&sample()).unwrap();
        assert_eq!(out[0].users.len(), 1);
        assert_eq!(out[0].users[0].name, "ann");
        assert_eq!(out[1].users.len(), 1);
    }

    #[test]
    fn test_active_only_filter() {
        let companies = sample();
        let filter = SnapshotFilter {
            active_only: true,
            ..Default::default()
        };
        let out = filter.apply(&companies).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].users.len(), 2);
        assert_eq!(out[0].instances.len(), 1);
        assert_eq!(out[0].channels.len(), 1);

        // input untouched
        assert_eq!(companies[0].users.len(), 3);
    }

    #[test]
    fn test_available_user_types() {
        let snapshot = Snapshot {
            companies: sample(),
            ..Default::default()
        };
        assert_eq!(
            SnapshotFilter::available_user_types(&snapshot),
            vec!["AI", "Admin", "Agent"]
        );
    }
}
