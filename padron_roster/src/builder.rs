use log::{debug, info};

pub use crate::config::*;
use crate::{link_roster, normalize_ci, same_identity, Roster};

/// Creates the assignment record for a picked entry.
///
/// Taken entries are rejected: the picker must not be able to select them.
/// Which levels a user may add depends on their role:
/// - the superadmin adds coordinators,
/// - a coordinator adds sub-coordinators (that it owns) and voters,
/// - a sub-coordinator adds voters.
pub fn new_assignment(
    entry: &PoolEntry<'_>,
    target: Role,
    user: &ActingUser,
) -> Result<AssignmentRecord, RosterErrors> {
    if entry.ci.is_empty() {
        return Err(RosterErrors::EmptyIdentity);
    }
    if let Some(holder) = &entry.holder {
        return Err(RosterErrors::AlreadyAssigned(entry.ci.clone(), holder.clone()));
    }
    let superior = normalize_ci(user.ci.as_str());
    let mut record = AssignmentRecord::new(&entry.ci, target);
    match (&user.role, target) {
        (UserRole::Superadmin, Role::Coordinator) => {}
        (UserRole::Coordinator, Role::SubCoordinator) if !superior.is_empty() => {
            record.assigned_by = superior.clone();
            record.coordinator_ci = superior;
        }
        (UserRole::Coordinator, Role::Voter) | (UserRole::SubCoordinator, Role::Voter)
            if !superior.is_empty() =>
        {
            record.assigned_by = superior;
        }
        // Allowed, but the user has no identity to assign from.
        (UserRole::Coordinator, Role::SubCoordinator)
        | (UserRole::Coordinator, Role::Voter)
        | (UserRole::SubCoordinator, Role::Voter) => {
            return Err(RosterErrors::EmptyIdentity);
        }
        (role, target) => {
            return Err(RosterErrors::RoleNotAllowed(role.clone(), target));
        }
    }
    Ok(record)
}

/// A builder for editing the assignment tables.
///
/// ```
/// use padron_roster::builder::Builder;
/// use padron_roster::{ActingUser, Person, Role, UserRole};
/// # use padron_roster::RosterErrors;
///
/// let mut builder = Builder::new(vec![Person {
///     ci: "1.234.567".to_string(),
///     first_name: "Ana".to_string(),
///     last_name: "Benítez".to_string(),
///     ..Person::default()
/// }]);
/// let admin = ActingUser::new("", UserRole::Superadmin);
/// builder.add("1234567", Role::Coordinator, &admin)?;
///
/// let roster = builder.build();
/// assert_eq!(roster.coordinators().len(), 1);
/// # Ok::<(), RosterErrors>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    tables: Tables,
}

impl Builder {
    pub fn new(roll: Vec<Person>) -> Builder {
        Builder {
            tables: Tables {
                roll,
                ..Tables::default()
            },
        }
    }

    pub fn from_tables(tables: Tables) -> Builder {
        Builder { tables }
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Links the current tables.
    pub fn build(&self) -> Roster {
        link_roster(&self.tables)
    }

    /// Adds the person with the given CI at the target level, on behalf of
    /// the user. Nothing changes if the add is rejected.
    pub fn add(
        &mut self,
        ci: &str,
        target: Role,
        user: &ActingUser,
    ) -> Result<AssignmentRecord, RosterErrors> {
        let key = normalize_ci(ci);
        if key.is_empty() {
            return Err(RosterErrors::EmptyIdentity);
        }
        let roster = self.build();
        let entry = roster
            .availability()
            .into_iter()
            .find(|e| e.ci == key)
            .ok_or_else(|| RosterErrors::UnknownPerson(key.clone()))?;
        let record = new_assignment(&entry, target, user)?;
        info!(
            "add: {} as {} by {}",
            record.ci,
            record.role,
            user.role.tag()
        );
        self.table_mut(target).push(record.clone());
        Ok(record)
    }

    /// Removes the assignment of a CI, wherever it is in the hierarchy.
    ///
    /// The people that were assigned by the removed person are left as they
    /// are.
    pub fn remove(&mut self, ci: &str) -> Option<AssignmentRecord> {
        let key = normalize_ci(ci);
        if key.is_empty() {
            return None;
        }
        for role in Role::ALL {
            let table = self.table_mut(role);
            if let Some(idx) = table
                .iter()
                .position(|a| same_identity(key.as_str(), a.ci.as_str()))
            {
                let removed = table.remove(idx);
                debug!("remove: {} was a {}", key, role);
                return Some(removed);
            }
        }
        None
    }

    /// Marks the vote of a voter as confirmed or not. Returns false if the CI
    /// is not a voter.
    pub fn set_vote_confirmed(&mut self, ci: &str, confirmed: bool) -> bool {
        match self
            .tables
            .voters
            .iter_mut()
            .find(|a| same_identity(ci, a.ci.as_str()))
        {
            Some(v) => {
                v.vote_confirmed = confirmed;
                true
            }
            None => false,
        }
    }

    fn table_mut(&mut self, role: Role) -> &mut Vec<AssignmentRecord> {
        match role {
            Role::Coordinator => &mut self.tables.coordinators,
            Role::SubCoordinator => &mut self.tables.sub_coordinators,
            Role::Voter => &mut self.tables.voters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use crate::{compute_stats, RoleStats};

    fn admin() -> ActingUser {
        ActingUser::new("", UserRole::Superadmin)
    }

    #[test]
    fn build_hierarchy() {
        init_logs();
        let mut b = Builder::new(vec![
            person("1.000", "Ana", "A"),
            person("2.000", "Bea", "B"),
            person("3.000", "Ciro", "C"),
            person("4.000", "Dora", "D"),
        ]);
        b.add("1.000", Role::Coordinator, &admin()).unwrap();
        let coord = ActingUser::new("1000", UserRole::Coordinator);
        let sub = b.add("2000", Role::SubCoordinator, &coord).unwrap();
        assert_eq!(sub.assigned_by, "1000");
        assert_eq!(sub.coordinator_ci, "1000");
        b.add("3.000", Role::Voter, &coord).unwrap();
        let sub_user = ActingUser::new("2.000", UserRole::SubCoordinator);
        let v = b.add("4000", Role::Voter, &sub_user).unwrap();
        assert_eq!(v.assigned_by, "2000");

        let roster = b.build();
        assert_eq!(
            compute_stats(&roster, Some(&coord)),
            RoleStats::Coordinator {
                sub_coordinators: 1,
                direct_voters: 1,
                indirect_voters: 1,
                total: 3,
            }
        );
        assert!(roster.eligibility_pool().is_empty());
    }

    #[test]
    fn taken_entries_are_rejected() {
        let mut b = Builder::from_tables(small_tables());
        let before = b.tables().clone();
        let coord = ActingUser::new("1000100", UserRole::Coordinator);
        let err = b.add("300", Role::Voter, &coord).unwrap_err();
        match err {
            RosterErrors::AlreadyAssigned(ci, holder) => {
                assert_eq!(ci, "300");
                assert_eq!(holder.role, Role::Voter);
                assert_eq!(holder.assigned_by.as_deref(), Some("Carla Duarte"));
            }
            e => panic!("unexpected error {:?}", e),
        }
        assert_eq!(b.tables(), &before);
    }

    #[test]
    fn invalid_adds() {
        let mut b = Builder::from_tables(small_tables());
        let before = b.tables().clone();
        let coord = ActingUser::new("1000100", UserRole::Coordinator);
        assert_eq!(
            b.add("999", Role::Voter, &coord),
            Err(RosterErrors::UnknownPerson("999".to_string()))
        );
        assert_eq!(
            b.add("", Role::Voter, &coord),
            Err(RosterErrors::EmptyIdentity)
        );
        assert_eq!(
            b.add("400", Role::Coordinator, &coord),
            Err(RosterErrors::RoleNotAllowed(
                UserRole::Coordinator,
                Role::Coordinator
            ))
        );
        let sub = ActingUser::new("200", UserRole::SubCoordinator);
        assert!(matches!(
            b.add("400", Role::SubCoordinator, &sub),
            Err(RosterErrors::RoleNotAllowed(_, Role::SubCoordinator))
        ));
        assert!(matches!(
            b.add("400", Role::Voter, &admin()),
            Err(RosterErrors::RoleNotAllowed(UserRole::Superadmin, Role::Voter))
        ));
        let anonymous = ActingUser::new("", UserRole::Coordinator);
        assert_eq!(
            b.add("400", Role::Voter, &anonymous),
            Err(RosterErrors::EmptyIdentity)
        );
        assert_eq!(b.tables(), &before);
    }

    #[test]
    fn remove_frees_the_person() {
        let mut b = Builder::from_tables(small_tables());
        let removed = b.remove("3-0-1").unwrap();
        assert_eq!(removed.role, Role::Voter);
        assert_eq!(b.remove("301"), None);
        assert_eq!(b.remove(""), None);
        let roster = b.build();
        let pool: Vec<String> = roster
            .eligibility_pool()
            .iter()
            .map(|e| e.ci.clone())
            .collect();
        assert_eq!(pool, vec!["301".to_string(), "400".to_string()]);
        let sub = ActingUser::new("200", UserRole::SubCoordinator);
        b.add("301", Role::Voter, &sub).unwrap();
        assert_eq!(b.tables().voters.len(), 6);
    }

    #[test]
    fn confirm_votes() {
        let mut b = Builder::from_tables(small_tables());
        assert!(b.set_vote_confirmed("301", true));
        assert!(!b.set_vote_confirmed("200", true));
        assert!(!b.set_vote_confirmed("", true));
        assert!(!b.set_vote_confirmed("n/a", true));
        // Dotted and plain forms are the same voter.
        assert!(b.set_vote_confirmed("3.0.3", true));
        assert!(b.tables().voters[3].vote_confirmed);
        let roster = b.build();
        let sub = ActingUser::new("200", UserRole::SubCoordinator);
        assert_eq!(crate::confirmation_stats(&roster, Some(&sub)).percentage, 100);
    }
}
