use log::debug;

use crate::{normalize_ci, ActingUser, LinkedEntity, Roster, UserRole};

/// Counters visible to the acting user.
///
/// The totals follow the conventions of the canvassing teams:
/// - for the superadmin, the total is the number of people in the system
///   across the three levels, not the number of voters;
/// - a coordinator's network includes its sub-coordinators;
/// - a sub-coordinator counts themselves in their own total.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RoleStats {
    Superadmin {
        coordinators: usize,
        sub_coordinators: usize,
        voters: usize,
        total_people: usize,
    },
    Coordinator {
        sub_coordinators: usize,
        direct_voters: usize,
        indirect_voters: usize,
        total: usize,
    },
    SubCoordinator {
        voters: usize,
        total: usize,
    },
    Empty,
}

impl RoleStats {
    /// The named counters, in display order.
    pub fn counters(&self) -> Vec<(&'static str, usize)> {
        match *self {
            RoleStats::Superadmin {
                coordinators,
                sub_coordinators,
                voters,
                total_people,
            } => vec![
                ("coordinadores", coordinators),
                ("subcoordinadores", sub_coordinators),
                ("votantes", voters),
                ("votantesTotales", total_people),
            ],
            RoleStats::Coordinator {
                sub_coordinators,
                direct_voters,
                indirect_voters,
                total,
            } => vec![
                ("subcoordinadores", sub_coordinators),
                ("votantesDirectos", direct_voters),
                ("votantesIndirectos", indirect_voters),
                ("total", total),
            ],
            RoleStats::SubCoordinator { voters, total } => {
                vec![("votantes", voters), ("votantesTotales", total)]
            }
            RoleStats::Empty => vec![],
        }
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.counters()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct ConfirmationStats {
    pub confirmed: usize,
    pub total: usize,
    /// Rounded to the nearest integer.
    pub percentage: u32,
}

/// `confirmed / total` as a rounded percentage, 0 when there is nothing to count.
pub fn confirmed_percentage(confirmed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let (c, t) = (confirmed as u64, total as u64);
    // Half-up rounding in integer arithmetic.
    ((c * 200 + t) / (2 * t)) as u32
}

/// Computes the counters of the acting user. Missing data gives zero counts.
pub fn compute_stats(roster: &Roster, user: Option<&ActingUser>) -> RoleStats {
    let user = match user {
        Some(u) => u,
        None => return RoleStats::Empty,
    };
    let res = match &user.role {
        UserRole::Superadmin => {
            let coordinators = roster.coordinators().len();
            let sub_coordinators = roster.sub_coordinators().len();
            let voters = roster.voters().len();
            RoleStats::Superadmin {
                coordinators,
                sub_coordinators,
                voters,
                total_people: coordinators + sub_coordinators + voters,
            }
        }
        UserRole::Coordinator => {
            let key = normalize_ci(user.ci.as_str());
            let subs = roster.sub_coordinators_of(&key);
            let direct_voters = roster.voters_assigned_by(&key).len();
            let indirect_voters: usize = subs
                .iter()
                .map(|s| roster.voters_assigned_by(s.ci.as_str()).len())
                .sum();
            RoleStats::Coordinator {
                sub_coordinators: subs.len(),
                direct_voters,
                indirect_voters,
                total: direct_voters + indirect_voters + subs.len(),
            }
        }
        UserRole::SubCoordinator => {
            let voters = roster.voters_assigned_by(user.ci.as_str()).len();
            RoleStats::SubCoordinator {
                voters,
                total: voters + 1,
            }
        }
        UserRole::Other(_) => RoleStats::Empty,
    };
    debug!("compute_stats: user: {:?} stats: {:?}", user, res);
    res
}

/// The voters an acting user is accountable for.
pub fn scoped_voters<'a>(roster: &'a Roster, user: Option<&ActingUser>) -> Vec<&'a LinkedEntity> {
    match user {
        Some(ActingUser {
            role: UserRole::Superadmin,
            ..
        }) => roster.voters().iter().collect(),
        Some(ActingUser {
            ci,
            role: UserRole::Coordinator,
        }) => {
            let mut res = roster.voters_assigned_by(ci);
            res.extend(roster.indirect_voters_of(ci));
            res
        }
        Some(ActingUser {
            ci,
            role: UserRole::SubCoordinator,
        }) => roster.voters_assigned_by(ci),
        _ => Vec::new(),
    }
}

/// How many of the acting user's voters confirmed their vote.
pub fn confirmation_stats(roster: &Roster, user: Option<&ActingUser>) -> ConfirmationStats {
    let voters = scoped_voters(roster, user);
    let confirmed = voters.iter().filter(|v| v.vote_confirmed).count();
    ConfirmationStats {
        confirmed,
        total: voters.len(),
        percentage: confirmed_percentage(confirmed, voters.len()),
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use crate::*;

    #[test]
    fn coordinator_network() {
        init_logs();
        let roster = link_roster(&small_tables());
        let user = ActingUser::new("1.000.100", UserRole::Coordinator);
        let stats = compute_stats(&roster, Some(&user));
        assert_eq!(
            stats,
            RoleStats::Coordinator {
                sub_coordinators: 2,
                direct_voters: 2,
                indirect_voters: 4,
                total: 8,
            }
        );
        assert_eq!(stats.get("total"), Some(8));
        assert_eq!(stats.get("votantes"), None);
    }

    #[test]
    fn coordinator_without_network() {
        let roster = link_roster(&small_tables());
        let user = ActingUser::new("101", UserRole::Coordinator);
        assert_eq!(compute_stats(&roster, Some(&user)).get("total"), Some(0));
    }

    #[test]
    fn sub_coordinator_counts_themselves() {
        let mut tables = small_tables();
        tables.voters.push(voter("9001", "200", false));
        tables.voters.push(voter("9002", "200", false));
        let roster = link_roster(&tables);
        let user = ActingUser::new("200", UserRole::SubCoordinator);
        let stats = compute_stats(&roster, Some(&user));
        assert_eq!(
            stats.counters(),
            vec![("votantes", 5), ("votantesTotales", 6)]
        );
    }

    #[test]
    fn superadmin_counts_people_across_levels() {
        let roster = link_roster(&small_tables());
        let user = ActingUser::new("", UserRole::Superadmin);
        assert_eq!(
            compute_stats(&roster, Some(&user)).counters(),
            vec![
                ("coordinadores", 2),
                ("subcoordinadores", 2),
                ("votantes", 6),
                ("votantesTotales", 10),
            ]
        );
    }

    #[test]
    fn other_roles_see_nothing() {
        let roster = link_roster(&small_tables());
        let user = ActingUser::new("300", UserRole::from_tag("votante"));
        assert_eq!(compute_stats(&roster, Some(&user)), RoleStats::Empty);
        assert_eq!(compute_stats(&roster, None), RoleStats::Empty);
        assert!(RoleStats::Empty.counters().is_empty());
    }

    #[test]
    fn empty_roster() {
        let roster = link_roster(&Tables::default());
        let user = ActingUser::new("1", UserRole::SubCoordinator);
        assert_eq!(compute_stats(&roster, Some(&user)).get("votantesTotales"), Some(1));
        assert_eq!(
            confirmation_stats(&roster, Some(&user)),
            ConfirmationStats::default()
        );
    }

    #[test]
    fn percentages() {
        assert_eq!(confirmed_percentage(0, 0), 0);
        assert_eq!(confirmed_percentage(1, 3), 33);
        assert_eq!(confirmed_percentage(2, 3), 67);
        assert_eq!(confirmed_percentage(1, 8), 13);
        assert_eq!(confirmed_percentage(5, 5), 100);
    }

    #[test]
    fn confirmation_by_scope() {
        let roster = link_roster(&small_tables());
        let coordinator = ActingUser::new("1000100", UserRole::Coordinator);
        assert_eq!(
            confirmation_stats(&roster, Some(&coordinator)),
            ConfirmationStats {
                confirmed: 3,
                total: 6,
                percentage: 50
            }
        );
        let sub = ActingUser::new("200", UserRole::SubCoordinator);
        assert_eq!(confirmation_stats(&roster, Some(&sub)).percentage, 67);
        let admin = ActingUser::new("", UserRole::Superadmin);
        assert_eq!(confirmation_stats(&roster, Some(&admin)).confirmed, 3);
        assert_eq!(confirmation_stats(&roster, None).total, 0);
    }
}
