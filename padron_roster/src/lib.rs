pub mod builder;
mod config;
mod identity;
pub mod manual;
pub mod report;
mod search;
mod stats;

use log::{debug, info, warn};

use std::collections::{HashMap, HashSet};

pub use crate::config::*;
pub use crate::identity::*;
pub use crate::search::*;
pub use crate::stats::*;

/// The linked hierarchy, recomputed from the raw tables on every reload.
///
/// A roster is an immutable snapshot. Reloading the data means linking a new
/// roster and dropping the old one.
#[derive(Debug, Clone)]
pub struct Roster {
    roll: Vec<Person>,
    // Normalized key -> position in the roll. Empty keys are not indexed.
    roll_index: HashMap<String, usize>,
    coordinators: Vec<LinkedEntity>,
    sub_coordinators: Vec<LinkedEntity>,
    voters: Vec<LinkedEntity>,
    // Normalized coordinator key -> positions in sub_coordinators
    subs_by_coordinator: HashMap<String, Vec<usize>>,
    // Normalized assigner key -> positions in voters
    voters_by_assigner: HashMap<String, Vec<usize>>,
    // Normalized key -> where the active assignment lives
    assignments: HashMap<String, (Role, usize)>,
}

/// Links the raw tables. See [`Roster::link`].
pub fn link_roster(tables: &Tables) -> Roster {
    Roster::link(tables.clone())
}

/// Merges an assignment with its roll entry, field by field. The assignment
/// wins on the fields both carry.
pub fn merge(assignment: &AssignmentRecord, person: Option<&Person>) -> LinkedEntity {
    LinkedEntity {
        ci: normalize_ci(assignment.ci.as_str()),
        role: assignment.role,
        assigned_by: assignment.assigned_by.clone(),
        coordinator_ci: assignment.coordinator_ci.clone(),
        vote_confirmed: assignment.vote_confirmed,
        in_roll: person.is_some(),
        first_name: person.map(|p| p.first_name.clone()),
        last_name: person.map(|p| p.last_name.clone()),
        phone: assignment
            .phone
            .clone()
            .or_else(|| person.and_then(|p| p.phone.clone())),
        address: person.and_then(|p| p.address.clone()),
        section: person.and_then(|p| p.section.clone()),
        polling_place: person.and_then(|p| p.polling_place.clone()),
        table: person.and_then(|p| p.table.clone()),
        order: person.and_then(|p| p.order.clone()),
    }
}

impl Roster {
    /// Builds the linked structure out of the raw tables.
    ///
    /// The roll index is built once and shared by the three merges. Linking
    /// never fails: an assignment without roll entry is kept with its own
    /// fields only.
    pub fn link(tables: Tables) -> Roster {
        info!(
            "link: roll: {}, coordinators: {}, sub_coordinators: {}, voters: {}",
            tables.roll.len(),
            tables.coordinators.len(),
            tables.sub_coordinators.len(),
            tables.voters.len()
        );
        let mut roll_index: HashMap<String, usize> = HashMap::new();
        for (idx, p) in tables.roll.iter().enumerate() {
            let key = normalize_ci(p.ci.as_str());
            if key.is_empty() {
                continue;
            }
            // The first entry wins on duplicated keys.
            roll_index.entry(key).or_insert(idx);
        }

        let link_all = |records: &[AssignmentRecord]| -> Vec<LinkedEntity> {
            records
                .iter()
                .map(|a| {
                    let person = roll_index
                        .get(&normalize_ci(a.ci.as_str()))
                        .and_then(|idx| tables.roll.get(*idx));
                    merge(a, person)
                })
                .collect()
        };
        let coordinators = link_all(&tables.coordinators);
        let sub_coordinators = link_all(&tables.sub_coordinators);
        let voters = link_all(&tables.voters);

        let subs_by_coordinator = index_by(&sub_coordinators, |e| e.coordinator_ci.as_str());
        let voters_by_assigner = index_by(&voters, |e| e.assigned_by.as_str());

        let mut assignments: HashMap<String, (Role, usize)> = HashMap::new();
        for (role, entities) in [
            (Role::Coordinator, &coordinators),
            (Role::SubCoordinator, &sub_coordinators),
            (Role::Voter, &voters),
        ] {
            for (idx, e) in entities.iter().enumerate() {
                if e.ci.is_empty() {
                    continue;
                }
                if let Some((other_role, _)) = assignments.get(&e.ci) {
                    warn!(
                        "link: {} is assigned both as {} and as {}, keeping the first one",
                        e.ci, other_role, role
                    );
                    continue;
                }
                assignments.insert(e.ci.clone(), (role, idx));
            }
        }

        let roster = Roster {
            roll: tables.roll,
            roll_index,
            coordinators,
            sub_coordinators,
            voters,
            subs_by_coordinator,
            voters_by_assigner,
            assignments,
        };
        debug!(
            "link: {} linked entities without roll entry",
            roster.unmatched_count()
        );
        roster
    }

    pub fn roll(&self) -> &[Person] {
        &self.roll
    }

    pub fn coordinators(&self) -> &[LinkedEntity] {
        &self.coordinators
    }

    pub fn sub_coordinators(&self) -> &[LinkedEntity] {
        &self.sub_coordinators
    }

    pub fn voters(&self) -> &[LinkedEntity] {
        &self.voters
    }

    /// The linked entities of one level.
    pub fn entities(&self, role: Role) -> &[LinkedEntity] {
        match role {
            Role::Coordinator => &self.coordinators,
            Role::SubCoordinator => &self.sub_coordinators,
            Role::Voter => &self.voters,
        }
    }

    /// The roll entry of an identity, if any.
    pub fn person(&self, ci: &str) -> Option<&Person> {
        self.roll_index
            .get(&normalize_ci(ci))
            .and_then(|idx| self.roll.get(*idx))
    }

    /// The active assignment of an identity, if any.
    pub fn assignment_of(&self, ci: &str) -> Option<&LinkedEntity> {
        let (role, idx) = self.assignments.get(&normalize_ci(ci))?;
        self.entities(*role).get(*idx)
    }

    /// Every normalized key holding an assignment.
    pub fn assigned_keys(&self) -> HashSet<&str> {
        self.assignments.keys().map(|k| k.as_str()).collect()
    }

    /// The sub-coordinators owned by a coordinator.
    pub fn sub_coordinators_of(&self, coordinator_ci: &str) -> Vec<&LinkedEntity> {
        lookup(&self.subs_by_coordinator, &self.sub_coordinators, coordinator_ci)
    }

    /// The voters assigned directly by a coordinator or a sub-coordinator.
    pub fn voters_assigned_by(&self, ci: &str) -> Vec<&LinkedEntity> {
        lookup(&self.voters_by_assigner, &self.voters, ci)
    }

    /// The voters reachable through the sub-coordinators of a coordinator.
    pub fn indirect_voters_of(&self, coordinator_ci: &str) -> Vec<&LinkedEntity> {
        self.sub_coordinators_of(coordinator_ci)
            .iter()
            .flat_map(|sub| self.voters_assigned_by(sub.ci.as_str()))
            .collect()
    }

    /// Number of linked entities that have no roll entry.
    pub fn unmatched_count(&self) -> usize {
        self.coordinators
            .iter()
            .chain(self.sub_coordinators.iter())
            .chain(self.voters.iter())
            .filter(|e| !e.in_roll)
            .count()
    }

    /// Who holds the assignment of an identity, with the name of the superior
    /// that made it.
    pub fn holder_of(&self, ci: &str) -> Option<Holder> {
        let entity = self.assignment_of(ci)?;
        let superior_ci = if normalize_ci(entity.assigned_by.as_str()).is_empty() {
            entity.coordinator_ci.as_str()
        } else {
            entity.assigned_by.as_str()
        };
        let assigned_by = self
            .assignment_of(superior_ci)
            .map(|s| s.display_name())
            .or_else(|| self.person(superior_ci).map(|p| p.full_name()));
        Some(Holder {
            role: entity.role,
            assigned_by,
        })
    }
}

fn index_by<F>(entities: &[LinkedEntity], key: F) -> HashMap<String, Vec<usize>>
where
    F: Fn(&LinkedEntity) -> &str,
{
    let mut res: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, e) in entities.iter().enumerate() {
        let k = normalize_ci(key(e));
        // An empty key means "nobody": it must not group entities together.
        if !k.is_empty() {
            res.entry(k).or_default().push(idx);
        }
    }
    res
}

fn lookup<'a>(
    index: &HashMap<String, Vec<usize>>,
    entities: &'a [LinkedEntity],
    ci: &str,
) -> Vec<&'a LinkedEntity> {
    match index.get(&normalize_ci(ci)) {
        Some(positions) => positions.iter().filter_map(|idx| entities.get(*idx)).collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::*;

    pub fn person(ci: &str, first_name: &str, last_name: &str) -> Person {
        Person {
            ci: ci.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            ..Person::default()
        }
    }

    pub fn coordinator(ci: &str) -> AssignmentRecord {
        AssignmentRecord::new(ci, Role::Coordinator)
    }

    pub fn sub_coordinator(ci: &str, coordinator_ci: &str) -> AssignmentRecord {
        AssignmentRecord {
            assigned_by: coordinator_ci.to_string(),
            coordinator_ci: coordinator_ci.to_string(),
            ..AssignmentRecord::new(ci, Role::SubCoordinator)
        }
    }

    pub fn voter(ci: &str, assigned_by: &str, confirmed: bool) -> AssignmentRecord {
        AssignmentRecord {
            assigned_by: assigned_by.to_string(),
            vote_confirmed: confirmed,
            ..AssignmentRecord::new(ci, Role::Voter)
        }
    }

    /// Coordinator 100 with sub-coordinators 200 (3 voters) and 201 (1 voter),
    /// and 2 direct voters. Coordinator 101 has nothing.
    pub fn small_tables() -> Tables {
        let mut roll = vec![
            person("1.000.100", "Ana", "Benítez"),
            person("101", "Bruno", "Cáceres"),
            person("200", "Carla", "Duarte"),
            person("201", "Diego", "Espínola"),
        ];
        for i in 0..6 {
            roll.push(person(&format!("30{}", i), "Votante", &format!("N{}", i)));
        }
        roll.push(person("400", "Juan", "Pérez"));
        Tables {
            roll,
            coordinators: vec![coordinator("1000100"), coordinator("101")],
            sub_coordinators: vec![
                sub_coordinator("200", "1000100"),
                sub_coordinator("201", "1.000.100"),
            ],
            voters: vec![
                voter("300", "200", true),
                voter("301", "200", false),
                voter("302", "200", true),
                voter("303", "201", false),
                voter("304", "1000100", true),
                voter("305", "1000100", false),
            ],
        }
    }

    pub fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use crate::*;

    #[test]
    fn merge_without_roll_keeps_assignment_fields() {
        init_logs();
        let tables = Tables {
            roll: vec![],
            coordinators: vec![coordinator("1.234.567")],
            sub_coordinators: vec![sub_coordinator("2.222", "1234567")],
            voters: vec![voter("3-3", "2222", true)],
        };
        let roster = link_roster(&tables);
        assert_eq!(roster.coordinators().len(), 1);
        let c = &roster.coordinators()[0];
        assert_eq!(c.ci, "1234567");
        assert!(!c.in_roll);
        assert_eq!(c.first_name, None);
        assert_eq!(c.display_name(), "1234567");
        assert_eq!(roster.unmatched_count(), 3);
        assert!(roster.voters()[0].vote_confirmed);
    }

    #[test]
    fn merge_prefers_assignment_fields() {
        let p = Person {
            phone: Some("021 555".to_string()),
            polling_place: Some("Escuela 1".to_string()),
            ..person("4.000", "Eva", "Gómez")
        };
        let mut a = voter("4000", "1", false);
        let e = merge(&a, Some(&p));
        assert_eq!(e.ci, "4000");
        assert_eq!(e.phone.as_deref(), Some("021 555"));
        assert_eq!(e.polling_place.as_deref(), Some("Escuela 1"));
        assert_eq!(e.display_name(), "Eva Gómez");

        a.phone = Some("0981 123".to_string());
        let e = merge(&a, Some(&p));
        assert_eq!(e.phone.as_deref(), Some("0981 123"));
    }

    #[test]
    fn link_matches_normalized_keys() {
        let roster = link_roster(&small_tables());
        let c = &roster.coordinators()[0];
        assert!(c.in_roll);
        assert_eq!(c.first_name.as_deref(), Some("Ana"));
        assert_eq!(roster.unmatched_count(), 0);
        assert_eq!(roster.person("1000100").map(|p| p.ci.as_str()), Some("1.000.100"));
    }

    #[test]
    fn derived_queries() {
        let roster = link_roster(&small_tables());
        let subs: Vec<&str> = roster
            .sub_coordinators_of("1.000.100")
            .iter()
            .map(|e| e.ci.as_str())
            .collect();
        assert_eq!(subs, vec!["200", "201"]);
        assert_eq!(roster.voters_assigned_by("200").len(), 3);
        assert_eq!(roster.voters_assigned_by("1000100").len(), 2);
        let indirect: Vec<&str> = roster
            .indirect_voters_of("1000100")
            .iter()
            .map(|e| e.ci.as_str())
            .collect();
        assert_eq!(indirect, vec!["300", "301", "302", "303"]);
        assert!(roster.sub_coordinators_of("101").is_empty());
        assert!(roster.indirect_voters_of("999").is_empty());
    }

    #[test]
    fn empty_keys_do_not_group() {
        let tables = Tables {
            roll: vec![],
            coordinators: vec![coordinator("")],
            sub_coordinators: vec![],
            voters: vec![voter("1", "", false), voter("2", "n/a", false)],
        };
        let roster = link_roster(&tables);
        assert!(roster.voters_assigned_by("").is_empty());
        assert!(roster.voters_assigned_by("n/a").is_empty());
        assert!(roster.assignment_of("").is_none());
        assert_eq!(roster.assigned_keys().len(), 2);
    }

    #[test]
    fn holder_resolves_superior_name() {
        let roster = link_roster(&small_tables());
        let h = roster.holder_of("300").unwrap();
        assert_eq!(h.role, Role::Voter);
        assert_eq!(h.assigned_by.as_deref(), Some("Carla Duarte"));
        let h = roster.holder_of("1000100").unwrap();
        assert_eq!(h.role, Role::Coordinator);
        assert_eq!(h.assigned_by, None);
        assert_eq!(roster.holder_of("400"), None);
    }

    #[test]
    fn relinking_is_idempotent() {
        let tables = small_tables();
        let a = link_roster(&tables);
        let b = link_roster(&tables);
        assert_eq!(a.coordinators(), b.coordinators());
        assert_eq!(a.sub_coordinators(), b.sub_coordinators());
        assert_eq!(a.voters(), b.voters());
    }
}
