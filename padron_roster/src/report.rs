//! Tables handed over to the print collaborator.

use crate::{
    compute_stats, confirmation_stats, scoped_voters, ActingUser, LinkedEntity, RoleStats,
    Roster, UserRole,
};

/// A title and a table of text cells, ready to be laid out.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReportTable {
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// The roll-up of the network of one coordinator.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CoordinatorSummary {
    pub ci: String,
    pub name: String,
    pub sub_coordinators: usize,
    pub direct_voters: usize,
    pub indirect_voters: usize,
    pub total: usize,
    pub confirmed: usize,
    pub percentage: u32,
}

/// One summary per coordinator, in the order of the coordinator table.
pub fn coordinator_summaries(roster: &Roster) -> Vec<CoordinatorSummary> {
    roster
        .coordinators()
        .iter()
        .map(|c| {
            let user = ActingUser::new(&c.ci, UserRole::Coordinator);
            let confirmation = confirmation_stats(roster, Some(&user));
            match compute_stats(roster, Some(&user)) {
                RoleStats::Coordinator {
                    sub_coordinators,
                    direct_voters,
                    indirect_voters,
                    total,
                } => CoordinatorSummary {
                    ci: c.ci.clone(),
                    name: c.display_name(),
                    sub_coordinators,
                    direct_voters,
                    indirect_voters,
                    total,
                    confirmed: confirmation.confirmed,
                    percentage: confirmation.percentage,
                },
                _ => CoordinatorSummary {
                    ci: c.ci.clone(),
                    name: c.display_name(),
                    sub_coordinators: 0,
                    direct_voters: 0,
                    indirect_voters: 0,
                    total: 0,
                    confirmed: 0,
                    percentage: 0,
                },
            }
        })
        .collect()
}

pub fn coordinator_report(roster: &Roster, title: &str) -> ReportTable {
    let header = [
        "CI",
        "Coordinador",
        "Subcoordinadores",
        "Votantes directos",
        "Votantes indirectos",
        "Total",
        "Confirmados",
        "% confirmados",
    ];
    let rows = coordinator_summaries(roster)
        .into_iter()
        .map(|s| {
            vec![
                s.ci,
                s.name,
                s.sub_coordinators.to_string(),
                s.direct_voters.to_string(),
                s.indirect_voters.to_string(),
                s.total.to_string(),
                s.confirmed.to_string(),
                format!("{}%", s.percentage),
            ]
        })
        .collect();
    ReportTable {
        title: title.to_string(),
        header: header.iter().map(|s| s.to_string()).collect(),
        rows,
    }
}

fn cell(x: &Option<String>) -> String {
    x.clone().unwrap_or_default()
}

fn voter_row(roster: &Roster, v: &LinkedEntity) -> Vec<String> {
    let assigned_by = roster
        .assignment_of(&v.assigned_by)
        .map(|s| s.display_name())
        .unwrap_or_default();
    vec![
        v.ci.clone(),
        v.display_name(),
        cell(&v.phone),
        cell(&v.polling_place),
        cell(&v.table),
        cell(&v.order),
        assigned_by,
        if v.vote_confirmed { "Sí" } else { "No" }.to_string(),
    ]
}

/// The voters the user is accountable for, one row each.
pub fn network_report(roster: &Roster, user: Option<&ActingUser>, title: &str) -> ReportTable {
    let header = [
        "CI",
        "Nombre",
        "Teléfono",
        "Local de votación",
        "Mesa",
        "Orden",
        "Asignado por",
        "Voto confirmado",
    ];
    let rows = scoped_voters(roster, user)
        .into_iter()
        .map(|v| voter_row(roster, v))
        .collect();
    ReportTable {
        title: title.to_string(),
        header: header.iter().map(|s| s.to_string()).collect(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link_roster;
    use crate::test_support::*;

    #[test]
    fn summaries_per_coordinator() {
        let roster = link_roster(&small_tables());
        let s = coordinator_summaries(&roster);
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].name, "Ana Benítez");
        assert_eq!(s[0].total, 8);
        assert_eq!(s[0].percentage, 50);
        assert_eq!(s[1].total, 0);
        assert_eq!(s[1].percentage, 0);

        let t = coordinator_report(&roster, "Resumen");
        assert_eq!(t.title, "Resumen");
        assert_eq!(t.header.len(), t.rows[0].len());
        assert_eq!(t.rows[0][0], "1000100");
        assert_eq!(t.rows[0][7], "50%");
    }

    #[test]
    fn network_of_sub_coordinator() {
        let roster = link_roster(&small_tables());
        let user = ActingUser::new("201", UserRole::SubCoordinator);
        let t = network_report(&roster, Some(&user), "Mis votantes");
        assert_eq!(
            t.rows,
            vec![vec![
                "303".to_string(),
                "Votante N3".to_string(),
                "".to_string(),
                "".to_string(),
                "".to_string(),
                "".to_string(),
                "Diego Espínola".to_string(),
                "No".to_string(),
            ]]
        );
        assert!(network_report(&roster, None, "").rows.is_empty());
    }
}
