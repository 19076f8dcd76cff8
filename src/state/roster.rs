use std::collections::HashSet;

use uuid::Uuid;

use crate::state::competition::{Match, Team};

/// Registered teams that do not appear in any of the given matches, in roster order.
pub fn unassigned_teams(roster: Vec<Team>, matches: &[Match]) -> Vec<Team> {
    let assigned: HashSet<Uuid> = matches
        .iter()
        .flat_map(|m| [m.team1_id, m.team2_id])
        .collect();

    let mut seen = HashSet::new();
    roster
        .into_iter()
        .filter(|team| !assigned.contains(&team.id) && seen.insert(team.id))
        .collect()
}
