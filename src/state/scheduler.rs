//! First-round match generation.
//!
//! Teams are put in a random order by a [`TeamShuffler`], paired two by two and spread over
//! the competition's courts in round-robin order. Every match lands on the competition's start
//! date and a single run never exceeds the daily capacity of the courts; pairs beyond that
//! capacity (and the odd team out) are left unassigned.

use std::sync::Mutex;

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use thiserror::Error;
use uuid::Uuid;

use crate::state::competition::{Competition, Match, Team};

/// How many matches one court hosts per day.
pub const MAX_MATCHES_PER_COURT_PER_DAY: u32 = 2;

/// Source of the random permutation used to pair teams.
pub trait TeamShuffler: Send + Sync {
    /// Reorder `teams` in place with a uniformly random permutation.
    fn shuffle(&self, teams: &mut [Team]);
}

/// Shuffler drawing from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngShuffler;

impl TeamShuffler for ThreadRngShuffler {
    fn shuffle(&self, teams: &mut [Team]) {
        teams.shuffle(&mut rand::rng());
    }
}

/// Reproducible shuffler; the same seed yields the same sequence of permutations.
#[derive(Debug)]
pub struct SeededShuffler {
    rng: Mutex<StdRng>,
}

impl SeededShuffler {
    /// Build a shuffler from a fixed seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl TeamShuffler for SeededShuffler {
    fn shuffle(&self, teams: &mut [Team]) {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        teams.shuffle(&mut *rng);
    }
}

/// Reasons a first round cannot be generated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Fewer than two teams are registered.
    #[error("not enough teams to generate matches in competition `{competition_id}` ({registered} registered, 2 required)")]
    InsufficientTeams {
        /// Competition that was asked for a first round.
        competition_id: Uuid,
        /// Number of teams registered at the time of the request.
        registered: usize,
    },
}

/// Maximum number of matches the competition's courts can host in one day.
pub fn daily_capacity(competition: &Competition) -> usize {
    competition.number_of_courts as usize * MAX_MATCHES_PER_COURT_PER_DAY as usize
}

/// Pair the roster into the first-round matches of `competition`.
///
/// The roster is sorted by team id before shuffling so a seeded shuffler gives the same
/// pairing whatever order the store returned the teams in.
pub fn first_round(
    competition: &Competition,
    mut roster: Vec<Team>,
    shuffler: &dyn TeamShuffler,
) -> Result<Vec<Match>, ScheduleError> {
    if roster.len() < 2 {
        return Err(ScheduleError::InsufficientTeams {
            competition_id: competition.id,
            registered: roster.len(),
        });
    }

    roster.sort_by_key(|team| team.id);
    shuffler.shuffle(&mut roster);

    let courts = (1..=competition.number_of_courts).cycle();
    let matches = roster
        .chunks_exact(2)
        .take(daily_capacity(competition))
        .zip(courts)
        .map(|(pair, court_number)| Match {
            id: Uuid::new_v4(),
            competition_id: competition.id,
            team1_id: pair[0].id,
            team2_id: pair[1].id,
            match_date: competition.start_date,
            court_number,
        })
        .collect();

    Ok(matches)
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use time::macros::date;

    use super::*;

    /// Leaves the roster in the order it was given.
    struct IdentityShuffler;

    impl TeamShuffler for IdentityShuffler {
        fn shuffle(&self, _teams: &mut [Team]) {}
    }

    fn competition(courts: u32) -> Competition {
        Competition {
            id: Uuid::new_v4(),
            name: "Spring Tournament".into(),
            sport: "Tennis".into(),
            start_date: date!(2025 - 04 - 01),
            end_date: date!(2025 - 04 - 07),
            number_of_courts: courts,
        }
    }

    fn roster(size: usize) -> Vec<Team> {
        (0..size)
            .map(|index| Team {
                id: Uuid::new_v4(),
                name: format!("Team {index}"),
            })
            .collect()
    }

    fn scheduled_ids(matches: &[Match]) -> Vec<Uuid> {
        matches
            .iter()
            .flat_map(|m| [m.team1_id, m.team2_id])
            .collect()
    }

    #[test]
    fn rejects_rosters_with_fewer_than_two_teams() {
        let cup = competition(2);
        for size in 0..2 {
            let err = first_round(&cup, roster(size), &ThreadRngShuffler).unwrap_err();
            assert_eq!(
                err,
                ScheduleError::InsufficientTeams {
                    competition_id: cup.id,
                    registered: size,
                }
            );
        }
    }

    #[test]
    fn match_count_is_bounded_by_pairs_and_capacity() {
        for courts in 1..=4 {
            let cup = competition(courts);
            for size in 2..=20 {
                let matches = first_round(&cup, roster(size), &ThreadRngShuffler).unwrap();
                let expected = (size / 2).min(courts as usize * 2);
                assert_eq!(matches.len(), expected, "courts={courts} teams={size}");
                assert!(
                    matches
                        .iter()
                        .all(|m| (1..=courts).contains(&m.court_number))
                );
                assert!(matches.iter().all(|m| m.match_date == cup.start_date));
                assert!(matches.iter().all(|m| m.competition_id == cup.id));
            }
        }
    }

    #[test]
    fn every_team_plays_at_most_once_and_never_against_itself() {
        let cup = competition(3);
        let teams = roster(11);
        let members: HashSet<Uuid> = teams.iter().map(|team| team.id).collect();
        let matches = first_round(&cup, teams, &ThreadRngShuffler).unwrap();

        let ids = scheduled_ids(&matches);
        let unique: HashSet<Uuid> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
        assert!(unique.is_subset(&members));
        assert!(matches.iter().all(|m| m.team1_id != m.team2_id));
    }

    #[test]
    fn ten_teams_on_two_courts_fill_capacity_round_robin() {
        let cup = competition(2);
        let matches = first_round(&cup, roster(10), &ThreadRngShuffler).unwrap();

        assert_eq!(matches.len(), 4);
        let courts: Vec<u32> = matches.iter().map(|m| m.court_number).collect();
        assert_eq!(courts, vec![1, 2, 1, 2]);
        assert_eq!(scheduled_ids(&matches).len(), 8);
    }

    #[test]
    fn pairs_consecutive_teams_of_the_permutation() {
        let cup = competition(1);
        let mut teams = roster(5);
        let matches = first_round(&cup, teams.clone(), &IdentityShuffler).unwrap();

        teams.sort_by_key(|team| team.id);
        assert_eq!(matches.len(), 2);
        assert_eq!((matches[0].team1_id, matches[0].team2_id), (teams[0].id, teams[1].id));
        assert_eq!((matches[1].team1_id, matches[1].team2_id), (teams[2].id, teams[3].id));
        assert_eq!(matches[0].court_number, 1);
        assert_eq!(matches[1].court_number, 1);
    }

    #[test]
    fn seeded_shuffler_is_reproducible_regardless_of_input_order() {
        let cup = competition(4);
        let teams = roster(8);
        let mut reversed = teams.clone();
        reversed.reverse();

        let first = first_round(&cup, teams, &SeededShuffler::new(7)).unwrap();
        let second = first_round(&cup, reversed, &SeededShuffler::new(7)).unwrap();

        assert_eq!(scheduled_ids(&first), scheduled_ids(&second));
    }

    #[test]
    fn three_teams_on_one_court_pair_uniformly() {
        let cup = competition(1);
        let teams = roster(3);
        let shuffler = SeededShuffler::new(2025);
        let mut seen: HashMap<(Uuid, Uuid), usize> = HashMap::new();

        let runs = 3_000;
        for _ in 0..runs {
            let matches = first_round(&cup, teams.clone(), &shuffler).unwrap();
            assert_eq!(matches.len(), 1);
            let (a, b) = (matches[0].team1_id, matches[0].team2_id);
            *seen.entry((a.min(b), a.max(b))).or_default() += 1;
        }

        assert_eq!(seen.len(), 3, "every pairing should be reachable");
        for (pair, count) in seen {
            assert!(
                (800..=1200).contains(&count),
                "pairing {pair:?} drawn {count} times out of {runs}"
            );
        }
    }
}
