//! Determines which participants may still be drawn, given the roster and
//! the results recorded so far.
//
//  Recomputed from scratch whenever the roster or results change; never
//  mutated in place.

use std::collections::HashSet;

use roster::model::{DrawResult, Participant};

/// Result of an eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    NotFlagged,
    AlreadyWon,
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

/// Normalized ids of everyone who already appears in `results`.
pub fn winner_ids(results: &[DrawResult]) -> HashSet<String> {
    results
        .iter()
        .map(|r| r.participant_id.normalized())
        .collect()
}

/// Check a single participant against the set from [`winner_ids`].
pub fn check_participant_eligibility(
    participant: &Participant,
    winners: &HashSet<String>,
) -> Eligibility {
    if !participant.eligible.is_truthy() {
        return Eligibility::NotFlagged;
    }

    if winners.contains(&participant.id.normalized()) {
        return Eligibility::AlreadyWon;
    }

    Eligibility::Eligible
}

/// The drawable pool, in roster order. Empty means "draw unavailable".
pub fn eligible_pool(participants: &[Participant], results: &[DrawResult]) -> Vec<Participant> {
    let winners = winner_ids(results);

    participants
        .iter()
        .filter(|p| check_participant_eligibility(p, &winners).is_eligible())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster::model::{EligibleFlag, ParticipantId};

    fn person(id: &str, eligible: impl Into<EligibleFlag>) -> Participant {
        Participant::new(id, format!("p{id}"), "Team", eligible)
    }

    fn won(id: impl Into<ParticipantId>) -> DrawResult {
        DrawResult {
            time: String::new(),
            prize_id: "P".into(),
            prize_name: "Prize".into(),
            participant_id: id.into(),
            name: String::new(),
            team: String::new(),
        }
    }

    #[test]
    fn unflagged_participant_fails() {
        let out = check_participant_eligibility(&person("1", false), &HashSet::new());
        assert_eq!(out, Eligibility::NotFlagged);
    }

    #[test]
    fn previous_winner_fails() {
        let winners = winner_ids(&[won("1")]);
        let out = check_participant_eligibility(&person("1", true), &winners);
        assert_eq!(out, Eligibility::AlreadyWon);
    }

    #[test]
    fn string_flag_passes() {
        let p = person("2", EligibleFlag::Text("true".into()));
        assert!(check_participant_eligibility(&p, &HashSet::new()).is_eligible());
    }

    #[test]
    fn numeric_result_id_excludes_string_participant_id() {
        let roster = vec![person("7", true), person("8", true)];
        let pool = eligible_pool(&roster, &[won(7u64)]);

        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].id.normalized(), "8");
    }

    #[test]
    fn nobody_qualifies_gives_empty_pool() {
        let roster = vec![person("1", false), person("2", EligibleFlag::Text("no".into()))];
        assert!(eligible_pool(&roster, &[]).is_empty());
    }

    #[test]
    fn pool_keeps_roster_order() {
        let roster = vec![person("3", true), person("1", true), person("2", true)];
        let ids: Vec<String> = eligible_pool(&roster, &[])
            .iter()
            .map(|p| p.id.normalized())
            .collect();
        assert_eq!(ids, ["3", "1", "2"]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use roster::model::{EligibleFlag, ParticipantId};

    fn flag() -> impl Strategy<Value = EligibleFlag> {
        prop_oneof![
            any::<bool>().prop_map(EligibleFlag::Flag),
            prop::sample::select(vec!["true", "TRUE", "True", "false", "FALSE", "yes", ""])
                .prop_map(|s| EligibleFlag::Text(s.to_string())),
        ]
    }

    fn id() -> impl Strategy<Value = ParticipantId> {
        prop_oneof![
            (0u64..50).prop_map(ParticipantId::from),
            (0u64..50).prop_map(|n| ParticipantId::from(n.to_string())),
        ]
    }

    fn truthy(flag: &EligibleFlag) -> bool {
        match flag {
            EligibleFlag::Flag(b) => *b,
            EligibleFlag::Text(s) => s.to_uppercase() == "TRUE",
            EligibleFlag::Other(_) => false,
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn pool_is_exactly_flagged_minus_winners(
            roster in prop::collection::vec((id(), flag()), 0..40),
            won in prop::collection::vec(id(), 0..20),
        ) {
            let participants: Vec<Participant> = roster
                .iter()
                .map(|(id, flag)| Participant {
                    id: id.clone(),
                    name: String::new(),
                    team: String::new(),
                    eligible: flag.clone(),
                })
                .collect();

            let results: Vec<DrawResult> = won
                .iter()
                .map(|id| DrawResult {
                    time: String::new(),
                    prize_id: String::new(),
                    prize_name: String::new(),
                    participant_id: id.clone(),
                    name: String::new(),
                    team: String::new(),
                })
                .collect();

            let won_ids: HashSet<String> = won.iter().map(|id| id.normalized()).collect();
            let pool = eligible_pool(&participants, &results);

            for p in &pool {
                prop_assert!(!won_ids.contains(&p.id.normalized()));
                prop_assert!(truthy(&p.eligible));
            }

            let expected = participants
                .iter()
                .filter(|p| truthy(&p.eligible) && !won_ids.contains(&p.id.normalized()))
                .count();
            prop_assert_eq!(pool.len(), expected);
        }
    }
}
