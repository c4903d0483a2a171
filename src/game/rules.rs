//! Pure round logic: role assignment, ballot tallying, and the win condition.
//! Everything here computes over a roster snapshot and never touches the
//! session; randomness comes in through the [`Shuffler`] seam.

use std::collections::HashMap;

use super::shuffler::Shuffler;
use super::types::{Player, PlayerId, VoteTally, Winner};
use crate::error::GameError;

/// Hard algorithmic floor for a playable table. The configurable policy
/// minimum sits at or above this.
pub const MIN_PLAYERS: usize = 3;

/// Assign impostor roles across a roster snapshot.
///
/// The Fisher-Yates pass runs over seat indices so the draw is unbiased while
/// the returned roster keeps its turn order: the shuffle decides *who* hides,
/// not where anyone sits. Exactly `impostor_count` players come back flagged,
/// with all ballot state cleared. The input is not mutated.
pub fn assign_roles(
    players: &[Player],
    impostor_count: usize,
    shuffler: &mut impl Shuffler,
) -> Result<Vec<Player>, GameError> {
    if players.len() < MIN_PLAYERS {
        return Err(GameError::NotEnoughPlayers { min: MIN_PLAYERS });
    }
    if impostor_count >= players.len() {
        return Err(GameError::TooManyImpostors {
            requested: impostor_count,
            players: players.len(),
        });
    }

    let mut indices: Vec<usize> = (0..players.len()).collect();
    for i in (1..indices.len()).rev() {
        let j = shuffler.pick_index(i + 1);
        indices.swap(i, j);
    }

    let mut assigned = players.to_vec();
    for player in &mut assigned {
        player.is_impostor = false;
        player.clear_vote();
    }
    for &seat in indices.iter().take(impostor_count) {
        assigned[seat].is_impostor = true;
    }

    Ok(assigned)
}

/// Tally ballots and find the most-voted candidate.
///
/// Candidates are walked in roster order, so the reported leader is
/// deterministic: the first seat to reach a strict maximum. A later equal
/// count marks the tally as tied without clearing the leader; callers must
/// treat the leader as undefined under a tie and go through
/// [`VoteTally::elimination`], which yields nobody.
pub fn count_votes(players: &[Player]) -> VoteTally {
    let mut counts: HashMap<PlayerId, usize> = HashMap::new();
    for player in players {
        if let Some(target) = player.voted_for {
            *counts.entry(target).or_insert(0) += 1;
        }
    }

    let mut max_votes = 0;
    let mut most_voted: Option<PlayerId> = None;
    let mut is_tie = false;

    for player in players {
        let Some(&votes) = counts.get(&player.id) else {
            continue;
        };
        if votes > max_votes {
            max_votes = votes;
            most_voted = Some(player.id);
            is_tie = false;
        } else if votes == max_votes && max_votes > 0 {
            is_tie = true;
        }
    }

    VoteTally {
        counts,
        most_voted,
        is_tie,
    }
}

/// Decide the round, if it can be decided.
///
/// Nobody eliminated (or an id that no longer resolves) means no verdict yet.
/// Eliminating an impostor hands the round to the civilians; eliminating a
/// civilian hands it to the impostors once they match the remaining civilian
/// count. Anything else leaves the round undecided.
pub fn determine_winner(players: &[Player], eliminated: Option<PlayerId>) -> Option<Winner> {
    let eliminated_id = eliminated?;
    let eliminated_player = players.iter().find(|p| p.id == eliminated_id)?;

    if eliminated_player.is_impostor {
        return Some(Winner::Civilians);
    }

    let remaining_impostors = players
        .iter()
        .filter(|p| p.is_impostor && p.id != eliminated_id)
        .count();
    let remaining_civilians = players
        .iter()
        .filter(|p| !p.is_impostor && p.id != eliminated_id)
        .count();

    if remaining_impostors >= remaining_civilians {
        Some(Winner::Impostors)
    } else {
        None
    }
}

/// Validate a player name and return it trimmed.
pub fn validate_player_name(name: &str) -> Result<String, GameError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(GameError::InvalidName("name cannot be empty"));
    }
    if trimmed.chars().count() < 2 {
        return Err(GameError::InvalidName("name must be at least 2 characters"));
    }
    if trimmed.chars().count() > 20 {
        return Err(GameError::InvalidName("name must be 20 characters or less"));
    }

    Ok(trimmed.to_string())
}

/// Suggested impostor count for a table of the given size.
pub fn recommended_impostor_count(player_count: usize) -> usize {
    match player_count {
        0..=2 => 0,
        3..=5 => 1,
        6..=8 => 2,
        n => n / 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::shuffler::{SequenceShuffler, ThreadRngShuffler};

    fn table(names: &[&str]) -> Vec<Player> {
        names.iter().map(|n| Player::new(*n, "fox")).collect()
    }

    fn vote(players: &mut [Player], voter: usize, target: usize) {
        let target_id = players[target].id;
        players[voter].has_voted = true;
        players[voter].voted_for = Some(target_id);
    }

    #[test]
    fn test_assign_roles_flags_exactly_the_requested_count() {
        let players = table(&["Mira", "Theo", "Sana", "Noor", "Elio"]);
        let mut shuffler = ThreadRngShuffler::new();

        for impostor_count in 1..players.len() {
            let assigned = assign_roles(&players, impostor_count, &mut shuffler).unwrap();
            let flagged = assigned.iter().filter(|p| p.is_impostor).count();
            assert_eq!(flagged, impostor_count);
            assert!(assigned.iter().all(|p| !p.has_voted && p.voted_for.is_none()));
        }
    }

    #[test]
    fn test_assign_roles_preserves_turn_order() {
        let players = table(&["Mira", "Theo", "Sana"]);
        let ids: Vec<_> = players.iter().map(|p| p.id).collect();

        // Scripted swaps still must not reorder the roster itself
        let mut shuffler = SequenceShuffler::new(vec![0, 1]);
        let assigned = assign_roles(&players, 1, &mut shuffler).unwrap();
        let assigned_ids: Vec<_> = assigned.iter().map(|p| p.id).collect();

        assert_eq!(assigned_ids, ids);
        // Input untouched
        assert!(players.iter().all(|p| !p.is_impostor));
    }

    #[test]
    fn test_assign_roles_is_deterministic_under_a_scripted_shuffle() {
        let players = table(&["Mira", "Theo", "Sana"]);

        // Identity permutation: each pick returns the pivot itself, so no
        // swap moves anything and seat 0 is the impostor.
        let mut shuffler = SequenceShuffler::new(vec![2, 1]);
        let assigned = assign_roles(&players, 1, &mut shuffler).unwrap();

        assert!(assigned[0].is_impostor);
        assert!(!assigned[1].is_impostor);
        assert!(!assigned[2].is_impostor);
    }

    #[test]
    fn test_assign_roles_rejects_short_tables() {
        let players = table(&["Mira", "Theo"]);
        let mut shuffler = SequenceShuffler::new(vec![]);

        let err = assign_roles(&players, 1, &mut shuffler).unwrap_err();
        assert_eq!(err, GameError::NotEnoughPlayers { min: MIN_PLAYERS });
    }

    #[test]
    fn test_assign_roles_rejects_too_many_impostors() {
        let players = table(&["Mira", "Theo", "Sana"]);
        let mut shuffler = SequenceShuffler::new(vec![]);

        let err = assign_roles(&players, 3, &mut shuffler).unwrap_err();
        assert_eq!(
            err,
            GameError::TooManyImpostors {
                requested: 3,
                players: 3
            }
        );
    }

    #[test]
    fn test_count_votes_finds_a_clear_majority() {
        let mut players = table(&["A", "B", "C"]);
        // A→C, B→C, C→A
        vote(&mut players, 0, 2);
        vote(&mut players, 1, 2);
        vote(&mut players, 2, 0);

        let tally = count_votes(&players);
        assert_eq!(tally.most_voted, Some(players[2].id));
        assert!(!tally.is_tie);
        assert_eq!(tally.elimination(), Some(players[2].id));
        assert_eq!(tally.counts[&players[2].id], 2);
        assert_eq!(tally.counts[&players[0].id], 1);
    }

    #[test]
    fn test_count_votes_reports_a_tie() {
        let mut players = table(&["A", "B", "C"]);
        // A→B, B→A, C abstains: one ballot each
        vote(&mut players, 0, 1);
        vote(&mut players, 1, 0);

        let tally = count_votes(&players);
        assert!(tally.is_tie);
        // The leader field keeps the first strict maximum in roster order,
        // but a tied ballot eliminates nobody.
        assert_eq!(tally.most_voted, Some(players[0].id));
        assert_eq!(tally.elimination(), None);
    }

    #[test]
    fn test_count_votes_ignores_abstainers() {
        let players = table(&["A", "B", "C"]);
        let tally = count_votes(&players);
        assert!(tally.counts.is_empty());
        assert_eq!(tally.most_voted, None);
        assert!(!tally.is_tie);
    }

    #[test]
    fn test_determine_winner_civilians_on_impostor_elimination() {
        let mut players = table(&["A", "B", "C", "D"]);
        players[2].is_impostor = true;

        let winner = determine_winner(&players, Some(players[2].id));
        assert_eq!(winner, Some(Winner::Civilians));
    }

    #[test]
    fn test_determine_winner_impostors_when_they_match_civilians() {
        let mut players = table(&["A", "B", "C"]);
        players[0].is_impostor = true;

        // Eliminating a civilian leaves 1 impostor vs 1 civilian
        let winner = determine_winner(&players, Some(players[1].id));
        assert_eq!(winner, Some(Winner::Impostors));
    }

    #[test]
    fn test_determine_winner_undecided_on_civilian_elimination_at_a_big_table() {
        let mut players = table(&["A", "B", "C", "D", "E"]);
        players[0].is_impostor = true;

        // 1 impostor vs 3 civilians remain: play on
        let winner = determine_winner(&players, Some(players[1].id));
        assert_eq!(winner, None);
    }

    #[test]
    fn test_determine_winner_needs_an_elimination() {
        let players = table(&["A", "B", "C"]);
        assert_eq!(determine_winner(&players, None), None);

        // An id that no longer resolves is not a verdict either
        let stranger = Player::new("Zed", "owl");
        assert_eq!(determine_winner(&players, Some(stranger.id)), None);
    }

    #[test]
    fn test_validate_player_name_trims_and_bounds() {
        assert_eq!(validate_player_name("  Mira  ").unwrap(), "Mira");
        assert!(validate_player_name("").is_err());
        assert!(validate_player_name("   ").is_err());
        assert!(validate_player_name("M").is_err());
        assert!(validate_player_name(&"x".repeat(21)).is_err());
        assert_eq!(validate_player_name(&"x".repeat(20)).unwrap().len(), 20);
    }

    #[test]
    fn test_recommended_impostor_count() {
        assert_eq!(recommended_impostor_count(2), 0);
        assert_eq!(recommended_impostor_count(3), 1);
        assert_eq!(recommended_impostor_count(5), 1);
        assert_eq!(recommended_impostor_count(8), 2);
        assert_eq!(recommended_impostor_count(12), 3);
    }
}
