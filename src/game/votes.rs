use super::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tracks the latest choice of each voter. Re-voting replaces the earlier choice.
#[derive(Clone, Serialize, Deserialize, Default, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct Ballots {
    votes: BTreeMap<PlayerId, PlayerId>,
}

/// The result of counting a set of ballots.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Tally {
    /// Nobody voted.
    NoVotes,
    /// One target received strictly more votes than any other.
    Winner(PlayerId),
    /// Several targets share the highest count.
    Tie(Vec<PlayerId>),
}

impl Ballots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the vote of a player.
    pub fn cast(&mut self, voter: PlayerId, target: PlayerId) {
        self.votes.insert(voter, target);
    }

    pub fn clear(&mut self) {
        self.votes.clear();
    }

    /// Counts the ballots accepted by `counts`, which receives `(voter, target)`.
    pub fn tally(&self, counts: impl Fn(PlayerId, PlayerId) -> bool) -> Tally {
        let mut totals = BTreeMap::<PlayerId, usize>::new();
        for (&voter, &target) in self.votes.iter() {
            if counts(voter, target) {
                *totals.entry(target).or_default() += 1;
            }
        }

        let Some(top) = totals.values().copied().max() else {
            return Tally::NoVotes;
        };
        let leaders: Vec<_> = totals
            .into_iter()
            .filter(|(_, n)| *n == top)
            .map(|(target, _)| target)
            .collect();
        match leaders[..] {
            [winner] => Tally::Winner(winner),
            _ => Tally::Tie(leaders),
        }
    }
}
