use super::votes::Tally;
use super::{Game, Phase, PlayerId, Role, SheriffAction, Team};
use crate::error::GameError;

/// What happened during a night.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct NightOutcome {
    /// Players eliminated, in the order the eliminations were applied.
    pub killed: Vec<PlayerId>,
    /// Players attacked but saved by the doctor.
    pub saved: Vec<PlayerId>,
    pub check: Option<CheckResult>,
    pub winner: Option<Team>,
}

/// The result of the sheriff's investigation, revealed only to the sheriff.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CheckResult {
    pub sheriff: PlayerId,
    pub target: PlayerId,
    pub team: Team,
}

/// What happened during a day vote.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DayOutcome {
    pub eliminated: Option<PlayerId>,
    pub tally: Tally,
    pub winner: Option<Team>,
}

impl Game {
    /// Resolves the night's actions and moves to the day vote, or ends the game.
    pub fn resolve_night(&mut self) -> Result<NightOutcome, GameError> {
        if self.phase != Phase::Night {
            return Err(GameError::PhaseEnded);
        }

        let mut outcome = NightOutcome::default();
        let mafia_kill = self.mafia_target();
        let sheriff_kill = match (self.sheriff_action, self.sheriff_target) {
            (Some(SheriffAction::Shoot), Some(target)) => Some(target),
            _ => None,
        };

        let mut heal = self.doctor_target;
        for target in [mafia_kill, sheriff_kill].into_iter().flatten() {
            if heal == Some(target) {
                heal = None;
                outcome.saved.push(target);
                continue;
            }
            if self.eliminate(target) {
                outcome.saved.retain(|p| *p != target);
                outcome.killed.push(target);
            }
            outcome.winner = self.winner();
            if outcome.winner.is_some() {
                break;
            }
        }

        if let (Some(SheriffAction::Check), Some(target)) = (self.sheriff_action, self.sheriff_target) {
            let sheriff = self.players.iter().find(|p| p.role == Some(Role::Sheriff));
            let team = self.player(target).and_then(|p| p.team());
            if let (Some(sheriff), Some(team)) = (sheriff, team) {
                outcome.check = Some(CheckResult {
                    sheriff: sheriff.id,
                    target,
                    team,
                });
            }
        }

        match outcome.winner {
            Some(_) => self.phase = Phase::Ended,
            None => self.begin_vote(),
        }
        Ok(outcome)
    }

    /// Resolves the day vote and moves to the next night, or ends the game.
    pub fn resolve_vote(&mut self) -> Result<DayOutcome, GameError> {
        if self.phase != Phase::DayVote {
            return Err(GameError::PhaseEnded);
        }

        let tally = self
            .vote_votes
            .tally(|voter, target| self.is_alive(voter) && self.is_alive(target));
        let eliminated = match tally {
            Tally::Winner(target) => self.eliminate(target).then_some(target),
            _ => None,
        };

        let winner = self.winner();
        match winner {
            Some(_) => self.phase = Phase::Ended,
            None => self.begin_night(),
        }
        Ok(DayOutcome {
            eliminated,
            tally,
            winner,
        })
    }

    /// Determines the winning team, if either has won. Civilians win once no mafia remain;
    /// the mafia win once they are at least as many as the civilians.
    pub fn winner(&self) -> Option<Team> {
        if self.phase == Phase::Lobby {
            return None;
        }
        let mafia = self.num_alive(Team::Mafia);
        let civilians = self.num_alive(Team::Civilian);
        if mafia == 0 {
            Some(Team::Civilian)
        } else if mafia >= civilians {
            Some(Team::Mafia)
        } else {
            None
        }
    }

    /// Returns whether a particular player has won: they must be alive and on the winning team.
    pub fn player_has_won(&self, player: PlayerId, winner: Team) -> bool {
        self.player(player)
            .map(|p| p.alive && p.team() == Some(winner))
            .unwrap_or(false)
    }

    /// The mafia's chosen victim: the plurality target among living mafia-aligned voters.
    /// A tie attacks nobody.
    fn mafia_target(&self) -> Option<PlayerId> {
        let counts = |voter: PlayerId, target: PlayerId| {
            self.player(voter).map(|p| p.alive && p.is_mafia()).unwrap_or(false) && self.is_alive(target)
        };
        match self.mafia_votes.tally(counts) {
            Tally::Winner(target) => Some(target),
            Tally::NoVotes | Tally::Tie(_) => None,
        }
    }

    /// Eliminates a living player, returning `false` if they were already out.
    pub(super) fn eliminate(&mut self, id: PlayerId) -> bool {
        match self.player_mut(id) {
            Some(player) if player.alive => {
                player.eliminate();
                true
            }
            _ => false,
        }
    }
}
