use super::{player::Team, Game, Phase, Player, PlayerId, Role};
use crate::error::GameError;
use serde::{Deserialize, Serialize};

/// An action a player can record during a phase.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// A mafia-aligned player votes on the night's victim.
    Kill,
    /// The doctor protects a player for the night.
    Heal,
    /// The sheriff learns a player's team.
    Check,
    /// The sheriff shoots a player instead of checking.
    Shoot,
    /// A living player votes to eliminate someone during the day.
    Vote,
}

/// What the sheriff chose to do with their target.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum SheriffAction {
    Check,
    Shoot,
}

impl ActionKind {
    /// The phase in which this action is accepted.
    pub fn phase(self) -> Phase {
        match self {
            ActionKind::Vote => Phase::DayVote,
            _ => Phase::Night,
        }
    }

    pub fn allows_self(self) -> bool {
        self == ActionKind::Heal
    }

    pub fn allowed_for(self, role: Role) -> bool {
        match self {
            ActionKind::Kill => role.team() == Team::Mafia,
            ActionKind::Heal => role == Role::Doctor,
            ActionKind::Check | ActionKind::Shoot => role == Role::Sheriff,
            ActionKind::Vote => true,
        }
    }

    /// The night actions offered to a role.
    pub fn night_actions(role: Role) -> &'static [ActionKind] {
        match role {
            Role::Mafia | Role::Don => &[ActionKind::Kill],
            Role::Doctor => &[ActionKind::Heal],
            Role::Sheriff => &[ActionKind::Check, ActionKind::Shoot],
            Role::Civilian => &[],
        }
    }
}

impl Game {
    /// Records a player's choice for the current phase. Nothing is tallied here;
    /// a later choice by the same player simply replaces the earlier one.
    pub fn record_action(
        &mut self,
        actor: PlayerId,
        kind: ActionKind,
        target: PlayerId,
    ) -> Result<(), GameError> {
        if self.phase != kind.phase() {
            return Err(GameError::PhaseEnded);
        }

        let player = self.player(actor).ok_or(GameError::PlayerNotFound)?;
        if !player.alive {
            return Err(GameError::PlayerEliminated);
        }
        match player.role {
            Some(role) if kind.allowed_for(role) => {}
            _ => return Err(GameError::NotEligible),
        }

        if actor == target && !kind.allows_self() {
            return Err(GameError::SelfTarget);
        }
        if !self.is_alive(target) {
            return Err(GameError::InvalidPlayerChoice);
        }

        match kind {
            ActionKind::Kill => self.mafia_votes.cast(actor, target),
            ActionKind::Heal => self.doctor_target = Some(target),
            ActionKind::Check => {
                self.sheriff_target = Some(target);
                self.sheriff_action = Some(SheriffAction::Check);
            }
            ActionKind::Shoot => {
                self.sheriff_target = Some(target);
                self.sheriff_action = Some(SheriffAction::Shoot);
            }
            ActionKind::Vote => self.vote_votes.cast(actor, target),
        }
        Ok(())
    }

    /// Gets the players the actor may choose for the given action.
    pub fn targets(&self, actor: PlayerId, kind: ActionKind) -> Vec<&Player> {
        self.alive_players()
            .filter(|p| p.id != actor || kind.allows_self())
            .collect()
    }
}
