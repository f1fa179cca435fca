use super::PlayerId;
use rand::prelude::SliceRandom;
use serde::{Deserialize, Serialize};
use std::iter::repeat;

/// A game player.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Unset until the lobby closes, then fixed for the rest of the game.
    pub role: Option<Role>,
    pub alive: bool,
    /// Grants exactly one chat message after elimination.
    pub last_word_allowed: bool,
}

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Mafia,
    Don,
    Sheriff,
    Doctor,
    Civilian,
}

/// The two sides of the game.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Mafia,
    Civilian,
}

/// Classifies a role into its team. All team checks go through here.
pub fn team_of(role: Role) -> Team {
    match role {
        Role::Mafia | Role::Don => Team::Mafia,
        Role::Sheriff | Role::Doctor | Role::Civilian => Team::Civilian,
    }
}

impl Role {
    pub fn team(self) -> Team {
        team_of(self)
    }

    /// Whether this role is prompted for an action during the night.
    pub fn acts_at_night(self) -> bool {
        !matches!(self, Role::Civilian)
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Mafia => "Mafia",
            Role::Don => "Don",
            Role::Sheriff => "Sheriff",
            Role::Doctor => "Doctor",
            Role::Civilian => "Civilian",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Team::Mafia => f.write_str("Mafia"),
            Team::Civilian => f.write_str("Civilians"),
        }
    }
}

impl Player {
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            role: None,
            alive: true,
            last_word_allowed: false,
        }
    }

    pub fn team(&self) -> Option<Team> {
        self.role.map(team_of)
    }

    pub fn is_mafia(&self) -> bool {
        self.team() == Some(Team::Mafia)
    }

    /// Marks the player as eliminated. Eliminations are permanent.
    pub fn eliminate(&mut self) {
        if self.alive {
            self.alive = false;
            self.last_word_allowed = true;
        }
    }
}

/// The number of each role for a given player count.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RoleDistribution {
    pub num_players: usize,
    pub mafia: usize,
    pub don: usize,
    pub sheriff: usize,
    pub doctor: usize,
    pub civilians: usize,
}

impl RoleDistribution {
    pub fn new(num_players: usize) -> Self {
        let mafia_team = (num_players / 4).max(1);
        let don = usize::from(mafia_team >= 2);
        let (sheriff, doctor) = (1, 1);
        let civilians = num_players.saturating_sub(mafia_team + sheriff + doctor);
        Self {
            num_players,
            mafia: mafia_team - don,
            don,
            sheriff,
            doctor,
            civilians,
        }
    }

    /// Number of mafia-aligned roles.
    pub fn mafia_team(&self) -> usize {
        self.mafia + self.don
    }

    /// Builds the unshuffled role tokens, padded with civilians to the player count. Tables
    /// too small for every role give up civilians first, then the doctor, then the sheriff.
    /// The mafia is never dropped.
    pub fn tokens(&self) -> Vec<Role> {
        let mut roles = Vec::with_capacity(self.num_players.max(self.mafia_team() + 2));
        roles.extend(repeat(Role::Mafia).take(self.mafia));
        roles.extend(repeat(Role::Don).take(self.don));
        roles.extend(repeat(Role::Sheriff).take(self.sheriff));
        roles.extend(repeat(Role::Doctor).take(self.doctor));
        roles.extend(repeat(Role::Civilian).take(self.civilians));

        while roles.len() < self.num_players {
            roles.push(Role::Civilian);
        }
        for expendable in [Role::Civilian, Role::Doctor, Role::Sheriff] {
            while roles.len() > self.num_players {
                let Some(idx) = roles.iter().rposition(|r| *r == expendable) else {
                    break;
                };
                roles.remove(idx);
            }
        }
        roles
    }
}

/// Shuffles the role tokens for `num_players` players. The result is in assignment order,
/// i.e. the first role goes to the first player to have joined.
pub fn assign_roles(num_players: usize, rng: &mut impl rand::Rng) -> Vec<Role> {
    let mut roles = RoleDistribution::new(num_players).tokens();
    roles.shuffle(rng);
    roles
}
