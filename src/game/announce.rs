use super::{ActionKind, CheckResult, DayOutcome, Game, NightOutcome, PlayerId, Role, Tally, Team};
use std::fmt::Write;

impl Game {
    pub fn lobby_text(&self) -> String {
        let mut text = format!("🎮 Mafia\n\n👥 Players ({}):\n", self.players.len());
        for player in self.players.iter() {
            writeln!(text, "• {}", player.name).ok();
        }
        write!(
            text,
            "\nJoin within {} seconds. At least {} players are needed.",
            self.settings.lobby_time, self.settings.min_players
        )
        .ok();
        text
    }

    pub fn settings_text(&self) -> String {
        let s = &self.settings;
        format!(
            "⚙️ Settings\n⏱ Lobby: {} s\n🌙 Night: {} s\n🗳 Vote: {} s\n👥 Min. players: {}",
            s.lobby_time, s.night_time, s.vote_time, s.min_players
        )
    }

    pub fn roster_text(&self) -> String {
        let mut text = format!("👥 Players ({}):", self.players.len());
        for player in self.players.iter() {
            let status = if player.alive { "alive" } else { "eliminated" };
            write!(text, "\n - {} ({})", player.name, status).ok();
        }
        text
    }

    pub fn night_text(&self) -> String {
        format!(
            "🌙 Night {}. The city falls asleep; the mafia chooses a victim ({} s).",
            self.day, self.settings.night_time
        )
    }

    pub fn night_prompt_text(&self, role: Role) -> &'static str {
        match role {
            Role::Mafia | Role::Don => "🔫 Choose your victim. Messages you send me reach your teammates.",
            Role::Doctor => "💊 Choose who to heal tonight.",
            Role::Sheriff => "🔎 Check a player's allegiance, or shoot them.",
            Role::Civilian => "",
        }
    }

    pub fn action_ack_text(&self, kind: ActionKind, target: PlayerId) -> String {
        let name = self.name_of(target);
        match kind {
            ActionKind::Kill => format!("🔫 Victim: {}", name),
            ActionKind::Heal => format!("💊 Healing: {}", name),
            ActionKind::Check => format!("🔎 Checking: {}", name),
            ActionKind::Shoot => format!("🔫 Shooting: {}", name),
            ActionKind::Vote => format!("🗳 Vote accepted: {}", name),
        }
    }

    pub fn morning_text(&self, outcome: &NightOutcome) -> String {
        if outcome.killed.is_empty() {
            return "☀️ Morning. Everyone survived the night.".to_string();
        }
        let names: Vec<_> = outcome.killed.iter().map(|id| self.name_of(*id)).collect();
        format!("☀️ Morning. Killed tonight: {}", names.join(", "))
    }

    pub fn check_text(&self, check: &CheckResult) -> String {
        let verdict = match check.team {
            Team::Mafia => "is a member of the mafia",
            Team::Civilian => "is a peaceful civilian",
        };
        format!("🔎 {} {}.", self.name_of(check.target), verdict)
    }

    pub fn vote_text(&self) -> String {
        format!(
            "🗳 Vote! Find the mafia. Voting closes in {} s.",
            self.settings.vote_time
        )
    }

    pub fn vote_result_text(&self, outcome: &DayOutcome) -> String {
        match (&outcome.tally, outcome.eliminated) {
            (Tally::NoVotes, _) => "🤷 Nobody voted.".to_string(),
            (Tally::Tie(_), _) => "⚖️ The vote is tied. Nobody is eliminated.".to_string(),
            (Tally::Winner(_), Some(id)) => format!("❌ Eliminated by vote: {}", self.name_of(id)),
            (Tally::Winner(_), None) => "🤷 Nobody is eliminated.".to_string(),
        }
    }

    /// The final reveal of every role, mafia-aligned players first.
    pub fn final_text(&self, winner: Team) -> String {
        let mut text = match winner {
            Team::Mafia => "🏁 🔫 The mafia wins!".to_string(),
            Team::Civilian => "🏁 🕊 The civilians win!".to_string(),
        };
        text.push_str("\n\nRoles:");
        for player in self.transcript() {
            let role = player.role.map(Role::name).unwrap_or("-");
            let status = if player.alive { "alive" } else { "eliminated" };
            write!(text, "\n{} - {} ({})", player.name, role, status).ok();
        }
        text
    }
}

pub fn role_text(role: Role) -> String {
    let blurb = match role {
        Role::Mafia => "Each night, agree with your teammates on a victim.",
        Role::Don => "You lead the mafia. Each night, agree with your teammates on a victim.",
        Role::Sheriff => "Each night, check a player's allegiance or shoot them.",
        Role::Doctor => "Each night, heal one player (yourself included).",
        Role::Civilian => "Find the mafia and vote them out during the day.",
    };
    format!("🎭 Your role: {}\n{}", role, blurb)
}
