//! Client bookkeeping: unnamed applicants and named players.

use tokio::sync::mpsc::UnboundedSender;

/// Identifies a connection for the lifetime of the process. Never reused.
pub type ClientId = u64;

/// A connection that hasn't picked a name yet.
pub struct Applicant {
    pub id: ClientId,
    pub outbox: UnboundedSender<String>,
}

/// A named, seated player.
pub struct Player {
    pub id: ClientId,
    pub name: String,
    pub outbox: UnboundedSender<String>,
}

#[derive(Default)]
pub struct Registry {
    pub applicants: Vec<Applicant>,
    pub players: Vec<Player>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_applicant(&mut self, id: ClientId, outbox: UnboundedSender<String>) {
        self.applicants.push(Applicant { id, outbox });
    }

    pub fn find_applicant(&self, id: ClientId) -> Option<&Applicant> {
        self.applicants.iter().find(|a| a.id == id)
    }

    pub fn remove_applicant(&mut self, id: ClientId) -> Option<Applicant> {
        let idx = self.applicants.iter().position(|a| a.id == id)?;
        Some(self.applicants.remove(idx))
    }

    pub fn name_taken(&self, name: &str) -> bool {
        self.players.iter().any(|p| p.name == name)
    }

    /// Promote an applicant to a seated player, preserving join order.
    pub fn seat_player(&mut self, applicant: Applicant, name: String) {
        self.players.push(Player {
            id: applicant.id,
            name,
            outbox: applicant.outbox,
        });
    }

    pub fn find_player(&self, id: ClientId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_index(&self, id: ClientId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    pub fn remove_player_by_id(&mut self, id: ClientId) -> Option<Player> {
        let idx = self.player_index(id)?;
        Some(self.players.remove(idx))
    }

    pub fn is_known(&self, id: ClientId) -> bool {
        self.find_applicant(id).is_some() || self.find_player(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    fn sender() -> UnboundedSender<String> {
        let (tx, _rx) = unbounded_channel();
        tx
    }

    #[test]
    fn seating_moves_applicant_to_player_preserving_join_order() {
        let mut reg = Registry::new();
        reg.add_applicant(1, sender());
        reg.add_applicant(2, sender());

        let a1 = reg.remove_applicant(1).unwrap();
        reg.seat_player(a1, "alice".to_string());
        let a2 = reg.remove_applicant(2).unwrap();
        reg.seat_player(a2, "bob".to_string());

        assert_eq!(reg.players[0].name, "alice");
        assert_eq!(reg.players[1].name, "bob");
    }

    #[test]
    fn name_taken_checks_existing_players_only() {
        let mut reg = Registry::new();
        reg.add_applicant(1, sender());
        let a1 = reg.remove_applicant(1).unwrap();
        reg.seat_player(a1, "alice".to_string());

        assert!(reg.name_taken("alice"));
        assert!(!reg.name_taken("bob"));
    }

    #[test]
    fn remove_player_by_id_drops_exactly_one() {
        let mut reg = Registry::new();
        for i in 1..=3 {
            reg.add_applicant(i, sender());
            let a = reg.remove_applicant(i).unwrap();
            reg.seat_player(a, format!("p{i}"));
        }
        let removed = reg.remove_player_by_id(2).unwrap();
        assert_eq!(removed.name, "p2");
        assert_eq!(reg.players.len(), 2);
        assert!(reg.find_player(2).is_none());
    }
}
