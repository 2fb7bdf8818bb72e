/// Composite store keys, `<kind>:<scope>[:<date>]`.
///
/// Everything the game persists lives under one of these. Building keys
/// through the enum keeps the namespace in a single place.
#[derive(Debug, Clone, Copy)]
pub enum StoreKey<'a> {
    /// Per-player streak record.
    Streak(&'a str),
    /// Play-gate flag for one player on one date.
    Played { user: &'a str, date: &'a str },
    /// Completed-game snapshot for one player on one date.
    Score { user: &'a str, date: &'a str },
    /// Lifetime per-player stats hash.
    Stats(&'a str),
    /// The day's shared challenge.
    Challenge(&'a str),
    /// Short-lived marker: generation for this date is in flight.
    ChallengePending(&'a str),
    /// Ranked set of the day's scores.
    Leaderboard(&'a str),
}

impl From<StoreKey<'_>> for String {
    fn from(value: StoreKey<'_>) -> Self {
        match value {
            StoreKey::Streak(user) => format!("streak:{}", user),
            StoreKey::Played { user, date } => format!("played:{}:{}", user, date),
            StoreKey::Score { user, date } => format!("score:{}:{}", user, date),
            StoreKey::Stats(user) => format!("stats:{}", user),
            StoreKey::Challenge(date) => format!("challenge:{}", date),
            StoreKey::ChallengePending(date) => format!("challenge:{}:pending", date),
            StoreKey::Leaderboard(date) => format!("leaderboard:{}", date),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn keys_are_namespaced_by_kind_and_scope() {
        assert_eq!(String::from(StoreKey::Streak("t2_abc")), "streak:t2_abc");
        assert_eq!(
            String::from(StoreKey::Played { user: "t2_abc", date: "2025-06-15" }),
            "played:t2_abc:2025-06-15"
        );
        assert_eq!(
            String::from(StoreKey::Score { user: "t2_abc", date: "2025-06-15" }),
            "score:t2_abc:2025-06-15"
        );
        assert_eq!(
            String::from(StoreKey::Challenge("2025-06-15")),
            "challenge:2025-06-15"
        );
        assert_eq!(
            String::from(StoreKey::ChallengePending("2025-06-15")),
            "challenge:2025-06-15:pending"
        );
        assert_eq!(
            String::from(StoreKey::Leaderboard("2025-06-15")),
            "leaderboard:2025-06-15"
        );
    }
}
