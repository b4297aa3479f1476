use super::peer::PeerId;
use serde::{Deserialize, Serialize};

/// Entry in the user sidebar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: PeerId,
    pub username: String,
}

/// Case-insensitive substring filter over usernames
///
/// The term is used as typed, whitespace included; an empty term keeps
/// every user.
pub fn filter_users<'a>(users: &'a [UserSummary], term: &str) -> Vec<&'a UserSummary> {
    let term = term.to_lowercase();
    users
        .iter()
        .filter(|user| user.username.to_lowercase().contains(&term))
        .collect()
}
