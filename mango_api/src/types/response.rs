use serde::{Deserialize, Serialize};

use super::User;

/// Body of a successful `/stats/request` call.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct StatsKeyResponse {
    #[serde(default)]
    pub key: String,
}

/// Body of a successful `/config/users/request` call.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct UsersResponse {
    #[serde(default)]
    pub users: Vec<User>,
}
