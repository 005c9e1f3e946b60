use serde::Serialize;

use super::ApiRequest;

/// Looks up users by their internal extension.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UserRequest {
    pub extension: String,
}

impl UserRequest {
    pub fn new(extension: &str) -> Self {
        Self {
            extension: extension.to_string(),
        }
    }
}

impl ApiRequest for UserRequest {
    fn path(&self) -> &'static str {
        "/config/users/request"
    }
}
