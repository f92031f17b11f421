use serde::{Deserialize, Serialize};

/// Confirmation body shared by the mutation endpoints, e.g. `{"msg": "post deleted"}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}
