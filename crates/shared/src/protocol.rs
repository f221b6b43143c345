//! Wire contract between the panel and the intercom server.
//!
//! The buzzer endpoint is deliberately plain: a `PUT` with the door in the
//! query string, the CSRF token in a header, an empty body, and a short
//! opaque reply body on HTTP 200. Everything here mirrors what the server
//! actually emits; none of it is negotiable client-side.

use serde::{Deserialize, Serialize};

pub const BUZZER_PATH: &str = "/buzzer";
pub const DOOR_QUERY_PARAM: &str = "door";
pub const CSRF_HEADER: &str = "X-CSRF-TOKEN";
pub const LOGIN_PATH: &str = "/login";

/// Well-known path of the background worker script served by the host.
pub const WORKER_SCRIPT_PATH: &str = "/swDummy.js";

pub const REPLY_ACCEPTED: &str = "OK";
pub const REPLY_LOGIN: &str = "LOGIN";

/// Classification of a 200 reply body. Comparison is verbatim and
/// case-sensitive against the whole body; the server's `"ERROR"` body and
/// anything unexpected both land in [`BuzzReply::Rejected`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reply", content = "body", rename_all = "snake_case")]
pub enum BuzzReply {
    Accepted,
    LoginRequired,
    Rejected(String),
}

impl BuzzReply {
    pub fn classify(body: &str) -> Self {
        match body {
            REPLY_ACCEPTED => Self::Accepted,
            REPLY_LOGIN => Self::LoginRequired,
            other => Self::Rejected(other.to_string()),
        }
    }
}
