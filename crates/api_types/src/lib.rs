use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Header carrying the session id on every request but login.
pub const SESSION_HEADER: &str = "tally-session-id";

/// Small structured result every action answers with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionResult {
    pub fn ok() -> Self {
        Self {
            ok: true,
            message: None,
        }
    }

    pub fn ok_with(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: Some(message.into()),
        }
    }
}

pub mod session {
    use super::*;

    /// Login form: who is counting and where.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionStart {
        pub operator: String,
        pub route: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionStarted {
        pub session_id: Uuid,
        pub tally: TallyView,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CategoryOrigin {
        Base,
        AdHoc,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryCountView {
        pub name: String,
        pub origin: CategoryOrigin,
        pub count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TallyView {
        pub operator: String,
        pub route: String,
        pub ledger_key: String,
        pub categories: Vec<CategoryCountView>,
        /// Vehicles counted since login or the last save.
        pub running_total: u64,
        /// Unsaved changes pending.
        pub dirty: bool,
    }
}

pub mod tally {
    use super::*;

    /// `sumar`/`restar` are accepted as aliases from the web form.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Direction {
        #[serde(alias = "sumar")]
        Increase,
        #[serde(alias = "restar")]
        Decrease,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Adjust {
        pub category: String,
        pub direction: Direction,
    }

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Adjusted {
        pub ok: bool,
        pub count: u64,
        pub running_total: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
    }

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Committed {
        pub ok: bool,
        pub message: String,
        pub ledger_key: String,
        /// History entries written by this save.
        pub entries: usize,
        pub total: Option<i64>,
    }
}
