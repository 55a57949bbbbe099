//! User and habit types shared by the store and the HTTP API.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// Body fields the service does not interpret, stored and echoed as sent.
pub type Extra = BTreeMap<String, Value>;

/// How often a habit is meant to be performed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Frequency {
    /// Every day.
    #[default]
    Daily,
    /// Once a week.
    Weekly,
    /// Once a month.
    Monthly,
}

/// A recurring activity tracked under a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Habit {
    /// Id, unique among the owning user's current habits under the sequence strategy.
    pub id: u64,
    /// Habit name.
    pub name: String,
    /// Cadence.
    pub frequency: Frequency,
    /// Any other fields sent when the habit was created.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Extra,
}

impl Habit {
    /// Create a habit with no extra fields.
    pub fn new(id: u64, name: impl Into<String>, frequency: Frequency) -> Self {
        Self {
            id,
            name: name.into(),
            frequency,
            extra: Extra::new(),
        }
    }
}

/// A user and the habits it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// User id.
    pub id: u64,
    /// Display name, unique among users (case-sensitive).
    pub name: String,
    /// Habits, absent until the first one is added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub habits: Option<Vec<Habit>>,
    /// Any other fields sent when the user was created.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Extra,
}

impl User {
    /// Create a user without a habits list.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            habits: None,
            extra: Extra::new(),
        }
    }
}

/// Request body for `POST /users`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewUser {
    /// Required. Any falsy JSON value counts as missing.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub name: Option<Value>,
    /// Stored as given.
    #[serde(default)]
    pub habits: Option<Vec<Habit>>,
    /// Echoed back and stored on the user.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Extra,
}

/// Request body for `POST /users/{user_id}/habits`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewHabit {
    /// Required. Any falsy JSON value counts as missing.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub name: Option<Value>,
    /// One of `daily`, `weekly`, `monthly`. Defaults to `daily` only when
    /// the field is omitted; `null` is kept as a present falsy value.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<Frequency>)]
    pub frequency: Option<Value>,
    /// Echoed back and stored on the habit.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Extra,
}

/// Deserialize a field that is present in the body, keeping `null` as `Some(Value::Null)`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// JavaScript truthiness of a JSON value: `null`, `false`, `0` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// How the store assigns user and habit ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Default)]
#[strum(serialize_all = "lowercase")]
pub enum IdStrategy {
    /// `len + 1` of the target collection. Ids can repeat after a deletion.
    #[default]
    Count,
    /// Monotonic counter per collection. Ids are never reused.
    Sequence,
}
