//! In-memory user and habit store.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::ApiError;

use super::types::{is_truthy, Frequency, Habit, IdStrategy, NewHabit, NewUser, User};

/// Ordered in-memory collection of users and their habits.
///
/// Every operation validates its input in a fixed order and returns the
/// first failure. Nothing is persisted.
#[derive(Debug, Clone)]
pub struct HabitStore {
    users: Vec<User>,
    ids: IdStrategy,
    /// Next user id under [`IdStrategy::Sequence`].
    next_user_id: u64,
    /// Next habit id per user id under [`IdStrategy::Sequence`].
    next_habit_ids: HashMap<u64, u64>,
}

impl HabitStore {
    /// Create an empty store.
    pub fn new(ids: IdStrategy) -> Self {
        Self {
            users: Vec::new(),
            ids,
            next_user_id: 1,
            next_habit_ids: HashMap::new(),
        }
    }

    /// Create a store holding the two seed users, Alice (1) and Bob (2).
    pub fn seeded(ids: IdStrategy) -> Self {
        let mut store = Self::new(ids);
        store.users = vec![User::new(1, "Alice"), User::new(2, "Bob")];
        store.next_user_id = 3;
        store
    }

    /// Id assignment strategy in use.
    pub fn id_strategy(&self) -> IdStrategy {
        self.ids
    }

    /// All users in insertion order.
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Number of users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the store holds no users.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Look up a user by id.
    pub fn user(&self, id: u64) -> Result<&User, ApiError> {
        self.users
            .iter()
            .find(|user| user.id == id)
            .ok_or(ApiError::UserNotFound)
    }

    fn user_mut(&mut self, id: u64) -> Result<&mut User, ApiError> {
        self.users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or(ApiError::UserNotFound)
    }

    /// Add a user.
    ///
    /// Fails with [`ApiError::NameRequired`] before checking for a duplicate
    /// name. Supplied habits and unrecognised fields are stored unchanged;
    /// a supplied `id` is overwritten.
    pub fn create_user(&mut self, new: NewUser) -> Result<User, ApiError> {
        let name = required_name(new.name)?;

        if self.users.iter().any(|user| user.name == name) {
            debug!(name = %name, "user name already taken");
            return Err(ApiError::NameTaken);
        }

        let id = match self.ids {
            IdStrategy::Count => self.users.len() as u64 + 1,
            IdStrategy::Sequence => {
                let id = self.next_user_id;
                self.next_user_id += 1;
                id
            }
        };

        let mut extra = new.extra;
        extra.remove("id");

        let user = User {
            id,
            name,
            habits: new.habits,
            extra,
        };
        self.users.push(user.clone());

        info!(user_id = user.id, name = %user.name, "user created");
        Ok(user)
    }

    /// Add a habit to a user, creating the habits list on first use.
    ///
    /// Checks run in order: user exists, name present, frequency present,
    /// frequency valid. A missing frequency means [`Frequency::Daily`].
    pub fn add_habit(&mut self, user_id: u64, new: NewHabit) -> Result<Habit, ApiError> {
        let Self {
            users,
            ids,
            next_habit_ids,
            ..
        } = self;
        let user = users
            .iter_mut()
            .find(|user| user.id == user_id)
            .ok_or(ApiError::UserNotFound)?;

        let name = required_name(new.name)?;
        let frequency = parse_frequency(new.frequency.as_ref())?;

        let habits = user.habits.get_or_insert_with(Vec::new);
        let id = match ids {
            IdStrategy::Count => habits.len() as u64 + 1,
            IdStrategy::Sequence => {
                let next = next_habit_ids
                    .entry(user_id)
                    .or_insert_with(|| habits.iter().map(|h| h.id).max().unwrap_or(0) + 1);
                let id = *next;
                *next += 1;
                id
            }
        };

        let mut extra = new.extra;
        extra.remove("id");

        let habit = Habit {
            id,
            name,
            frequency,
            extra,
        };
        habits.push(habit.clone());

        info!(user_id, habit_id = habit.id, frequency = %habit.frequency, "habit created");
        Ok(habit)
    }

    /// Remove the first habit of a user with the given id.
    ///
    /// Returns [`ApiError::MissingHabitList`] when the user never had a
    /// habits list, and [`ApiError::HabitNotFound`] when the list exists but
    /// has no match. Remaining habits keep their ids.
    pub fn delete_habit(&mut self, user_id: u64, habit_id: u64) -> Result<Habit, ApiError> {
        let user = self.user_mut(user_id)?;
        let habits = user.habits.as_mut().ok_or(ApiError::MissingHabitList)?;

        let position = habits
            .iter()
            .position(|habit| habit.id == habit_id)
            .ok_or(ApiError::HabitNotFound)?;
        let removed = habits.remove(position);

        info!(user_id, habit_id, "habit deleted");
        Ok(removed)
    }
}

impl Default for HabitStore {
    fn default() -> Self {
        Self::new(IdStrategy::default())
    }
}

/// A falsy or missing name is required; a truthy non-string one is malformed.
fn required_name(value: Option<Value>) -> Result<String, ApiError> {
    match value {
        Some(Value::String(name)) if !name.is_empty() => Ok(name),
        Some(other) if is_truthy(&other) => {
            Err(ApiError::MalformedBody("name must be a string".to_string()))
        }
        _ => Err(ApiError::NameRequired),
    }
}

/// `None` means the field was omitted.
fn parse_frequency(raw: Option<&Value>) -> Result<Frequency, ApiError> {
    match raw {
        None => Ok(Frequency::default()),
        Some(value) if !is_truthy(value) => Err(ApiError::FrequencyRequired),
        Some(Value::String(value)) => value.parse().map_err(|_| ApiError::InvalidFrequency),
        Some(_) => Err(ApiError::InvalidFrequency),
    }
}
