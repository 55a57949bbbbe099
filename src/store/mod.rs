//! User and habit storage.

pub mod memory;
pub mod types;

pub use memory::HabitStore;
pub use types::{Frequency, Habit, IdStrategy, NewHabit, NewUser, User};
