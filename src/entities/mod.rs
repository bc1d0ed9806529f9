//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Gateways in [`crate::core`] are the only code that queries them.

pub mod habit;
pub mod hint;
pub mod info;
pub mod relapse_history;
pub mod reminder;
pub mod user;
pub mod user_habit;

// Re-export specific types to avoid conflicts
pub use habit::{Column as HabitColumn, Entity as Habit, Model as HabitModel};
pub use hint::{Column as HintColumn, Entity as Hint, Model as HintModel};
pub use info::{Column as InfoColumn, Entity as Info, Model as InfoModel};
pub use relapse_history::{
    Column as RelapseHistoryColumn, Entity as RelapseHistory, Model as RelapseHistoryModel,
};
pub use reminder::{Column as ReminderColumn, Entity as Reminder, Model as ReminderModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
pub use user_habit::{Column as UserHabitColumn, Entity as UserHabit, Model as UserHabitModel};
