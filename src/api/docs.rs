//! OpenAPI document for the user and habit routes.

use utoipa::OpenApi;

use super::handlers::{DeleteResponse, HabitEnvelope, UserEnvelope};
use crate::error::ErrorBody;
use crate::store::{Frequency, Habit, NewHabit, NewUser, User};

/// OpenAPI description served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(title = "habit-tracker", description = "In-memory users and habits API"),
    paths(
        super::handlers::list_users,
        super::handlers::get_user,
        super::handlers::create_user,
        super::handlers::create_habit,
        super::handlers::delete_habit,
    ),
    components(schemas(
        User,
        Habit,
        Frequency,
        NewUser,
        NewHabit,
        UserEnvelope,
        HabitEnvelope,
        DeleteResponse,
        ErrorBody,
    )),
    tags(
        (name = "users", description = "User collection"),
        (name = "habits", description = "Habits owned by a user")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_resource_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/users",
            "/users/{user_id}",
            "/users/{user_id}/habits",
            "/users/{user_id}/habits/{habit_id}",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }
}
