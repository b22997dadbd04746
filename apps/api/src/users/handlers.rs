use axum::{extract::State, Json};

use crate::auth::AuthenticatedUser;
use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// GET /api/v1/users/me
pub async fn handle_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}

/// GET /api/v1/users
pub async fn handle_list_users(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<User>>, AppError> {
    let users = sqlx::query_as::<_, User>(
        "SELECT id, username, email, created_at FROM users ORDER BY created_at",
    )
    .fetch_all(&state.db)
    .await?;
    Ok(Json(users))
}
