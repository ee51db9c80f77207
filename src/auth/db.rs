use crate::db::DbPool;
use crate::models::User;
use crate::schema::{sessions, users};
use chrono::Utc;
use diesel::prelude::*;

use super::crypto::hash_token;

/// Resolve a bearer token to its user, if the session exists and has not
/// expired. Sessions are minted by the external auth service.
pub async fn get_user_from_token(pool: &DbPool, token: &str) -> Option<User> {
    let mut conn = pool.get().ok()?;
    let token_hash = hash_token(token);

    sessions::table
        .inner_join(users::table)
        .filter(sessions::token_hash.eq(&token_hash))
        .filter(sessions::expires_at.gt(Utc::now()))
        .select(User::as_select())
        .first(&mut conn)
        .ok()
}
