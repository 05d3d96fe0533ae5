//! Navigation and roles-matrix routes.

use axum::response::Json;

use crate::routes::auth::AuthUser;
use crate::services::navigation::{self, CapabilityRow, NavItem};

/// `GET /api/nav` — screens the caller's role may open.
pub async fn nav(auth: AuthUser) -> Json<Vec<NavItem>> {
    Json(navigation::visible_items(auth.user.role))
}

/// `GET /api/roles` — capability matrix.
pub async fn roles(_auth: AuthUser) -> Json<Vec<CapabilityRow>> {
    Json(navigation::roles_matrix())
}
