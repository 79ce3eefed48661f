use axum::routing::get;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Admin console routes.
///
/// ```text
/// GET    /admin/books           -> changelist
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/admin/books", get(admin::changelist))
}
