use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers::{
    clear_history, create_diff, delete_diff, latest_diff, list_history, reopen_diff,
};
use crate::host::MeldState;

/// Routes under `/diff`.
pub fn routes() -> Router<MeldState> {
    Router::new()
        .route("/diff", post(create_diff).get(latest_diff))
        .route("/diff/history", get(list_history).delete(clear_history))
        .route("/diff/reopen/{id}", post(reopen_diff))
        .route("/diff/{id}", delete(delete_diff))
}
