//! Landing page.

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../templates/index.html");

/// GET /
///
/// Static page compiled into the binary; never touches the database.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
