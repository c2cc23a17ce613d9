use axum::{
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::services::calendar;

pub fn calendar_routes() -> Router {
    Router::new().route(calendar::ADOS_2025_PATH, get(ados_2025))
}

async fn ados_2025() -> Response {
    let disposition = format!("attachment; filename=\"{}\"", calendar::ADOS_2025_FILENAME);
    (
        [
            (header::CONTENT_TYPE, calendar::CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
        ],
        calendar::ados_2025_ics(),
    )
        .into_response()
}
