use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::services::export::ExportService;
use crate::AppState;

/// Download every graded submission as a styled XLSX workbook.
pub async fn export_submissions(
    State(state): State<AppState>,
) -> crate::error::Result<impl IntoResponse> {
    let rows = state.submission_service.export_rows().await?;
    let buffer = ExportService::generate_submissions_xlsx(&rows)?;

    let filename = format!(
        "submissions_{}.xlsx",
        chrono::Utc::now().format("%Y%m%d")
    );
    let disposition = format!("attachment; filename=\"{}\"", filename);

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        buffer,
    ))
}
