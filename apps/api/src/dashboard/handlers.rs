//! Axum route handlers for the dashboard page and its analysis endpoint.

use axum::{
    extract::{Multipart, State},
    response::Html,
    Json,
};

use crate::dashboard::pipeline::{analyze_interaction, Interaction, Upload};
use crate::dashboard::sections::Dashboard;
use crate::errors::AppError;
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("index.html");

/// GET /
pub async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// POST /api/v1/analyze
///
/// Multipart fields: `resume` (PDF file), `jd_text` (optional text),
/// `analyze` (trigger). Returns the idle dashboard unless both a file and the
/// trigger are present.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Dashboard>, AppError> {
    let interaction = read_interaction(multipart).await?;
    let dashboard =
        analyze_interaction(interaction, &state.model, state.match_scorer.as_ref()).await?;
    Ok(Json(dashboard))
}

async fn read_interaction(mut multipart: Multipart) -> Result<Interaction, AppError> {
    let mut interaction = Interaction::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("resume") => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;

                // Browsers send an empty, unnamed part when no file was chosen.
                if bytes.is_empty() && filename.as_deref().map_or(true, str::is_empty) {
                    continue;
                }

                let upload = Upload {
                    filename,
                    content_type,
                    bytes,
                };
                if !upload.is_pdf() {
                    return Err(AppError::Validation(
                        "Resume must be uploaded as a PDF file".to_string(),
                    ));
                }
                interaction.document = Some(upload);
            }
            Some("jd_text") => interaction.jd_text = field.text().await?,
            Some("analyze") => interaction.analyze_pressed = is_pressed(&field.text().await?),
            _ => {}
        }
    }

    Ok(interaction)
}

fn is_pressed(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "off" | "no"
    )
}
