//! The analysis handler: one user interaction in, one dashboard out.
//!
//! Extract → normalize → recognize → categorize → match. Nothing is kept
//! between calls except the model passed in by reference.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::dashboard::sections::{AnalysisReport, Dashboard};
use crate::errors::AppError;
use crate::extraction::{extract_text_from_pdf, normalize_whitespace};
use crate::matching::MatchScorer;
use crate::nlp::{categorize, Entity, EntityRecognizer, ModelHandle};

/// An uploaded resume, held only for the duration of the request.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl Upload {
    /// Accepts a PDF content type or, failing that, a `.pdf` file name.
    pub fn is_pdf(&self) -> bool {
        let by_type = self
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.eq_ignore_ascii_case("application/pdf"));
        let by_name = self
            .filename
            .as_deref()
            .is_some_and(|name| name.to_ascii_lowercase().ends_with(".pdf"));
        by_type || by_name
    }
}

/// The inputs of one interaction with the dashboard.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    pub document: Option<Upload>,
    pub jd_text: String,
    pub analyze_pressed: bool,
}

struct Recognized {
    text_chars: usize,
    entities: Vec<Entity>,
}

/// Runs the whole analysis if a document is present and the trigger was
/// pressed; otherwise returns the idle dashboard. Any failure aborts the
/// analysis with no partial results.
pub async fn analyze_interaction(
    interaction: Interaction,
    model: &ModelHandle,
    scorer: &dyn MatchScorer,
) -> Result<Dashboard, AppError> {
    let document = match interaction.document {
        Some(doc) if interaction.analyze_pressed => doc,
        _ => return Ok(Dashboard::idle()),
    };

    let recognizer = match model {
        ModelHandle::Loaded(recognizer) => Arc::clone(recognizer),
        ModelHandle::Unavailable { reason } => {
            return Err(AppError::ModelUnavailable(reason.clone()))
        }
    };

    let analysis_id = Uuid::new_v4();
    info!(
        %analysis_id,
        filename = document.filename.as_deref().unwrap_or("<unnamed>"),
        bytes = document.bytes.len(),
        "Processing PDF and running entity model"
    );

    let model_name = recognizer.name().to_string();
    let bytes = document.bytes;
    let recognized = tokio::task::spawn_blocking(move || recognize_document(&bytes, &*recognizer))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("analysis task failed: {e}")))??;

    let buckets = categorize(&recognized.entities);

    // Whitespace-only job text still counts as provided and scores 0.
    let match_result = if !interaction.jd_text.is_empty() && !buckets.skill.is_empty() {
        Some(scorer.score(&buckets.skill, &interaction.jd_text).await?)
    } else {
        None
    };

    info!(
        %analysis_id,
        entities = recognized.entities.len(),
        bucketed = buckets.total(),
        skills = buckets.skill.len(),
        orgs = buckets.org.len(),
        match_score = match_result.as_ref().map(|m| m.score),
        "Analysis complete"
    );

    Ok(Dashboard::complete(AnalysisReport {
        analysis_id,
        analyzed_at: Utc::now(),
        model: model_name,
        text_chars: recognized.text_chars,
        entity_count: recognized.entities.len(),
        buckets,
        match_result,
        scorer_backend: scorer.backend().to_string(),
    }))
}

fn recognize_document(bytes: &[u8], recognizer: &dyn EntityRecognizer) -> Result<Recognized, AppError> {
    let raw = extract_text_from_pdf(bytes)?;
    let text = normalize_whitespace(&raw);
    let entities = recognizer.recognize(&text);
    Ok(Recognized {
        text_chars: text.chars().count(),
        entities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::sections::{DashboardStatus, Section};
    use crate::extraction::pdf::fixtures::pdf_with_lines;
    use crate::matching::SubstringMatchScorer;
    use crate::nlp::pattern_model::{ModelMeta, PatternModel};

    const PATTERNS: &str = r#"
{"label": "PERSON", "pattern": "Jane Doe"}
{"label": "ORG", "pattern": "Acme Corp"}
{"label": "COMPANY", "pattern": "Globex"}
{"label": "GPE", "pattern": "Berlin"}
{"label": "SKILL", "pattern": [{"LOWER": "python"}]}
{"label": "SKILL", "pattern": [{"LOWER": "sql"}]}
{"label": "EDU", "pattern": "MIT"}
"#;

    fn loaded_model() -> ModelHandle {
        let model = PatternModel::from_jsonl(PATTERNS, ModelMeta::default(), "resume_test").unwrap();
        ModelHandle::Loaded(Arc::new(model))
    }

    fn resume_pdf() -> Bytes {
        Bytes::from(pdf_with_lines(&[
            "Jane Doe",
            "Software Engineer at Acme Corp, Berlin",
            "Previously at Globex and Acme Corp",
            "Skills: Python, SQL",
            "Education: MIT",
        ]))
    }

    fn interaction(bytes: Bytes, jd_text: &str, pressed: bool) -> Interaction {
        Interaction {
            document: Some(Upload {
                filename: Some("resume.pdf".to_string()),
                content_type: Some("application/pdf".to_string()),
                bytes,
            }),
            jd_text: jd_text.to_string(),
            analyze_pressed: pressed,
        }
    }

    #[test]
    fn test_upload_pdf_detection() {
        let upload = |name: Option<&str>, ct: Option<&str>| Upload {
            filename: name.map(String::from),
            content_type: ct.map(String::from),
            bytes: Bytes::new(),
        };
        assert!(upload(Some("cv.PDF"), None).is_pdf());
        assert!(upload(None, Some("application/pdf")).is_pdf());
        assert!(!upload(Some("cv.bin"), Some("application/octet-stream")).is_pdf());
        assert!(!upload(Some("cv.docx"), Some("application/vnd.openxmlformats")).is_pdf());
    }

    #[tokio::test]
    async fn test_end_to_end_person_and_deduplicated_orgs() {
        let dashboard = analyze_interaction(
            interaction(resume_pdf(), "Looking for Python and Java developer", true),
            &loaded_model(),
            &SubstringMatchScorer,
        )
        .await
        .unwrap();

        assert_eq!(dashboard.status, DashboardStatus::Complete);
        let report = dashboard.analysis.as_ref().unwrap();
        assert!(!report.buckets.person.is_empty());
        assert_eq!(report.buckets.org.len(), 2, "orgs: {:?}", report.buckets.org);
        assert!(report.buckets.org.contains(&"Acme Corp".to_string()));
        assert!(report.buckets.org.contains(&"Globex".to_string()));
        assert!(report.buckets.edu.is_empty());
        assert_eq!(report.model, "resume_test");

        let result = report.match_result.as_ref().unwrap();
        assert_eq!(result.matched, vec!["python"]);
        assert_eq!(result.score, 10);
        assert!(dashboard
            .sections
            .iter()
            .any(|s| matches!(s, Section::MatchScore { score: 10, .. })));
    }

    #[tokio::test]
    async fn test_empty_jd_skips_match_section() {
        let dashboard = analyze_interaction(
            interaction(resume_pdf(), "", true),
            &loaded_model(),
            &SubstringMatchScorer,
        )
        .await
        .unwrap();
        assert!(dashboard.analysis.unwrap().match_result.is_none());
        assert!(!dashboard
            .sections
            .iter()
            .any(|s| matches!(s, Section::MatchScore { .. })));
    }

    #[tokio::test]
    async fn test_whitespace_jd_renders_zero_match() {
        let dashboard = analyze_interaction(
            interaction(resume_pdf(), "   ", true),
            &loaded_model(),
            &SubstringMatchScorer,
        )
        .await
        .unwrap();
        let result = dashboard.analysis.as_ref().unwrap().match_result.as_ref().unwrap();
        assert_eq!(result.score, 0);
        assert!(result.matched.is_empty());
        assert!(dashboard
            .sections
            .iter()
            .any(|s| matches!(s, Section::MatchScore { score: 0, .. })));
    }

    #[tokio::test]
    async fn test_trigger_not_pressed_is_idle() {
        let dashboard = analyze_interaction(
            interaction(resume_pdf(), "Python", false),
            &loaded_model(),
            &SubstringMatchScorer,
        )
        .await
        .unwrap();
        assert_eq!(dashboard.status, DashboardStatus::Idle);
        assert!(dashboard.sections.is_empty());
    }

    #[tokio::test]
    async fn test_no_document_is_idle_even_without_model() {
        let unavailable = ModelHandle::Unavailable {
            reason: "missing".to_string(),
        };
        let dashboard = analyze_interaction(
            Interaction {
                analyze_pressed: true,
                ..Interaction::default()
            },
            &unavailable,
            &SubstringMatchScorer,
        )
        .await
        .unwrap();
        assert_eq!(dashboard.status, DashboardStatus::Idle);
    }

    #[tokio::test]
    async fn test_missing_model_refuses_analysis() {
        let unavailable = ModelHandle::Unavailable {
            reason: "model directory not found".to_string(),
        };
        let err = analyze_interaction(
            interaction(resume_pdf(), "", true),
            &unavailable,
            &SubstringMatchScorer,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::ModelUnavailable(_)));
    }

    #[tokio::test]
    async fn test_malformed_pdf_aborts_analysis() {
        let err = analyze_interaction(
            interaction(Bytes::from_static(b"%PDF-garbage"), "Python", true),
            &loaded_model(),
            &SubstringMatchScorer,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }
}
