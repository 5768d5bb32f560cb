use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matching::MatchResult;
use crate::nlp::CategoryBuckets;

// ────────────────────────────────────────────────────────────────────────────
// Dashboard model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardStatus {
    /// No document or trigger not pressed: nothing to render yet.
    Idle,
    Complete,
}

/// Everything computed for one analysis. Dropped after the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub analysis_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub model: String,
    pub text_chars: usize,
    pub entity_count: usize,
    pub buckets: CategoryBuckets,
    pub match_result: Option<MatchResult>,
    pub scorer_backend: String,
}

/// One render call on the dashboard page, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Section {
    Banner {
        message: String,
    },
    Metric {
        label: String,
        value: usize,
    },
    Candidate {
        name: String,
    },
    SkillCloud {
        title: String,
        skills: Vec<String>,
    },
    Divider,
    Table {
        title: String,
        column: String,
        rows: Vec<String>,
    },
    List {
        title: String,
        items: Vec<String>,
    },
    Info {
        title: String,
        message: String,
    },
    MatchScore {
        title: String,
        /// Progress bar value, 0 – 100.
        score: u8,
        caption: String,
        matched: Vec<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub status: DashboardStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisReport>,
    pub sections: Vec<Section>,
}

impl Dashboard {
    pub fn idle() -> Self {
        Self {
            status: DashboardStatus::Idle,
            analysis: None,
            sections: Vec::new(),
        }
    }

    pub fn complete(report: AnalysisReport) -> Self {
        let sections = build_sections(&report.buckets, report.match_result.as_ref());
        Self {
            status: DashboardStatus::Complete,
            analysis: Some(report),
            sections,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Layout
// ────────────────────────────────────────────────────────────────────────────

/// Lays out the results page. Empty buckets turn into info notes or are
/// omitted; the match section appears only when a match was computed.
pub fn build_sections(buckets: &CategoryBuckets, match_result: Option<&MatchResult>) -> Vec<Section> {
    let mut sections = vec![
        Section::Banner {
            message: "Analysis Complete ✅".to_string(),
        },
        Section::Metric {
            label: "Skills Detected".to_string(),
            value: buckets.skill.len(),
        },
    ];

    if let Some(name) = buckets.first_person() {
        sections.push(Section::Candidate {
            name: name.to_string(),
        });
    }

    if !buckets.skill.is_empty() {
        sections.push(Section::SkillCloud {
            title: "🧠 Detected Skills Cloud".to_string(),
            skills: buckets.skill.clone(),
        });
    }

    sections.push(Section::Divider);

    const ORG_TITLE: &str = "🏢 Experience & Organizations";
    if buckets.org.is_empty() {
        sections.push(Section::Info {
            title: ORG_TITLE.to_string(),
            message: "No specific organizations detected.".to_string(),
        });
    } else {
        sections.push(Section::Table {
            title: ORG_TITLE.to_string(),
            column: "Organization".to_string(),
            rows: buckets.org.clone(),
        });
    }

    const GPE_TITLE: &str = "📍 Locations Found";
    if buckets.gpe.is_empty() {
        sections.push(Section::Info {
            title: GPE_TITLE.to_string(),
            message: "No location data found.".to_string(),
        });
    } else {
        sections.push(Section::List {
            title: GPE_TITLE.to_string(),
            items: buckets.gpe.clone(),
        });
    }

    if let Some(result) = match_result {
        sections.push(Section::Divider);
        sections.push(Section::MatchScore {
            title: "📊 Job Match Score".to_string(),
            score: result.score,
            caption: result.caption(),
            matched: result.matched.clone(),
        });
    }

    sections
}
