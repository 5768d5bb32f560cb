use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::nlp::entity::Entity;

/// Fixed display buckets for recognized entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Skill,
    Org,
    Person,
    Gpe,
    /// Declared for display but never produced by `from_label`.
    Edu,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Skill,
        Category::Org,
        Category::Person,
        Category::Gpe,
        Category::Edu,
    ];

    /// Label lookup, checked in priority order. Deliberately partial: labels
    /// outside the table (including anything education-like) are dropped.
    pub fn from_label(label: &str) -> Option<Category> {
        match label {
            "SKILL" | "WORK_OF_ART" | "PRODUCT" => Some(Category::Skill),
            "ORG" | "COMPANY" => Some(Category::Org),
            "PERSON" => Some(Category::Person),
            "GPE" | "LOC" => Some(Category::Gpe),
            _ => None,
        }
    }
}

/// Deduplicated span texts per category, each in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBuckets {
    #[serde(rename = "SKILL")]
    pub skill: Vec<String>,
    #[serde(rename = "ORG")]
    pub org: Vec<String>,
    #[serde(rename = "PERSON")]
    pub person: Vec<String>,
    #[serde(rename = "GPE")]
    pub gpe: Vec<String>,
    #[serde(rename = "EDU")]
    pub edu: Vec<String>,
}

impl CategoryBuckets {
    pub fn get(&self, category: Category) -> &[String] {
        match category {
            Category::Skill => &self.skill,
            Category::Org => &self.org,
            Category::Person => &self.person,
            Category::Gpe => &self.gpe,
            Category::Edu => &self.edu,
        }
    }

    fn get_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Skill => &mut self.skill,
            Category::Org => &mut self.org,
            Category::Person => &mut self.person,
            Category::Gpe => &mut self.gpe,
            Category::Edu => &mut self.edu,
        }
    }

    /// The candidate name shown on the dashboard.
    pub fn first_person(&self) -> Option<&str> {
        self.person.first().map(String::as_str)
    }

    pub fn total(&self) -> usize {
        Category::ALL.iter().map(|c| self.get(*c).len()).sum()
    }
}

/// Sorts entities into buckets. Each entity lands in at most one bucket and
/// each bucket keeps a given text at most once (exact equality).
pub fn categorize(entities: &[Entity]) -> CategoryBuckets {
    let mut buckets = CategoryBuckets::default();
    let mut seen: HashSet<(Category, &str)> = HashSet::new();

    for entity in entities {
        let Some(category) = Category::from_label(&entity.label) else {
            continue;
        };
        if seen.insert((category, entity.text.as_str())) {
            buckets.get_mut(category).push(entity.text.clone());
        }
    }

    buckets
}
