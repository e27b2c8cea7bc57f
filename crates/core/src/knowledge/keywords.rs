use serde::{Deserialize, Serialize};

use crate::domain::ingredient::SkinType;
use crate::normalizer::normalize_name;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordNote {
    pub keyword: String,
    pub note: String,
}

impl KeywordNote {
    pub fn new(keyword: impl Into<String>, note: impl Into<String>) -> Self {
        Self { keyword: keyword.into(), note: note.into() }
    }

    /// Case-insensitive substring match of the keyword against a raw
    /// ingredient string, with hyphens and punctuation folded away first.
    pub fn matches(&self, ingredient: &str) -> bool {
        let keyword = fold_key(&self.keyword);
        !keyword.is_empty() && fold_key(ingredient).contains(&keyword)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkinTypeKeywordRow {
    pub skin_type: SkinType,
    pub keyword: String,
    pub note: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcernKeywordRow {
    pub concern: String,
    pub keyword: String,
    pub note: String,
}

/// Keyword tables backing the personalization scans. Rows keep insertion
/// order; lookups return every row for the requested key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeywordTables {
    cautions: Vec<SkinTypeKeywordRow>,
    benefits: Vec<SkinTypeKeywordRow>,
    concerns: Vec<ConcernKeywordRow>,
}

impl KeywordTables {
    pub fn add_caution(&mut self, skin_type: SkinType, keyword: &str, note: &str) {
        upsert_skin_row(&mut self.cautions, skin_type, keyword, note);
    }

    pub fn add_benefit(&mut self, skin_type: SkinType, keyword: &str, note: &str) {
        upsert_skin_row(&mut self.benefits, skin_type, keyword, note);
    }

    pub fn add_concern_note(&mut self, concern: &str, keyword: &str, note: &str) {
        let concern = fold_key(concern);
        if let Some(row) = self
            .concerns
            .iter_mut()
            .find(|row| row.concern == concern && row.keyword.eq_ignore_ascii_case(keyword))
        {
            row.note = note.to_string();
            return;
        }
        self.concerns.push(ConcernKeywordRow {
            concern,
            keyword: keyword.to_string(),
            note: note.to_string(),
        });
    }

    pub fn cautions_for(&self, skin_type: SkinType) -> Vec<KeywordNote> {
        skin_rows(&self.cautions, skin_type)
    }

    pub fn benefits_for(&self, skin_type: SkinType) -> Vec<KeywordNote> {
        skin_rows(&self.benefits, skin_type)
    }

    pub fn concern_notes_for(&self, concern: &str) -> Vec<KeywordNote> {
        let concern = fold_key(concern);
        self.concerns
            .iter()
            .filter(|row| row.concern == concern)
            .map(|row| KeywordNote::new(row.keyword.clone(), row.note.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.cautions.len() + self.benefits.len() + self.concerns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `dark_spots`, `dark-spots` and `Dark Spots` all fold to `dark spots`.
pub(crate) fn fold_key(raw: &str) -> String {
    normalize_name(&raw.replace(['-', '_', '/'], " "))
}

fn upsert_skin_row(rows: &mut Vec<SkinTypeKeywordRow>, skin_type: SkinType, keyword: &str, note: &str) {
    if let Some(row) = rows
        .iter_mut()
        .find(|row| row.skin_type == skin_type && row.keyword.eq_ignore_ascii_case(keyword))
    {
        row.note = note.to_string();
        return;
    }
    rows.push(SkinTypeKeywordRow {
        skin_type,
        keyword: keyword.to_string(),
        note: note.to_string(),
    });
}

fn skin_rows(rows: &[SkinTypeKeywordRow], skin_type: SkinType) -> Vec<KeywordNote> {
    rows.iter()
        .filter(|row| row.skin_type == skin_type)
        .map(|row| KeywordNote::new(row.keyword.clone(), row.note.clone()))
        .collect()
}
