//! Cohort Relevance Classifier
//!
//! Decides whether a listing belongs to the tracked promotional cohort
//! (pump.fun "Mayhem Mode"). Tag-like fields are checked first; if none
//! carries the keyword, a fixed set of text fields is searched.

use serde_json::Value;

use super::listing::RawListing;

/// Default cohort keyword
pub const DEFAULT_COHORT_KEYWORD: &str = "mayhem";

/// Case-insensitive keyword classifier over raw listings
#[derive(Debug, Clone)]
pub struct RelevanceClassifier {
    keyword: String,
}

impl Default for RelevanceClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_COHORT_KEYWORD)
    }
}

impl RelevanceClassifier {
    pub fn new(keyword: impl AsRef<str>) -> Self {
        Self {
            keyword: keyword.as_ref().trim().to_lowercase(),
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    fn matches(&self, value: &str) -> bool {
        !self.keyword.is_empty() && value.to_lowercase().contains(&self.keyword)
    }

    /// True when the listing is part of the cohort. Absent fields count as
    /// empty; never fails.
    pub fn is_relevant(&self, listing: &RawListing) -> bool {
        self.has_cohort_tag(listing) || self.has_cohort_text(listing)
    }

    /// Step 1: tag list, flag fields and mode/segment/category markers
    pub fn has_cohort_tag(&self, listing: &RawListing) -> bool {
        let info = listing.info.as_ref();
        let tag_fields = [
            listing.tags.as_ref(),
            info.and_then(|i| i.tags.as_ref()),
            listing.flags.as_ref(),
            listing.flag.as_ref(),
            info.and_then(|i| i.mode.as_ref()),
            info.and_then(|i| i.segment.as_ref()),
            info.and_then(|i| i.category.as_ref()),
        ];

        let mut tags = Vec::new();
        for field in tag_fields.into_iter().flatten() {
            collect_strings(field, &mut tags);
        }

        tags.iter().any(|tag| self.matches(tag))
    }

    /// Step 2: substring search across identifying text fields
    pub fn has_cohort_text(&self, listing: &RawListing) -> bool {
        let base = listing.base_token.as_ref();
        let quote = listing.quote_token.as_ref();
        let info = listing.info.as_ref();

        let fields = [
            listing.pair_address.as_deref(),
            base.and_then(|t| t.name.as_deref()),
            base.and_then(|t| t.symbol.as_deref()),
            quote.and_then(|t| t.name.as_deref()),
            quote.and_then(|t| t.symbol.as_deref()),
            info.and_then(|i| i.description.as_deref()),
            info.and_then(|i| i.name.as_deref()),
            info.and_then(|i| i.label.as_deref()),
        ];

        fields.into_iter().flatten().any(|field| self.matches(field))
    }
}

/// Flatten a tag-like field: a string, or an array of strings (one level).
fn collect_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => out.extend(items.iter().filter_map(Value::as_str)),
        _ => {}
    }
}
