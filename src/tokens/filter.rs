use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{TokenSource, TokenTree};

const INVERTED_MARKER: &str = "/inverted";
const DEFAULT_MARKER: &str = "/default";

/// Which theme categories of a token export make it into the merged tree.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct ThemeFilter {
    pub default_category: String,
    pub allowed_prefixes: Vec<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CategoryDecision {
    Processed,
    /// Allowed, but carried no `tds` tree.
    Empty,
    SkippedInverted,
    SkippedOtherTheme,
    Ignored,
}

impl ThemeFilter {
    pub fn new<I, S>(default_category: impl Into<String>, allowed_prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            default_category: default_category.into(),
            allowed_prefixes: allowed_prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Classifies a category by name alone. Allowed categories report `Processed`.
    pub fn classify(&self, category: &str) -> CategoryDecision {
        if category.contains(INVERTED_MARKER) {
            CategoryDecision::SkippedInverted
        } else if category == self.default_category
            || self
                .allowed_prefixes
                .iter()
                .any(|prefix| category.starts_with(prefix.as_str()))
        {
            CategoryDecision::Processed
        } else if category.contains(DEFAULT_MARKER) {
            CategoryDecision::SkippedOtherTheme
        } else {
            CategoryDecision::Ignored
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FilterReport {
    pub decisions: Vec<(String, CategoryDecision)>,
}

impl FilterReport {
    pub fn count(&self, decision: CategoryDecision) -> usize {
        self.decisions
            .iter()
            .filter(|(_, recorded)| *recorded == decision)
            .count()
    }

    pub fn processed(&self) -> usize {
        self.count(CategoryDecision::Processed)
    }

    pub fn skipped_inverted(&self) -> usize {
        self.count(CategoryDecision::SkippedInverted)
    }

    pub fn skipped_other_theme(&self) -> usize {
        self.count(CategoryDecision::SkippedOtherTheme)
    }

    pub fn decision(&self, category: &str) -> Option<CategoryDecision> {
        self.decisions
            .iter()
            .find_map(|(name, decision)| (name == category).then_some(*decision))
    }

    pub fn log_summary(&self) {
        info!(
            processed = self.processed(),
            skipped_inverted = self.skipped_inverted(),
            skipped_other_theme = self.skipped_other_theme(),
            "theme filtering summary"
        );
        if self.processed() == 0 {
            warn!("no allowed theme category was found; the output will contain no variables");
        }
    }
}

/// Deep-merges the `tds` tree of every allowed category, in source order.
pub fn merge_categories(source: &TokenSource, filter: &ThemeFilter) -> (TokenTree, FilterReport) {
    let mut merged = TokenTree::new();
    let mut report = FilterReport::default();

    for (category, data) in source.categories() {
        let mut decision = filter.classify(category);
        match decision {
            CategoryDecision::SkippedInverted => {
                warn!(category, "skipping inverted theme");
            }
            CategoryDecision::SkippedOtherTheme => {
                warn!(category, "skipping default category of another theme");
            }
            CategoryDecision::Ignored => {
                debug!(category, "ignoring category without a recognised theme");
            }
            CategoryDecision::Processed | CategoryDecision::Empty => {
                match data.get("tds").and_then(Value::as_object) {
                    Some(tokens) => {
                        merged.merge(tokens);
                        info!(category, "processing");
                    }
                    None => {
                        decision = CategoryDecision::Empty;
                        debug!(category, "allowed category has no tds tokens");
                    }
                }
            }
        }
        report.decisions.push((category.to_string(), decision));
    }

    (merged, report)
}
