use log::debug;
use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;

use crate::{normalize_ci, PoolEntry, Roster, SearchPage, SearchRules};

impl Roster {
    /// Every roll entry, annotated with the assignment holding it (if any).
    ///
    /// This is what the person picker displays: taken entries are shown but
    /// cannot be selected.
    pub fn availability(&self) -> Vec<PoolEntry<'_>> {
        self.roll()
            .iter()
            .map(|person| {
                let ci = normalize_ci(person.ci.as_str());
                let holder = self.holder_of(&ci);
                PoolEntry { person, ci, holder }
            })
            .collect()
    }

    /// The roll entries without any assignment in the hierarchy.
    pub fn eligibility_pool(&self) -> Vec<PoolEntry<'_>> {
        let res: Vec<PoolEntry<'_>> = self
            .availability()
            .into_iter()
            .filter(|e| !e.is_assigned())
            .collect();
        debug!(
            "eligibility_pool: {} eligible out of {}",
            res.len(),
            self.roll().len()
        );
        res
    }
}

/// Lower-cases the text and removes the combining diacritical marks
/// (U+0300 to U+036F) after canonical decomposition.
///
/// ```
/// use padron_roster::fold_diacritics;
///
/// assert_eq!(fold_diacritics("José Ñandú"), "jose nandu");
/// ```
pub fn fold_diacritics(s: &str) -> String {
    s.to_lowercase()
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect()
}

/// The search tokens of a query. Empty when the query is blank.
pub fn query_tokens(query: &str) -> Vec<String> {
    fold_diacritics(query)
        .split_whitespace()
        .map(|s| s.to_string())
        .collect()
}

fn entry_matches(entry: &PoolEntry<'_>, tokens: &[String]) -> bool {
    let ci = entry.person.ci.to_lowercase();
    let name = fold_diacritics(&entry.person.full_name());
    tokens
        .iter()
        .all(|t| ci.contains(t.as_str()) || name.contains(t.as_str()))
}

/// Accent- and case-insensitive comparison, with the raw text as tiebreak.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    fold_diacritics(a)
        .cmp(&fold_diacritics(b))
        .then_with(|| a.cmp(b))
}

/// Searches the entries for a free-text query.
///
/// All the tokens of the query must be found, each one either in the CI or
/// in the full name. An entry whose CI is exactly the query comes first, the
/// rest is sorted by given name. A blank query returns nothing.
pub fn search<'a, 'b>(entries: &'b [PoolEntry<'a>], query: &str) -> Vec<&'b PoolEntry<'a>> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    let tokens = query_tokens(query);
    let mut res: Vec<&PoolEntry> = entries
        .iter()
        .filter(|e| entry_matches(e, &tokens))
        .collect();
    res.sort_by(|a, b| {
        let a_exact = a.person.ci == query;
        let b_exact = b.person.ci == query;
        b_exact
            .cmp(&a_exact)
            .then_with(|| compare_names(&a.person.first_name, &b.person.first_name))
    });
    debug!(
        "search: query: {:?} tokens: {:?} matches: {}",
        query,
        tokens,
        res.len()
    );
    res
}

/// Number of pages needed for the matches. Always at least 1.
pub fn page_count(num_matches: usize, page_size: usize) -> usize {
    let size = page_size.max(1);
    ((num_matches + size - 1) / size).max(1)
}

/// The state of the person picker, owned by the presentation layer.
///
/// Pages are 1-based.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SearchView {
    pub query: String,
    pub page: usize,
}

impl Default for SearchView {
    fn default() -> Self {
        SearchView::new("")
    }
}

impl SearchView {
    pub fn new(query: &str) -> SearchView {
        SearchView {
            query: query.to_string(),
            page: 1,
        }
    }

    /// Changing the text of the query goes back to the first page.
    pub fn with_query(self, query: &str) -> SearchView {
        if self.query == query {
            self
        } else {
            SearchView::new(query)
        }
    }

    pub fn go_to(self, page: usize, page_count: usize) -> SearchView {
        SearchView {
            page: page.clamp(1, page_count.max(1)),
            query: self.query,
        }
    }

    pub fn next_page(self, page_count: usize) -> SearchView {
        let page = self.page + 1;
        self.go_to(page, page_count)
    }

    pub fn previous_page(self, page_count: usize) -> SearchView {
        let page = self.page.saturating_sub(1);
        self.go_to(page, page_count)
    }
}

/// Runs the search of the view and cuts the requested page out of it.
pub fn search_page<'a, 'b>(
    entries: &'b [PoolEntry<'a>],
    view: &SearchView,
    rules: &SearchRules,
) -> SearchPage<'a, 'b> {
    let matches = search(entries, &view.query);
    let size = rules.page_size.max(1);
    let count = page_count(matches.len(), size);
    let page = view.page.clamp(1, count);
    let total_matches = matches.len();
    let entries = matches
        .into_iter()
        .skip((page - 1) * size)
        .take(size)
        .collect();
    SearchPage {
        entries,
        page,
        page_count: count,
        total_matches,
    }
}
