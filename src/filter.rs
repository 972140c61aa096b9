use crate::node::PropertyMap;
use crate::value::PropertyValue;

/// Ranks candidate names against a search term. Returns the matching subset, most
/// relevant first; the returned order is the display order.
pub trait FuzzyMatcher {
    fn matches(&self, candidates: &[&str], term: Option<&str>) -> Vec<String>;
}

impl<F> FuzzyMatcher for F
where
    F: Fn(&[&str], Option<&str>) -> Vec<String>,
{
    fn matches(&self, candidates: &[&str], term: Option<&str>) -> Vec<String> {
        self(candidates, term)
    }
}

/// Display-ready row for one property that survived the filter.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayProperty {
    pub name: String,
    pub value: PropertyValue,
    pub type_name: &'static str,
}

/// Build the display list for `properties` under `search`. Values and type names are read
/// from the map at call time; names the matcher returns that are no longer in the map are skipped.
pub fn filter_properties<M: FuzzyMatcher + ?Sized>(
    properties: &PropertyMap,
    search: Option<&str>,
    matcher: &M,
) -> Vec<DisplayProperty> {
    let names: Vec<&str> = properties.keys().map(String::as_str).collect();
    let matched = matcher.matches(&names, search);

    let mut out = Vec::with_capacity(matched.len());
    for name in matched {
        let Some(property) = properties.get(&name) else {
            log::debug!("skipping stale property name {name:?}");
            continue;
        };
        out.push(DisplayProperty {
            value: property.value.clone(),
            type_name: property.type_name(),
            name,
        });
    }
    out
}

/// Case-insensitive subsequence matcher. An absent or blank term keeps every candidate
/// in its original order; otherwise tighter, earlier matches rank first.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubsequenceMatcher;

impl FuzzyMatcher for SubsequenceMatcher {
    fn matches(&self, candidates: &[&str], term: Option<&str>) -> Vec<String> {
        let needle = term.map(str::trim).unwrap_or_default();
        if needle.is_empty() {
            return candidates.iter().map(|c| (*c).to_string()).collect();
        }

        let needle = needle.to_lowercase();
        let mut scored: Vec<(i64, usize)> = candidates
            .iter()
            .enumerate()
            .filter_map(|(idx, candidate)| {
                subsequence_score(&needle, &candidate.to_lowercase()).map(|score| (score, idx))
            })
            .collect();

        scored.sort_by(|(score_a, idx_a), (score_b, idx_b)| {
            score_b.cmp(score_a).then_with(|| idx_a.cmp(idx_b))
        });

        scored
            .into_iter()
            .map(|(_, idx)| candidates[idx].to_string())
            .collect()
    }
}

fn is_boundary_char(ch: char) -> bool {
    matches!(ch, ':' | '_' | '-' | '.' | ' ' | '/')
}

fn subsequence_score(needle: &str, haystack: &str) -> Option<i64> {
    let mut needle_iter = needle.chars().peekable();
    let mut first: Option<usize> = None;
    let mut last = 0usize;
    let mut prev_match: Option<usize> = None;
    let mut consecutive = 0i64;
    let mut start_boundary = false;
    let mut prev_hay: Option<char> = None;

    for (idx, ch) in haystack.chars().enumerate() {
        let Some(&want) = needle_iter.peek() else {
            break;
        };

        if ch == want {
            needle_iter.next();
            if first.is_none() {
                first = Some(idx);
                start_boundary = prev_hay.is_none_or(is_boundary_char);
            }
            if prev_match.is_some_and(|prev| prev + 1 == idx) {
                consecutive += 1;
            }
            prev_match = Some(idx);
            last = idx;
        }
        prev_hay = Some(ch);
    }

    if needle_iter.peek().is_some() {
        return None;
    }

    let first = first?;
    let span = (last - first + 1) as i64;

    let mut score = 1000 - span - (first as i64) / 4 + consecutive * 40;
    if start_boundary {
        score += 150;
    }
    if haystack.contains(needle) {
        score += 2000;
    }
    Some(score)
}
