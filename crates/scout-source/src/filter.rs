//! Pure predicate filters over fetched postings.
//!
//! Each predicate is independent of the others and of input order; the
//! result preserves the order postings arrived in.

use tracing::debug;

use scout_types::{RawPosting, SearchCriteria};

/// Title keywords that read as senior-level roles.
pub const SENIORITY_KEYWORDS: &[&str] = &[
    "senior",
    "lead",
    "principal",
    "staff",
    "director",
    "vp",
    "head of",
];

/// Location substrings treated as domestic.
pub const US_INDICATORS: &[&str] = &["usa", "united states", "remote"];

/// State abbreviations checked as location substrings. A heuristic, not a
/// geolocation lookup; kept deliberately.
pub const US_STATE_ABBREVS: &[&str] = &["ca", "ny", "tx", "wa", "fl", "il", "ma", "pa", "ga", "nc"];

/// Apply every filter to a batch, preserving input order.
pub fn apply_filters(postings: Vec<RawPosting>, criteria: &SearchCriteria) -> Vec<RawPosting> {
    let before = postings.len();
    let kept: Vec<RawPosting> = postings
        .into_iter()
        .filter(|p| passes_filters(p, criteria))
        .collect();
    debug!(before, after = kept.len(), "Applied filters");
    kept
}

/// Whether a single posting survives every configured filter.
pub fn passes_filters(posting: &RawPosting, criteria: &SearchCriteria) -> bool {
    if excluded_by_keywords(posting, &criteria.exclude_keywords) {
        return false;
    }
    if criteria.exclude_senior && excluded_as_senior(posting) {
        return false;
    }
    if criteria.exclude_international && excluded_as_international(posting) {
        return false;
    }
    if excluded_by_salary(posting, criteria.salary_min, criteria.salary_max) {
        return false;
    }
    true
}

fn excluded_by_keywords(posting: &RawPosting, exclude_keywords: &[String]) -> bool {
    if exclude_keywords.is_empty() {
        return false;
    }
    let title = posting.title.to_lowercase();
    let description = posting
        .description
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();

    exclude_keywords.iter().any(|kw| {
        let kw = kw.to_lowercase();
        title.contains(&kw) || description.contains(&kw)
    })
}

fn excluded_as_senior(posting: &RawPosting) -> bool {
    let title = posting.title.to_lowercase();
    SENIORITY_KEYWORDS.iter().any(|kw| title.contains(kw))
}

/// Substring heuristic for non-domestic postings.
///
/// Empty locations pass, as does anything mentioning "remote". Substring
/// matching means e.g. "ca" also matches inside unrelated words; this
/// looseness is accepted.
fn excluded_as_international(posting: &RawPosting) -> bool {
    let location = posting
        .location
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();

    let domestic = US_INDICATORS
        .iter()
        .chain(US_STATE_ABBREVS.iter())
        .any(|ind| location.contains(ind));

    !domestic && !location.is_empty() && !location.contains("remote")
}

fn excluded_by_salary(
    posting: &RawPosting,
    salary_min: Option<f64>,
    salary_max: Option<f64>,
) -> bool {
    if let (Some(wanted_min), Some(posting_max)) = (salary_min, posting.salary_max) {
        if posting_max < wanted_min {
            return true;
        }
    }
    if let (Some(wanted_max), Some(posting_min)) = (salary_max, posting.salary_min) {
        if posting_min > wanted_max {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn posting(title: &str) -> RawPosting {
        RawPosting::new("j-1", title)
    }

    fn located(title: &str, location: &str) -> RawPosting {
        let mut p = posting(title);
        p.location = Some(location.to_string());
        p
    }

    #[test]
    fn test_no_criteria_passes_everything() {
        let criteria = SearchCriteria::default();
        assert!(passes_filters(&posting("Senior Engineer"), &criteria));
        assert!(passes_filters(&located("Engineer", "Berlin, Germany"), &criteria));
    }

    #[test]
    fn test_keyword_in_title_drops() {
        let criteria = SearchCriteria {
            exclude_keywords: vec!["crypto".to_string()],
            ..Default::default()
        };
        assert!(!passes_filters(&posting("Crypto Platform Engineer"), &criteria));
        assert!(passes_filters(&posting("Platform Engineer"), &criteria));
    }

    #[test]
    fn test_keyword_in_description_drops() {
        let criteria = SearchCriteria {
            exclude_keywords: vec!["clearance".to_string()],
            ..Default::default()
        };
        let mut p = posting("Systems Engineer");
        p.description = Some("Requires active security clearance".to_string());
        assert!(!passes_filters(&p, &criteria));
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let criteria = SearchCriteria {
            exclude_keywords: vec!["BLOCKCHAIN".to_string()],
            ..Default::default()
        };
        assert!(!passes_filters(&posting("Blockchain Developer"), &criteria));
    }

    #[test]
    fn test_seniority_filter_matches_title_keywords() {
        let criteria = SearchCriteria {
            exclude_senior: true,
            ..Default::default()
        };
        for title in [
            "Senior Backend Engineer",
            "Tech Lead",
            "Principal Engineer",
            "Staff Engineer",
            "Director of Engineering",
            "VP Engineering",
            "Head of Platform",
        ] {
            assert!(!passes_filters(&posting(title), &criteria), "{}", title);
        }
        assert!(passes_filters(&posting("Backend Engineer II"), &criteria));
    }

    #[test]
    fn test_international_filter_heuristics() {
        let criteria = SearchCriteria {
            exclude_international: true,
            ..Default::default()
        };

        // Domestic indicators pass
        assert!(passes_filters(&located("E", "San Francisco, CA"), &criteria));
        assert!(passes_filters(&located("E", "New York, NY"), &criteria));
        assert!(passes_filters(&located("E", "Remote"), &criteria));
        assert!(passes_filters(&located("E", "Remote - Europe"), &criteria));
        assert!(passes_filters(&located("E", "United States"), &criteria));

        // Missing location passes
        assert!(passes_filters(&posting("E"), &criteria));

        // Foreign locations with no indicator substring drop
        assert!(!passes_filters(&located("E", "London, UK"), &criteria));
        assert!(!passes_filters(&located("E", "Zurich, Switzerland"), &criteria));

        // Substring looseness: "Germany" contains "ny", so it slips
        // through. Accepted behavior of the heuristic.
        assert!(passes_filters(&located("E", "Berlin, Germany"), &criteria));
    }

    #[test]
    fn test_salary_band_overlap() {
        let criteria = SearchCriteria {
            salary_min: Some(120_000.0),
            salary_max: Some(200_000.0),
            ..Default::default()
        };

        let mut below = posting("E");
        below.salary_max = Some(100_000.0);
        assert!(!passes_filters(&below, &criteria));

        let mut above = posting("E");
        above.salary_min = Some(250_000.0);
        assert!(!passes_filters(&above, &criteria));

        let mut overlapping = posting("E");
        overlapping.salary_min = Some(110_000.0);
        overlapping.salary_max = Some(130_000.0);
        assert!(passes_filters(&overlapping, &criteria));

        // Absent posting bounds never exclude
        assert!(passes_filters(&posting("E"), &criteria));
    }

    #[test]
    fn test_apply_filters_preserves_order() {
        let criteria = SearchCriteria {
            exclude_senior: true,
            ..Default::default()
        };
        let batch = vec![
            RawPosting::new("a", "Engineer"),
            RawPosting::new("b", "Senior Engineer"),
            RawPosting::new("c", "Developer"),
            RawPosting::new("d", "Staff Developer"),
            RawPosting::new("e", "SRE"),
        ];

        let kept = apply_filters(batch, &criteria);
        let ids: Vec<&str> = kept.iter().map(|p| p.external_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "e"]);
    }
}
