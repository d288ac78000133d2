//! Application option-string parsing.
//!
//! Web applications record the applicant's choices as free text of the
//! form `*Standards:NASAA,ACO *Categories:Producer - Dairy,Processor`.
//! Each section runs from its marker to the next `*` or the end of the
//! string. Nothing here fails: malformed text yields empty selections.

use serde::{Deserialize, Serialize};

const STANDARDS_MARKER: &str = "*Standards";
const CATEGORIES_MARKER: &str = "*Categories";

/// Names selected on an application, in the order they were written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOptions {
    pub standards: Vec<String>,
    pub categories: Vec<String>,
}

#[must_use]
pub fn parse_option_string(options: &str) -> SelectedOptions {
    SelectedOptions {
        standards: section_values(options, STANDARDS_MARKER),
        categories: section_values(options, CATEGORIES_MARKER),
    }
}

fn section_values(options: &str, marker: &str) -> Vec<String> {
    let Some(start) = options.find(marker) else {
        return Vec::new();
    };
    let rest = &options[start + marker.len()..];
    let body = rest.split('*').next().unwrap_or_default();
    let body = body.trim_start_matches([':', '=']);

    body.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_both_sections() {
        let parsed = parse_option_string("*Standards:NASAA,ACO*Categories:Producer - Dairy,Processor");
        assert_eq!(parsed.standards, vec!["NASAA", "ACO"]);
        assert_eq!(parsed.categories, vec!["Producer - Dairy", "Processor"]);
    }

    #[test]
    fn sections_in_either_order_with_whitespace() {
        let parsed = parse_option_string("*Categories: Viticulture ,\n*Standards: NASAA , ");
        assert_eq!(parsed.standards, vec!["NASAA"]);
        assert_eq!(parsed.categories, vec!["Viticulture"]);
    }

    #[test]
    fn empty_values_are_skipped() {
        let parsed = parse_option_string("*Standards:,,NASAA,,");
        assert_eq!(parsed.standards, vec!["NASAA"]);
        assert!(parsed.categories.is_empty());
    }

    #[test]
    fn missing_markers_yield_nothing() {
        assert_eq!(parse_option_string(""), SelectedOptions::default());
        assert_eq!(
            parse_option_string("Standards NASAA, Categories Dairy"),
            SelectedOptions::default()
        );
    }
}
