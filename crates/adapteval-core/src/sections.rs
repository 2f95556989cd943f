use std::collections::HashMap;

/// The four named blocks a response is bucketed into for review display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    ExecutiveSummary,
    Credibility,
    Uncertainty,
    Actionability,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::ExecutiveSummary,
        Section::Credibility,
        Section::Uncertainty,
        Section::Actionability,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Section::ExecutiveSummary => "Executive summary",
            Section::Credibility => "Credibility",
            Section::Uncertainty => "Uncertainty",
            Section::Actionability => "Actionability",
        }
    }

    fn match_heading(lower: &str) -> Option<Section> {
        if lower.starts_with("### executive summary") {
            Some(Section::ExecutiveSummary)
        } else if lower.starts_with("### credibility") {
            Some(Section::Credibility)
        } else if lower.starts_with("### uncertainty") {
            Some(Section::Uncertainty)
        } else if lower.starts_with("### actionability") {
            Some(Section::Actionability)
        } else {
            None
        }
    }
}

/// Buckets raw answer text into named sections by heading match.
///
/// Lines are trimmed before matching. Horizontal-rule lines are skipped
/// and never start or end a section. Lines before the first recognized
/// heading are discarded. A repeated heading restarts its section.
/// Labels never encountered are absent from the map; callers supply the
/// "not found" placeholder.
pub fn split_sections(text: &str) -> HashMap<Section, String> {
    let mut sections: HashMap<Section, String> = HashMap::new();
    let mut current: Option<Section> = None;

    for raw in text.lines() {
        let line = raw.trim();

        if matches!(line, "---" | "***" | "___") {
            continue;
        }

        let lower = line.to_lowercase();
        if let Some(section) = Section::match_heading(&lower) {
            sections.insert(section, String::new());
            current = Some(section);
        } else if let Some(section) = current {
            let buf = sections.entry(section).or_default();
            buf.push_str(line);
            buf.push('\n');
        }
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credibility_block_excludes_rule_line() {
        let text = "### Credibility\nfirst line\nsecond line\n---\n";
        let sections = split_sections(text);
        assert_eq!(
            sections.get(&Section::Credibility).map(String::as_str),
            Some("first line\nsecond line\n")
        );
        assert_eq!(sections.len(), 1);
    }

    #[test]
    fn no_recognized_headings_yields_empty_map() {
        let text = "just some prose\n## wrong level\nmore prose\n";
        assert!(split_sections(text).is_empty());
    }

    #[test]
    fn preamble_before_first_heading_is_discarded() {
        let text = "intro text\n### Uncertainty\nbody\n";
        let sections = split_sections(text);
        assert_eq!(sections.len(), 1);
        assert_eq!(
            sections.get(&Section::Uncertainty).map(String::as_str),
            Some("body\n")
        );
    }

    #[test]
    fn headings_match_case_insensitively_with_trailing_text() {
        let text = "### EXECUTIVE SUMMARY of findings\nsummary body\n### actionability\nact body\n";
        let sections = split_sections(text);
        assert_eq!(
            sections.get(&Section::ExecutiveSummary).map(String::as_str),
            Some("summary body\n")
        );
        assert_eq!(
            sections.get(&Section::Actionability).map(String::as_str),
            Some("act body\n")
        );
    }

    #[test]
    fn repeated_heading_restarts_the_section() {
        let text = "### Credibility\nold\n### Credibility\nnew\n";
        let sections = split_sections(text);
        assert_eq!(
            sections.get(&Section::Credibility).map(String::as_str),
            Some("new\n")
        );
    }

    #[test]
    fn rule_lines_do_not_end_a_section() {
        let text = "### Uncertainty\nbefore\n***\nafter\n";
        let sections = split_sections(text);
        assert_eq!(
            sections.get(&Section::Uncertainty).map(String::as_str),
            Some("before\nafter\n")
        );
    }
}
