// tests/comparison_test.rs
use resume_compare::diff_engine::{reconstruct_customized, reconstruct_original};
use resume_compare::{compare, DiffGranularity, DiffTag};

const ORIGINAL: &str = "\
# Jane Doe
jane@example.com

## SUMMARY
Backend engineer with 6 years of experience.

## EXPERIENCE
Acme Corp - Senior Engineer
Built billing APIs in Java.

## SKILLS
Java, SQL
";

const CUSTOMIZED: &str = "\
# Jane Doe
jane@example.com

## SUMMARY
Backend engineer with 6 years of experience building payment systems.

## EXPERIENCE
Acme Corp - Senior Engineer
Built billing APIs in Java and Go.
Led migration to Kubernetes.

## SKILLS
Java, SQL, Go, Kubernetes
";

const GRANULARITIES: [DiffGranularity; 3] = [
    DiffGranularity::Line,
    DiffGranularity::Word,
    DiffGranularity::Hybrid,
];

#[test]
fn test_spans_reconstruct_both_documents() {
    let pairs = [
        (ORIGINAL, CUSTOMIZED),
        ("", "SKILLS\nRust\n"),
        ("SKILLS\nRust\n", ""),
        ("no trailing newline", "no trailing newline, changed"),
        ("same\n", "same\n"),
        ("Ünïcödé café\n", "Unicode café 😊\n"),
    ];

    for (original, customized) in pairs {
        for granularity in GRANULARITIES {
            let comparison = compare(original, customized, granularity);
            let spans = comparison.inline_spans.as_deref().unwrap();
            assert_eq!(reconstruct_original(spans), original, "{:?}", granularity);
            assert_eq!(reconstruct_customized(spans), customized, "{:?}", granularity);

            assert_eq!(reconstruct_original(&comparison.line_spans), original);
            assert_eq!(reconstruct_customized(&comparison.line_spans), customized);
        }
    }
}

#[test]
fn test_skills_example() {
    let comparison = compare("SKILLS\nJava\n", "SKILLS\nJava, Go\n", DiffGranularity::Word);

    let added: Vec<&str> = comparison
        .inline_spans
        .as_deref()
        .unwrap()
        .iter()
        .filter(|s| s.tag == DiffTag::Added)
        .map(|s| s.value.as_str())
        .collect();
    assert_eq!(added, vec![", Go"]);

    assert!(comparison.original_sections[0].modified);
    assert!(comparison.customized_sections[0].modified);
    assert_eq!(comparison.modified_titles, vec!["SKILLS".to_string()]);
}

#[test]
fn test_modified_sections_on_full_resume() {
    let comparison = compare(ORIGINAL, CUSTOMIZED, DiffGranularity::Word);

    let titles: Vec<&str> = comparison
        .original_sections
        .iter()
        .map(|s| s.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Jane Doe", "SUMMARY", "EXPERIENCE", "SKILLS"]);

    assert_eq!(
        comparison.modified_titles,
        vec!["SUMMARY".to_string(), "EXPERIENCE".to_string(), "SKILLS".to_string()]
    );
    assert!(!comparison.original_sections[0].modified);
}

#[test]
fn test_summary_counts_changes() {
    let comparison = compare(ORIGINAL, CUSTOMIZED, DiffGranularity::Word);
    assert!(comparison.summary.added_spans > 0);
    assert_eq!(comparison.summary.removed_spans, 0);
    assert!(comparison.summary.similarity > 0.5 && comparison.summary.similarity < 1.0);
    assert!(!comparison.hunks().is_empty());
}

#[test]
fn test_identical_documents() {
    let comparison = compare(ORIGINAL, ORIGINAL, DiffGranularity::Hybrid);
    assert!(comparison.modified_titles.is_empty());
    assert_eq!(comparison.summary.total_changes(), 0);
    assert_eq!(comparison.summary.similarity, 1.0);
    assert!(comparison.hunks().is_empty());
}

#[test]
fn test_section_rename_is_aligned() {
    use resume_compare::alignment::PairKind;

    let comparison = compare(
        "SUMMARY\nx\nSKILLS\nJava\n",
        "SUMMARY\nx\nTECHNICAL SKILLS\nJava\n",
        DiffGranularity::Word,
    );
    assert_eq!(comparison.alignment.count(PairKind::Matched), 1);
    assert_eq!(comparison.alignment.count(PairKind::Renamed), 1);
    // The heading line itself changed, so both sides count as modified
    assert_eq!(
        comparison.modified_titles,
        vec!["SKILLS".to_string(), "TECHNICAL SKILLS".to_string()]
    );
}
