// tests/session_test.rs
use std::time::{Duration, Instant};

use resume_compare::outline::ToggleState;
use resume_compare::{
    ComparisonSession, Config, DocumentText, Pane, SearchScope, SectionKey, ViewMode,
};

fn session() -> ComparisonSession {
    ComparisonSession::new(
        DocumentText::from_plain("SUMMARY\nJava developer\nSKILLS\nJava\n"),
        DocumentText::from_plain("SUMMARY\nJava developer\nSKILLS\nJava, Go\n"),
    )
}

fn skills() -> SectionKey {
    SectionKey::new("SKILLS", 0)
}

#[test]
fn test_one_toggle_per_heading() {
    let session = session();
    for pane in [Pane::Original, Pane::Customized] {
        let view = session.view(pane);
        let headings = view.blocks.iter().filter(|b| b.heading().is_some()).count();
        assert_eq!(headings, 2);
        assert_eq!(view.toggles.len(), headings);
    }
}

#[test]
fn test_toggle_twice_restores_state() {
    let mut session = session();

    assert!(!session.toggle_section(Pane::Customized, &skills()).unwrap());
    let view = session.view(Pane::Customized);
    let toggle = &view.toggles[view.toggle_index(&skills()).unwrap()];
    assert_eq!(toggle.state, ToggleState::Collapsed);
    assert!(toggle.content.iter().all(|&idx| view.blocks[idx].hidden));

    assert!(session.toggle_section(Pane::Customized, &skills()).unwrap());
    for pane in [Pane::Original, Pane::Customized] {
        let view = session.view(pane);
        assert!(view.blocks.iter().all(|b| !b.hidden));
        assert!(view.toggles.iter().all(|t| t.state == ToggleState::Expanded));
    }
}

#[test]
fn test_toggle_by_rendered_id() {
    let mut session = session();
    let id = session.view(Pane::Original).toggles[1].id.clone();
    assert_eq!(id, "original-section-toggle-1");

    assert!(!session.toggle_section_by_id(&id).unwrap());
    assert_eq!(session.view(Pane::Customized).is_expanded(&skills()), Some(false));
}

#[test]
fn test_match_count_sums_panes() {
    let mut session = session();
    assert_eq!(session.search_now("JAVA"), 4);
    assert_eq!(session.search().matches_in(Pane::Original).count(), 2);
    assert_eq!(session.search().matches_in(Pane::Customized).count(), 2);

    assert_eq!(session.search_now("j"), 0);
    assert!(session.search().matches().is_empty());
}

#[test]
fn test_next_wraps_to_first() {
    let mut session = session();
    let total = session.search_now("java");
    let first = session.search().current().cloned().unwrap();

    for _ in 0..total {
        session.next_match();
    }
    assert_eq!(session.search().current(), Some(&first));

    let last = session.handle_enter(true).unwrap();
    assert_eq!(last.index, total - 1);
    assert_eq!(last.counter, "4 of 4");
}

#[test]
fn test_navigation_expands_collapsed_sections() {
    let mut session = session();
    session.toggle_section(Pane::Original, &skills()).unwrap();
    assert_eq!(session.view(Pane::Customized).is_expanded(&skills()), Some(false));

    session.search_now("java");
    let target = session.next_match().unwrap();

    assert_eq!(target.pane, Pane::Original);
    assert_eq!(target.block_id, "original-block-3");
    assert_eq!(target.container_id, "original-resume-html");
    assert_eq!(
        target.expanded,
        vec![(Pane::Original, skills()), (Pane::Customized, skills())]
    );
    assert_eq!(session.view(Pane::Original).is_expanded(&skills()), Some(true));
    assert_eq!(session.view(Pane::Customized).is_expanded(&skills()), Some(true));
    assert!(!session.view(Pane::Original).blocks[3].hidden);
}

#[test]
fn test_debounced_input() {
    let mut session = session();
    let start = Instant::now();

    session.input_query("ja", start);
    session.input_query("java", start + Duration::from_millis(100));
    assert_eq!(session.tick(start + Duration::from_millis(350)), None);
    assert_eq!(session.tick(start + Duration::from_millis(400)), Some(4));
    assert_eq!(session.search().query(), Some("java"));
    assert_eq!(session.tick(start + Duration::from_millis(900)), None);
}

#[test]
fn test_scope_change_reruns_last_query() {
    let mut session = session();
    session.search_now("go");
    assert_eq!(session.search().matches().len(), 1);

    assert_eq!(session.set_scope(SearchScope::Original), 0);
    assert_eq!(session.set_scope(SearchScope::Customized), 1);
    assert_eq!(session.set_scope(SearchScope::Both), 1);
}

#[test]
fn test_clear_resets_everything() {
    let mut session = session();
    session.search_now("java");
    session.input_query("developer", Instant::now());
    session.clear_search();

    assert!(session.search().matches().is_empty());
    assert_eq!(session.search().query(), None);
    assert_eq!(session.search().current_index(), None);
    assert_eq!(session.search().counter_label(), "No matches");
    assert_eq!(session.tick(Instant::now() + Duration::from_secs(1)), None);
    assert!(session.next_match().is_none());
}

#[test]
fn test_view_mode_keeps_collapse_state() {
    let mut session = session();
    session.toggle_section(Pane::Customized, &skills()).unwrap();
    session.search_now("java");

    assert_eq!(session.toggle_view_mode(), ViewMode::DiffOnly);
    for pane in [Pane::Original, Pane::Customized] {
        assert_eq!(session.view(pane).mode, ViewMode::DiffOnly);
        assert_eq!(session.view(pane).is_expanded(&skills()), Some(false));
    }

    // Only the changed customized line survives the diff-only filter
    assert_eq!(session.search().query(), Some("java"));
    assert_eq!(session.search().matches().len(), 1);
    assert_eq!(session.search().matches()[0].pane, Pane::Customized);

    assert_eq!(session.toggle_view_mode(), ViewMode::Full);
    assert_eq!(session.view(Pane::Original).is_expanded(&skills()), Some(false));
    assert_eq!(session.search().matches().len(), 4);
}

#[test]
fn test_config_drives_session() {
    let mut config = Config::default();
    config.search.min_query_len = 4;
    config.search.default_scope = SearchScope::Customized;
    config.sections.max_scan_depth = 1;

    let mut session = ComparisonSession::with_config(
        DocumentText::from_plain("SKILLS\nJava\nSQL\n"),
        DocumentText::from_plain("SKILLS\nJava\nSQL\nGo\n"),
        &config,
    );
    assert_eq!(session.search_now("sql"), 0);
    assert_eq!(session.search_now("java"), 1);
    assert_eq!(session.view(Pane::Customized).toggles[0].content.len(), 1);
}

#[test]
fn test_crlf_documents() {
    let mut session = ComparisonSession::new(
        DocumentText::from_plain("SKILLS\r\nJava\r\n"),
        DocumentText::from_plain("SKILLS\r\nJava, Go\r\n"),
    );

    for pane in [Pane::Original, Pane::Customized] {
        let view = session.view(pane);
        assert!(view.blocks.iter().all(|b| !b.text().contains('\r')));
        assert_eq!(view.toggles.len(), 1);
    }
    assert_eq!(session.view(Pane::Original).blocks[1].text(), "Java");
    assert_eq!(session.comparison().modified_titles, vec!["SKILLS".to_string()]);

    assert_eq!(session.search_now("java"), 2);
    assert!(!session.render_html().contains('\r'));
}
