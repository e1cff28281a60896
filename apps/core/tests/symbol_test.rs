use std::time::Instant;

use quickswitch_core::config::Settings;
use quickswitch_core::facets::FacetId;
use quickswitch_core::host::NavigationState;
use quickswitch_core::model::{Leaf, Position};
use quickswitch_core::suggestion::{ChooseModifiers, Flair, LinkSubType, Suggestion, SymbolType};
use quickswitch_core::switcher::{Switcher, UpdateOutcome};
use quickswitch_core::vault::{MemoryVault, NavigationEvent};

const GUIDE: &str = "# Guide\nIntro #howto\n## Setup\nInstall via [[Tools]].\n> [!tip] Shortcut\n> body\n### Deep\n## Usage\n![[diagram.png]]\n";

fn fixture(cursor_line: usize) -> (MemoryVault, Leaf) {
    let mut vault = MemoryVault::default();
    let guide = vault.add_note("docs/Guide.md", GUIDE);
    vault.add_note("Tools.md", "# Tools\n");
    let mut leaf = Leaf::markdown(1, guide);
    leaf.cursor = Some(Position::new(cursor_line, 0));
    vault.open_leaf(leaf.clone());
    vault.set_active_leaf(Some(leaf.id));
    (vault, leaf)
}

fn symbols(switcher: &mut Switcher, vault: &MemoryVault, text: &str, leaf: &Leaf) -> Vec<Suggestion> {
    match switcher.update_suggestions(vault, text, None, Some(leaf), Instant::now()) {
        UpdateOutcome::Ready { suggestions, .. } => suggestions,
        other => panic!("expected symbol suggestions, got {other:?}"),
    }
}

fn outline(suggestions: &[Suggestion]) -> Vec<(String, usize)> {
    suggestions
        .iter()
        .filter_map(|s| s.symbol())
        .map(|sym| (sym.text.clone(), sym.indent_level))
        .collect()
}

#[test]
fn symbols_are_listed_in_line_order_with_heading_indent() {
    let (vault, leaf) = fixture(0);
    let mut switcher = Switcher::with_default_matcher(Settings::default()).unwrap();

    let suggestions = symbols(&mut switcher, &vault, "@", &leaf);
    assert_eq!(
        outline(&suggestions),
        vec![
            ("Guide".to_string(), 0),
            ("#howto".to_string(), 0),
            ("Setup".to_string(), 1),
            ("Tools".to_string(), 1),
            ("Shortcut".to_string(), 1),
            ("Deep".to_string(), 2),
            ("Usage".to_string(), 1),
            ("diagram.png".to_string(), 1),
        ]
    );
}

#[test]
fn heading_nearest_the_cursor_is_selected() {
    let (vault, leaf) = fixture(5);
    let mut switcher = Switcher::with_default_matcher(Settings::default()).unwrap();

    let suggestions = symbols(&mut switcher, &vault, "@", &leaf);
    let selected: Vec<&str> = suggestions
        .iter()
        .filter_map(|s| s.symbol())
        .filter(|sym| sym.is_selected)
        .map(|sym| sym.text.as_str())
        .collect();
    assert_eq!(selected, vec!["Setup"]);
}

#[test]
fn search_term_filters_and_skips_selection() {
    let (vault, leaf) = fixture(5);
    let mut switcher = Switcher::with_default_matcher(Settings::default()).unwrap();

    let suggestions = symbols(&mut switcher, &vault, "@setu", &leaf);
    let found = outline(&suggestions);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].0, "Setup");
    assert!(suggestions.iter().filter_map(|s| s.symbol()).all(|sym| !sym.is_selected));
}

#[test]
fn unreadable_file_only_loses_callouts() {
    let (mut vault, leaf) = fixture(0);
    vault.mark_unreadable("docs/Guide.md");
    let mut switcher = Switcher::with_default_matcher(Settings::default()).unwrap();

    let suggestions = symbols(&mut switcher, &vault, "@", &leaf);
    let types: Vec<SymbolType> = suggestions
        .iter()
        .filter_map(|s| s.symbol().map(|sym| sym.symbol_type))
        .collect();
    assert_eq!(types.len(), 7);
    assert!(!types.contains(&SymbolType::Callout));
    assert!(types.contains(&SymbolType::Heading));
}

#[test]
fn disabled_symbol_types_are_omitted() {
    let (vault, leaf) = fixture(0);
    let mut settings = Settings::default();
    settings.enabled_symbol_types.remove(&SymbolType::Tag);
    settings.enabled_symbol_types.remove(&SymbolType::Embed);
    let mut switcher = Switcher::with_default_matcher(settings).unwrap();

    let suggestions = symbols(&mut switcher, &vault, "@", &leaf);
    assert!(suggestions
        .iter()
        .filter_map(|s| s.symbol())
        .all(|sym| !matches!(sym.symbol_type, SymbolType::Tag | SymbolType::Embed)));
}

#[test]
fn facet_restricts_to_one_symbol_type() {
    let (vault, leaf) = fixture(0);
    let mut switcher = Switcher::with_default_matcher(Settings::default()).unwrap();
    switcher.open_session(&vault);
    assert!(switcher.toggle_facet(FacetId::Symbol(SymbolType::Heading)));

    let suggestions = symbols(&mut switcher, &vault, "@", &leaf);
    let texts: Vec<String> = outline(&suggestions).into_iter().map(|(text, _)| text).collect();
    assert_eq!(texts, vec!["Guide", "Setup", "Deep", "Usage"]);
}

#[test]
fn rendering_carries_symbol_flairs_and_indent() {
    let (vault, leaf) = fixture(0);
    let mut switcher = Switcher::with_default_matcher(Settings::default()).unwrap();

    let suggestions = symbols(&mut switcher, &vault, "@", &leaf);
    let deep = suggestions
        .iter()
        .find(|s| s.symbol().is_some_and(|sym| sym.text == "Deep"))
        .expect("Deep heading should be listed");
    let rendered = switcher.render_suggestion(&vault, deep).expect("symbols render");
    assert_eq!(rendered.title, "Deep");
    assert_eq!(rendered.indent_level, 2);
    assert_eq!(rendered.flairs, vec![Flair::Symbol(SymbolType::Heading), Flair::HeadingLevel(3)]);
}

#[test]
fn choosing_a_symbol_moves_the_cursor_in_the_source_pane() {
    let (vault, leaf) = fixture(0);
    let mut switcher = Switcher::with_default_matcher(Settings::default()).unwrap();

    let suggestions = symbols(&mut switcher, &vault, "@", &leaf);
    let setup = suggestions
        .iter()
        .find(|s| s.symbol().is_some_and(|sym| sym.text == "Setup"))
        .expect("Setup heading should be listed");

    assert!(switcher.choose_suggestion(&vault, setup, ChooseModifiers::default()));
    assert_eq!(
        vault.navigation_log(),
        vec![NavigationEvent::ActivateLeaf {
            leaf: leaf.id,
            state: Some(NavigationState {
                cursor: Some(Position::new(2, 0)),
                subpath: None,
            }),
        }]
    );
    assert!(!switcher.state().is_open());
}

#[test]
fn navigation_failures_are_swallowed() {
    let (mut vault, leaf) = fixture(0);
    vault.set_fail_navigation(true);
    let mut switcher = Switcher::with_default_matcher(Settings::default()).unwrap();

    let suggestions = symbols(&mut switcher, &vault, "@", &leaf);
    assert!(switcher.choose_suggestion(&vault, &suggestions[0], ChooseModifiers::default()));
    assert!(vault.navigation_log().is_empty());
}

#[test]
fn excluded_link_sub_types_are_omitted() {
    let mut vault = MemoryVault::default();
    let links = vault.add_note(
        "Links.md",
        "See [[Tools#Install]]\nPinned [[Tools#^abc123]]\nPlain [[Tools]]\n",
    );
    vault.add_note("Tools.md", "# Tools\n## Install\n");
    let leaf = Leaf::markdown(1, links);
    vault.open_leaf(leaf.clone());

    let mut settings = Settings::default();
    settings.exclude_link_sub_types.insert(LinkSubType::Block);
    let mut switcher = Switcher::with_default_matcher(settings).unwrap();

    let texts: Vec<String> = outline(&symbols(&mut switcher, &vault, "@", &leaf))
        .into_iter()
        .map(|(text, _)| text)
        .collect();
    assert_eq!(texts, vec!["Tools#Install", "Tools"]);

    let mut switcher = Switcher::with_default_matcher(Settings::default()).unwrap();
    assert_eq!(symbols(&mut switcher, &vault, "@", &leaf).len(), 3);
}
