use std::time::Instant;

use quickswitch_core::config::Settings;
use quickswitch_core::contract::{QueryResponse, SuggestionDto};
use quickswitch_core::input_info::Mode;
use quickswitch_core::model::Leaf;
use quickswitch_core::switcher::{Switcher, UpdateOutcome};
use quickswitch_core::vault::MemoryVault;

fn response(text: &str) -> QueryResponse {
    let mut vault = MemoryVault::default();
    let guide = vault.add_note("docs/Guide.md", "# Guide\n## Setup\n");
    let leaf = Leaf::markdown(1, guide);
    vault.open_leaf(leaf.clone());

    let mut switcher = Switcher::with_default_matcher(Settings::default()).unwrap();
    let UpdateOutcome::Ready { input, suggestions, .. } =
        switcher.update_suggestions(&vault, text, None, Some(&leaf), Instant::now())
    else {
        panic!("expected ready suggestions for {text:?}");
    };
    let rows = suggestions
        .iter()
        .filter_map(|s| switcher.render_suggestion(&vault, s).map(|r| SuggestionDto::new(s, r)))
        .collect();
    QueryResponse::new(&input, rows)
}

#[test]
fn symbol_response_carries_source_and_rows() {
    let response = response("@set");
    assert_eq!(response.mode, Mode::SymbolList);
    assert_eq!(response.filter, "set");
    assert_eq!(response.source.as_deref(), Some("docs/Guide.md"));
    assert_eq!(response.suggestions.len(), 1);

    let row = &response.suggestions[0];
    assert_eq!(row.title, "Setup");
    assert_eq!(row.path.as_deref(), Some("docs/Guide.md"));
    assert!(row.score.is_some());
    assert!(!row.title_matches.is_empty());
}

#[test]
fn response_serializes_with_snake_case_tags() {
    let response = response("#guide");
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["mode"], "headings_list");
    assert_eq!(json["suggestions"][0]["kind"], "headings_list");
    assert_eq!(json["suggestions"][0]["match_type"], "primary");
    assert_eq!(json["suggestions"][0]["flairs"][0], "open_in_editor");
    assert_eq!(json["suggestions"][0]["flairs"][1]["heading_level"], 1);

    let decoded: QueryResponse = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, response);
}
