use quickswitch_core::config::Settings;
use quickswitch_core::settings::{validate_exclusion_patterns, validate_for_save, validate_limit, validate_trigger};

#[test]
fn lists_every_unparseable_folder_pattern() {
    let settings = Settings {
        exclude_folders: vec!["^fine/".to_string(), "(".to_string()],
        downrank_folders: vec!["[".to_string()],
        ..Settings::default()
    };

    let message = validate_exclusion_patterns(&settings).unwrap_err();
    assert!(message.starts_with("2 folder patterns could not be parsed:"));
    assert!(message.contains("exclude_folders: '('"));
    assert!(message.contains("downrank_folders: '['"));
    assert!(!message.contains("^fine/"));
    assert_eq!(message.lines().count(), 3);
}

#[test]
fn valid_patterns_pass() {
    let settings = Settings {
        exclude_related_folders: vec!["^daily/".to_string()],
        ..Settings::default()
    };
    assert!(validate_exclusion_patterns(&settings).is_ok());
}

#[test]
fn validates_limit_and_triggers() {
    assert!(validate_limit(1).is_ok());
    assert!(validate_limit(0).is_err());
    assert!(validate_trigger("@").is_ok());
    assert!(validate_trigger("").is_err());
    assert!(validate_trigger("  ").is_err());
}

#[test]
fn save_validation_names_the_offending_mode() {
    let settings = Settings {
        bookmarks_list_command: " ".to_string(),
        ..Settings::default()
    };
    let message = validate_for_save(&settings).unwrap_err();
    assert!(message.starts_with("BookmarksList:"));

    let shared = Settings {
        vault_list_command: "@".to_string(),
        ..Settings::default()
    };
    assert!(validate_for_save(&shared).unwrap_err().contains("shared"));
    assert!(validate_for_save(&Settings::default()).is_ok());
}
