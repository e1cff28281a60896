use std::path::PathBuf;
use std::time::Instant;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::{self, ConfigError, Settings};
use crate::contract::{QueryResponse, SuggestionDto};
use crate::discovery::{self, DiscoveryError};
use crate::fuzzy::NucleoMatcher;
use crate::host::{FileProvider, Host};
use crate::input_info::InputInfo;
use crate::logging;
use crate::model::{normalize_vault_path, Leaf};
use crate::search::{SearchResult, Searcher};
use crate::suggestion::{Suggestion, SuggestionKind};
use crate::switcher::{Switcher, SwitcherError, UpdateOutcome};
use crate::vault::MemoryVault;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{0}")]
    Usage(String),
    #[error("discovery error: {0}")]
    Discovery(#[from] DiscoveryError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("switcher error: {0}")]
    Switcher(#[from] SwitcherError),
    #[error("log setup failed: {0}")]
    Logging(std::io::Error),
    #[error("failed to encode response: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuntimeOptions {
    pub vault_root: PathBuf,
    pub config_path: Option<PathBuf>,
    pub open_paths: Vec<String>,
    pub active_path: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub json: bool,
    pub queries: Vec<String>,
}

pub const USAGE: &str = "usage: quickswitch-core --vault DIR [--config FILE] [--open PATH]... \
[--active PATH] [--log-dir DIR] [--json] QUERY...";

fn flag_value(args: &[String], index: usize, flag: &str) -> Result<String, String> {
    args.get(index + 1)
        .cloned()
        .ok_or_else(|| format!("{flag} requires a value\n{USAGE}"))
}

pub fn parse_cli_args(args: &[String]) -> Result<RuntimeOptions, String> {
    let mut options = RuntimeOptions::default();
    let mut vault_root = None;
    let mut index = 0;

    while index < args.len() {
        let arg = args[index].as_str();
        match arg {
            "--vault" => {
                vault_root = Some(PathBuf::from(flag_value(args, index, arg)?));
                index += 2;
            }
            "--config" => {
                options.config_path = Some(PathBuf::from(flag_value(args, index, arg)?));
                index += 2;
            }
            "--open" => {
                options.open_paths.push(flag_value(args, index, arg)?);
                index += 2;
            }
            "--active" => {
                options.active_path = Some(flag_value(args, index, arg)?);
                index += 2;
            }
            "--log-dir" => {
                options.log_dir = Some(PathBuf::from(flag_value(args, index, arg)?));
                index += 2;
            }
            "--json" => {
                options.json = true;
                index += 1;
            }
            "--" => {
                options.queries.extend(args[index + 1..].iter().cloned());
                break;
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown flag '{other}'\n{USAGE}"));
            }
            _ => {
                options.queries.push(args[index].clone());
                index += 1;
            }
        }
    }

    options.vault_root = vault_root.ok_or_else(|| format!("--vault is required\n{USAGE}"))?;
    if options.queries.is_empty() {
        return Err(format!("at least one query is required\n{USAGE}"));
    }
    Ok(options)
}

fn open_panes(vault: &mut MemoryVault, options: &RuntimeOptions) -> Result<(), RuntimeError> {
    let mut next_id = 1;
    let mut paths = options.open_paths.clone();
    if let Some(active) = &options.active_path {
        if !paths.contains(active) {
            paths.push(active.clone());
        }
    }

    for raw in &paths {
        let path = normalize_vault_path(raw);
        let Some(file) = vault.file_by_path(&path) else {
            return Err(RuntimeError::Usage(format!("no such file in vault: {path}")));
        };
        vault.open_leaf(Leaf::markdown(next_id, file));
        if options.active_path.as_deref() == Some(raw.as_str()) {
            vault.set_active_leaf(Some(crate::model::LeafId(next_id)));
        }
        next_id += 1;
    }
    Ok(())
}

fn load_settings(options: &RuntimeOptions) -> Result<Settings, RuntimeError> {
    match &options.config_path {
        Some(path) => Ok(config::load(path)?),
        None => Ok(Settings::default()),
    }
}

fn standard_suggestions(host: &dyn Host, input: &InputInfo) -> Vec<Suggestion> {
    let matcher = NucleoMatcher::default();
    let searcher = Searcher::new(&matcher, &input.search_query.query);
    host.files()
        .into_iter()
        .filter_map(|file| {
            let search = if searcher.has_search_term() {
                let result = searcher.search_with_fallback(None, Some(&file));
                if !result.is_match() {
                    return None;
                }
                result
            } else {
                SearchResult::none()
            };
            Some(Suggestion::new(SuggestionKind::File, Some(file), search))
        })
        .collect()
}

fn run_query(switcher: &mut Switcher, host: &dyn Host, query: &str) -> (InputInfo, Vec<Suggestion>) {
    let active_leaf = host.active_leaf();
    match switcher.update_suggestions(host, query, None, active_leaf.as_ref(), Instant::now()) {
        UpdateOutcome::Standard(input) => {
            let mut suggestions = standard_suggestions(host, &input);
            switcher.annotate_standard_suggestions(&input, &mut suggestions);
            suggestions.truncate(switcher.settings().limit);
            (input, suggestions)
        }
        UpdateOutcome::Ready {
            token,
            input,
            suggestions,
        } => {
            let suggestions = switcher.commit(&token, suggestions).unwrap_or_default();
            (input, suggestions)
        }
        UpdateOutcome::Deferred { token, due } => {
            let input = switcher.pending_input().cloned();
            let suggestions = switcher
                .poll_debounced(host, due)
                .and_then(|(ready, suggestions)| {
                    (ready == token).then(|| switcher.commit(&ready, suggestions)).flatten()
                })
                .unwrap_or_default();
            (input.unwrap_or_else(|| InputInfo::detached(query)), suggestions)
        }
    }
}

fn print_text(response: &QueryResponse) {
    println!(
        "[quickswitch-core] query='{}' mode={:?} filter='{}' results={}",
        response.input,
        response.mode,
        response.filter,
        response.suggestions.len()
    );
    for row in &response.suggestions {
        let indent = "  ".repeat(row.indent_level);
        let marker = if row.is_selected { "*" } else { " " };
        match &row.note {
            Some(note) => println!("{marker} {indent}{} ({note})", row.title),
            None => println!("{marker} {indent}{}", row.title),
        }
    }
}

pub fn run_with_options(options: RuntimeOptions) -> Result<(), RuntimeError> {
    let log_dir = options.log_dir.clone().unwrap_or_else(logging::default_logs_dir);
    let log_path = logging::init(&log_dir).map_err(RuntimeError::Logging)?;

    let settings = load_settings(&options)?;
    let mut vault = discovery::load_vault(&options.vault_root)?;
    open_panes(&mut vault, &options)?;
    info!(
        vault = %options.vault_root.display(),
        log = %log_path.display(),
        queries = options.queries.len(),
        "runtime started"
    );

    let mut switcher = Switcher::with_default_matcher(settings)?;
    switcher.open_session(&vault);

    for query in &options.queries {
        let (input, suggestions) = run_query(&mut switcher, &vault, query);
        let rows = suggestions
            .iter()
            .filter_map(|suggestion| {
                let rendered = switcher.render_suggestion(&vault, suggestion);
                if rendered.is_none() {
                    warn!(query = %query, "suggestion had no renderer");
                }
                rendered.map(|rendered| SuggestionDto::new(suggestion, rendered))
            })
            .collect();
        let response = QueryResponse::new(&input, rows);

        if options.json {
            println!("{}", serde_json::to_string(&response)?);
        } else {
            print_text(&response);
        }
    }

    switcher.close_session();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_cli_args, run_with_options, RuntimeError, RuntimeOptions};
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_vault(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_nanos();
        let root = std::env::temp_dir().join(format!("quickswitch-runtime-{name}-{nanos}"));
        std::fs::create_dir_all(root.join("notes")).unwrap();
        std::fs::write(root.join("notes").join("Plan.md"), "# Plan\n## Goals\n").unwrap();
        root
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn parses_full_command_line() {
        let options = parse_cli_args(&args(&[
            "--vault", "/notes", "--open", "a.md", "--open", "b.md", "--active", "b.md", "--json",
            "#head", "@sym",
        ]))
        .expect("arguments should parse");

        assert_eq!(
            options,
            RuntimeOptions {
                vault_root: PathBuf::from("/notes"),
                config_path: None,
                open_paths: vec!["a.md".into(), "b.md".into()],
                active_path: Some("b.md".into()),
                log_dir: None,
                json: true,
                queries: vec!["#head".into(), "@sym".into()],
            }
        );
    }

    #[test]
    fn double_dash_keeps_flag_like_queries() {
        let options = parse_cli_args(&args(&["--vault", "/notes", "--", "--json"])).unwrap();
        assert_eq!(options.queries, vec!["--json".to_string()]);
        assert!(!options.json);
    }

    #[test]
    fn rejects_missing_vault_and_queries() {
        assert!(parse_cli_args(&args(&["query"])).unwrap_err().contains("--vault"));
        assert!(parse_cli_args(&args(&["--vault", "/notes"]))
            .unwrap_err()
            .contains("query"));
        assert!(parse_cli_args(&args(&["--vault"])).unwrap_err().contains("requires a value"));
        assert!(parse_cli_args(&args(&["--vault", "/n", "--bogus", "q"]))
            .unwrap_err()
            .contains("unknown flag"));
    }

    #[test]
    fn runs_every_query_against_a_vault_on_disk() {
        let root = temp_vault("run");
        let options = RuntimeOptions {
            vault_root: root.clone(),
            open_paths: vec!["notes/Plan.md".into()],
            active_path: Some("notes/Plan.md".into()),
            log_dir: Some(root.join(".logs")),
            json: true,
            queries: vec!["plan".into(), "#goal".into(), "@".into()],
            ..RuntimeOptions::default()
        };
        run_with_options(options).expect("queries should run");
        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn unknown_pane_path_is_a_usage_error() {
        let root = temp_vault("pane");
        let options = RuntimeOptions {
            vault_root: root.clone(),
            open_paths: vec!["nope.md".into()],
            log_dir: Some(root.join(".logs")),
            queries: vec!["x".into()],
            ..RuntimeOptions::default()
        };
        assert!(matches!(run_with_options(options), Err(RuntimeError::Usage(_))));
        let _ = std::fs::remove_dir_all(root);
    }
}
