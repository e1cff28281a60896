pub mod config;
pub mod contract;
pub mod debounce;
pub mod discovery;
pub mod facets;
pub mod fuzzy;
pub mod handlers;
pub mod host;
pub mod input_info;
pub mod logging;
pub mod metadata;
pub mod mode_handler;
pub mod model;
pub mod runtime;
pub mod search;
pub mod session;
pub mod settings;
pub mod suggestion;
pub mod switcher;
pub mod vault;
