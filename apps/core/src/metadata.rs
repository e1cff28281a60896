//! Positions are zero-based line numbers into the whole file (frontmatter included)
//! with byte columns.

use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::Value;
use tracing::debug;

use crate::model::{FileCache, FrontMatter, HeadingCache, LinkCache, Position, SectionCache, Span, TagCache};

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})[ \t]+(.+?)[ \t]*#*[ \t]*$").expect("invalid regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[\s(,])#([\p{L}\p{N}_/-]*[\p{L}_/-][\p{L}\p{N}_/-]*)").expect("invalid regex")
});
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(!?)\[\[([^\[\]|]+?)(?:\|([^\[\]]+))?\]\]").expect("invalid regex")
});

pub fn parse(content: &str) -> FileCache {
    let mut cache = FileCache::default();
    let lines: Vec<&str> = content.lines().collect();

    let body_start = match split_frontmatter(&lines) {
        Some((yaml, body_start)) => {
            cache.frontmatter = parse_frontmatter(&yaml);
            body_start
        }
        None => 0,
    };

    let mut in_fence = false;
    let mut callout: Option<(usize, usize, usize)> = None;

    for (line_no, line) in lines.iter().enumerate().skip(body_start) {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        let is_quote = trimmed.starts_with('>');
        match callout {
            Some((start, _, _)) if is_quote && !is_callout_start(trimmed) => {
                callout = Some((start, line_no, line.len()));
            }
            _ => {
                if let Some(section) = callout.take() {
                    cache.sections.push(callout_section(section));
                }
                if is_callout_start(trimmed) {
                    callout = Some((line_no, line_no, line.len()));
                }
            }
        }

        if let Some(caps) = HEADING_RE.captures(line) {
            cache.headings.push(HeadingCache {
                heading: caps[2].to_string(),
                level: caps[1].len() as u8,
                position: Span::line(line_no, 0, line.len()),
            });
            continue;
        }

        for caps in TAG_RE.captures_iter(line) {
            let Some(name) = caps.get(1) else {
                continue;
            };
            let start = name.start() - 1;
            cache.tags.push(TagCache {
                tag: format!("#{}", name.as_str()),
                position: Span::line(line_no, start, name.end()),
            });
        }

        for caps in LINK_RE.captures_iter(line) {
            let (Some(whole), Some(target)) = (caps.get(0), caps.get(2)) else {
                continue;
            };
            let link = LinkCache {
                link: target.as_str().trim().to_string(),
                original: whole.as_str().to_string(),
                display_text: caps.get(3).map(|m| m.as_str().trim().to_string()),
                position: Span::line(line_no, whole.start(), whole.end()),
            };
            if caps.get(1).is_some_and(|bang| !bang.as_str().is_empty()) {
                cache.embeds.push(link);
            } else {
                cache.links.push(link);
            }
        }
    }

    if let Some(section) = callout {
        cache.sections.push(callout_section(section));
    }
    cache
}

fn is_callout_start(trimmed: &str) -> bool {
    trimmed
        .strip_prefix('>')
        .is_some_and(|rest| rest.trim_start().starts_with("[!"))
}

fn callout_section((start, end, end_col): (usize, usize, usize)) -> SectionCache {
    SectionCache {
        kind: "callout".to_string(),
        position: Span {
            start: Position::new(start, 0),
            end: Position::new(end, end_col),
        },
    }
}

fn split_frontmatter(lines: &[&str]) -> Option<(String, usize)> {
    let first = lines.first()?.trim_start_matches('\u{feff}');
    if first.trim_end() != "---" {
        return None;
    }
    let close = lines
        .iter()
        .skip(1)
        .position(|line| line.trim_end() == "---")?
        + 1;
    Some((lines[1..close].join("\n"), close + 1))
}

fn parse_frontmatter(yaml: &str) -> Option<FrontMatter> {
    let value: Value = match serde_yaml::from_str(yaml) {
        Ok(value) => value,
        Err(err) => {
            debug!("ignoring malformed frontmatter: {err}");
            return None;
        }
    };

    let field = |names: &[&str]| -> Vec<String> {
        names
            .iter()
            .find_map(|name| value.get(*name))
            .map(string_list)
            .unwrap_or_default()
    };

    Some(FrontMatter {
        aliases: field(&["aliases", "alias"]),
        tags: field(&["tags", "tag"]),
    })
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(text) => text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Sequence(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}
