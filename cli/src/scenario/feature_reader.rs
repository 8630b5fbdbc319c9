use super::feature::{unescape_cell, Row, ScenarioKey, BODY_PREFIX, HEADER_PREFIX, MATCH_STEP};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHEN_LINE: Regex =
        Regex::new(r#"^When (?:User ".*" send|I send) a (\S+) request to "(.*)" with$"#).unwrap();
}

#[derive(Default)]
struct BlockReader {
    method: Option<String>,
    path: String,
    headers: Vec<Row>,
    body: Vec<Row>,
    assertions: Vec<Row>,
    in_expectations: bool,
}

impl BlockReader {
    fn push_row(&mut self, row: Row) {
        if self.in_expectations {
            self.assertions.push(row);
        } else if row.0.starts_with(HEADER_PREFIX) {
            self.headers.push(row);
        } else if row.0.starts_with(BODY_PREFIX) {
            self.body.push(row);
        }
    }

    fn finish(self) -> Option<ScenarioKey> {
        let method = self.method?;
        Some(ScenarioKey::new(
            &method,
            &self.path,
            &self.headers,
            &self.body,
            &self.assertions,
        ))
    }
}

/// Keys of every scenario block in a feature document. Blocks without a
/// recognisable request step are ignored.
pub fn existing_keys(content: &str) -> Vec<ScenarioKey> {
    let mut keys = Vec::new();
    let mut current: Option<BlockReader> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with("Scenario:") {
            if let Some(key) = current.take().and_then(BlockReader::finish) {
                keys.push(key);
            }
            current = Some(BlockReader::default());
            continue;
        }
        let Some(block) = current.as_mut() else {
            continue;
        };

        if let Some(caps) = WHEN_LINE.captures(line) {
            block.method = Some(caps[1].to_string());
            block.path = caps[2].to_string();
        } else if line == MATCH_STEP {
            block.in_expectations = true;
        } else if line.starts_with('|') {
            if let Some(row) = split_row(line) {
                block.push_row(row);
            }
        }
    }

    if let Some(key) = current.and_then(BlockReader::finish) {
        keys.push(key);
    }
    keys
}

/// Splits `| key | value |` on unescaped pipes. Escapes are kept until each
/// cell has been trimmed.
fn split_row(line: &str) -> Option<Row> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = line.strip_prefix('|')?.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                cell.push('\\');
                if let Some(next) = chars.next() {
                    cell.push(next);
                }
            }
            '|' => cells.push(unescape_cell(std::mem::take(&mut cell).trim())),
            other => cell.push(other),
        }
    }

    let mut cells = cells.into_iter();
    let key = cells.next()?;
    let value = cells.next().unwrap_or_default();
    Some((key, value))
}
