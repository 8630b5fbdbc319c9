//! Recovers structured expectations from free-form test scripts.
//!
//! Four independent matchers run in a fixed order over the same script text and
//! all append to one output list. A script construct that none of them
//! recognises is dropped; nothing is inferred beyond what the text states.

use crate::collection::model::Event;
use lazy_static::lazy_static;
use regex::Regex;

pub const STATUS_KEY: &str = "status";
pub const BODY_KEY: &str = "body";
pub const TEXT_KEY: &str = "text";
pub const GROUP_KEY: &str = "GroupName";

lazy_static! {
    static ref HAVE_STATUS: Regex = Regex::new(r"response\.to\.have\.status\(\s*(\d+)\s*\)").unwrap();
    static ref ONE_OF: Regex =
        Regex::new(r"pm\.expect\((.+?)\)\.to\.be\.oneOf\(\[([^\]]+)\]\)").unwrap();
    static ref RESPONSE_VALUE: Regex =
        Regex::new(r"response\.(?:json\(\)|code)(?:\.([\w.]+))?").unwrap();
    static ref EXPECTATION: Regex = Regex::new(r"pm\.expect\((.+?)\)\.to\.(\w+)\((.+?)\)").unwrap();
    static ref JSON_PATH: Regex = Regex::new(r"response\.json\(\)(?:\.([\w.]+))?").unwrap();
    static ref ARRAY_ASSIGNMENT: Regex = Regex::new(r"\b(\w+)\s*=\s*\[([^\]]+)\]").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertionKind {
    Equality,
    Membership,
    Existence,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    pub key: String,
    pub value: String,
    pub kind: AssertionKind,
}

impl Assertion {
    pub fn new(key: impl Into<String>, value: impl Into<String>, kind: AssertionKind) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            kind,
        }
    }
}

pub trait Matcher {
    fn family(&self) -> &'static str;
    fn extract(&self, script: &str, out: &mut Vec<Assertion>);
}

/// `pm.response.to.have.status(200)`. Bare `response.code` comparisons are
/// conditions, not checks, and are left alone.
pub struct StatusMatcher;

impl Matcher for StatusMatcher {
    fn family(&self) -> &'static str {
        "status"
    }

    fn extract(&self, script: &str, out: &mut Vec<Assertion>) {
        for caps in HAVE_STATUS.captures_iter(script) {
            out.push(Assertion::new(STATUS_KEY, &caps[1], AssertionKind::Equality));
        }
    }
}

/// `pm.expect(<expr>).to.be.oneOf([a, b])`.
pub struct MembershipMatcher;

impl Matcher for MembershipMatcher {
    fn family(&self) -> &'static str {
        "one_of"
    }

    fn extract(&self, script: &str, out: &mut Vec<Assertion>) {
        for caps in ONE_OF.captures_iter(script) {
            let actual = caps[1].trim();
            let options: Vec<String> = caps[2].split(',').map(strip_quotes).collect();

            let key = match RESPONSE_VALUE.captures(actual) {
                Some(path) => match path.get(1) {
                    Some(sub_path) => sub_path.as_str().to_string(),
                    None if actual.contains("code") => STATUS_KEY.to_string(),
                    None => BODY_KEY.to_string(),
                },
                None => BODY_KEY.to_string(),
            };
            out.push(Assertion::new(
                key,
                options.join(","),
                AssertionKind::Membership,
            ));
        }
    }
}

/// `pm.expect(<expr>).to.<method>(<arg>)` for any single-call expectation.
pub struct ExpectationMatcher;

impl Matcher for ExpectationMatcher {
    fn family(&self) -> &'static str {
        "expect"
    }

    fn extract(&self, script: &str, out: &mut Vec<Assertion>) {
        for caps in EXPECTATION.captures_iter(script) {
            let actual = caps[1].trim();
            let method = &caps[2];
            let expected = strip_quotes(&caps[3]);

            let key = if actual.contains("response.json()") {
                JSON_PATH
                    .captures(actual)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| BODY_KEY.to_string())
            } else if actual.contains("response.code") {
                STATUS_KEY.to_string()
            } else if actual.contains("response.text()") {
                TEXT_KEY.to_string()
            } else {
                BODY_KEY.to_string()
            };

            let kind = match method {
                "equal" | "eql" | "eq" | "equals" => AssertionKind::Equality,
                _ => AssertionKind::Membership,
            };
            out.push(Assertion::new(key, expected, kind));
        }
    }
}

/// `const names = ['a', 'b']; ... names.forEach(...)`: every element must be
/// present somewhere in the response.
pub struct GroupedArrayMatcher;

impl Matcher for GroupedArrayMatcher {
    fn family(&self) -> &'static str {
        "grouped_array"
    }

    fn extract(&self, script: &str, out: &mut Vec<Assertion>) {
        let mut pos = 0;
        while let Some(caps) = ARRAY_ASSIGNMENT.captures_at(script, pos) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                break;
            };

            match find_iteration(script, whole.end(), name.as_str()) {
                Some(iteration_end) => {
                    for element in caps[2].split(',').map(strip_quotes) {
                        if !element.is_empty() {
                            out.push(Assertion::new(GROUP_KEY, element, AssertionKind::Existence));
                        }
                    }
                    pos = iteration_end;
                }
                None => pos = name.end(),
            }
        }
    }
}

/// End offset of the first `name.forEach` / `of name` that starts at least one
/// character after `from`.
fn find_iteration(script: &str, from: usize, name: &str) -> Option<usize> {
    let first = script[from..].chars().next()?;
    let escaped = regex::escape(name);
    let pattern = format!(r"\b{escaped}\s*\.\s*forEach\b|\bof\s+{escaped}\b");
    let re = Regex::new(&pattern).ok()?;
    re.find_at(script, from + first.len_utf8()).map(|m| m.end())
}

fn strip_quotes(raw: &str) -> String {
    raw.trim().replace(['\'', '"', '`'], "")
}

pub fn matchers() -> Vec<Box<dyn Matcher>> {
    vec![
        Box::new(StatusMatcher),
        Box::new(MembershipMatcher),
        Box::new(ExpectationMatcher),
        Box::new(GroupedArrayMatcher),
    ]
}

pub fn extract_from_script(script: &str) -> Vec<Assertion> {
    let mut assertions = Vec::new();
    for matcher in matchers() {
        let before = assertions.len();
        matcher.extract(script, &mut assertions);
        if assertions.len() > before {
            tracing::debug!(
                family = matcher.family(),
                found = assertions.len() - before,
                "assertions extracted"
            );
        }
    }
    assertions
}

/// Assertions of every `test` event, in event order.
pub fn extract_assertions(events: &[Event]) -> Vec<Assertion> {
    events
        .iter()
        .filter_map(Event::test_script)
        .flat_map(|script| extract_from_script(&script))
        .collect()
}
