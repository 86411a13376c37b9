//! # normalize: turning requirements (and optionally a model completion) into test cases
//!
//! Whatever happens upstream, [`normalize`] returns a [`TestCaseSet`] holding between one
//! and [`MAX_TEST_CASES`] cases numbered `TC1..TCn`:
//!
//! 1. With [`CompletionPolicy::ModelFirst`], a completion that parses as a JSON array of
//!    well-formed cases is used as-is (capped and renumbered).
//! 2. Otherwise each of the first ten requirement sentences becomes one case.
//! 3. With no requirement sentences at all, a single generic case is returned.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::CompletionPolicy;
use crate::contract::{TestCaseSet, MAX_TEST_CASES};

pub const FALLBACK_DESCRIPTION: &str = "Verify basic functionality of the system based on SRS.";
pub const FALLBACK_EXPECTED_RESULT: &str = "System behaves as described in SRS.";

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("static code fence pattern"));

/// Shape of one case as emitted by the model. Its `id` is ignored; cases are renumbered.
#[derive(Debug, Deserialize)]
struct CompletionCase {
    description: String,
    expected_result: String,
}

pub fn normalize(
    requirements: &[String],
    completion: Option<&str>,
    policy: CompletionPolicy,
) -> TestCaseSet {
    if policy == CompletionPolicy::ModelFirst {
        match completion.map(parse_completion) {
            Some(Some(set)) => {
                info!(count = set.len(), "[NORMALIZE] Using test cases parsed from model completion");
                return set;
            }
            Some(None) => {
                warn!("[NORMALIZE] Model completion did not match the expected shape; deriving from requirements")
            }
            None => debug!("[NORMALIZE] No model completion available; deriving from requirements"),
        }
    }

    match derive_from_requirements(requirements) {
        Some(set) => {
            info!(count = set.len(), "[NORMALIZE] Derived test cases from requirement sentences");
            set
        }
        None => {
            info!("[NORMALIZE] No requirement sentences; returning generic fallback case");
            fallback_set()
        }
    }
}

/// One case per requirement sentence, for the first [`MAX_TEST_CASES`] sentences.
pub fn derive_from_requirements(requirements: &[String]) -> Option<TestCaseSet> {
    TestCaseSet::numbered(requirements.iter().map(|sentence| {
        (
            format!("Verify that {sentence}"),
            format!("{sentence} succeeds as specified."),
        )
    }))
}

/// The single generic case used when nothing else is available.
pub fn fallback_set() -> TestCaseSet {
    TestCaseSet::single(FALLBACK_DESCRIPTION, FALLBACK_EXPECTED_RESULT)
}

/// Best-effort parse of a model completion into test cases.
///
/// Accepts a bare JSON array or one wrapped in a Markdown code fence, optionally
/// surrounded by prose. Each `[` before the last `]` is tried as the array start, so
/// bracketed prose ahead of the array is skipped. Returns `None` when no array parses,
/// it is empty, or one of its first [`MAX_TEST_CASES`] cases has a blank description or
/// expected result.
pub fn parse_completion(completion: &str) -> Option<TestCaseSet> {
    let body = CODE_FENCE
        .captures(completion)
        .and_then(|c| c.get(1))
        .map_or(completion, |m| m.as_str());
    let end = body.rfind(']')?;

    let cases = body[..end]
        .match_indices('[')
        .find_map(|(start, _)| serde_json::from_str::<Vec<CompletionCase>>(&body[start..=end]).ok());
    let Some(cases) = cases else {
        debug!("[NORMALIZE] Completion holds no JSON array of test cases");
        return None;
    };

    let cases: Vec<CompletionCase> = cases.into_iter().take(MAX_TEST_CASES).collect();
    if cases
        .iter()
        .any(|c| c.description.trim().is_empty() || c.expected_result.trim().is_empty())
    {
        return None;
    }

    TestCaseSet::numbered(cases.into_iter().map(|c| {
        (
            c.description.trim().to_owned(),
            c.expected_result.trim().to_owned(),
        )
    }))
}
