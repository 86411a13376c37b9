use srs_testgen_core::config::CompletionPolicy;
use srs_testgen_core::normalize::{
    normalize, parse_completion, FALLBACK_DESCRIPTION, FALLBACK_EXPECTED_RESULT,
};
use srs_testgen_core::TestCase;

fn sentences(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("The system shall do thing {i}")).collect()
}

#[test]
fn test_normalize_derives_one_case_per_requirement() {
    let reqs = vec![
        "The system shall allow login".to_string(),
        "Users must be able to logout".to_string(),
    ];
    let set = normalize(&reqs, None, CompletionPolicy::Deterministic);
    assert_eq!(
        set.as_slice(),
        &[
            TestCase {
                id: "TC1".into(),
                description: "Verify that The system shall allow login".into(),
                expected_result: "The system shall allow login succeeds as specified.".into(),
            },
            TestCase {
                id: "TC2".into(),
                description: "Verify that Users must be able to logout".into(),
                expected_result: "Users must be able to logout succeeds as specified.".into(),
            },
        ]
    );
}

#[test]
fn test_normalize_counts_and_ids_for_every_length() {
    for n in 1..=25 {
        let set = normalize(&sentences(n), None, CompletionPolicy::Deterministic);
        let expected = n.min(10);
        assert_eq!(set.len(), expected, "length for n={n}");
        for (i, case) in set.as_slice().iter().enumerate() {
            assert_eq!(case.id, format!("TC{}", i + 1));
            assert_eq!(case.description, format!("Verify that The system shall do thing {}", i + 1));
        }
    }
}

#[test]
fn test_normalize_empty_requirements_yields_fallback() {
    let set = normalize(&[], None, CompletionPolicy::Deterministic);
    assert_eq!(set.len(), 1);
    let case = &set.as_slice()[0];
    assert_eq!(case.id, "TC1");
    assert_eq!(case.description, FALLBACK_DESCRIPTION);
    assert_eq!(case.expected_result, FALLBACK_EXPECTED_RESULT);
}

#[test]
fn test_deterministic_policy_ignores_completion() {
    let completion = r#"[{"id": "X", "description": "d", "expected_result": "e"}]"#;
    let set = normalize(&sentences(3), Some(completion), CompletionPolicy::Deterministic);
    assert_eq!(set.len(), 3);
    assert!(set.as_slice()[0].description.starts_with("Verify that"));
}

#[test]
fn test_model_first_uses_fenced_completion_and_renumbers() {
    let completion = "Here you go:\n```json\n[\n  {\"id\": \"A7\", \"description\": \"Login works\", \"expected_result\": \"User is logged in\"},\n  {\"description\": \"Logout works\", \"expected_result\": \"Session ends\"}\n]\n```\n";
    let set = normalize(&sentences(5), Some(completion), CompletionPolicy::ModelFirst);
    let ids: Vec<&str> = set.as_slice().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["TC1", "TC2"]);
    assert_eq!(set.as_slice()[0].description, "Login works");
    assert_eq!(set.as_slice()[1].expected_result, "Session ends");
}

#[test]
fn test_model_first_caps_parsed_cases_at_ten() {
    let items: Vec<String> = (0..14)
        .map(|i| format!(r#"{{"id":"TC{i}","description":"d{i}","expected_result":"e{i}"}}"#))
        .collect();
    let completion = format!("[{}]", items.join(","));
    let set = parse_completion(&completion).expect("valid array parses");
    assert_eq!(set.len(), 10);
    assert_eq!(set.as_slice()[9].id, "TC10");
    assert_eq!(set.as_slice()[9].description, "d9");
}

#[test]
fn test_bracketed_prose_before_array_is_skipped() {
    let completion = "Here are [2] cases, see [notes]:\n[{\"description\": \"Login works\", \"expected_result\": \"User is logged in\"}, {\"description\": \"Logout works\", \"expected_result\": \"Session ends\"}]";
    let set = parse_completion(completion).expect("array after bracketed prose parses");
    assert_eq!(set.len(), 2);
    assert_eq!(set.as_slice()[0].description, "Login works");
    assert_eq!(set.as_slice()[1].id, "TC2");
}

#[test]
fn test_blank_case_beyond_cap_does_not_discard_completion() {
    let mut items: Vec<String> = (0..11)
        .map(|i| format!(r#"{{"description":"d{i}","expected_result":"e{i}"}}"#))
        .collect();
    items.push(r#"{"description":"   ","expected_result":""}"#.to_string());
    let completion = format!("[{}]", items.join(","));

    let set = normalize(&sentences(2), Some(&completion), CompletionPolicy::ModelFirst);
    assert_eq!(set.len(), 10);
    assert_eq!(set.as_slice()[0].description, "d0");
    assert_eq!(set.as_slice()[9].description, "d9");
}

#[test]
fn test_model_first_falls_back_on_unusable_completion() {
    let reqs = sentences(2);
    for completion in [
        "I cannot help with that.",
        "[]",
        r#"[{"description": "only a description"}]"#,
        r#"[{"description": "  ", "expected_result": "x"}]"#,
        "] nonsense [",
    ] {
        let set = normalize(&reqs, Some(completion), CompletionPolicy::ModelFirst);
        assert_eq!(set.len(), 2, "completion {completion:?}");
        assert_eq!(set.as_slice()[0].description, "Verify that The system shall do thing 1");
    }

    let set = normalize(&[], Some("garbage"), CompletionPolicy::ModelFirst);
    assert_eq!(set.as_slice()[0].description, FALLBACK_DESCRIPTION);
}

#[test]
fn test_test_case_set_serializes_as_response_body() {
    let set = normalize(&["Users must log in".to_string()], None, CompletionPolicy::Deterministic);
    let json = serde_json::to_value(&set).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "test_cases": [{
                "id": "TC1",
                "description": "Verify that Users must log in",
                "expected_result": "Users must log in succeeds as specified."
            }]
        })
    );
}
