use crate::contract::MAX_TEST_CASES;

/// Text handed to the model: the filtered sentences joined back into prose, or the whole
/// document when no sentence qualified.
pub fn prompt_basis(requirements: &[String], full_text: &str) -> String {
    if requirements.is_empty() {
        full_text.to_owned()
    } else {
        requirements.join(". ")
    }
}

/// Renders the synthesis instruction around `requirements`.
pub fn build_prompt(requirements: &str) -> String {
    format!(
        r#"
You are a test case generation expert. Given the following Software Requirements Specification (SRS) text, generate detailed test cases. Each test case should include:
- Test Case ID (e.g., TC1, TC2)
- Description: What the test verifies
- Expected Result: The expected outcome

SRS Text:
{requirements}

Generate up to {MAX_TEST_CASES} test cases based on the functional requirements in the SRS. Use clear, concise language. If the input is too long, prioritize key functional requirements (e.g., sentences with 'shall' or 'must'). Return test cases in JSON format:
[
  {{"id": "TC1", "description": "...", "expected_result": "..."}},
  ...
]
"#
    )
}
