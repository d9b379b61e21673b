use super::*;

fn yes_no() -> Vec<String> {
    vec!["yes".to_string(), "no".to_string()]
}

#[test]
fn prompt_errors_on_empty_choice_list_without_reading() {
    let console = ScriptedConsole::with_input(&["1"]);
    let err = prompt_for_confirmation(&console, "proceed?", &[])
        .expect_err("empty choices must be rejected");
    assert!(matches!(err, PromptError::InvalidArgument(_)));
    assert!(err.to_string().contains("No choices passed in."));
    assert_eq!(console.read_count(), 0);
}

#[test]
fn prompt_errors_on_blank_prompt_without_reading() {
    let console = ScriptedConsole::with_input(&["1"]);
    let err = prompt_for_confirmation(&console, "   ", &yes_no())
        .expect_err("blank prompt must be rejected");
    assert!(matches!(err, PromptError::InvalidArgument(_)));
    assert_eq!(console.read_count(), 0);
}

#[test]
fn prompt_returns_first_choice_for_one() {
    let console = ScriptedConsole::with_input(&["1"]);
    let choice =
        prompt_for_confirmation(&console, "proceed?", &yes_no()).expect("must select");
    assert_eq!(choice, "yes");
    assert_eq!(console.read_count(), 1);
}

#[test]
fn prompt_returns_second_choice_for_two() {
    let console = ScriptedConsole::with_input(&["2"]);
    let choice =
        prompt_for_confirmation(&console, "proceed?", &yes_no()).expect("must select");
    assert_eq!(choice, "no");
}

#[test]
fn prompt_tolerates_surrounding_whitespace() {
    let console = ScriptedConsole::with_input(&["  2  "]);
    let choice =
        prompt_for_confirmation(&console, "proceed?", &yes_no()).expect("must select");
    assert_eq!(choice, "no");
}

#[test]
fn prompt_recovers_after_a_single_typo() {
    let console = ScriptedConsole::with_input(&["yess", "1"]);
    let choice =
        prompt_for_confirmation(&console, "proceed?", &yes_no()).expect("must select");
    assert_eq!(choice, "yes");
    assert_eq!(console.read_count(), 2);
}

#[test]
fn prompt_fails_after_ceiling_of_blank_answers() {
    let console = ScriptedConsole::with_input(&[]);
    let err = prompt_for_confirmation(&console, "proceed?", &yes_no())
        .expect_err("blank input must exhaust the ceiling");
    assert!(matches!(
        err,
        PromptError::InvalidInput {
            attempts: MAX_PROMPT_ATTEMPTS
        }
    ));
    assert_eq!(console.read_count(), MAX_PROMPT_ATTEMPTS);
}

#[test]
fn prompt_fails_after_ceiling_of_out_of_range_answers() {
    let inputs = vec!["3"; MAX_PROMPT_ATTEMPTS as usize + 2];
    let console = ScriptedConsole::with_input(&inputs);
    let err = prompt_for_confirmation(&console, "proceed?", &yes_no())
        .expect_err("out-of-range input must exhaust the ceiling");
    assert!(matches!(err, PromptError::InvalidInput { .. }));
    assert_eq!(console.read_count(), MAX_PROMPT_ATTEMPTS);
}

#[test]
fn prompt_rejects_zero_and_negative_selections() {
    let console = ScriptedConsole::with_input(&["0", "-1", "2"]);
    let choice =
        prompt_for_confirmation(&console, "proceed?", &yes_no()).expect("must select");
    assert_eq!(choice, "no");
    assert_eq!(console.read_count(), 3);
}

#[test]
fn prompt_renders_numbered_choices() {
    let console = ScriptedConsole::with_input(&["1"]);
    prompt_for_confirmation(&console, "proceed with upgrade?", &yes_no())
        .expect("must select");
    let written = console.written().join("");
    assert!(written.contains("proceed with upgrade?"));
    assert!(written.contains(" 1) yes"));
    assert!(written.contains(" 2) no"));
}

#[test]
fn prompt_notice_names_the_rejected_input_on_the_error_stream() {
    let console = ScriptedConsole::with_input(&["nope", "1"]);
    prompt_for_confirmation(&console, "proceed?", &yes_no()).expect("must select");
    let errors = console.error_lines().join("");
    assert!(errors.contains("'nope' is not a valid selection"));
    assert!(!console.written().join("").contains("not a valid selection"));
}

#[test]
fn prompt_accepts_valid_selection_without_error_output() {
    let console = ScriptedConsole::with_input(&["1"]);
    prompt_for_confirmation(&console, "proceed?", &yes_no()).expect("must select");
    assert!(console.error_lines().is_empty());
}

#[test]
fn scripted_console_reports_empty_after_input_is_consumed() {
    let console = ScriptedConsole::with_input(&["only"]);
    assert_eq!(console.read_line().expect("must read"), "only");
    assert_eq!(console.read_line().expect("must read"), "");
    assert_eq!(console.read_count(), 2);
}
