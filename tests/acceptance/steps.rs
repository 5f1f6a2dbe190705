use crate::GhmmWorld;
use cucumber::gherkin::Step;
use cucumber::{given, then, when};
use ghmm::due_date::DueDate;
use ghmm::error::MilestoneError;
use ghmm::github::fake::repo;
use ghmm::github::milestones::{MilestoneRecord, MilestoneState};
use ghmm::github::repository::RepositoryRef;
use ghmm::output::Output;

fn state(name: &str) -> MilestoneState {
    match name {
        "open" => MilestoneState::Open,
        "closed" => MilestoneState::Closed,
        other => panic!("unknown milestone state {other}"),
    }
}

fn find_milestone(world: &GhmmWorld, number: u64, full_name: &str) -> MilestoneRecord {
    world
        .github
        .find_milestone(full_name, number)
        .unwrap_or_else(|| panic!("no milestone #{number} in {full_name}"))
}

fn captured(bytes: &[u8]) -> String {
    String::from_utf8(bytes.to_vec()).expect("Invalid UTF-8")
}

#[given(regex = r#"^the organization "([^"]+)" has the repositories "([^"]*)" in pages of (\d+)$"#)]
async fn given_organization(world: &mut GhmmWorld, org: String, repos: String, page_size: usize) {
    let repos: Vec<RepositoryRef> = repos
        .split(',')
        .filter(|name| !name.is_empty())
        .map(repo)
        .collect();
    let pages = repos.chunks(page_size).map(<[RepositoryRef]>::to_vec).collect();
    world.github.add_org_pages(&org, pages);
}

#[given(
    regex = r#"^repository "([^"]+)" has (open|closed) milestone "([^"]+)" #(\d+) due "([^"]+)"$"#
)]
async fn given_milestone_with_due_date(
    world: &mut GhmmWorld,
    full_name: String,
    milestone_state: String,
    title: String,
    number: u64,
    due: String,
) {
    let record = MilestoneRecord {
        number,
        title,
        state: state(&milestone_state),
        due: Some(DueDate::parse(&due).expect("valid due date in scenario")),
    };
    world.github.add_milestone(&full_name, record);
}

#[given(regex = r#"^repository "([^"]+)" has (open|closed) milestone "([^"]+)" #(\d+) with no due date$"#)]
async fn given_milestone_without_due_date(
    world: &mut GhmmWorld,
    full_name: String,
    milestone_state: String,
    title: String,
    number: u64,
) {
    let record = MilestoneRecord {
        number,
        title,
        state: state(&milestone_state),
        due: None,
    };
    world.github.add_milestone(&full_name, record);
}

#[given(regex = r#"^milestone #(\d+) in repository "([^"]+)" has open issues "([^"]+)"$"#)]
async fn given_open_issues(world: &mut GhmmWorld, number: u64, full_name: String, issues: String) {
    let issues: Vec<u64> = issues
        .split(',')
        .map(|n| n.trim().parse().expect("issue number"))
        .collect();
    world.github.add_open_issues(&full_name, number, &issues);
}

#[given(regex = r#"^listing milestones fails for repository "([^"]+)"$"#)]
async fn given_unreadable_repository(world: &mut GhmmWorld, full_name: String) {
    world.github.fail_listing(&full_name);
}

#[given(regex = r#"^editing milestones fails for repository "([^"]+)"$"#)]
async fn given_read_only_repository(world: &mut GhmmWorld, full_name: String) {
    world.github.fail_edits(&full_name);
}

#[when(regex = r#"^I run `ghmm ([^`]*)`$"#)]
async fn when_run_ghmm(world: &mut GhmmWorld, command_line: String) {
    let args: Vec<String> = std::iter::once("ghmm")
        .chain(command_line.split_whitespace())
        .map(String::from)
        .collect();
    let cli = ghmm::cli::parser::parse_args(&args)
        .unwrap_or_else(|e| panic!("Failed to parse `{command_line}`: {e}"));

    let mut out: Vec<u8> = Vec::new();
    let mut err: Vec<u8> = Vec::new();
    let result = ghmm::run::execute(
        &world.github,
        &cli.command,
        &mut Output::new(&mut out, &mut err),
    )
    .await;

    world.captured_output = out;
    world.captured_error = err;
    world.result = Some(result);
}

#[then("the output should be:")]
async fn then_output_should_be(world: &mut GhmmWorld, step: &Step) {
    let expected = step
        .docstring
        .as_ref()
        .expect("Expected docstring with output");
    let output = captured(&world.captured_output);
    assert_eq!(
        output.trim_end(),
        expected.trim(),
        "Expected output:\n---\n{}\n---\nbut got:\n---\n{}\n---",
        expected.trim(),
        output.trim_end()
    );
}

#[then("the output should be empty")]
async fn then_output_should_be_empty(world: &mut GhmmWorld) {
    let output = captured(&world.captured_output);
    assert!(
        output.trim().is_empty(),
        "Expected output to be empty, but got:\n---\n{}\n---",
        output
    );
}

#[then("the error stream should be empty")]
async fn then_error_stream_should_be_empty(world: &mut GhmmWorld) {
    let error = captured(&world.captured_error);
    assert!(
        error.trim().is_empty(),
        "Expected error stream to be empty, but got:\n---\n{}\n---",
        error
    );
}

#[then(regex = r#"^the error stream should contain "(.*)"$"#)]
async fn then_error_stream_should_contain(world: &mut GhmmWorld, expected: String) {
    let error = captured(&world.captured_error);
    assert!(
        error.lines().any(|line| line == expected),
        "Expected error stream to contain '{}', but got:\n---\n{}\n---",
        expected,
        error
    );
}

#[then(regex = r#"^the error stream should have (\d+) lines?$"#)]
async fn then_error_stream_line_count(world: &mut GhmmWorld, count: usize) {
    let error = captured(&world.captured_error);
    assert_eq!(
        error.lines().count(),
        count,
        "Unexpected error stream:\n---\n{}\n---",
        error
    );
}

#[then("the command should succeed")]
async fn then_command_should_succeed(world: &mut GhmmWorld) {
    match &world.result {
        Some(Ok(report)) => assert_eq!(report.failures, 0, "Unexpected failures: {report:?}"),
        other => panic!("Command should have succeeded, got {other:?}"),
    }
}

#[then(regex = r#"^the command should finish with (\d+) failures?$"#)]
async fn then_command_partial(world: &mut GhmmWorld, failures: usize) {
    match &world.result {
        Some(Ok(report)) => assert_eq!(report.failures, failures),
        other => panic!("Command should have finished, got {other:?}"),
    }
}

#[then(regex = r#"^the command should fail with an? (argument|lookup|fetch|not implemented) error$"#)]
async fn then_command_should_fail(world: &mut GhmmWorld, kind: String) {
    let error = match &world.result {
        Some(Err(error)) => error,
        other => panic!("Command should have failed, got {other:?}"),
    };
    let matches = match kind.as_str() {
        "argument" => matches!(error, MilestoneError::Argument(_)),
        "lookup" => matches!(error, MilestoneError::Lookup { .. }),
        "fetch" => matches!(error, MilestoneError::Fetch { .. }),
        _ => matches!(error, MilestoneError::NotImplemented(_)),
    };
    assert!(matches, "Expected {kind} error, got {error:?}");
}

#[then(regex = r#"^(\d+) milestone edits? should have been made$"#)]
async fn then_edit_count(world: &mut GhmmWorld, count: usize) {
    assert_eq!(world.github.edit_count(), count);
}

#[then("no request should have been made")]
async fn then_no_request(world: &mut GhmmWorld) {
    let requests = world.github.requests();
    assert!(requests.is_empty(), "Unexpected requests: {requests:?}");
}

#[then(regex = r#"^milestone #(\d+) in repository "([^"]+)" should be (open|closed)$"#)]
async fn then_milestone_state(
    world: &mut GhmmWorld,
    number: u64,
    full_name: String,
    expected: String,
) {
    assert_eq!(find_milestone(world, number, &full_name).state, state(&expected));
}

#[then(regex = r#"^milestone #(\d+) in repository "([^"]+)" should be due "([^"]+)"$"#)]
async fn then_milestone_due(world: &mut GhmmWorld, number: u64, full_name: String, due: String) {
    assert_eq!(
        find_milestone(world, number, &full_name).due,
        Some(DueDate::parse(&due).expect("valid due date in scenario"))
    );
}
