use std::fs;

use crate::analysis::AnalysisAction;
use crate::session::{
    ANALYSIS_FAILED_NOTICE, AnalysisSession, RequestStatus, load_failure_notice,
    load_success_notice,
};

fn session_with_input(text: &str) -> AnalysisSession {
    let mut session = AnalysisSession::new();
    session.set_input(text);
    session
}

#[test]
fn streamed_chunks_append_in_delivery_order() {
    let mut session = session_with_input("int main() { return 0; }");
    let generation = session.submit(AnalysisAction::ExplainLogic).unwrap();
    for chunk in ["The ", "function ", "returns ", "0."] {
        assert!(session.on_chunk(generation, chunk));
    }
    session.on_complete(generation);
    assert_eq!(session.result(), "The function returns 0.");
    assert_eq!(session.status(), RequestStatus::Completed);
}

#[test]
fn chunks_keep_embedded_separators_verbatim() {
    let mut session = session_with_input("x");
    let generation = session.submit(AnalysisAction::TranslateToPython).unwrap();
    assert!(session.on_chunk(generation, "std::vector<int> v;\n"));
    assert!(session.on_chunk(generation, "v.push_back(1);"));
    assert_eq!(session.result(), "std::vector<int> v;\nv.push_back(1);");
}

#[test]
fn submit_with_whitespace_input_is_a_noop() {
    let mut session = session_with_input("  \n\t ");
    assert!(session.submit(AnalysisAction::ExplainLogic).is_none());
    assert_eq!(session.status(), RequestStatus::Idle);
    assert_eq!(session.result(), "");
    // The rejected submit must not have advanced the generation counter.
    session.set_input("int x;");
    assert_eq!(session.submit(AnalysisAction::ExplainLogic), Some(1));
}

#[test]
fn submit_while_running_is_a_noop() {
    let mut session = session_with_input("void f(void);");
    let first = session.submit(AnalysisAction::ExplainLogic).unwrap();
    assert!(session.submit(AnalysisAction::SuggestRefactoring).is_none());
    assert_eq!(
        session.status(),
        RequestStatus::Running(AnalysisAction::ExplainLogic)
    );
    // The first request is still live and keeps appending.
    assert!(session.on_chunk(first, "still mine"));
    assert_eq!(session.result(), "still mine");
}

#[test]
fn new_request_clears_previous_result() {
    let mut session = session_with_input("void f(void);");
    let first = session.submit(AnalysisAction::ExplainLogic).unwrap();
    session.on_chunk(first, "old output");
    session.on_complete(first);
    let second = session.submit(AnalysisAction::SuggestRefactoring).unwrap();
    assert_eq!(session.result(), "");
    assert!(second > first);
}

#[test]
fn stream_failure_replaces_result_with_fixed_notice() {
    let mut session = session_with_input("char buf[8];");
    let generation = session.submit(AnalysisAction::FindVulnerabilities).unwrap();
    session.on_chunk(generation, "partial out");
    session.on_failure(generation);
    assert_eq!(session.result(), ANALYSIS_FAILED_NOTICE);
    assert_eq!(session.status(), RequestStatus::Failed);
}

#[test]
fn load_file_installs_contents_and_notice() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("main.c");
    fs::write(&path, "int main(){}").unwrap();

    let mut session = AnalysisSession::new();
    assert!(session.load_file(&path));
    assert_eq!(session.input(), "int main(){}");
    assert!(session.result().contains("main.c"));
    assert_eq!(session.result(), load_success_notice("main.c"));
}

#[test]
fn load_file_twice_in_a_row_behaves_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dump.cpp");
    fs::write(&path, "struct S {};").unwrap();

    let mut session = AnalysisSession::new();
    assert!(session.load_file(&path));
    let first_result = session.result().to_string();
    assert!(session.load_file(&path));
    assert_eq!(session.result(), first_result);
    assert_eq!(session.input(), "struct S {};");
}

#[test]
fn load_failure_posts_failure_notice_and_keeps_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gone.c");

    let mut session = session_with_input("previous input");
    assert!(!session.load_file(&path));
    assert_eq!(session.input(), "previous input");
    assert_eq!(session.result(), load_failure_notice("gone.c"));
}

#[test]
fn reset_clears_everything_from_any_status() {
    let mut scenarios: Vec<AnalysisSession> = Vec::new();

    scenarios.push(session_with_input("idle"));

    let mut running = session_with_input("running");
    running.submit(AnalysisAction::ExplainLogic).unwrap();
    scenarios.push(running);

    let mut completed = session_with_input("completed");
    let generation = completed.submit(AnalysisAction::ExplainLogic).unwrap();
    completed.on_chunk(generation, "done output");
    completed.on_complete(generation);
    scenarios.push(completed);

    let mut failed = session_with_input("failed");
    let generation = failed.submit(AnalysisAction::ExplainLogic).unwrap();
    failed.on_failure(generation);
    scenarios.push(failed);

    let mut cancelled = session_with_input("cancelled");
    cancelled.submit(AnalysisAction::ExplainLogic).unwrap();
    cancelled.cancel();
    scenarios.push(cancelled);

    for mut session in scenarios {
        session.reset();
        assert_eq!(session.input(), "");
        assert_eq!(session.result(), "");
        assert_eq!(session.status(), RequestStatus::Idle);
    }
}

#[test]
fn chunks_after_reset_are_dropped() {
    let mut session = session_with_input("void g(void);");
    let generation = session.submit(AnalysisAction::ExplainLogic).unwrap();
    assert!(session.on_chunk(generation, "live"));
    session.reset();
    assert!(!session.on_chunk(generation, "stale"));
    assert_eq!(session.result(), "");
    assert_eq!(session.status(), RequestStatus::Idle);
}

#[test]
fn chunks_after_completion_are_dropped() {
    let mut session = session_with_input("void g(void);");
    let generation = session.submit(AnalysisAction::ExplainLogic).unwrap();
    session.on_chunk(generation, "output");
    session.on_complete(generation);
    assert!(!session.on_chunk(generation, " tail"));
    assert_eq!(session.result(), "output");
}

#[test]
fn stale_terminal_events_do_not_disturb_a_newer_request() {
    let mut session = session_with_input("int x;");
    let first = session.submit(AnalysisAction::ExplainLogic).unwrap();
    session.cancel();
    let second = session.submit(AnalysisAction::SuggestRefactoring).unwrap();

    // The abandoned stream reports in late; none of it may land.
    session.on_failure(first);
    assert_eq!(
        session.status(),
        RequestStatus::Running(AnalysisAction::SuggestRefactoring)
    );
    session.on_complete(first);
    assert!(session.status().is_running());

    assert!(session.on_chunk(second, "fresh"));
    assert_eq!(session.result(), "fresh");
}

#[test]
fn cancel_keeps_buffers_and_unblocks_submission() {
    let mut session = session_with_input("long f;");
    let generation = session.submit(AnalysisAction::ExplainLogic).unwrap();
    session.on_chunk(generation, "partial");
    assert!(session.cancel());
    assert_eq!(session.status(), RequestStatus::Cancelled);
    assert_eq!(session.result(), "partial");
    assert_eq!(session.input(), "long f;");

    let next = session.submit(AnalysisAction::TranslateToPython).unwrap();
    assert!(next > generation);
}

#[test]
fn cancel_outside_running_is_a_noop() {
    let mut session = session_with_input("int x;");
    assert!(!session.cancel());
    assert_eq!(session.status(), RequestStatus::Idle);
}

#[test]
fn notices_quote_the_file_name() {
    assert_eq!(
        load_success_notice("dump.c"),
        "// SUCCESS: LOADED FILE \"dump.c\""
    );
    assert_eq!(
        load_failure_notice("dump.c"),
        "// ERROR: FAILED TO READ FILE \"dump.c\""
    );
}
