//! End-to-end tests of registration, matching, dispatch and aggregation.

mod common;

use common::{lines, ScriptedProvider};
use std::sync::Arc;
use std::time::{Duration, Instant};
use termfix::domain::models::{
    ExitStatus, OutputMatcher, QuickFix, QuickFixConfig, QuickFixOptions, QuickFixSelector,
    QuickFixType, TerminalCommand,
};
use termfix::services::{register_builtin_providers, CommandSession, QuickFixService};
use tokio_util::sync::CancellationToken;
use url::Url;

fn git_fix_selector() -> QuickFixSelector {
    QuickFixSelector::unresolved(
        QuickFixOptions::new("git-fix", "^git push$", ExitStatus::Error)
            .with_output_matcher(OutputMatcher::new("rejected")),
    )
}

#[tokio::test]
async fn test_git_fix_example() {
    let service = QuickFixService::default();
    service.register_command_selector(git_fix_selector());
    let _handle = service.register_quick_fix_provider(
        "git-fix",
        Arc::new(ScriptedProvider::immediate(vec![QuickFix::command(
            "git-fix",
            "git push --force-with-lease",
        )])),
    );

    let output = lines("To origin\n ! [rejected] main -> main (fetch first)");
    let command = TerminalCommand::from_exit_code("git push", 1);
    let fixes = service
        .evaluate(&command, Some(output.as_slice()), &CancellationToken::new())
        .await;

    assert_eq!(fixes.len(), 1);
    match &fixes[0] {
        QuickFix::Command {
            terminal_command,
            source,
            ..
        } => {
            assert_eq!(terminal_command, "git push --force-with-lease");
            assert_eq!(source.as_deref(), Some("git-fix"));
        }
        other => panic!("Expected command fix, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_matching_command_line_contributes_nothing() {
    let service = QuickFixService::default();
    service.register_command_selector(git_fix_selector());
    let provider = Arc::new(ScriptedProvider::immediate(vec![QuickFix::command("x", "y")]));
    let _handle = service.register_quick_fix_provider("git-fix", provider.clone());

    let output = lines("rejected");
    let command = TerminalCommand::from_exit_code("git pull", 1);
    let fixes = service
        .evaluate(&command, Some(output.as_slice()), &CancellationToken::new())
        .await;

    assert!(fixes.is_empty());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_output_matcher_is_mandatory() {
    let service = QuickFixService::default();
    service.register_command_selector(git_fix_selector());
    let provider = Arc::new(ScriptedProvider::immediate(vec![QuickFix::command("x", "y")]));
    let _handle = service.register_quick_fix_provider("git-fix", provider.clone());

    let command = TerminalCommand::from_exit_code("git push", 1);
    let cancel = CancellationToken::new();
    assert!(service.evaluate(&command, None, &cancel).await.is_empty());

    let output = lines("Everything up-to-date");
    assert!(service
        .evaluate(&command, Some(output.as_slice()), &cancel)
        .await
        .is_empty());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_duplicate_openers_collapse_to_first() {
    let uri = Url::parse("https://example.com/docs").unwrap();
    let service = QuickFixService::default();
    for id in ["first", "second"] {
        service.register_command_selector(QuickFixSelector::resolved(
            QuickFixOptions::new(id, ".*", ExitStatus::Error),
            Arc::new(ScriptedProvider::immediate(vec![QuickFix::opener(
                id,
                uri.clone(),
            )])),
        ));
    }

    let command = TerminalCommand::from_exit_code("anything", 1);
    let fixes = service
        .evaluate(&command, None, &CancellationToken::new())
        .await;

    assert_eq!(fixes.len(), 1);
    assert_eq!(fixes[0].fix_type(), QuickFixType::Opener);
    assert_eq!(fixes[0].source(), Some("first"));
}

#[tokio::test]
async fn test_providers_run_concurrently() {
    let service = QuickFixService::default();
    for id in ["a", "b", "c"] {
        service.register_command_selector(QuickFixSelector::resolved(
            QuickFixOptions::new(id, ".*", ExitStatus::Error),
            Arc::new(ScriptedProvider::delayed(
                vec![QuickFix::command(id, format!("fix {id}"))],
                Duration::from_millis(200),
            )),
        ));
    }

    let start = Instant::now();
    let command = TerminalCommand::from_exit_code("x", 1);
    let fixes = service
        .evaluate(&command, None, &CancellationToken::new())
        .await;

    assert!(start.elapsed() < Duration::from_millis(550));
    let labels: Vec<_> = fixes.iter().map(QuickFix::label).collect();
    assert_eq!(labels, vec!["Run: fix a", "Run: fix b", "Run: fix c"]);
}

#[tokio::test]
async fn test_cancellation_keeps_only_finished_results() {
    let service = QuickFixService::default();
    service.register_command_selector(QuickFixSelector::internal(
        QuickFixOptions::new("fast", ".*", ExitStatus::Error),
        |_| Ok(QuickFix::command("fast", "quick").into()),
    ));
    service.register_command_selector(QuickFixSelector::resolved(
        QuickFixOptions::new("stubborn", ".*", ExitStatus::Error),
        Arc::new(
            ScriptedProvider::delayed(
                vec![QuickFix::command("stubborn", "late")],
                Duration::from_secs(30),
            )
            .ignoring_cancel(),
        ),
    ));

    let cancel = CancellationToken::new();
    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        })
    };

    let start = Instant::now();
    let command = TerminalCommand::from_exit_code("x", 1);
    let fixes = service.evaluate(&command, None, &cancel).await;
    canceller.await.unwrap();

    assert!(start.elapsed() < Duration::from_secs(5));
    let labels: Vec<_> = fixes.iter().map(QuickFix::label).collect();
    assert_eq!(labels, vec!["Run: quick"]);
}

#[tokio::test]
async fn test_dispose_mid_evaluation_does_not_abort() {
    let service = Arc::new(QuickFixService::default());
    service.register_command_selector(QuickFixSelector::unresolved(QuickFixOptions::new(
        "ext",
        ".*",
        ExitStatus::Error,
    )));
    let handle = service.register_quick_fix_provider(
        "ext",
        Arc::new(ScriptedProvider::delayed(
            vec![QuickFix::command("ext", "in flight")],
            Duration::from_millis(100),
        )),
    );

    let command = TerminalCommand::from_exit_code("x", 1);
    let cancel = CancellationToken::new();
    let (fixes, disposed) = tokio::join!(service.evaluate(&command, None, &cancel), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.dispose()
    });

    assert!(disposed);
    assert_eq!(fixes.len(), 1);
    assert!(service.evaluate(&command, None, &cancel).await.is_empty());
}

#[tokio::test]
async fn test_timeout_from_config() {
    let service = QuickFixService::new(QuickFixConfig {
        provider_timeout_ms: 50,
        ..Default::default()
    });
    service.register_command_selector(QuickFixSelector::resolved(
        QuickFixOptions::new("slow", ".*", ExitStatus::Error),
        Arc::new(
            ScriptedProvider::delayed(vec![QuickFix::port("slow", 3000)], Duration::from_secs(5))
                .ignoring_cancel(),
        ),
    ));
    service.register_command_selector(QuickFixSelector::internal(
        QuickFixOptions::new("ok", ".*", ExitStatus::Error),
        |_| Ok(QuickFix::port("ok", 4000).into()),
    ));

    let command = TerminalCommand::from_exit_code("x", 1);
    let fixes = service
        .evaluate(&command, None, &CancellationToken::new())
        .await;
    assert_eq!(fixes.len(), 1);
    assert_eq!(fixes[0].label(), "Free port 4000");
}

#[tokio::test]
async fn test_builtin_and_custom_selectors_together() {
    let service = Arc::new(QuickFixService::default());
    register_builtin_providers(&service);
    service.register_command_selector(QuickFixSelector::internal(
        QuickFixOptions::new("upstream-docs", r"^git push", ExitStatus::Error),
        |_| {
            Ok(QuickFix::opener(
                "upstream-docs",
                Url::parse("https://git-scm.com/docs/git-push")?,
            )
            .into())
        },
    ));

    let session = CommandSession::new(Arc::clone(&service));
    let command = TerminalCommand::from_exit_code("git push", 128);
    let output = lines(
        "fatal: The current branch topic has no upstream branch.\n\n    git push --set-upstream origin topic\n",
    );

    let fixes = session
        .on_command_finished(&command, Some(output.as_slice()))
        .await
        .unwrap();
    let labels: Vec<_> = fixes.iter().map(QuickFix::label).collect();
    assert_eq!(
        labels,
        vec![
            "Run: git push --set-upstream origin topic",
            "Open: https://git-scm.com/docs/git-push",
        ]
    );

    assert!(session
        .on_command_finished(&command, Some(output.as_slice()))
        .await
        .is_none());
}
