//! Contributions files loaded from disk and evaluated through the service.

mod common;

use common::{lines, temp_dir, write_file};
use termfix::domain::models::{QuickFix, SelectorType, TerminalCommand};
use termfix::infrastructure::contributions::ContributionLoader;
use termfix::services::QuickFixService;
use tokio_util::sync::CancellationToken;

const CONTRIBUTIONS: &str = r#"
quick_fixes:
  - id: npm-missing-script
    command_line_matcher: "^npm run (?P<script>\\S+)"
    command_exit_result: error
    output_matcher:
      line_matcher: 'Did you mean "(?P<suggestion>[^"]+)"\?'
    fixes:
      - type: command
        terminal_command: "npm run ${suggestion}"
        add_new_line: true
      - type: opener
        uri: "https://docs.npmjs.com/cli/run-script#${script}"
  - id: dev-server-port
    command_line_matcher: "^npm start"
    command_exit_result: error
    output_matcher:
      line_matcher: 'port (\d+) is taken'
    fixes:
      - type: port
        port: "${1}"
"#;

#[tokio::test]
async fn test_contributed_templates_are_evaluated() {
    let dir = temp_dir();
    let path = write_file(&dir, "quick-fixes.yaml", CONTRIBUTIONS);

    let service = QuickFixService::default();
    let loaded = ContributionLoader::load_all(&[path], &service);
    assert_eq!(loaded.selector_ids.len(), 2);
    assert_eq!(loaded.registrations.len(), 2);

    let command = TerminalCommand::from_exit_code("npm run biuld", 1);
    let output = lines("npm ERR! Missing script: \"biuld\"\nnpm ERR! Did you mean \"build\"?");
    let fixes = service
        .evaluate(&command, Some(output.as_slice()), &CancellationToken::new())
        .await;

    let labels: Vec<_> = fixes.iter().map(QuickFix::label).collect();
    assert_eq!(
        labels,
        vec![
            "Run: npm run build",
            "Open: https://docs.npmjs.com/cli/run-script#biuld",
        ]
    );
    assert!(fixes
        .iter()
        .all(|fix| fix.source() == Some("npm-missing-script")));
}

#[tokio::test]
async fn test_contributed_port_fix() {
    let dir = temp_dir();
    let path = write_file(&dir, "ports.yaml", CONTRIBUTIONS);

    let service = QuickFixService::default();
    let _loaded = ContributionLoader::load_all(&[path], &service);

    let command = TerminalCommand::from_exit_code("npm start", 1);
    let output = lines("starting...\nError: port 5173 is taken");
    let fixes = service
        .evaluate(&command, Some(output.as_slice()), &CancellationToken::new())
        .await;

    assert_eq!(fixes, vec![QuickFix::port("dev-server-port", 5173).with_source("dev-server-port")]);
}

#[tokio::test]
async fn test_broken_file_is_skipped() {
    let dir = temp_dir();
    let good = write_file(&dir, "good.yaml", CONTRIBUTIONS);
    let bad = write_file(&dir, "bad.yaml", "quick_fixes: [");
    let missing = dir.path().join("missing.yaml");

    let service = QuickFixService::default();
    let loaded = ContributionLoader::load_all(&[bad, missing, good], &service);

    assert_eq!(
        loaded.selector_ids,
        vec!["npm-missing-script", "dev-server-port"]
    );
    let selectors = service.terminal_quick_fixes().await;
    assert_eq!(selectors.len(), 2);
    assert!(selectors
        .iter()
        .all(|s| s.selector_type() == SelectorType::UnresolvedExtension));
}

#[tokio::test]
async fn test_disposing_contributed_providers_makes_selectors_inert() {
    let dir = temp_dir();
    let path = write_file(&dir, "quick-fixes.yaml", CONTRIBUTIONS);

    let service = QuickFixService::default();
    let loaded = ContributionLoader::load_all(&[path], &service);
    for registration in loaded.registrations {
        assert!(registration.dispose());
    }

    let command = TerminalCommand::from_exit_code("npm start", 1);
    let output = lines("port 5173 is taken");
    let fixes = service
        .evaluate(&command, Some(output.as_slice()), &CancellationToken::new())
        .await;
    assert!(fixes.is_empty());
    assert_eq!(service.terminal_quick_fixes().await.len(), 2);
}
