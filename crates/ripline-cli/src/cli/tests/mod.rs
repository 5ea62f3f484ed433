use super::*;

mod stages;

fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

#[test]
fn cli_parse_status() {
    match parse(&["ripline", "status"]) {
        CliCommand::Status => {}
        _ => panic!("expected Status"),
    }
}

#[test]
fn cli_parse_files() {
    match parse(&["ripline", "files", "12"]) {
        CliCommand::Files { job } => assert_eq!(job, 12),
        _ => panic!("expected Files"),
    }
}

#[test]
fn cli_parse_check() {
    match parse(&["ripline", "check"]) {
        CliCommand::Check => {}
        _ => panic!("expected Check"),
    }
}

#[test]
fn cli_parse_validate_state() {
    match parse(&["ripline", "validate-state", "/srv/staging/1-ripped/movies/M/.rip"]) {
        CliCommand::ValidateState { path } => {
            assert_eq!(path, PathBuf::from("/srv/staging/1-ripped/movies/M/.rip"))
        }
        _ => panic!("expected ValidateState"),
    }
}

#[test]
fn cli_parse_completions_and_man() {
    match parse(&["ripline", "completions", "bash"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, Shell::Bash),
        _ => panic!("expected Completions"),
    }
    match parse(&["ripline", "man"]) {
        CliCommand::Man => {}
        _ => panic!("expected Man"),
    }
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn delay_values() {
    assert_eq!(parse_delay("250ms"), Ok(Duration::from_millis(250)));
    assert_eq!(parse_delay("2s"), Ok(Duration::from_secs(2)));
    assert_eq!(parse_delay("100"), Ok(Duration::from_millis(100)));
    assert!(parse_delay("soon").is_err());
    assert!(parse_delay("-1s").is_err());
}
