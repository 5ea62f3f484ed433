use super::*;

#[test]
fn cli_parse_rip_movie() {
    match parse(&["ripline", "rip", "-t", "movie", "-n", "Big Buck Bunny"]) {
        CliCommand::Rip(args) => {
            assert_eq!(args.media_type, Some(MediaType::Movie));
            assert_eq!(args.name.as_deref(), Some("Big Buck Bunny"));
            assert_eq!(args.disc_path, "disc:0");
            assert!(args.mock.is_none());
        }
        _ => panic!("expected Rip"),
    }
}

#[test]
fn cli_parse_rip_tv_mock() {
    match parse(&[
        "ripline",
        "rip",
        "--type",
        "show",
        "--name",
        "The Simpsons",
        "-s",
        "1",
        "-d",
        "2",
        "--mock",
        "simpsons_s01d01",
    ]) {
        CliCommand::Rip(args) => {
            assert_eq!(args.media_type, Some(MediaType::Tv));
            assert_eq!((args.season, args.disc), (Some(1), Some(2)));
            assert_eq!(args.mock.as_deref(), Some("simpsons_s01d01"));
        }
        _ => panic!("expected Rip"),
    }
}

#[test]
fn cli_parse_rip_job_mode() {
    match parse(&["ripline", "rip", "--job", "7"]) {
        CliCommand::Rip(args) => {
            assert_eq!(args.job, Some(7));
            assert!(args.media_type.is_none());
        }
        _ => panic!("expected Rip"),
    }
}

#[test]
fn cli_rip_requires_type_and_name() {
    assert!(Cli::try_parse_from(["ripline", "rip", "-n", "X"]).is_err());
    assert!(Cli::try_parse_from(["ripline", "rip", "-t", "album", "-n", "X"]).is_err());
    assert!(Cli::try_parse_from(["ripline", "rip", "-t", "movie", "-n", "X", "--synthetic"]).is_err());
}

#[test]
fn cli_parse_transcode() {
    match parse(&["ripline", "transcode", "--job", "3", "--skip-transform"]) {
        CliCommand::Transcode(args) => {
            assert_eq!(args.job, Some(3));
            assert!(args.skip_transform);
            assert!(!args.hardware);
        }
        _ => panic!("expected Transcode"),
    }
    match parse(&["ripline", "transcode", "--from-job", "1", "--hardware"]) {
        CliCommand::Transcode(args) => {
            assert_eq!(args.from_job, Some(1));
            assert!(args.hardware);
        }
        _ => panic!("expected Transcode"),
    }
}

#[test]
fn cli_transcode_needs_exactly_one_job() {
    assert!(Cli::try_parse_from(["ripline", "transcode"]).is_err());
    assert!(Cli::try_parse_from(["ripline", "transcode", "--job", "1", "--from-job", "2"]).is_err());
}
