//! Command surface contract: flag names, aliases, required inputs and the
//! global options parse the way the help output promises.

use clap::Parser;

use cloudcmd::commands::{Cli, Command};

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(args)
}

#[test]
fn worker_fleet_requires_name_and_site() {
    let err = parse(&["cloudcmd", "new-worker-fleet", "--name", "Fleet-A"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

    let cli = parse(&[
        "cloudcmd",
        "new-worker-fleet",
        "--name",
        "Fleet-A",
        "--site",
        "arn:aws:iotroborunner:us-east-1:123:site/s-1",
    ])
    .unwrap();
    match cli.command {
        Command::NewWorkerFleet(args) => {
            assert_eq!(args.name, "Fleet-A");
            assert!(args.client_token.is_none());
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn select_and_force_are_global() {
    let cli = parse(&[
        "cloudcmd",
        "remove-streaming-distribution",
        "--id",
        "EDFDVBD6EXAMPLE",
        "--select",
        "*",
        "--force",
    ])
    .unwrap();
    assert_eq!(cli.select.as_deref(), Some("*"));
    assert!(cli.force);
}

#[test]
fn connection_flags_parse_before_the_subcommand() {
    let cli = parse(&[
        "cloudcmd",
        "--region",
        "eu-west-1",
        "--endpoint-url",
        "http://localhost:4566",
        "get-scan-list",
    ])
    .unwrap();
    assert_eq!(cli.connection.region.as_deref(), Some("eu-west-1"));
    assert_eq!(
        cli.connection.endpoint_url.as_deref(),
        Some("http://localhost:4566")
    );
}

#[test]
fn pipeline_units_accept_singular_aliases() {
    let cli = parse(&[
        "cloudcmd",
        "new-pipeline",
        "--pipeline-name",
        "log-ingest",
        "--min-unit",
        "1",
        "--max-unit",
        "4",
        "--pipeline-configuration-body",
        "version: \"2\"",
        "--log-group",
        "/app/logs",
    ])
    .unwrap();
    match cli.command {
        Command::NewPipeline(args) => {
            assert_eq!(args.min_units, 1);
            assert_eq!(args.max_units, 4);
            assert_eq!(args.log_group.as_deref(), Some("/app/logs"));
            assert!(args.subnet_ids.is_empty());
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn message_attributes_parse_as_key_value_pairs() {
    let cli = parse(&[
        "cloudcmd",
        "send-channel-message",
        "--channel-arn",
        "arn:aws:chime:us-east-1:123:channel/abc",
        "--chime-bearer",
        "arn:aws:chime:us-east-1:123:app-instance-user/u1",
        "--content",
        "hello",
        "--persistence",
        "PERSISTENT",
        "--type",
        "STANDARD",
        "--attribute",
        "priority=high",
        "--attribute",
        "channel=ops",
    ])
    .unwrap();
    match cli.command {
        Command::SendChannelMessage(args) => {
            assert_eq!(args.attributes.len(), 2);
            assert_eq!(args.attributes[0], ("priority".to_string(), "high".to_string()));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn bias_position_accepts_negative_coordinates() {
    let cli = parse(&[
        "cloudcmd",
        "search-place-index-suggestions",
        "--index-name",
        "places",
        "--text",
        "Mont",
        "--bias-position",
        "-73.98,40.74",
    ])
    .unwrap();
    match cli.command {
        Command::SearchPlaceIndexSuggestions(args) => {
            assert_eq!(args.bias_position, Some(vec![-73.98, 40.74]));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn malformed_attribute_is_rejected() {
    let err = parse(&[
        "cloudcmd",
        "new-graphql-api",
        "--name",
        "orders",
        "--authentication-type",
        "API_KEY",
        "--tag",
        "not-a-pair",
    ])
    .unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
}
