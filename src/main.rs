//! Purpose: `spancat` CLI entry point: catalog lookups and offline manifest decoding.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: Commands emit stable stdout formats (JSON by default, text with --pretty).
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: Diagnostics (tracing) go to stderr and default to `warn`.
#![allow(clippy::result_large_err)]
use std::error::Error as StdError;
use std::io::{self, IsTerminal, Read};
use std::time::Duration;

use clap::{
    CommandFactory, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod node_json;
mod node_tree;

use node_json::{diff_json, node_json, types_json};
use node_tree::{render_labeled, render_tree};
use spancat::api::{
    CatalogClient, ClientConfig, ConfigOverrides, Error, ErrorKind, to_exit_code,
};
use spancat::catalog::{self, ManifestRecord, TeamSelector};
use spancat::core::dynamic::{self, Node, diff::diff};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse_from(std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                let message = clap_error_summary(&err);
                let hint = clap_error_hint(&err);
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(message)
                        .with_hint(hint),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    let connection = ConnectionOptions {
        endpoint: cli.endpoint,
        token: cli.token,
        timeout_ms: cli.timeout_ms,
    };

    let result = command_dispatch::dispatch_command(cli.command, &connection, color_mode);

    result
        .map_err(add_permission_hint)
        .map_err(add_io_hint)
        .map_err(add_internal_hint)
        .map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "spancat",
    version,
    about = "Span catalog lookups with typed, order-preserving manifest decoding",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"Looks up people, teams, and team manifests in the Span catalog.
Manifest vendor sections are schema-less JSON; spancat maps them to typed
nodes that keep key order and exact number literals.

Mental model:
  - `person`/`people`/`team`/`teams` query the catalog
  - `manifest` fetches a team manifest and decodes its vendors
  - `decode`/`diff` run the same mapping on local files (no network)
"#,
    after_help = r#"EXAMPLES
  $ export SPAN_ACCESS_TOKEN=...           # 64-character access token
  $ spancat person --email ada@example.com
  $ spancat team --name Payments
  $ spancat manifest --team-id t_123 --pretty
  $ echo '{"github":{"org":"acme"}}' | spancat decode --types

LEARN MORE
  $ spancat <command> --help"#,
    arg_required_else_help = true,
    disable_help_subcommand = false
)]
struct Cli {
    #[arg(
        long,
        value_hint = ValueHint::Url,
        help = "Catalog API endpoint (default: $SPAN_API_ENDPOINT or https://span.app/api/external/v1)"
    )]
    endpoint: Option<String>,
    #[arg(long, help = "Access token (default: $SPAN_ACCESS_TOKEN)")]
    token: Option<String>,
    #[arg(
        long = "timeout-ms",
        value_name = "MS",
        help = "HTTP timeout in milliseconds (default: 30000)"
    )]
    timeout_ms: Option<u64>,
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics and --pretty output: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Look up one person by email",
        after_help = r#"EXAMPLES
  $ spancat person --email ada@example.com

NOTES
  - Exits 3 when nobody matches and 4 when several people match."#
    )]
    Person {
        #[arg(long, help = "Email address to look up")]
        email: String,
    },
    #[command(
        about = "List people, optionally filtered by team",
        after_help = r#"EXAMPLES
  $ spancat people
  $ spancat people --team-id t_123 --team-id t_456"#
    )]
    People {
        #[arg(long = "team-id", value_name = "ID", help = "Repeatable team id filter")]
        team_ids: Vec<String>,
    },
    #[command(
        about = "Look up one team (with members) by id or name",
        after_help = r#"EXAMPLES
  $ spancat team --id t_123
  $ spancat team --name Payments

NOTES
  - When both are given, --name is resolved first."#
    )]
    Team {
        #[arg(long, help = "Team id")]
        id: Option<String>,
        #[arg(long, help = "Team name")]
        name: Option<String>,
    },
    #[command(
        about = "List teams, optionally filtered by name",
        after_help = r#"EXAMPLES
  $ spancat teams
  $ spancat teams --name Core"#
    )]
    Teams {
        #[arg(long, help = "Name filter passed to the catalog")]
        name: Option<String>,
    },
    #[command(
        about = "Fetch a team manifest and decode its vendors",
        after_help = r#"EXAMPLES
  $ spancat manifest --team-id t_123
  $ spancat manifest --team-id t_123 --pretty

NOTES
  - JSON output encodes vendors as tagged nodes (type + value/fields/elements)."#
    )]
    Manifest {
        #[arg(long = "team-id", help = "Team id")]
        team_id: String,
        #[arg(long, help = "Emit a human-readable tree instead of JSON")]
        pretty: bool,
    },
    #[command(
        about = "Decode a local JSON document into typed nodes",
        after_help = r#"EXAMPLES
  $ spancat decode vendors.json
  $ cat vendors.json | spancat decode --pretty
  $ spancat decode vendors.json --types

NOTES
  - Reads stdin when FILE is omitted or `-`.
  - Duplicate keys keep the last value at the first key's position."#
    )]
    Decode {
        #[arg(help = "Input file (default: stdin)", value_hint = ValueHint::FilePath)]
        input: Option<String>,
        #[arg(long, conflicts_with = "types", help = "Emit a human-readable tree")]
        pretty: bool,
        #[arg(long, help = "Emit the structural type descriptor")]
        types: bool,
    },
    #[command(
        about = "Structurally compare two local JSON documents",
        after_help = r#"EXAMPLES
  $ spancat diff old.json new.json

NOTES
  - Key order is part of a value: pure reorders are reported as `reordered`.
  - Numbers compare numerically (1.0 equals 1.00)."#
    )]
    Diff {
        #[arg(help = "Old document (`-` for stdin)", value_hint = ValueHint::FilePath)]
        old: String,
        #[arg(help = "New document (`-` for stdin)", value_hint = ValueHint::FilePath)]
        new: String,
    },
    #[command(
        about = "Print version info as JSON",
        long_about = r#"Emit version info as JSON (stable, machine-readable)."#
    )]
    Version,
    #[command(
        arg_required_else_help = true,
        about = "Generate shell completions",
        after_help = r#"EXAMPLES
  $ spancat completion bash > ~/.local/share/bash-completion/completions/spancat
  $ spancat completion zsh > ~/.zfunc/_spancat"#
    )]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

#[derive(Clone, Debug, Default)]
struct ConnectionOptions {
    endpoint: Option<String>,
    token: Option<String>,
    timeout_ms: Option<u64>,
}

fn catalog_client(options: &ConnectionOptions) -> Result<CatalogClient, Error> {
    let config = ClientConfig::resolve(ConfigOverrides {
        token: options.token.clone(),
        endpoint: options.endpoint.clone(),
        timeout: options.timeout_ms.map(Duration::from_millis),
    })?;
    debug!(?config, "catalog client configured");
    Ok(CatalogClient::new(config))
}

fn read_input(input: Option<&str>) -> Result<(Vec<u8>, String), Error> {
    match input {
        None | Some("-") => {
            let mut bytes = Vec::new();
            io::stdin().read_to_end(&mut bytes).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read stdin")
                    .with_source(err)
            })?;
            Ok((bytes, "<stdin>".to_string()))
        }
        Some(path) => {
            let bytes = std::fs::read(path).map_err(|err| {
                Error::new(map_io_error_kind(&err))
                    .with_message("failed to read input file")
                    .with_subject(path)
                    .with_source(err)
            })?;
            Ok((bytes, path.to_string()))
        }
    }
}

fn decode_input(input: Option<&str>) -> Result<Node, Error> {
    let (bytes, label) = read_input(input)?;
    dynamic::classify(&bytes).map_err(|err| Error::from(err).with_subject(label))
}

fn map_io_error_kind(err: &io::Error) -> ErrorKind {
    match err.kind() {
        io::ErrorKind::NotFound => ErrorKind::NotFound,
        io::ErrorKind::PermissionDenied => ErrorKind::Permission,
        _ => ErrorKind::Io,
    }
}

fn manifest_text(record: &ManifestRecord, use_color: bool) -> String {
    let lines = [
        format!(
            "{} {} ({})",
            colorize_label("team:", use_color, AnsiColor::Cyan),
            record.team_name,
            record.team_id
        ),
        format!(
            "{} {}",
            colorize_label("reference:", use_color, AnsiColor::Cyan),
            record.reference
        ),
        format!(
            "{} {}",
            colorize_label("tech lead:", use_color, AnsiColor::Cyan),
            record.tech_lead
        ),
        render_labeled("vendors", &record.vendors, use_color),
    ];
    lines.join("\n")
}

fn add_permission_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Permission || err.hint().is_some() {
        return err;
    }
    err.with_hint("Permission denied. Check the access token or file permissions.")
}

fn add_io_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Io || err.hint().is_some() {
        return err;
    }
    err.with_hint("I/O error. Check the path, network access, and the catalog endpoint.")
}

fn add_internal_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Internal || err.hint().is_some() {
        return err;
    }
    err.with_hint(
        "Unexpected internal failure. Retry with RUST_LOG=debug and share command/context if it persists.",
    )
}

fn emit_version_output() {
    if io::stdout().is_terminal() {
        println!("spancat {}", env!("CARGO_PKG_VERSION"));
    } else {
        emit_json(json!({
            "name": "spancat",
            "version": env!("CARGO_PKG_VERSION"),
        }));
    }
}

fn emit_json(value: Value) {
    let json = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_serialized<T: serde::Serialize>(value: &T) -> Result<(), Error> {
    let value = serde_json::to_value(value).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode output json")
            .with_source(err)
    })?;
    emit_json(value);
    Ok(())
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
    Cyan,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
        AnsiColor::Cyan => "36",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::Ambiguous => "ambiguous match".to_string(),
        ErrorKind::Permission => "permission denied".to_string(),
        ErrorKind::Decode => "decode failed".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(subject) = err.subject() {
        inner.insert("subject".to_string(), json!(subject));
    }
    if let Some(status) = err.status() {
        inner.insert("status".to_string(), json!(status));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(subject) = err.subject() {
        lines.push(format!(
            "{} {subject}",
            colorize_label("subject:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(status) = err.status() {
        lines.push(format!(
            "{} {status}",
            colorize_label("status:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let usage = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
        .map(str::trim);

    let Some(usage) = usage else {
        return "Try `spancat --help`.".to_string();
    };

    let tokens: Vec<&str> = usage.split_whitespace().collect();
    let Some(pos) = tokens.iter().position(|t| *t == "spancat") else {
        return "Try `spancat --help`.".to_string();
    };

    let parts: Vec<&str> = tokens
        .iter()
        .skip(pos + 1)
        .take_while(|token| {
            !(token.starts_with('-') || token.starts_with('<') || token.starts_with('['))
        })
        .copied()
        .collect();

    if parts.is_empty() {
        return "Try `spancat --help`.".to_string();
    }
    format!("Try `spancat {} --help`.", parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::{
        Cli, Command, Error, ErrorKind, clap_error_hint, error_json, error_text, manifest_text,
        map_io_error_kind,
    };
    use clap::Parser;
    use serde_json::json;
    use spancat::Node;
    use spancat::catalog::ManifestRecord;
    use std::io;

    #[test]
    fn cli_parses_team_selectors() {
        let cli = Cli::try_parse_from(["spancat", "team", "--name", "Payments", "--id", "t1"])
            .expect("parse");
        match cli.command {
            Command::Team { id, name } => {
                assert_eq!(id.as_deref(), Some("t1"));
                assert_eq!(name.as_deref(), Some("Payments"));
            }
            _ => panic!("expected team command"),
        }
    }

    #[test]
    fn cli_collects_repeated_team_ids_and_globals() {
        let cli = Cli::try_parse_from([
            "spancat",
            "--timeout-ms",
            "1500",
            "--endpoint",
            "http://127.0.0.1:9/api",
            "people",
            "--team-id",
            "a",
            "--team-id",
            "b",
        ])
        .expect("parse");
        assert_eq!(cli.timeout_ms, Some(1500));
        assert_eq!(cli.endpoint.as_deref(), Some("http://127.0.0.1:9/api"));
        match cli.command {
            Command::People { team_ids } => assert_eq!(team_ids, ["a", "b"]),
            _ => panic!("expected people command"),
        }
    }

    #[test]
    fn decode_pretty_conflicts_with_types() {
        assert!(Cli::try_parse_from(["spancat", "decode", "--pretty", "--types"]).is_err());
    }

    #[test]
    fn clap_hint_points_at_subcommand_help() {
        let err = Cli::try_parse_from(["spancat", "manifest"])
            .err()
            .expect("missing team id");
        assert_eq!(clap_error_hint(&err), "Try `spancat manifest --help`.");
    }

    #[test]
    fn error_json_includes_subject_status_and_causes() {
        let err = Error::new(ErrorKind::NotFound)
            .with_message("catalog error status 404")
            .with_subject("/catalog/teams/t1")
            .with_status(404)
            .with_source(io::Error::other("boom"));
        let value = error_json(&err);
        assert_eq!(value["error"]["kind"], json!("NotFound"));
        assert_eq!(value["error"]["status"], json!(404));
        assert_eq!(value["error"]["subject"], json!("/catalog/teams/t1"));
        assert_eq!(value["error"]["causes"], json!(["boom"]));
    }

    #[test]
    fn error_text_falls_back_to_kind_message() {
        let text = error_text(&Error::new(ErrorKind::Ambiguous).with_hint("narrow it"), false);
        assert_eq!(text, "error: ambiguous match\nhint: narrow it");
    }

    #[test]
    fn io_errors_map_to_kinds() {
        let missing = io::Error::from(io::ErrorKind::NotFound);
        assert_eq!(map_io_error_kind(&missing), ErrorKind::NotFound);
        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(map_io_error_kind(&denied), ErrorKind::Permission);
        assert_eq!(map_io_error_kind(&io::Error::other("x")), ErrorKind::Io);
    }

    #[test]
    fn manifest_text_lists_header_then_vendor_tree() {
        let record = ManifestRecord {
            team_id: "t1".to_string(),
            team_name: "Payments".to_string(),
            reference: "payments".to_string(),
            tech_lead: "lead@x.io".to_string(),
            vendors: r#"{"github":{"org":"acme"}}"#.parse::<Node>().expect("node"),
        };
        assert_eq!(
            manifest_text(&record, false),
            [
                "team: Payments (t1)",
                "reference: payments",
                "tech lead: lead@x.io",
                "vendors: object",
                "  github: object",
                "    org: string \"acme\"",
            ]
            .join("\n")
        );
    }
}
