//! Purpose: Hold top-level CLI command dispatch for `spancat`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Remote commands build one client per invocation; offline commands never do.
//! Invariants: Helpers in `main.rs` remain the source of output and error shaping.

use super::*;

pub(super) fn dispatch_command(
    command: Command,
    connection: &ConnectionOptions,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "spancat", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output();
            Ok(RunOutcome::ok())
        }
        Command::Person { email } => {
            let client = catalog_client(connection)?;
            let record = catalog::person(&client, &email)?;
            emit_serialized(&record)?;
            Ok(RunOutcome::ok())
        }
        Command::People { team_ids } => {
            let client = catalog_client(connection)?;
            let records = catalog::people(&client, &team_ids)?;
            emit_json(json!({ "people": records }));
            Ok(RunOutcome::ok())
        }
        Command::Team { id, name } => {
            let client = catalog_client(connection)?;
            let record = catalog::team(&client, &TeamSelector { id, name })?;
            emit_serialized(&record)?;
            Ok(RunOutcome::ok())
        }
        Command::Teams { name } => {
            let client = catalog_client(connection)?;
            let records = catalog::teams(&client, name.as_deref())?;
            emit_json(json!({ "teams": records }));
            Ok(RunOutcome::ok())
        }
        Command::Manifest { team_id, pretty } => {
            let client = catalog_client(connection)?;
            let record = catalog::team_manifest(&client, &team_id)?;
            if pretty {
                let use_color = color_mode.use_color(io::stdout().is_terminal());
                println!("{}", manifest_text(&record, use_color));
            } else {
                emit_serialized(&record)?;
            }
            Ok(RunOutcome::ok())
        }
        Command::Decode {
            input,
            pretty,
            types,
        } => {
            let node = decode_input(input.as_deref())?;
            if types {
                emit_json(types_json(&node));
            } else if pretty {
                let use_color = color_mode.use_color(io::stdout().is_terminal());
                println!("{}", render_tree(&node, use_color));
            } else {
                emit_json(node_json(&node)?);
            }
            Ok(RunOutcome::ok())
        }
        Command::Diff { old, new } => {
            if old == "-" && new == "-" {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("only one diff input can be read from stdin")
                    .with_hint("Pass at least one side as a file path."));
            }
            let old_node = decode_input(Some(&old))?;
            let new_node = decode_input(Some(&new))?;
            let changes = diff(&old_node, &new_node);
            debug!(changes = changes.len(), "diff complete");
            emit_json(diff_json(&changes)?);
            Ok(RunOutcome::ok())
        }
    }
}
