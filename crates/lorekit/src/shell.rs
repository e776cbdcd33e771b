// SPDX-FileCopyrightText: 2026 Lorekit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lorekit shell` command implementation.
//!
//! Launches an interactive REPL with a colored prompt and readline history.
//! Each input line is fed through the inbound hook (match + activate) and
//! the composed system-prompt suffix is shown, so operators can watch a
//! template set behave before wiring it into a host pipeline. Creates a new
//! session per invocation.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use colored::Colorize;
use lorekit_config::LorekitConfig;
use lorekit_core::{InboundMessage, LorekitError, SessionId};
use lorekit_engine::InjectionEngine;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::info;

/// Runs the `lorekit shell` interactive REPL.
pub async fn run_shell(config: LorekitConfig) -> Result<(), LorekitError> {
    let engine = Arc::new(InjectionEngine::from_config(&config)?);

    // Background sweeper, if configured. Lazy pruning already keeps reads
    // correct; this only bounds memory on long-idle sessions.
    let sweeper = if config.engine.sweep_interval_secs > 0 {
        let handle = Arc::clone(&engine)
            .spawn_sweeper(Duration::from_secs(config.engine.sweep_interval_secs));
        info!(
            interval_secs = config.engine.sweep_interval_secs,
            "background sweeper started"
        );
        Some(handle)
    } else {
        None
    };

    let session = SessionId(format!("shell:{}", uuid::Uuid::new_v4()));
    let mut sender_is_admin = false;

    let mut rl = DefaultEditor::new()
        .map_err(|e| LorekitError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "lorekit shell".bold().green());
    println!(
        "session {} -- type a message to trigger templates, {} for commands, {} to exit\n",
        session.as_str().dimmed(),
        "/help".yellow(),
        "/quit".yellow()
    );

    let prompt = format!("{}> ", "lorekit".green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                if let Some(command) = trimmed.strip_prefix('/') {
                    handle_command(&engine, &session, &mut sender_is_admin, command);
                } else {
                    handle_message(&engine, &session, sender_is_admin, trimmed);
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C
                break;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D
                break;
            }
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    if let Some(handle) = sweeper {
        handle.abort();
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

/// Feeds one message through the inbound hook and shows the resulting
/// injection suffix.
fn handle_message(
    engine: &InjectionEngine,
    session: &SessionId,
    sender_is_admin: bool,
    text: &str,
) {
    let now = Utc::now();
    let message = InboundMessage {
        session_id: session.clone(),
        sender_id: "local".to_string(),
        sender_is_admin,
        text: text.to_string(),
    };

    let activated = engine.handle_inbound(&message, now);
    if !activated.is_empty() {
        println!("{} {}", "activated:".cyan(), activated.join(", "));
    }

    let suffix = engine.build_injection_suffix(session, now);
    if suffix.is_empty() {
        println!("{}", "(no injection)".dimmed());
    } else {
        println!("{}", "-- injected suffix --".dimmed());
        println!("{}", suffix.dimmed());
    }
}

/// Handles a `/command` line.
fn handle_command(
    engine: &InjectionEngine,
    session: &SessionId,
    sender_is_admin: &mut bool,
    command: &str,
) {
    let mut parts = command.split_whitespace();
    let verb = parts.next().unwrap_or_default();
    let args: Vec<String> = parts.map(|s| s.to_string()).collect();

    match verb {
        "help" => {
            println!("  /status            show active templates");
            println!("  /clear             clear this session's activations");
            println!("  /enable <names>    enable templates");
            println!("  /disable <names>   disable templates");
            println!("  /admin             toggle admin sender flag");
            println!("  /export <path>     export the registry as a JSON pack");
            println!("  /quit              exit");
        }
        "status" => {
            let status = engine.status(session, Utc::now());
            if status.is_empty() {
                println!("{}", "no active templates".dimmed());
            }
            for row in status {
                println!(
                    "  {} priority={} remaining={}",
                    row.name.bold(),
                    row.priority,
                    row.remaining
                );
            }
        }
        "clear" => {
            let removed = engine.clear(session);
            println!("cleared {removed} activation(s)");
        }
        "enable" | "disable" => {
            if args.is_empty() {
                eprintln!("{}: /{verb} <names>", "usage".yellow());
                return;
            }
            let (applied, unknown) = engine.set_enabled(&args, verb == "enable");
            if !applied.is_empty() {
                println!("{verb}d: {}", applied.join(", "));
            }
            if !unknown.is_empty() {
                eprintln!("{}: {}", "unknown".yellow(), unknown.join(", "));
            }
        }
        "admin" => {
            *sender_is_admin = !*sender_is_admin;
            println!(
                "sender is now {}",
                if *sender_is_admin {
                    "admin".yellow()
                } else {
                    "non-admin".normal()
                }
            );
        }
        "export" => {
            let Some(path) = args.first() else {
                eprintln!("{}: /export <path>", "usage".yellow());
                return;
            };
            let templates = engine.export_templates();
            match lorekit_config::save_pack(Path::new(path), &templates) {
                Ok(()) => println!("exported {} template(s) to {path}", templates.len()),
                Err(e) => eprintln!("{}: {e}", "error".red()),
            }
        }
        _ => {
            eprintln!("{}: unknown command /{verb}", "error".red());
        }
    }
}
