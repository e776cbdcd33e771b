// SPDX-FileCopyrightText: 2026 Lorekit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end integration tests for the complete lorekit pipeline:
//! TOML configuration -> engine -> inbound messages -> composed injection.
//!
//! Each test builds an isolated engine from an inline config string.
//! Tests are independent and order-insensitive.

use chrono::Utc;
use lorekit_config::load_and_validate_str;
use lorekit_core::{InboundMessage, Remaining, SessionId};
use lorekit_engine::InjectionEngine;

fn engine_from(toml: &str) -> InjectionEngine {
    let config = load_and_validate_str(toml).expect("test config must be valid");
    InjectionEngine::from_config(&config).expect("engine must build")
}

fn message(session: &str, text: &str, admin: bool) -> InboundMessage {
    InboundMessage {
        session_id: session.into(),
        sender_id: "tester".to_string(),
        sender_is_admin: admin,
        text: text.to_string(),
    }
}

const SCENARIO: &str = r#"
[[templates]]
name = "calm"
content = "calm-content"
priority = 10
regexs = ["冷静"]
duration = 60

[[templates]]
name = "strict"
content = "strict-content"
priority = 1
regexs = ["严格"]
duration = 0
only_admin = true
"#;

// ---- The documented end-to-end scenario ----

#[test]
fn calm_strict_scenario_full_lifecycle() {
    let engine = engine_from(SCENARIO);
    let session: SessionId = "group:1".into();
    let t0 = Utc::now();

    // Non-admin sends "请冷静": calm activates, expires 60s later.
    assert_eq!(
        engine.handle_inbound(&message("group:1", "请冷静", false), t0),
        vec!["calm"]
    );

    // Non-admin sends "请严格": admin_only blocks activation.
    assert!(engine
        .handle_inbound(&message("group:1", "请严格", false), t0)
        .is_empty());

    // Admin sends "请严格": strict activates permanently.
    assert_eq!(
        engine.handle_inbound(&message("group:1", "请严格", true), t0),
        vec!["strict"]
    );

    // Composing at t+10s: priority 1 before priority 10.
    let t10 = t0 + chrono::Duration::seconds(10);
    assert_eq!(
        engine.build_system_prompt(&session, "base", t10),
        "base\nstrict-content\ncalm-content"
    );

    // Status shows both with correct remaining values.
    let status = engine.status(&session, t10);
    assert_eq!(status.len(), 2);
    let calm = status.iter().find(|s| s.name == "calm").unwrap();
    assert_eq!(calm.remaining, Remaining::Seconds(50));
    let strict = status.iter().find(|s| s.name == "strict").unwrap();
    assert_eq!(strict.remaining, Remaining::Permanent);

    // At t+61s only strict survives.
    let t61 = t0 + chrono::Duration::seconds(61);
    assert_eq!(
        engine.build_system_prompt(&session, "base", t61),
        "base\nstrict-content"
    );

    // Clear empties the session; a second clear is a zero no-op.
    assert_eq!(engine.clear(&session), 1);
    assert_eq!(engine.clear(&session), 0);
    assert_eq!(engine.build_system_prompt(&session, "base", t61), "base");
}

// ---- Session isolation ----

#[test]
fn sessions_do_not_leak_activations() {
    let engine = engine_from(SCENARIO);
    let t0 = Utc::now();

    engine.handle_inbound(&message("group:1", "冷静", false), t0);

    let other: SessionId = "group:2".into();
    assert_eq!(engine.build_system_prompt(&other, "base", t0), "base");
    assert!(engine.status(&other, t0).is_empty());
}

// ---- Re-trigger refresh ----

#[test]
fn retrigger_extends_lifetime_without_stacking() {
    let engine = engine_from(SCENARIO);
    let session: SessionId = "group:1".into();
    let t0 = Utc::now();

    engine.handle_inbound(&message("group:1", "冷静", false), t0);
    let t50 = t0 + chrono::Duration::seconds(50);
    engine.handle_inbound(&message("group:1", "冷静", false), t50);

    // One record, with the restarted timer.
    let t70 = t0 + chrono::Duration::seconds(70);
    let status = engine.status(&session, t70);
    assert_eq!(status.len(), 1);
    assert_eq!(status[0].remaining, Remaining::Seconds(40));
}

// ---- Hot reload ----

#[test]
fn reload_swaps_registry_without_touching_other_activations() {
    let engine = engine_from(SCENARIO);
    let session: SessionId = "group:1".into();
    let t0 = Utc::now();

    engine.handle_inbound(&message("group:1", "严格", true), t0);
    engine.handle_inbound(&message("group:1", "冷静", false), t0);

    // Reload keeping only strict: calm's record dangles and is evicted at
    // the next composition.
    let config = load_and_validate_str(
        r#"
[[templates]]
name = "strict"
content = "strict-content"
priority = 1
regexs = ["严格"]
duration = 0
only_admin = true
"#,
    )
    .unwrap();
    engine.reload(&config.templates).unwrap();

    let t1 = t0 + chrono::Duration::seconds(1);
    assert_eq!(
        engine.build_system_prompt(&session, "base", t1),
        "base\nstrict-content"
    );
    // The dangling record is gone from status as well.
    let status = engine.status(&session, t1);
    assert_eq!(status.len(), 1);
    assert_eq!(status[0].name, "strict");
}

#[test]
fn failed_reload_keeps_serving_the_old_registry() {
    let engine = engine_from(SCENARIO);
    let t0 = Utc::now();

    let dup = load_and_validate_str(
        r#"
[[templates]]
name = "a"
content = "x"
"#,
    )
    .unwrap();
    let mut templates = dup.templates.clone();
    templates.push(templates[0].clone());
    assert!(engine.reload(&templates).is_err());

    assert_eq!(
        engine.handle_inbound(&message("group:1", "冷静", false), t0),
        vec!["calm"]
    );
}

// ---- Composition options ----

#[test]
fn headings_and_custom_separator_apply() {
    let engine = engine_from(
        r#"
[engine]
separator = "\n\n"
headings = true

[[templates]]
name = "calm"
content = "calm-content"
priority = 10
regexs = ["冷静"]
duration = 0

[[templates]]
name = "strict"
content = "strict-content"
priority = 1
regexs = ["严格"]
duration = 0
"#,
    );
    let session: SessionId = "s".into();
    let t0 = Utc::now();
    engine.handle_inbound(&message("s", "冷静 严格", false), t0);

    assert_eq!(
        engine.build_injection_suffix(&session, t0),
        "## [strict]\nstrict-content\n\n## [calm]\ncalm-content"
    );
}

#[test]
fn max_inject_caps_one_composition_only() {
    let engine = engine_from(
        r#"
[engine]
max_inject = 1

[[templates]]
name = "one"
content = "<one>"
priority = 1
regexs = ["both"]
duration = 0

[[templates]]
name = "two"
content = "<two>"
priority = 2
regexs = ["both"]
duration = 0
"#,
    );
    let session: SessionId = "s".into();
    let t0 = Utc::now();
    engine.handle_inbound(&message("s", "both", false), t0);

    assert_eq!(engine.build_injection_suffix(&session, t0), "<one>");
    // Both records are still active; the cap applied to the request only.
    assert_eq!(engine.status(&session, t0).len(), 2);
}

#[test]
fn use_limited_template_stops_after_exhaustion() {
    let engine = engine_from(
        r#"
[[templates]]
name = "twice"
content = "<twice>"
regexs = ["go"]
duration = 0
times = 2
"#,
    );
    let session: SessionId = "s".into();
    let t0 = Utc::now();
    engine.handle_inbound(&message("s", "go", false), t0);

    assert_eq!(engine.build_injection_suffix(&session, t0), "<twice>");
    assert_eq!(engine.build_injection_suffix(&session, t0), "<twice>");
    // Third composition: the record is exhausted and pruned.
    assert_eq!(engine.build_injection_suffix(&session, t0), "");
    assert!(engine.status(&session, t0).is_empty());
}

#[test]
fn placeholders_render_in_composed_output() {
    let engine = engine_from(
        r#"
[[templates]]
name = "aware"
content = "session={session_id} template={template_name} keep={unknown}"
regexs = ["hello"]
duration = 0
"#,
    );
    let session: SessionId = "room:9".into();
    let t0 = Utc::now();
    engine.handle_inbound(&message("room:9", "hello", false), t0);

    assert_eq!(
        engine.build_injection_suffix(&session, t0),
        "session=room:9 template=aware keep={unknown}"
    );
}

// ---- Degraded patterns ----

#[test]
fn broken_pattern_never_blocks_the_rest_of_the_registry() {
    let engine = engine_from(
        r#"
[[templates]]
name = "broken"
content = "<broken>"
regexs = ["[unclosed"]
duration = 0

[[templates]]
name = "fine"
content = "<fine>"
regexs = ["fine"]
duration = 0
"#,
    );
    let t0 = Utc::now();

    // The broken template is excluded from every match call...
    assert!(engine
        .handle_inbound(&message("s", "[unclosed", false), t0)
        .is_empty());
    // ...but the rest of the registry loads and matches.
    assert_eq!(
        engine.handle_inbound(&message("s", "fine", false), t0),
        vec!["fine"]
    );
}

// ---- Template packs ----

#[test]
fn pack_file_templates_participate_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let pack_path = dir.path().join("pack.json");
    std::fs::write(
        &pack_path,
        r#"{"entries": [
            {"name": "packed", "content": "<packed>", "regexs": ["from-pack"], "duration": 0}
        ]}"#,
    )
    .unwrap();

    let toml = format!(
        r#"
templates_files = ["{}"]

[[templates]]
name = "inline"
content = "<inline>"
regexs = ["from-config"]
duration = 0
"#,
        pack_path.display()
    );
    let engine = engine_from(&toml);
    let session: SessionId = "s".into();
    let t0 = Utc::now();

    engine.handle_inbound(&message("s", "from-pack and from-config", false), t0);
    let suffix = engine.build_injection_suffix(&session, t0);
    assert!(suffix.contains("<inline>"));
    assert!(suffix.contains("<packed>"));
}

#[test]
fn export_import_round_trip_preserves_behavior() {
    let dir = tempfile::tempdir().unwrap();
    let pack_path = dir.path().join("export.json");

    let engine = engine_from(SCENARIO);
    lorekit_config::save_pack(&pack_path, &engine.export_templates()).unwrap();

    let reloaded = lorekit_config::load_pack(&pack_path).unwrap();
    let other = engine_from("");
    other.reload(&reloaded).unwrap();

    let t0 = Utc::now();
    assert_eq!(
        other.handle_inbound(&message("s", "请冷静", false), t0),
        vec!["calm"]
    );
}
