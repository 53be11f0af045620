//! Unit tests for the `adesk` CLI entrypoint module.

use super::{
    api_url, envelope_data, error_message_for_response, format_deleted, format_file_rows,
    format_folder_rows, format_quote_rows, format_record_output, format_slots_output,
    format_task_rows, normalize_server, resolve_server, toggled_status, upload_name,
};
use super::{Cli, Commands, FileCommand, TaskCommand};
use agencydesk_core::env::{env_lock, EnvGuard};
use agencydesk_core::constants::{DEFAULT_CLI_SERVER_URL, DEFAULT_PORT};
use clap::Parser;
use serde_json::json;

#[test]
fn normalize_server_matrix() {
    let cases = [
        (
            DEFAULT_CLI_SERVER_URL.to_string(),
            format!("http://127.0.0.1:{}", DEFAULT_PORT),
        ),
        (
            format!("https://localhost:{}", DEFAULT_PORT),
            format!("https://localhost:{}", DEFAULT_PORT),
        ),
        (
            format!("http://127.0.0.1:{}/", DEFAULT_PORT),
            format!("http://127.0.0.1:{}", DEFAULT_PORT),
        ),
    ];
    for (input, expected) in cases {
        assert_eq!(normalize_server(input), expected);
    }
}

#[test]
fn default_cli_server_url_uses_default_port_constant() {
    assert_eq!(
        DEFAULT_CLI_SERVER_URL,
        format!("http://localhost:{}", DEFAULT_PORT)
    );
}

#[test]
fn resolve_server_treats_blank_override_as_absent() {
    assert_eq!(resolve_server(Some("   ".to_string())), DEFAULT_CLI_SERVER_URL);
    assert_eq!(
        resolve_server(Some(" http://127.0.0.1:4000 ".to_string())),
        "http://127.0.0.1:4000"
    );
    assert_eq!(resolve_server(None), DEFAULT_CLI_SERVER_URL);
}

#[test]
fn error_message_for_response_prefers_json_error_field() {
    let status = reqwest::StatusCode::BAD_GATEWAY;
    let message = error_message_for_response(status, r#"{"error":"quota exceeded"}"#);
    assert_eq!(message, "quota exceeded");
}

#[test]
fn error_message_for_response_uses_reason_for_empty_body() {
    let status = reqwest::StatusCode::UNAUTHORIZED;
    let message = error_message_for_response(status, "   ");
    assert_eq!(message, "Unauthorized");
}

#[test]
fn envelope_data_unwraps_data_and_surfaces_errors() {
    let data = envelope_data(json!({ "data": { "id": "f1" } })).expect("data");
    assert_eq!(data["id"], "f1");

    let err = envelope_data(json!({ "error": "not found" })).expect_err("error envelope");
    assert_eq!(err, "not found");

    let err = envelope_data(json!({})).expect_err("empty envelope");
    assert!(err.contains("missing 'data'"));

    assert!(envelope_data(json!([1, 2])).is_err());
}

#[test]
fn table_output_renders_one_row_per_item() {
    let folders = json!([
        { "id": "f1", "name": "Contracts", "item_count": 3 },
        { "id": "f2", "name": "Invoices", "item_count": 0 }
    ]);
    let rendered = format_folder_rows(&folders, false).expect("folders");
    let rows: Vec<&str> = rendered.lines().collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].starts_with("f1"));
    assert!(rows[0].contains("Contracts"));
    assert!(rows[0].trim_end().ends_with('3'));

    let files = json!([{
        "id": "a",
        "name": "report.pdf",
        "size_label": "2.0 MB",
        "uploaded_label": "Mar 4, 2026"
    }]);
    let rendered = format_file_rows(&files, false).expect("files");
    assert!(rendered.contains("report.pdf"));
    assert!(rendered.contains("2.0 MB"));

    let tasks = json!([
        { "id": "t1", "title": "Ship", "status": "done", "priority": "high" },
        { "id": "t2", "title": "Plan", "status": "todo", "priority": "low" }
    ]);
    let rendered = format_task_rows(&tasks, false).expect("tasks");
    assert!(rendered.lines().next().unwrap_or_default().starts_with("[x]"));
    assert!(rendered.lines().nth(1).unwrap_or_default().starts_with("[ ]"));

    let quotes = json!([
        { "id": "q1", "number": "Q-0001", "status": "sent", "client_name": "Acme" }
    ]);
    let rendered = format_quote_rows(&quotes, false).expect("quotes");
    assert!(rendered.contains("Q-0001"));
    assert!(rendered.contains("Acme"));

    assert!(format_folder_rows(&json!({ "id": "x" }), false).is_err());
}

#[test]
fn json_output_helpers_preserve_payload_shape() {
    let folders = json!([{ "id": "f1", "name": "Contracts", "item_count": 3 }]);
    let rendered = format_folder_rows(&folders, true).expect("folder json output should render");
    let parsed: serde_json::Value =
        serde_json::from_str(&rendered).expect("rendered folders should be valid json");
    assert_eq!(parsed[0]["item_count"], 3);

    let deleted = json!({ "id": "f1" });
    let rendered = format_deleted("f1", &deleted, true).expect("delete json output");
    let parsed: serde_json::Value =
        serde_json::from_str(&rendered).expect("rendered delete should be valid json");
    assert_eq!(parsed["id"], "f1");
    assert_eq!(
        format_deleted("f1", &deleted, false).expect("plain"),
        "Deleted: f1"
    );
}

#[test]
fn record_output_requires_id_and_label() {
    let task = json!({ "id": "t1", "title": "Ship" });
    assert_eq!(
        format_record_output("Created", &task, "title", false).expect("record"),
        "Created: Ship (t1)"
    );
    let err = format_record_output("Created", &task, "number", false).expect_err("label");
    assert!(err.contains("'number'"));
    assert!(format_record_output("Created", &json!({ "title": "x" }), "title", false).is_err());
}

#[test]
fn slots_output_lists_times_or_reports_none() {
    let open = json!({ "date": "2030-01-07", "slots": ["09:00", "09:30"] });
    assert_eq!(
        format_slots_output(&open, false).expect("slots"),
        "09:00  09:30"
    );
    let none = json!({ "date": "2030-01-05", "slots": [] });
    assert_eq!(
        format_slots_output(&none, false).expect("slots"),
        "No open slots"
    );
}

#[test]
fn toggled_status_flips_done_and_open_tasks() {
    let tasks = json!([
        { "id": "t1", "status": "done" },
        { "id": "t2", "status": "in_progress" }
    ]);
    assert_eq!(toggled_status(&tasks, "t1"), Ok("todo"));
    assert_eq!(toggled_status(&tasks, "t2"), Ok("done"));
    assert!(toggled_status(&tasks, "t3").is_err());
}

#[test]
fn upload_name_defaults_to_local_file_name() {
    assert_eq!(
        upload_name("/tmp/out/report.pdf", None),
        Ok("report.pdf".to_string())
    );
    assert_eq!(
        upload_name("/tmp/out/report.pdf", Some("final.pdf".to_string())),
        Ok("final.pdf".to_string())
    );
    assert!(upload_name("/", None).is_err());
}

#[test]
fn api_url_encodes_path_segments() {
    let url = api_url(
        &format!("http://127.0.0.1:{}", DEFAULT_PORT),
        &["api", "files", "id/with?reserved#chars"],
    )
    .expect("api_url should build");
    assert_eq!(
        url.as_str(),
        &format!(
            "http://127.0.0.1:{}/api/files/id%2Fwith%3Freserved%23chars",
            DEFAULT_PORT
        )
    );
}

#[test]
fn cli_parses_nested_subcommands() {
    let cli = Cli::try_parse_from(["adesk", "file", "move", "abc", "f2"])
        .expect("cli should parse file move");
    match cli.command {
        Commands::File(FileCommand::Move { id, folder_id }) => {
            assert_eq!(id, "abc");
            assert_eq!(folder_id, "f2");
        }
        _ => panic!("expected file move command"),
    }

    let cli = Cli::try_parse_from(["adesk", "task", "new", "Ship it", "--priority", "high"])
        .expect("cli should parse task new");
    match cli.command {
        Commands::Task(TaskCommand::New {
            title, priority, ..
        }) => {
            assert_eq!(title, "Ship it");
            assert_eq!(priority.as_deref(), Some("high"));
        }
        _ => panic!("expected task new command"),
    }
}

#[test]
fn session_env_vars_feed_global_flags() {
    let _lock = env_lock().lock().expect("env lock");
    let _user = EnvGuard::set("ADESK_USER", "alice");
    let _server = EnvGuard::set("ADESK_SERVER", "http://127.0.0.1:47777");
    let cli = Cli::parse_from(["adesk", "folder", "list"]);
    assert_eq!(cli.user.as_deref(), Some("alice"));
    assert_eq!(resolve_server(cli.server), "http://127.0.0.1:47777");
}
