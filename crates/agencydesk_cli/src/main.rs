//! Command-line client for the AgencyDesk API.

use agencydesk_core::constants::{DEFAULT_CLI_SERVER_URL, EMAIL_HEADER, USER_HEADER};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use reqwest::Method;
use serde_json::{json, Value};
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "adesk", about = "AgencyDesk CLI", version)]
struct Cli {
    /// Server URL (can also be set via ADESK_SERVER env var)
    #[arg(short, long, env = "ADESK_SERVER")]
    server: Option<String>,

    /// Acting user id, sent as the session header
    #[arg(short, long, env = "ADESK_USER", global = true)]
    user: Option<String>,

    /// Acting user's email address
    #[arg(long, env = "ADESK_EMAIL", global = true)]
    email: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Print timing for API requests
    #[arg(long, global = true)]
    timing: bool,

    /// Request timeout in seconds
    #[arg(short = 't', long, default_value = "30")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Manage document folders
    #[command(subcommand)]
    Folder(FolderCommand),
    /// Manage uploaded files
    #[command(subcommand)]
    File(FileCommand),
    /// Manage the task board
    #[command(subcommand)]
    Task(TaskCommand),
    /// Manage quotes and invoices
    #[command(subcommand)]
    Quote(QuoteCommand),
    /// Show open booking slots for a day (YYYY-MM-DD)
    Slots { date: String },
}

#[derive(Subcommand)]
enum FolderCommand {
    List,
    New { name: String },
    Rename { id: String, name: String },
    Delete { id: String },
}

#[derive(Subcommand)]
enum FileCommand {
    List {
        folder_id: String,
    },
    Upload {
        folder_id: String,
        path: String,
        /// Stored name (defaults to the local file name)
        #[arg(short, long)]
        name: Option<String>,
    },
    Rename {
        id: String,
        name: String,
    },
    Move {
        id: String,
        folder_id: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum TaskCommand {
    List,
    New {
        title: String,
        #[arg(short, long)]
        priority: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(short, long)]
        due: Option<String>,
    },
    /// Toggle a task between done and todo
    Done { id: String },
    /// Move a task to a column (todo, in_progress, review, done)
    Move { id: String, status: String },
    Delete { id: String },
}

#[derive(Subcommand)]
enum QuoteCommand {
    List,
    /// Set a quote or invoice status (draft, sent, accepted, declined, paid)
    Status { id: String, status: String },
    /// Create an invoice from an accepted quote
    Invoice { id: String },
    Delete { id: String },
}

fn log_timing(timing: bool, label: &str, request: Duration, parse: Duration) {
    if !timing {
        return;
    }
    let total = request + parse;
    eprintln!(
        "[timing] {}: request {:.1} ms, parse {:.1} ms, total {:.1} ms",
        label,
        request.as_secs_f64() * 1000.0,
        parse.as_secs_f64() * 1000.0,
        total.as_secs_f64() * 1000.0
    );
}

fn error_message_for_response(status: reqwest::StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return value
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or(body)
            .to_string();
    }

    body.to_string()
}

async fn ensure_success_or_exit(res: reqwest::Response, action: &str) -> reqwest::Response {
    let status = res.status();
    if status.is_success() {
        return res;
    }

    let body = match res.text().await {
        Ok(body) => body,
        Err(err) => format!("failed to read error response body: {}", err),
    };
    let message = error_message_for_response(status, &body);
    eprintln!("{} failed ({}): {}", action, status, message);
    std::process::exit(1);
}

/// Unwrap the `data` member of an action envelope.
fn envelope_data(body: Value) -> Result<Value, String> {
    match body {
        Value::Object(mut map) => {
            if let Some(error) = map.get("error").and_then(Value::as_str) {
                return Err(error.to_string());
            }
            map.remove("data")
                .ok_or_else(|| "response missing 'data' field".to_string())
        }
        _ => Err("response is not a JSON object".to_string()),
    }
}

fn or_exit<T>(action: &str, result: Result<T, String>) -> T {
    match result {
        Ok(value) => value,
        Err(message) => {
            eprintln!("{} failed: {}", action, message);
            std::process::exit(1);
        }
    }
}

fn field<'a>(value: &'a Value, name: &str) -> &'a str {
    value.get(name).and_then(Value::as_str).unwrap_or("-")
}

fn rows_or_json(
    items: &Value,
    json: bool,
    row: impl Fn(&Value) -> String,
) -> Result<String, String> {
    if json {
        return serde_json::to_string_pretty(items)
            .map_err(|err| format!("response encoding error: {}", err));
    }
    let items = items
        .as_array()
        .ok_or_else(|| "expected a list in 'data'".to_string())?;
    Ok(items.iter().map(row).collect::<Vec<_>>().join("\n"))
}

fn format_folder_rows(folders: &Value, json: bool) -> Result<String, String> {
    rows_or_json(folders, json, |folder| {
        format!(
            "{:<36} {:<30} {:>5}",
            field(folder, "id"),
            field(folder, "name"),
            folder.get("item_count").and_then(Value::as_u64).unwrap_or(0)
        )
    })
}

fn format_file_rows(files: &Value, json: bool) -> Result<String, String> {
    rows_or_json(files, json, |file| {
        format!(
            "{:<36} {:<30} {:>10}  {}",
            field(file, "id"),
            field(file, "name"),
            field(file, "size_label"),
            field(file, "uploaded_label")
        )
    })
}

fn format_task_rows(tasks: &Value, json: bool) -> Result<String, String> {
    rows_or_json(tasks, json, |task| {
        let mark = if field(task, "status") == "done" { "x" } else { " " };
        format!(
            "[{}] {:<36} {:<12} {:<7} {}",
            mark,
            field(task, "id"),
            field(task, "status"),
            field(task, "priority"),
            field(task, "title")
        )
    })
}

fn format_quote_rows(quotes: &Value, json: bool) -> Result<String, String> {
    rows_or_json(quotes, json, |quote| {
        format!(
            "{:<36} {:<9} {:<9} {}",
            field(quote, "id"),
            field(quote, "number"),
            field(quote, "status"),
            field(quote, "client_name")
        )
    })
}

fn format_record_output(
    verb: &str,
    record: &Value,
    label_field: &str,
    json: bool,
) -> Result<String, String> {
    if json {
        return serde_json::to_string_pretty(record)
            .map_err(|err| format!("response encoding error: {}", err));
    }
    let id = record
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| "response missing 'id' field".to_string())?;
    let label = record
        .get(label_field)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("response missing '{}' field", label_field))?;
    Ok(format!("{}: {} ({})", verb, label, id))
}

fn api_url(server: &str, segments: &[&str]) -> Result<reqwest::Url, String> {
    let mut url = reqwest::Url::parse(server)
        .map_err(|err| format!("Invalid server URL '{}': {}", server, err))?;
    let mut path = url
        .path_segments_mut()
        .map_err(|_| "Server URL cannot be used as an API base".to_string())?;
    path.pop_if_empty();
    for segment in segments {
        path.push(segment);
    }
    drop(path);
    Ok(url)
}

fn normalize_server(server: String) -> String {
    if let Ok(mut url) = reqwest::Url::parse(&server) {
        let should_normalize_localhost =
            url.scheme().eq_ignore_ascii_case("http") && url.host_str() == Some("localhost");
        if should_normalize_localhost && url.set_host(Some("127.0.0.1")).is_err() {
            return server;
        }
        let mut normalized = url.to_string();
        while normalized.ends_with('/') {
            normalized.pop();
        }
        return normalized;
    }
    server
}

fn explicit_value(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn resolve_server(server: Option<String>) -> String {
    explicit_value(server).unwrap_or_else(|| DEFAULT_CLI_SERVER_URL.to_string())
}

fn upload_name(path: &str, name: Option<String>) -> Result<String, String> {
    if let Some(name) = explicit_value(name) {
        return Ok(name);
    }
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| format!("cannot derive a file name from '{}'", path))
}

/// Session headers and connection settings shared by every request.
struct Api {
    client: reqwest::Client,
    server: String,
    user: Option<String>,
    email: Option<String>,
    timing: bool,
}

impl Api {
    fn request(
        &self,
        method: reqwest::Method,
        action: &str,
        segments: &[&str],
    ) -> reqwest::RequestBuilder {
        let url = or_exit(action, api_url(&self.server, segments));
        let mut builder = self.client.request(method, url);
        if let Some(user) = &self.user {
            builder = builder.header(USER_HEADER, user);
        }
        if let Some(email) = &self.email {
            builder = builder.header(EMAIL_HEADER, email);
        }
        builder
    }

    /// Send `builder` and return the envelope's `data`, exiting on failure.
    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        action: &str,
    ) -> Result<Value, Box<dyn std::error::Error>> {
        let request_start = Instant::now();
        let res = builder.send().await?;
        let request_elapsed = request_start.elapsed();
        let res = ensure_success_or_exit(res, action).await;

        let parse_start = Instant::now();
        let body: Value = res.json().await?;
        let parse_elapsed = parse_start.elapsed();

        log_timing(self.timing, &action.to_ascii_lowercase(), request_elapsed, parse_elapsed);
        Ok(or_exit(action, envelope_data(body)))
    }
}

fn print_output(action: &str, output: Result<String, String>) {
    let output = or_exit(action, output);
    if !output.is_empty() {
        println!("{}", output);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Cli {
        server,
        user,
        email,
        json,
        timing,
        timeout,
        command,
    } = Cli::parse();

    if let Commands::Completions { shell } = &command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let api = Api {
        client: reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()?,
        server: normalize_server(resolve_server(server)),
        user: explicit_value(user),
        email: explicit_value(email),
        timing,
    };

    match command {
        Commands::Completions { .. } => unreachable!("completions handled before client setup"),
        Commands::Folder(cmd) => match cmd {
            FolderCommand::List => {
                let req = api.request(Method::GET, "List folders", &["api", "folders"]);
                let folders = api.send(req, "List folders").await?;
                print_output("List folders", format_folder_rows(&folders, json));
            }
            FolderCommand::New { name } => {
                let req = api
                    .request(Method::POST, "New folder", &["api", "folders"])
                    .json(&json!({ "name": name }));
                let folder = api.send(req, "New folder").await?;
                print_output("New folder", format_record_output("Created", &folder, "name", json));
            }
            FolderCommand::Rename { id, name } => {
                let req = api
                    .request(Method::PUT, "Rename folder", &["api", "folders", id.as_str()])
                    .json(&json!({ "name": name }));
                let folder = api.send(req, "Rename folder").await?;
                print_output(
                    "Rename folder",
                    format_record_output("Renamed", &folder, "name", json),
                );
            }
            FolderCommand::Delete { id } => {
                let req = api.request(
                    Method::DELETE,
                    "Delete folder",
                    &["api", "folders", id.as_str()],
                );
                let deleted = api.send(req, "Delete folder").await?;
                print_output("Delete folder", format_deleted(&id, &deleted, json));
            }
        },
        Commands::File(cmd) => match cmd {
            FileCommand::List { folder_id } => {
                let segments = ["api", "folders", folder_id.as_str(), "files"];
                let req = api.request(Method::GET, "List files", &segments);
                let files = api.send(req, "List files").await?;
                print_output("List files", format_file_rows(&files, json));
            }
            FileCommand::Upload {
                folder_id,
                path,
                name,
            } => {
                let name = or_exit("Upload", upload_name(&path, name));
                let bytes = std::fs::read(&path)?;
                let segments = ["api", "folders", folder_id.as_str(), "files"];
                let req = api
                    .request(Method::POST, "Upload", &segments)
                    .query(&[("name", name.as_str())])
                    .body(bytes);
                let file = api.send(req, "Upload").await?;
                print_output("Upload", format_record_output("Uploaded", &file, "name", json));
            }
            FileCommand::Rename { id, name } => {
                let req = api
                    .request(Method::PUT, "Rename file", &["api", "files", id.as_str()])
                    .json(&json!({ "name": name }));
                let file = api.send(req, "Rename file").await?;
                print_output("Rename file", format_record_output("Renamed", &file, "name", json));
            }
            FileCommand::Move { id, folder_id } => {
                let req = api
                    .request(Method::PUT, "Move file", &["api", "files", id.as_str()])
                    .json(&json!({ "folder_id": folder_id }));
                let file = api.send(req, "Move file").await?;
                print_output("Move file", format_record_output("Moved", &file, "name", json));
            }
            FileCommand::Delete { id } => {
                let req = api.request(
                    Method::DELETE,
                    "Delete file",
                    &["api", "files", id.as_str()],
                );
                let deleted = api.send(req, "Delete file").await?;
                print_output("Delete file", format_deleted(&id, &deleted, json));
            }
        },
        Commands::Task(cmd) => match cmd {
            TaskCommand::List => {
                let req = api.request(Method::GET, "List tasks", &["api", "tasks"]);
                let tasks = api.send(req, "List tasks").await?;
                print_output("List tasks", format_task_rows(&tasks, json));
            }
            TaskCommand::New {
                title,
                priority,
                due,
            } => {
                let req = api
                    .request(Method::POST, "New task", &["api", "tasks"])
                    .json(&json!({ "title": title, "priority": priority, "due_date": due }));
                let task = api.send(req, "New task").await?;
                print_output("New task", format_record_output("Created", &task, "title", json));
            }
            TaskCommand::Done { id } => {
                let get = api.request(Method::GET, "Toggle task", &["api", "tasks"]);
                let tasks = api.send(get, "Toggle task").await?;
                let status = or_exit("Toggle task", toggled_status(&tasks, &id));
                let req = api
                    .request(Method::PUT, "Toggle task", &["api", "tasks", id.as_str()])
                    .json(&json!({ "status": status }));
                let task = api.send(req, "Toggle task").await?;
                print_output("Toggle task", format_record_output("Updated", &task, "status", json));
            }
            TaskCommand::Move { id, status } => {
                let req = api
                    .request(Method::PUT, "Move task", &["api", "tasks", id.as_str()])
                    .json(&json!({ "status": status }));
                let task = api.send(req, "Move task").await?;
                print_output("Move task", format_record_output("Moved", &task, "status", json));
            }
            TaskCommand::Delete { id } => {
                let req = api.request(
                    Method::DELETE,
                    "Delete task",
                    &["api", "tasks", id.as_str()],
                );
                let deleted = api.send(req, "Delete task").await?;
                print_output("Delete task", format_deleted(&id, &deleted, json));
            }
        },
        Commands::Quote(cmd) => match cmd {
            QuoteCommand::List => {
                let req = api.request(Method::GET, "List quotes", &["api", "quotes"]);
                let quotes = api.send(req, "List quotes").await?;
                print_output("List quotes", format_quote_rows(&quotes, json));
            }
            QuoteCommand::Status { id, status } => {
                let req = api
                    .request(Method::PUT, "Quote status", &["api", "quotes", id.as_str()])
                    .json(&json!({ "status": status }));
                let quote = api.send(req, "Quote status").await?;
                print_output(
                    "Quote status",
                    format_record_output("Updated", &quote, "number", json),
                );
            }
            QuoteCommand::Invoice { id } => {
                let segments = ["api", "quotes", id.as_str(), "invoice"];
                let req = api.request(Method::POST, "Invoice", &segments);
                let invoice = api.send(req, "Invoice").await?;
                print_output("Invoice", format_record_output("Created", &invoice, "number", json));
            }
            QuoteCommand::Delete { id } => {
                let req = api.request(
                    Method::DELETE,
                    "Delete quote",
                    &["api", "quotes", id.as_str()],
                );
                let deleted = api.send(req, "Delete quote").await?;
                print_output("Delete quote", format_deleted(&id, &deleted, json));
            }
        },
        Commands::Slots { date } => {
            let req = api
                .request(Method::GET, "Slots", &["api", "booking", "availability"])
                .query(&[("date", date.as_str())]);
            let availability = api.send(req, "Slots").await?;
            print_output("Slots", format_slots_output(&availability, json));
        }
    }

    Ok(())
}

fn format_deleted(id: &str, response: &Value, json: bool) -> Result<String, String> {
    if json {
        return serde_json::to_string_pretty(response)
            .map_err(|err| format!("response encoding error: {}", err));
    }
    Ok(format!("Deleted: {}", id))
}

fn format_slots_output(availability: &Value, json: bool) -> Result<String, String> {
    if json {
        return serde_json::to_string_pretty(availability)
            .map_err(|err| format!("response encoding error: {}", err));
    }
    let slots = availability
        .get("slots")
        .and_then(Value::as_array)
        .ok_or_else(|| "response missing 'slots' field".to_string())?;
    if slots.is_empty() {
        return Ok("No open slots".to_string());
    }
    Ok(slots
        .iter()
        .filter_map(Value::as_str)
        .collect::<Vec<_>>()
        .join("  "))
}

/// Status a task moves to when its checkbox is toggled.
fn toggled_status(tasks: &Value, id: &str) -> Result<&'static str, String> {
    let task = tasks
        .as_array()
        .and_then(|tasks| tasks.iter().find(|task| field(task, "id") == id))
        .ok_or_else(|| format!("no task with id '{}'", id))?;
    Ok(if field(task, "status") == "done" {
        "todo"
    } else {
        "done"
    })
}

#[cfg(test)]
mod tests;
