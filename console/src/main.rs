use std::env;
use std::io::{self, Write};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use client::ApiClient;
use client::error::ApiError;
use client::models::{NewDevice, UserPayload};
use client::session::FileSessionStore;
use common::config::Config;
use common::logger::init_logger;
use console::controller::ViewState;
use console::gate::{AuthGate, GateState};
use console::views::{
    AttendanceView, Confirmation, DevicesView, UsersView, fetch_overview, format_confidence,
};

const USAGE: &str = "\
Usage: console <command>

Commands:
  login                                    authenticate with the admin password
  logout                                   clear the stored session
  overview                                 headline counts: users, devices, today's attendance
  users list [--search S] [--page N]       list users
  users create [--name N] [--admission-number A] [--email E] [--phone P]
               [--roll-number R] [--class C] [--section S] [--batch B]
  users update <id> [same flags as create]
  users delete <id>                        delete a user (asks for confirmation)
  devices list                             list scanning devices
  devices create <deviceId> <name>         register a device
  devices regenerate-token <id>            rotate a device's firmware secret
  devices delete <id>                      remove a device (asks for confirmation)
  attendance list [--user-id U] [--device-id D]
                  [--from YYYY-MM-DD] [--to YYYY-MM-DD] [--page N]";

#[tokio::main]
async fn main() {
    let config = Config::init(".env");
    init_logger(&config.log_level, &config.log_file);

    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(message) = run(&args).await {
        eprintln!("error: {message}");
        std::process::exit(1);
    }
}

async fn run(args: &[String]) -> Result<(), String> {
    let config = Config::get();
    let session = FileSessionStore::new(&config.session_file)
        .map_err(|e| format!("cannot open session file {}: {e}", config.session_file))?;
    let session = Arc::new(session);
    let api = ApiClient::from_config(session.clone()).map_err(|e| e.to_string())?;
    let mut gate = AuthGate::new(session);

    let Some(command) = args.first().map(String::as_str) else {
        return Err(USAGE.to_string());
    };

    match command {
        "login" => return login(&api, &mut gate).await,
        "logout" => {
            gate.logout();
            println!("Logged out.");
            return Ok(());
        }
        _ => {}
    }

    // Every other command is protected: the gate must resolve to an
    // authenticated session before any call goes out.
    if gate.resolve() != GateState::Authenticated {
        return Err("not logged in; run `console login` first".to_string());
    }

    match (command, args.get(1).map(String::as_str)) {
        ("overview", _) => overview(&api, &mut gate).await,
        ("users", Some("list")) => users_list(&api, &mut gate, &args[2..]).await,
        ("users", Some("create")) => users_create(&api, &mut gate, &args[2..]).await,
        ("users", Some("update")) => users_update(&api, &mut gate, &args[2..]).await,
        ("users", Some("delete")) => users_delete(&api, &mut gate, &args[2..]).await,
        ("devices", Some("list")) => devices_list(&api, &mut gate).await,
        ("devices", Some("create")) => devices_create(&api, &mut gate, &args[2..]).await,
        ("devices", Some("regenerate-token")) => {
            devices_regenerate(&api, &mut gate, &args[2..]).await
        }
        ("devices", Some("delete")) => devices_delete(&api, &mut gate, &args[2..]).await,
        ("attendance", Some("list")) => attendance_list(&api, &mut gate, &args[2..]).await,
        _ => Err(USAGE.to_string()),
    }
}

async fn login(api: &ApiClient, gate: &mut AuthGate) -> Result<(), String> {
    print!("Admin password: ");
    io::stdout().flush().ok();
    let mut password = String::new();
    io::stdin()
        .read_line(&mut password)
        .map_err(|e| e.to_string())?;

    match gate.login(api, password.trim_end_matches(['\r', '\n'])).await {
        Ok(true) => {
            println!("Logged in.");
            Ok(())
        }
        Ok(false) => Err("login failed: wrong password".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

async fn overview(api: &ApiClient, gate: &mut AuthGate) -> Result<(), String> {
    let today = Local::now().date_naive();
    let overview = fetch_overview(api, today)
        .await
        .map_err(|e| fail(gate, e))?;
    println!("Users:              {}", overview.total_users);
    println!("Devices:            {}", overview.total_devices);
    println!("Today's attendance: {}", overview.todays_attendance);
    Ok(())
}

async fn users_list(api: &ApiClient, gate: &mut AuthGate, flags: &[String]) -> Result<(), String> {
    let mut view = UsersView::new();
    if let Some(search) = flag(flags, "--search") {
        view.set_search(search);
    }

    view.refresh(api).await.map_err(|e| fail(gate, e))?;
    if let Some(target) = flag_u64(flags, "--page")? {
        while view.page() < target {
            let before = view.page();
            view.next_page();
            if view.page() == before {
                break; // clamped at the last page
            }
            view.refresh(api).await.map_err(|e| fail(gate, e))?;
        }
    }

    match view.state() {
        ViewState::Data(users) => {
            for user in users {
                println!(
                    "{}  {}  {}  class {} {}  batch {}",
                    user.id, user.admission_number, user.name, user.class_name, user.section,
                    user.batch
                );
            }
            if let Some(p) = view.pagination() {
                println!("page {} of {} ({} total)", p.page, p.pages, p.total);
            }
        }
        ViewState::Empty => println!("No users found."),
        ViewState::Error(message) => return Err(format!("{message} (re-run to retry)")),
        ViewState::Loading => {}
    }
    Ok(())
}

async fn users_create(
    api: &ApiClient,
    gate: &mut AuthGate,
    flags: &[String],
) -> Result<(), String> {
    let payload = user_payload(flags);
    let mut view = UsersView::new();
    let user = view
        .create(api, &payload)
        .await
        .map_err(|e| fail(gate, e))?;
    println!("Created user {} ({})", user.name, user.id);
    Ok(())
}

async fn users_update(
    api: &ApiClient,
    gate: &mut AuthGate,
    args: &[String],
) -> Result<(), String> {
    let id = args.first().ok_or("usage: users update <id> [flags]")?;
    let payload = user_payload(&args[1..]);
    let mut view = UsersView::new();
    let user = view
        .update(api, id, &payload)
        .await
        .map_err(|e| fail(gate, e))?;
    println!("Updated user {} ({})", user.name, user.id);
    Ok(())
}

async fn users_delete(
    api: &ApiClient,
    gate: &mut AuthGate,
    args: &[String],
) -> Result<(), String> {
    let id = args.first().ok_or("usage: users delete <id>")?;
    let confirmation = confirm(&format!("Delete user {id}? This cannot be undone."));
    let mut view = UsersView::new();
    match view.delete(api, id, confirmation).await {
        Ok(true) => {
            println!("Deleted user {id}.");
            Ok(())
        }
        Ok(false) => {
            println!("Cancelled.");
            Ok(())
        }
        Err(e) => Err(fail(gate, e)),
    }
}

async fn devices_list(api: &ApiClient, gate: &mut AuthGate) -> Result<(), String> {
    let mut view = DevicesView::new();
    view.refresh(api).await.map_err(|e| fail(gate, e))?;

    match view.state() {
        ViewState::Data(devices) => {
            for device in devices {
                let events = device
                    .count
                    .as_ref()
                    .map(|c| c.attendance.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}  {}  {}  token={}  events={}",
                    device.id, device.device_id, device.name, device.token, events
                );
            }
        }
        ViewState::Empty => println!("No devices registered."),
        ViewState::Error(message) => return Err(format!("{message} (re-run to retry)")),
        ViewState::Loading => {}
    }
    Ok(())
}

async fn devices_create(
    api: &ApiClient,
    gate: &mut AuthGate,
    args: &[String],
) -> Result<(), String> {
    let (device_id, name) = match (args.first(), args.get(1)) {
        (Some(device_id), Some(name)) => (device_id.clone(), name.clone()),
        _ => return Err("usage: devices create <deviceId> <name>".to_string()),
    };
    let mut view = DevicesView::new();
    let device = view
        .create(api, &NewDevice { device_id, name })
        .await
        .map_err(|e| fail(gate, e))?;
    println!(
        "Registered device {} ({}). Firmware token: {}",
        device.device_id, device.id, device.token
    );
    Ok(())
}

async fn devices_regenerate(
    api: &ApiClient,
    gate: &mut AuthGate,
    args: &[String],
) -> Result<(), String> {
    let id = args.first().ok_or("usage: devices regenerate-token <id>")?;
    let confirmation = confirm(&format!(
        "Regenerate token for device {id}? The current token stops working immediately."
    ));
    let mut view = DevicesView::new();
    match view.regenerate_token(api, id, confirmation).await {
        Ok(Some(device)) => {
            println!("New firmware token for {}: {}", device.device_id, device.token);
            Ok(())
        }
        Ok(None) => {
            println!("Cancelled.");
            Ok(())
        }
        Err(e) => Err(fail(gate, e)),
    }
}

async fn devices_delete(
    api: &ApiClient,
    gate: &mut AuthGate,
    args: &[String],
) -> Result<(), String> {
    let id = args.first().ok_or("usage: devices delete <id>")?;
    let confirmation = confirm(&format!("Delete device {id}? This cannot be undone."));
    let mut view = DevicesView::new();
    match view.delete(api, id, confirmation).await {
        Ok(true) => {
            println!("Deleted device {id}.");
            Ok(())
        }
        Ok(false) => {
            println!("Cancelled.");
            Ok(())
        }
        Err(e) => Err(fail(gate, e)),
    }
}

async fn attendance_list(
    api: &ApiClient,
    gate: &mut AuthGate,
    flags: &[String],
) -> Result<(), String> {
    let mut view = AttendanceView::new();
    view.set_user_id(flag(flags, "--user-id").map(str::to_string));
    view.set_device_id(flag(flags, "--device-id").map(str::to_string));
    let start = flag_date(flags, "--from")?;
    let end = flag_date(flags, "--to")?;
    view.set_date_range(start, end);

    view.refresh(api).await.map_err(|e| fail(gate, e))?;
    if let Some(target) = flag_u64(flags, "--page")? {
        while view.page() < target {
            let before = view.page();
            view.next_page();
            if view.page() == before {
                break;
            }
            view.refresh(api).await.map_err(|e| fail(gate, e))?;
        }
    }

    match view.state() {
        ViewState::Data(records) => {
            for record in records {
                println!(
                    "{}  {:>3}  {:>6}  {}  via {}",
                    record.created_at.format("%Y-%m-%d %H:%M:%S"),
                    record.event,
                    format_confidence(record.confidence),
                    record.user.name,
                    record.device.name
                );
            }
            if let Some(p) = view.pagination() {
                println!("page {} of {} ({} total)", p.page, p.pages, p.total);
            }
        }
        ViewState::Empty => println!("No attendance records match."),
        ViewState::Error(message) => return Err(format!("{message} (re-run to retry)")),
        ViewState::Loading => {}
    }
    Ok(())
}

/// Converts an API failure into the message shown to the operator. An
/// authorization failure additionally ends the session through the gate.
fn fail(gate: &mut AuthGate, e: ApiError) -> String {
    if gate.on_auth_failure(&e).is_some() {
        return "session expired; run `console login` again".to_string();
    }
    e.server_message()
        .map(str::to_string)
        .unwrap_or_else(|| e.to_string())
}

fn confirm(prompt: &str) -> Confirmation {
    print!("{prompt} [y/N]: ");
    io::stdout().flush().ok();
    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_err() {
        return Confirmation::Cancelled;
    }
    match line.trim().to_lowercase().as_str() {
        "y" | "yes" => Confirmation::Confirmed,
        _ => Confirmation::Cancelled,
    }
}

fn user_payload(flags: &[String]) -> UserPayload {
    UserPayload {
        admission_number: flag(flags, "--admission-number").map(str::to_string),
        name: flag(flags, "--name").map(str::to_string),
        email: flag(flags, "--email").map(str::to_string),
        phone: flag(flags, "--phone").map(str::to_string),
        roll_number: flag(flags, "--roll-number").map(str::to_string),
        class_name: flag(flags, "--class").map(str::to_string),
        section: flag(flags, "--section").map(str::to_string),
        batch: flag(flags, "--batch").map(str::to_string),
    }
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn flag_u64(args: &[String], name: &str) -> Result<Option<u64>, String> {
    match flag(args, name) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| format!("{name} expects a positive number, got '{raw}'")),
        None => Ok(None),
    }
}

fn flag_date(args: &[String], name: &str) -> Result<Option<NaiveDate>, String> {
    match flag(args, name) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| format!("{name} expects YYYY-MM-DD, got '{raw}'")),
        None => Ok(None),
    }
}
