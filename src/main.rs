use anyhow::{Context, Result};
use permission_gate::cli::Console;
use permission_gate::logging::init_logging;
use permission_gate::permissions::{PermissionManager, PermissionMediator, PermissionRequest};
use permission_gate::GateConfig;

fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => GateConfig::from_file(&path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => GateConfig::default(),
    }
    .with_env();

    init_logging(&config.log_dir)?;
    tracing::info!(
        "Starting permission gate with {} trusted origin(s), file {}",
        config.trusted_origins.len(),
        config.permission_file.display()
    );

    let mut manager = PermissionManager::from_config(&config);
    let mediator = PermissionMediator::new(Console::new());
    let console = mediator.prompt();

    console.print_banner();

    loop {
        let line = match console.read_input() {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read input: {}", e);
                console.print_error(&format!("Failed to read input: {}", e));
                break;
            }
        };

        let mut parts = line.split_whitespace();
        let (target, capability) = match (parts.next(), parts.next(), parts.next()) {
            (None, _, _) => continue,
            (Some("exit" | "quit"), None, _) => break,
            (Some("list"), None, _) => {
                print_records(console, &manager);
                continue;
            }
            (Some(target), Some(capability), None) => (target, capability),
            _ => {
                console.print_error("expected '<url> <capability>'");
                continue;
            }
        };

        match mediator.handle_url(&mut manager, target, capability) {
            Ok(verdict) => {
                let request = PermissionRequest::from_url(target, capability)
                    .unwrap_or_else(|| PermissionRequest::new(target, capability));
                console.print_verdict(&request, verdict);
            }
            Err(e) => {
                tracing::error!("Permission request failed: {}", e);
                console.print_error(&e.to_string());
            }
        }
    }

    tracing::info!("Permission gate stopped");
    Ok(())
}

fn print_records(console: &Console, manager: &PermissionManager) {
    console.print_separator();
    let mut trusted: Vec<&str> = manager.trusted_origins().collect();
    trusted.sort_unstable();
    for origin in trusted {
        console.print_system(&format!("trusted: {}", origin));
    }
    if manager.is_empty() {
        console.print_system(&format!("no decisions in {}", manager.path().display()));
    }
    for (origin, capability, decision) in manager.records() {
        console.print_record(origin, capability, decision);
    }
    console.print_separator();
}
