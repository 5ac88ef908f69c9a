mod cli;

use streamgate::{
    auth::{HttpAuthorizationService, RequestContext, ValidationRequest},
    config,
    origin::MemoryLocation,
    playback::SimulatedTransport,
    player::{PlayerSession, PlayerView},
    validator,
};
use streamgate_common::{Credential, Error, NetworkOrigin, Verdict};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;

/// How often the simulated transport advances during `watch`.
const TRANSPORT_TICK: Duration = Duration::from_millis(250);

async fn watch(
    config_path: Option<&std::path::Path>,
    token: String,
    username: Option<String>,
    location: Option<String>,
    duration: f64,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let href = location.unwrap_or_else(|| config.client.location.clone());
    let location = Arc::new(MemoryLocation::parse(&href)?);
    let service = Arc::new(HttpAuthorizationService::new(
        config.service.url.clone(),
        &config.client.user_agent,
    ));
    let transport = Arc::new(SimulatedTransport::new(duration));

    tracing::info!("Validating against {}", service.url());

    let mut player = PlayerSession::new(
        &config,
        service,
        location.clone(),
        transport.clone(),
        Credential::new(token),
        username,
    );
    player.mount();

    println!("Location: {}", location.href());
    print_view(&player.view());
    print_help();

    let mut verdicts = player.subscribe();
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut clock = tokio::time::interval(TRANSPORT_TICK);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = verdicts.changed() => {
                if changed.is_err() {
                    break;
                }
                let verdict = verdicts.borrow_and_update().clone();
                print_verdict(&verdict);
            }
            _ = clock.tick() => {
                for event in transport.tick(TRANSPORT_TICK.as_secs_f64()) {
                    player.handle_transport_event(event);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                if !handle_command(&mut player, &location, &config.origin.param, line.trim()) {
                    break;
                }
            }
        }
    }

    player.teardown();
    Ok(())
}

/// Apply one interactive command. Returns `false` when the session should end.
fn handle_command(
    player: &mut PlayerSession,
    location: &MemoryLocation,
    origin_param: &str,
    line: &str,
) -> bool {
    let (command, argument) = match line.split_once(char::is_whitespace) {
        Some((command, argument)) => (command, argument.trim()),
        None => (line, ""),
    };

    match command {
        "" => {}
        "play" | "pause" | "p" => {
            let status = player.play_pause();
            println!("Status: {}", status);
        }
        "seek" => match argument.parse::<f64>() {
            Ok(position) => match player.seek(position) {
                Some(applied) => println!("Position: {}", streamgate::player::format_time(applied)),
                None => println!("Seek ignored: access not granted"),
            },
            Err(_) => println!("Usage: seek <seconds>"),
        },
        "mute" => {
            let muted = player.toggle_mute();
            println!("{}", if muted { "Muted" } else { "Unmuted" });
        }
        "token" => {
            player.set_credential(Credential::new(argument));
            println!("Location: {}", location.href());
        }
        "ip" => {
            location.navigate_param(origin_param, argument);
            if player.location_changed() {
                println!("Origin changed; validation restarted");
            }
            println!("Location: {}", location.href());
        }
        "user" => {
            let username = (!argument.is_empty()).then(|| argument.to_string());
            player.set_username(username);
            println!("{}", player.view().mode_label);
        }
        "status" => print_view(&player.view()),
        "quit" | "exit" | "q" => return false,
        "help" | "?" => print_help(),
        other => {
            println!("Unknown command: {}", other);
            print_help();
        }
    }

    true
}

fn print_help() {
    println!("Commands: play | pause | seek <secs> | mute | token <t> | ip <addr> | user <name> | status | quit");
}

fn print_verdict(verdict: &Verdict) {
    if verdict.is_valid {
        println!("✓ Access granted: {}", verdict.message);
    } else {
        println!("✗ Access denied: {}", verdict.message);
    }
}

fn print_view(view: &PlayerView) {
    println!("{}", view.origin_banner);
    match view.username {
        Some(ref name) => println!("{} | User: {}", view.mode_label, name),
        None => println!("{}", view.mode_label),
    }
    println!(
        "Status: {}  {}  [{}]",
        view.playback.status,
        view.time_label,
        if view.playback.muted { "muted" } else { "sound on" }
    );
    if let Some(ref overlay) = view.denied_overlay {
        println!("Access Denied: {}", overlay);
    }
}

async fn check(
    config_path: Option<&std::path::Path>,
    token: String,
    ip: Option<String>,
    json: bool,
) -> Result<bool> {
    let config = config::load_config_or_default(config_path)?;
    let credential = Credential::new(token);

    let verdict = if credential.is_empty() {
        Error::MissingCredential.verdict()
    } else {
        let origin = match ip {
            Some(address) => NetworkOrigin::caller_provided(address),
            None => NetworkOrigin::defaulted(config.origin.default_address.clone()),
        };
        let service =
            HttpAuthorizationService::new(config.service.url.clone(), &config.client.user_agent);
        let request =
            ValidationRequest::new(&credential, &origin, &RequestContext::from_config(&config));
        validator::evaluate(&service, &request).await
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        print_verdict(&verdict);
    }

    Ok(verdict.is_valid)
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_config(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            print_config(&config::Config::default());
        }
    }

    Ok(())
}

fn print_config(config: &config::Config) {
    println!("  Service: {}", config.service.url);
    println!("  Interval: {}ms", config.validation.interval_ms);
    println!("  Claim: {}", config.validation.claim);
    println!(
        "  Default origin: {} (param '{}')",
        config.origin.default_address, config.origin.param
    );
    println!(
        "  Media: {}{}",
        config.media.base_url, config.media.resource_path
    );
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "streamgate=trace,streamgate_common=debug,reqwest=debug".to_string()
        } else {
            "streamgate=info,reqwest=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Watch {
            token,
            username,
            location,
            duration,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(watch(
                cli.config.as_deref(),
                token,
                username,
                location,
                duration,
            ))
        }
        Commands::Check { token, ip, json } => {
            let rt = tokio::runtime::Runtime::new()?;
            let valid = rt.block_on(check(cli.config.as_deref(), token, ip, json))?;
            if !valid {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("streamgate {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
