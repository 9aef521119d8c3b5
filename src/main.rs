// Main entry point
use clap::Parser;
use colored::Colorize;
use qiita_sync::application::dashboard::{Dashboard, DashboardView};
use qiita_sync::domain::model::{clamp_page, clamp_per_page, QueryPatch};
use qiita_sync::infrastructure::config::{self, load_config};
use qiita_sync::infrastructure::storage::cache::ResourceState;
use qiita_sync::interfaces::cli::Cli;
use qiita_sync::interfaces::repl::{self, Outcome};
use qiita_sync::presentation::render::{format_dashboard, RenderOptions};
use qiita_sync::presentation::theme::Theme;
use qiita_sync::state::AppState;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config()?;

    // Initialize logging
    if config.logging.enable {
        init_logging(&config.logging)?;
    }

    if cli.generate_config {
        config::generate_config_sample()?;
        return Ok(());
    }

    let state = AppState::new(config, cli.url.as_deref())?;

    if cli.status {
        print_status(&state);
        return Ok(());
    }

    if !state.api.has_credential() {
        eprintln!(
            "{}",
            format!(
                "{} is not set and no access_token is configured",
                config::TOKEN_ENV
            )
            .yellow()
        );
    }

    // Command-line values are one commit on top of the start URL
    let patch = QueryPatch {
        page: cli.page.map(clamp_page),
        per_page: cli.per_page.map(clamp_per_page),
        filter: cli.query.as_deref().map(|q| q.trim().to_string()),
    };
    if !patch.is_empty() {
        state.query.commit(patch);
    }

    let theme_name = cli.theme.as_deref().unwrap_or(state.config.theme.as_str());
    let theme = Theme::from_name(theme_name);
    let opts = RenderOptions {
        theme: &theme,
        enable_emoji: state.config.enable_emoji,
    };

    let mut dashboard = Dashboard::new(state.resources.clone(), state.query.clone())
        .with_user_items(cli.user_items);

    let view = dashboard.settle().await;
    print_view(&view, &opts, cli.json)?;

    if cli.interactive {
        run_interactive(&mut dashboard, &opts, cli.json).await?;
    }

    Ok(())
}

async fn run_interactive(
    dashboard: &mut Dashboard,
    opts: &RenderOptions<'_>,
    json: bool,
) -> anyhow::Result<()> {
    // Setup graceful shutdown handler
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("Failed to listen for shutdown signal: {}", e);
        } else {
            let _ = shutdown_tx.send(());
        }
    });

    println!("{}", "Type `help` for commands.".bright_black());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::Write::flush(&mut std::io::stdout()).ok();

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = &mut shutdown_rx => {
                eprintln!("\nInterrupted");
                return Ok(());
            }
        };
        let Some(line) = line else {
            return Ok(());
        };

        let command = match repl::parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", e.red());
                continue;
            }
        };

        match repl::apply(dashboard, command) {
            Outcome::Render => {
                let view = tokio::select! {
                    view = dashboard.settle() => view,
                    _ = &mut shutdown_rx => {
                        eprintln!("\nInterrupted");
                        return Ok(());
                    }
                };
                print_view(&view, opts, json)?;
            }
            Outcome::Message(message) => println!("{}", message),
            Outcome::Quit => return Ok(()),
        }
    }
}

fn print_view(view: &DashboardView, opts: &RenderOptions<'_>, json: bool) -> anyhow::Result<()> {
    if json {
        let doc = serde_json::json!({
            "query": view.query,
            "url": view.url.as_str(),
            "user": resource_json(&view.user),
            "items": resource_json(&view.listing),
            "user_items": resource_json(&view.user_items),
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        print!("{}", format_dashboard(view, opts));
    }
    Ok(())
}

fn resource_json<T: Serialize>(state: &ResourceState<T>) -> serde_json::Value {
    serde_json::json!({
        "value": state.value.as_deref(),
        "error": state.error.as_ref().map(|e| e.message.as_str()),
        "is_loading": state.is_loading,
    })
}

/// Initialize logging with path and level configuration
fn init_logging(logging: &config::Logging) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let level = match logging.level.as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARN" => "warn",
        "ERROR" => "error",
        _ => "warn",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Some(path) = logging.path.as_deref().filter(|p| !p.is_empty()) {
        // Log to file
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .init();
        return Ok(());
    }

    // Log to stderr (default)
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn print_status(state: &AppState) {
    println!("{}", "qiita-sync Status".green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!(
        "Config: {}",
        config::get_config_path()
            .filter(|p| p.exists())
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "Not found (using defaults)".to_string())
    );
    println!("API base: {}", state.api.base());

    if state.api.has_credential() {
        println!("Access token: Configured");
    } else {
        println!("Access token: Not configured");
    }

    let options = state.resources.items.options();
    println!(
        "Cache: dedupe {}ms, revalidate on revisit: {}",
        options.dedupe_interval.as_millis(),
        options.revalidate_on_revisit
    );
    println!("Start URL: {}", state.query.url());
}
