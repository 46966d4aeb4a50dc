mod bootstrap;
mod setup;

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use redzone_core::scoring::ScoringPolicy;
use redzone_core::settings::{AppConfig, LastUsedServices, Settings};
use redzone_feed::FeedClient;
use redzone_runtime::focus::{native_backend, FocusController};
use redzone_runtime::launcher::BrowserLauncher;
use redzone_runtime::monitor::{MonitorConfig, RedZoneMonitor};

use crate::setup::Prompter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let settings = Settings::load();

    let app_dir = bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("CFB RedZone v{} starting", env!("CARGO_PKG_VERSION"));

    let config_path = settings.config_path();
    let config = AppConfig::load_or_default(&config_path);
    tracing::debug!(path = %config_path.display(), "config loaded");

    let last_used_path = LastUsedServices::config_path_in(&app_dir);
    if settings.clear {
        LastUsedServices::clear_at(&last_used_path)
            .with_context(|| format!("removing {}", last_used_path.display()))?;
        println!("Cleared remembered services.");
    }
    let last_used = LastUsedServices::load_from(&last_used_path);

    println!("CFB RedZone");

    let launcher = BrowserLauncher::new(config.browser_paths.for_current_os(), &config.profile_root);
    let client = FeedClient::new(&config.scoreboard_url, settings.date.clone(), config.request_timeout())
        .context("building HTTP client")?;

    let mut bindings = {
        let stdin = std::io::stdin();
        let mut prompter = Prompter::new(stdin.lock(), std::io::stdout());

        // Step 1: services and their profiles.
        let services = prompter.choose_services(&config, &last_used.services)?;
        let remembered = LastUsedServices {
            services: services.clone(),
        };
        if let Err(e) = remembered.save_to(&last_used_path) {
            tracing::warn!(error = %e, "could not remember services");
        }
        for service in &services {
            if let Err(e) = launcher.ensure_profile_dir(service) {
                tracing::warn!(service = %service, error = %e, "could not create profile directory");
            }
        }

        // Step 2: the day's games.
        let day = client
            .date()
            .map(str::to_string)
            .unwrap_or_else(|| chrono::Local::now().format("%Y%m%d").to_string());
        println!("Fetching the {day} schedule from ESPN...");
        let games = client
            .list_events()
            .await
            .context("failed to fetch scoreboard")?;
        if games.is_empty() {
            println!("No games found. Exiting.");
            return Ok(());
        }

        let picked = prompter.choose_games(&games)?;
        if picked.is_empty() {
            println!("No games selected. Exiting.");
            return Ok(());
        }

        prompter.bind_games(picked, &services, &config, &launcher)?
    };

    // Step 3: one browser window per game.
    println!();
    println!("Launching browser windows for each chosen game. Complete any logins in them.");
    for binding in bindings.iter_mut() {
        println!(
            "Launching {} in profile '{}' -> {}",
            binding.game.display_name, binding.service, binding.url
        );
        launcher.launch_binding(binding);
        tokio::time::sleep(config.launch_spacing()).await;
    }

    // Step 4: monitor until interrupted.
    let monitor = RedZoneMonitor::new(
        client,
        FocusController::new(native_backend(), config.focus_retry_interval()),
        ScoringPolicy::new(config.red_zone_yards),
        MonitorConfig::from(&config),
    );

    let session = async {
        initial_wait(config.initial_wait_secs).await;
        println!("Entering monitoring loop. Ctrl-C to exit.");
        monitor.run(&bindings).await;
    };

    tokio::select! {
        _ = session => {}
        _ = tokio::signal::ctrl_c() => {
            println!();
            println!("Stopping monitor. Exiting.");
        }
    }

    Ok(())
}

/// Give the pages time to load and the user time to log in, counting down
/// once per second.
async fn initial_wait(secs: u64) {
    if secs == 0 {
        return;
    }
    println!();
    println!("Waiting {secs}s for pages to load and for you to log in if needed...");
    let mut stdout = std::io::stdout();
    for remaining in (1..=secs).rev() {
        let _ = write!(stdout, "\r  {remaining:>3}s remaining ");
        let _ = stdout.flush();
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    println!("\r  done            ");
}
