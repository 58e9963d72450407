mod console;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use calview_calendar::{
    CalendarController, ContainerInfo, ControllerSettings, DateRange, EventFetcher, HostSignal, LifecycleState,
};
use calview_core::Config;
use chrono::{Duration, Local, NaiveDate, TimeZone, Utc};
use clap::Parser;
use tokio::sync::mpsc;

use crate::console::{ConsoleBackend, ConsoleHost};

/// Load the calendar feed once through the view controller and print it.
#[derive(Parser, Debug)]
#[command(name = "calview", version, about)]
struct Args {
    /// Config file (defaults to <config dir>/calview/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Viewport width in pixels used to pick the layout
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// First day of the range (defaults to today)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Day after the last day of the range (defaults to start + 7 days)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Events endpoint, overriding the configured one
    #[arg(long)]
    endpoint: Option<String>,

    /// Container id, overriding the configured one
    #[arg(long)]
    container: Option<String>,
}

fn day_range(start: NaiveDate, end: NaiveDate) -> Result<DateRange> {
    let midnight = |day: NaiveDate| {
        day.and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .with_context(|| format!("Invalid date {}", day))
    };
    Ok(DateRange::new(midnight(start)?, midnight(end)?)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, validation) =
        Config::load_validated(args.config.as_deref()).context("Failed to load configuration")?;

    calview_core::init(&config.logging.filter);
    for warning in &validation.warnings {
        tracing::warn!("Config warning: {}", warning);
    }

    if let Some(endpoint) = args.endpoint {
        config.calendar.endpoint = endpoint;
    }
    if let Some(container) = args.container {
        config.calendar.container_id = container;
    }

    let start = args.start.unwrap_or_else(|| Local::now().date_naive());
    let end = args.end.unwrap_or(start + Duration::days(7));
    let range = day_range(start, end)?;

    let container_id = config.calendar.container_id.clone();
    let host = Arc::new(ConsoleHost::new(ContainerInfo::new(&container_id), args.width));
    let (outcomes, mut received) = mpsc::unbounded_channel();
    let backend = Arc::new(ConsoleBackend::new(range, outcomes));
    let loader = Arc::new(EventFetcher::from_config(&config.calendar).context("Invalid events base URL")?);

    let controller = CalendarController::new(host.clone(), backend, loader, ControllerSettings::from_config(&config))?;
    controller.bind_lifecycle(&container_id);

    tracing::info!(container_id = %container_id, width = args.width, %range, "Calview started");
    host.emit(&HostSignal::PageLoaded);

    if controller.state() != LifecycleState::Active {
        let reason = controller
            .failure_message()
            .unwrap_or_else(|| format!("Container '{}' not found", container_id));
        bail!("Calendar did not start: {}", reason);
    }

    let outcome = received
        .recv()
        .await
        .context("Calendar closed before events arrived")?;

    let result = match outcome {
        Ok(mut events) => {
            events.sort_by_key(|event| event.starts_at());
            println!("{} event(s)", events.len());
            for event in &events {
                let end = event.end.as_deref().unwrap_or("");
                println!("- [{}] {}  {} -> {}", event.id, event.title, event.start, end);
                if let Some(description) = event.description() {
                    println!("    {}", description);
                }
            }
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e).context("Failed to load events")),
    };

    for (name, value) in host.fields() {
        tracing::debug!(field = %name, %value, "Schedule form default");
    }

    host.emit(&HostSignal::BeforeSwap);
    controller.shutdown();

    result
}
