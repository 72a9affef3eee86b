use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use event_reminder::api::{self, AppState};
use event_reminder::channels::ChannelDirectory;
use event_reminder::config::{Cli, Commands, Config};
use event_reminder::db::Database;
use event_reminder::scheduler::ReminderScheduler;
use event_reminder::traq::TraqClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                "event_reminder=debug,reminder_core=info,tower_http=debug".into()
            }),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&cli.config).await?,
        Commands::Remind => {
            let db = open_database(&cli.config)?;
            let scheduler = build_scheduler(&cli.config, db)?;
            let report = scheduler.run_once().await;
            println!(
                "due: {}, sent: {}, failed: {}, skipped: {}",
                report.due, report.sent, report.failed, report.skipped
            );
        }
        Commands::Channels => {
            let traq = traq_client(&cli.config)?;
            let directory = ChannelDirectory::new(traq);
            for channel in directory.get().await? {
                println!("{}\t{}", channel.id, channel.path);
            }
        }
    }

    Ok(())
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    let db = open_database(config)?;
    let traq = traq_client(config)?;

    let scheduler = Arc::new(ReminderScheduler::new(
        Arc::new(db.clone()),
        traq.clone(),
        config.send_timeout(),
    ));
    let scheduler_handle = scheduler.spawn(config.trigger());

    let state = AppState::new(db, ChannelDirectory::new(traq), config.template_policy)
        .with_default_channel(config.remind_channel_id.clone());
    let app = api::create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        "event-reminder listening on http://{addr} (template policy: {})",
        config.template_policy
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for shutdown signal: {e}");
            }
            tracing::info!("shutting down");
        })
        .await?;

    scheduler_handle.abort();
    Ok(())
}

fn open_database(config: &Config) -> anyhow::Result<Database> {
    let db = match &config.database {
        Some(path) => Database::open(path)?,
        None => Database::open_default()?,
    };
    db.migrate()?;
    Ok(db)
}

fn traq_client(config: &Config) -> anyhow::Result<Arc<TraqClient>> {
    let client = TraqClient::new(
        &config.traq_base_url,
        config.traq_token()?,
        config.send_timeout(),
    )?;
    Ok(Arc::new(client))
}

fn build_scheduler(config: &Config, db: Database) -> anyhow::Result<ReminderScheduler> {
    Ok(ReminderScheduler::new(
        Arc::new(db),
        traq_client(config)?,
        config.send_timeout(),
    ))
}
