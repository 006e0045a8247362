use chrono::Local;
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "spendbook={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.database).await?;
    let engine = engine::Engine::builder().database(db).build().await?;

    let tick_hours = settings.scheduler.tick_hours.max(1);
    tracing::info!(tick_hours, "recurrence scheduler starting");

    // First tick fires immediately, then on the configured cadence. A tick
    // failure is logged and retried on the next interval from a full scan.
    let mut interval =
        tokio::time::interval(std::time::Duration::from_secs(tick_hours * 60 * 60));
    loop {
        interval.tick().await;
        let today = Local::now().date_naive();
        match engine.process_recurring(today).await {
            Ok(report) => tracing::info!(
                %today,
                accounts = report.accounts_credited,
                entries = report.entries_materialized,
                "recurrence tick complete"
            ),
            Err(err) => tracing::error!("recurrence tick failed: {err}"),
        }
    }
}

async fn parse_database(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
