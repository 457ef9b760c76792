use migration::{Migrator, MigratorTrait};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "budget={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = engine::connect(&settings.database.url(), settings.database.max_connections).await?;
    Migrator::up(&db, None).await?;
    tracing::info!("database ready");

    let delegator = engine::Delegator::builder()
        .database(db)
        .workers(settings.operator.workers)
        .queue_capacity(settings.operator.queue_capacity)
        .build();
    delegator.start();

    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("unable to listen for shutdown signal: {err}");
    }
    tracing::info!("shutting down");
    delegator.stop().await;

    Ok(())
}
