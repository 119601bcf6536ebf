use dotenvy::dotenv;
use log::info;
use matchday_sync::{config::SyncConfig, daemon::run_daemon};

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    let config = SyncConfig::from_env_or_default();

    info!("🚀️ Starting the match synchronization daemon against {}", config.database_url);
    match run_daemon(config).await {
        Ok(_) => println!("Bye!"),
        Err(e) => eprintln!("{e}"),
    }
}
