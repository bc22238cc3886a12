use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing_subscriber::EnvFilter;

use game::announcer::{Announcer, CommandAnnouncer, NullAnnouncer};
use game::clock::MonotonicClock;
use game::driver;
use game::host_api::HostServer;
use game::session::GameSession;
use game::settings::SettingsStore;

fn env_u16(name: &str) -> Option<u16> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn startup_seed(configured: Option<u64>) -> u64 {
    configured.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    })
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let settings = SettingsStore::from_env().load();
    let port = env_u16("OFFCOLOR_PORT").unwrap_or(settings.host.port);

    let announcer: Arc<dyn Announcer> = if settings.announce.enabled {
        Arc::new(CommandAnnouncer::new(settings.announce.program.clone()))
    } else {
        Arc::new(NullAnnouncer)
    };

    let session = GameSession::new(startup_seed(settings.seed));
    let (tx, rx) = driver::channel();

    let mut server = HostServer::start(port, tx.clone())?;
    println!("session api: http://{}", server.addr);

    let loop_handle = tokio::spawn(driver::run_session_loop(
        session,
        MonotonicClock::new(),
        announcer,
        rx,
    ));

    tokio::signal::ctrl_c().await?;
    server.shutdown();
    drop(tx);
    let _ = loop_handle.await;
    Ok(())
}
