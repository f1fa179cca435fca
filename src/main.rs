use crate::game::GameSettings;
use crate::messenger::GatewayMessenger;
use crate::session::GameManager;
use crate::stats::SledStats;
use crate::store::SledStore;
use crate::ws::accept_connection;
use std::net::{Ipv4Addr, SocketAddrV4};
use tokio::net::TcpListener;

mod client;
mod driver;
mod error;
mod game;
mod messenger;
mod pg;
mod session;
mod stats;
mod store;
mod ws;

// FIXME: Implement TLS support

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::try_init().ok();

    let Ok(Ok(port)) = std::env::var("PORT").map(|s| s.parse::<u16>()) else {
        log::error!("port is unspecified or is invalid");
        return;
    };

    let db_path = std::env::var("DB_PATH").unwrap_or_else(|_| "mafia.db".to_string());
    let db = match sled::open(&db_path) {
        Ok(db) => db,
        Err(err) => return log::error!("Could not open database at {}: {}", db_path, err),
    };
    let store = match SledStore::new(&db) {
        Ok(store) => store,
        Err(err) => return log::error!("Could not open game store: {}", err),
    };
    let stats = match SledStats::new(&db) {
        Ok(stats) => stats,
        Err(err) => return log::error!("Could not open stats: {}", err),
    };

    let gateway = GatewayMessenger::new(1024);
    let settings = GameSettings::from_env();
    log::info!("Default settings: {:?}", settings);

    let manager: &'static GameManager = Box::leak(Box::new(GameManager::new(
        Box::new(store),
        Box::new(stats),
        Box::new(gateway.clone()),
        settings,
    )));
    let resumed = manager.resume();
    if resumed > 0 {
        log::info!("Resumed {} games", resumed);
    }

    if std::env::var("PG_HOST").is_ok() {
        tokio::spawn(pg::sync_archive(db.clone()));
    }

    let addr = SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), port);
    let Ok(listener) = TcpListener::bind(addr).await else {
        log::error!("Could not bind to address: {:?}", addr);
        return;
    };
    log::info!("Listening on: {:?}", addr);

    while let Ok((stream, _)) = listener.accept().await {
        tokio::spawn(accept_connection(stream, manager, gateway.clone()));
    }
}
