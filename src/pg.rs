use crate::store::ArchivedGame;
use anyhow::Context;
use sled::IVec;
use std::time::Duration;
use tokio_postgres::{types::ToSql, Client, NoTls, Statement};

/// Copies finished games from the sled archive into PostgresQL, removing each
/// entry once written. Runs until the connection is lost.
pub async fn sync_archive(db: sled::Db) {
    let client = match connect_pg().await {
        Ok(client) => client,
        Err(err) => return log::error!("Could not connect to PostgresQL: {:?}", err),
    };

    let sql = "INSERT INTO mafia_game (id, chat_id, game_id, started, finished, players, winner, days)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT DO NOTHING;";
    let Ok(insert) = client.prepare(sql).await else {
        return log::error!("Could not create prepared statement");
    };

    let Ok(archive) = db.open_tree("archive") else {
        return log::error!("Could not open archive database");
    };

    log::info!("Writing finished games to PostgresQL.");
    loop {
        tokio::time::sleep(Duration::from_secs(1)).await;

        if client.is_closed() {
            log::error!("Connection to PostgresQL closed.");
            return;
        }

        let Some((key, game)) = archive.iter().flat_map(|e| e.ok().and_then(read_row)).next() else {
            continue;
        };

        if let Err(err) = write_row(&client, &insert, key, &game).await {
            log::error!("Could not write row: {:?}", err);
            continue;
        }

        log::info!("Archived game {} from chat {} to PostgresQL", game.game_id, game.chat_id);
        archive.remove(key.to_be_bytes()).ok();
    }
}

async fn connect_pg() -> anyhow::Result<Client> {
    let var = |name: &str| std::env::var(name).with_context(|| format!("{} is not set", name));
    let host = var("PG_HOST")?;
    let user = var("PG_USER")?;
    let password = var("PG_PASSWORD")?;
    let dbname = var("PG_DBNAME")?;

    let (client, connection) = tokio_postgres::Config::new()
        .host(&host)
        .user(&user)
        .password(&password)
        .dbname(&dbname)
        .connect(NoTls)
        .await
        .context("could not open connection")?;

    tokio::spawn(async move {
        if let Err(err) = connection.await {
            log::error!("PostgresQL connection error: {}", err);
        }
    });

    Ok(client)
}

fn read_row(entry: (IVec, IVec)) -> Option<(u64, ArchivedGame)> {
    let key = u64::from_be_bytes(entry.0.as_ref().try_into().ok()?);
    let game = serde_json::from_slice::<ArchivedGame>(&entry.1).ok()?;
    Some((key, game))
}

async fn write_row(client: &Client, stmt: &Statement, key: u64, game: &ArchivedGame) -> anyhow::Result<()> {
    let winner = game.winner.to_string();
    let args: [&(dyn ToSql + Sync); 8] = [
        &(key as i64),
        &game.chat_id,
        &(game.game_id as i64),
        &game.started,
        &game.finished,
        &game.players,
        &winner,
        &(game.days as i32),
    ];
    client.execute(stmt, &args).await?;
    Ok(())
}
