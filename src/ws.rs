use crate::{
    client::{Client, Request},
    messenger::{GatewayMessenger, Outbound},
    session::GameManager,
};
use futures_util::{select, FutureExt, SinkExt, StreamExt, TryStreamExt};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::broadcast::error::RecvError;
use tokio_tungstenite::tungstenite::Message;

#[derive(Error, Debug)]
enum WsError {
    #[error("violation of the application-layer protocol: {0}")]
    ProtocolError(#[from] serde_json::Error),
}

pub async fn accept_connection(stream: TcpStream, manager: &'static GameManager, gateway: GatewayMessenger) {
    log::info!("Accepted new gateway connection");

    let Ok(stream) = tokio_tungstenite::accept_async(stream).await else {
        log::error!("Error occured during websocket handshake");
        return;
    };
    let (mut write, read) = stream.split();
    let mut read = read.fuse();

    let client = Client::new(manager);
    let mut outbound = gateway.subscribe();

    loop {
        select! {
            msg = read.try_next() => {
                let Ok(Some(Message::Text(msg))) = msg else {
                    break;
                };
                let reply = match parse_request(&msg) {
                    Ok(req) => match client.handle(req) {
                        Ok(result) => json!({ "type": "ok", "result": result }),
                        Err(err) => json!({ "type": "error", "error": err.to_string() }),
                    },
                    Err(err) => {
                        log::error!("Invalid message received: {}", &msg);
                        json!({ "type": "error", "error": err.to_string() })
                    }
                };
                if write.send(Message::Text(reply.to_string())).await.is_err() {
                    log::error!("Could not send websockets message");
                    break;
                }
            },
            message = outbound.recv().fuse() => {
                let message = match message {
                    Ok(message) => message,
                    Err(RecvError::Lagged(skipped)) => {
                        log::warn!("Gateway lagged behind, dropped {} notifications", skipped);
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                if write.send(Message::Text(format_outbound(&message).to_string())).await.is_err() {
                    log::error!("Could not send websockets message");
                    break;
                }
            }
        }
    }
    log::info!("Gateway connection closed");
}

/// Parses a websockets message from the front end.
fn parse_request(msg: &str) -> Result<Request, WsError> {
    Ok(serde_json::from_str(msg)?)
}

/// Wraps a notification for sending over websockets.
fn format_outbound(message: &Outbound) -> Value {
    json!({
        "type": "outbound",
        "message": message
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbound_frames_are_tagged() {
        let frame = format_outbound(&Outbound::DeleteMessage {
            chat_id: -3,
            message_id: 17,
        });
        assert_eq!(frame["type"], "outbound");
        assert_eq!(frame["message"]["kind"], "delete_message");
        assert_eq!(frame["message"]["message_id"], 17);
    }

    #[test]
    fn bad_frames_are_protocol_errors() {
        let err = parse_request("{\"type\": 5}").unwrap_err();
        assert!(err.to_string().starts_with("violation of the application-layer protocol"));
        assert!(parse_request("{\"type\": \"force_stop\", \"chat_id\": 2}").is_ok());
    }
}
