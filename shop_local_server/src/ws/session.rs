//! WebSocket session handling.
//!
//! A client connects with `GET /ws?token=<access token>`. The token is validated during the handshake and the
//! session's identity is taken from its claims; a client cannot claim to be somebody else. On connect the session
//! joins its private room automatically (and customers join the shared `customer` broadcast room). After that the
//! client may ask to join or leave shop rooms:
//!
//! ```json
//! {"action": "subscribe", "room": "shop-3"}
//! {"action": "unsubscribe", "room": "shop-3"}
//! ```
//!
//! Requests for any other room are ignored; private rooms are handshake-only. All memberships are dropped when the
//! connection closes.

use std::str::FromStr;

use actix_web::{rt, web, HttpRequest, HttpResponse};
use actix_ws::{Message, MessageStream, Session};
use futures::StreamExt;
use log::*;
use serde::Deserialize;
use shop_local_engine::db_types::{Actor, Role};

use crate::{
    auth::TokenIssuer,
    errors::ServerError,
    ws::broker::{ConnId, NotificationBroker, Room},
};

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase", tag = "action")]
enum ClientCommand {
    Subscribe { room: String },
    Unsubscribe { room: String },
}

/// Route handler for the websocket endpoint.
pub async fn websocket_entry(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<WsQuery>,
    issuer: web::Data<TokenIssuer>,
    broker: web::Data<NotificationBroker>,
) -> Result<HttpResponse, ServerError> {
    let claims = issuer.verify_token(&query.token).map_err(|e| {
        debug!("🔌️ Rejecting websocket handshake. {e}");
        ServerError::AuthenticationError(e)
    })?;
    let actor = claims.actor();
    let (response, session, msg_stream) = actix_ws::handle(&req, stream).map_err(|e| {
        warn!("🔌️ Websocket handshake failed. {e}");
        ServerError::Unspecified(e.to_string())
    })?;
    let broker = broker.get_ref().clone();
    rt::spawn(run_session(actor, broker, session, msg_stream));
    Ok(response)
}

async fn run_session(actor: Actor, broker: NotificationBroker, mut session: Session, mut msg_stream: MessageStream) {
    let (conn, mut rx) = broker.connect();
    broker.subscribe(conn, &Room::private(&actor));
    if actor.role == Role::Customer {
        broker.subscribe(conn, &Room::Customers);
    }
    info!("🔌️ {actor} connected (connection #{conn})");
    loop {
        tokio::select! {
            msg = msg_stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => handle_command(&broker, conn, &text),
                    Some(Ok(Message::Ping(bytes))) => {
                        if session.pong(&bytes).await.is_err() {
                            break;
                        }
                    },
                    Some(Ok(Message::Close(reason))) => {
                        debug!("🔌️ {actor} closed the connection: {reason:?}");
                        break;
                    },
                    Some(Ok(_)) => {},
                    Some(Err(e)) => {
                        debug!("🔌️ Protocol error on connection #{conn}: {e}");
                        break;
                    },
                    None => break,
                }
            },
            out = rx.recv() => {
                match out {
                    Some(message) => {
                        if session.text(message).await.is_err() {
                            break;
                        }
                    },
                    None => break,
                }
            },
        }
    }
    broker.disconnect(conn);
    let _ = session.close(None).await;
    info!("🔌️ {actor} disconnected (connection #{conn})");
}

fn handle_command(broker: &NotificationBroker, conn: ConnId, text: &str) {
    let command = match serde_json::from_str::<ClientCommand>(text) {
        Ok(command) => command,
        Err(e) => {
            debug!("🔌️ Ignoring malformed message on connection #{conn}: {e}");
            return;
        },
    };
    let (room_name, subscribe) = match &command {
        ClientCommand::Subscribe { room } => (room, true),
        ClientCommand::Unsubscribe { room } => (room, false),
    };
    let room = match Room::from_str(room_name) {
        Ok(room) => room,
        Err(e) => {
            debug!("🔌️ Ignoring request on connection #{conn}: {e}");
            return;
        },
    };
    if !room.is_client_subscribable() {
        warn!("🔌️ Connection #{conn} asked to join {room}, which clients may not join by request. Ignoring.");
        return;
    }
    if subscribe {
        broker.subscribe(conn, &room);
    } else {
        broker.unsubscribe(conn, &room);
    }
}
