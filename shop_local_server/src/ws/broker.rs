//! The notification broker: a registry of live connections and the named channels ("rooms") they belong to.
//!
//! Delivery is best-effort fan-out to whoever is connected at emission time. There is no queueing, no replay and no
//! acknowledgement; a client that is offline when an event fires simply misses it and re-fetches authoritative
//! state over REST when it comes back.

use std::{
    collections::{HashMap, HashSet},
    fmt::Display,
    str::FromStr,
    sync::{Arc, Mutex},
};

use log::*;
use serde::Serialize;
use shop_local_engine::db_types::{Actor, Role};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

pub type ConnId = u64;

//--------------------------------------        Room         ---------------------------------------------------------
/// The closed set of channel names. Private rooms are derived from the authenticated actor during the handshake;
/// clients can only ask to join shop rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Room {
    /// The shared broadcast channel every customer joins.
    Customers,
    /// A customer's private channel.
    Customer(i64),
    /// A vendor's private channel.
    Vendor(i64),
    /// An admin's private channel.
    Admin(i64),
    /// The channel for clients currently viewing one shop's page.
    Shop(i64),
}

impl Room {
    /// The private room for an actor, as joined automatically on connect.
    pub fn private(actor: &Actor) -> Self {
        match actor.role {
            Role::Customer => Room::Customer(actor.id),
            Role::Vendor => Room::Vendor(actor.id),
            Role::Admin => Room::Admin(actor.id),
        }
    }

    /// Whether clients may subscribe to this room by request. Private rooms are handshake-only.
    pub fn is_client_subscribable(&self) -> bool {
        matches!(self, Room::Shop(_))
    }
}

impl Display for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Room::Customers => write!(f, "customer"),
            Room::Customer(id) => write!(f, "customer-{id}"),
            Room::Vendor(id) => write!(f, "vendor-{id}"),
            Room::Admin(id) => write!(f, "admin-{id}"),
            Room::Shop(id) => write!(f, "shop-{id}"),
        }
    }
}

impl FromStr for Room {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "customer" {
            return Ok(Room::Customers);
        }
        let (kind, id) = s.split_once('-').ok_or_else(|| format!("Unknown room name: {s}"))?;
        let id = id.parse::<i64>().map_err(|_| format!("Unknown room name: {s}"))?;
        match kind {
            "customer" => Ok(Room::Customer(id)),
            "vendor" => Ok(Room::Vendor(id)),
            "admin" => Ok(Room::Admin(id)),
            "shop" => Ok(Room::Shop(id)),
            _ => Err(format!("Unknown room name: {s}")),
        }
    }
}

//--------------------------------------  NotificationBroker  --------------------------------------------------------
#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    event: &'a str,
    data: &'a T,
}

#[derive(Default)]
struct BrokerInner {
    next_id: ConnId,
    connections: HashMap<ConnId, UnboundedSender<String>>,
    rooms: HashMap<Room, HashSet<ConnId>>,
}

/// Shared, cheaply-clonable registry of connections and room memberships. Sessions register on connect and are
/// pruned on disconnect or on a failed send.
#[derive(Clone, Default)]
pub struct NotificationBroker {
    inner: Arc<Mutex<BrokerInner>>,
}

impl NotificationBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new connection. The returned receiver is drained by the session task; everything emitted to a
    /// room this connection is in arrives there as serialized JSON text frames.
    pub fn connect(&self) -> (ConnId, UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.connections.insert(id, tx);
        debug!("🔌️ Connection #{id} registered");
        (id, rx)
    }

    /// Adds the connection to the room. Idempotent: joining a room twice is the same as joining it once.
    pub fn subscribe(&self, conn: ConnId, room: &Room) {
        let mut inner = self.inner.lock().unwrap();
        if !inner.connections.contains_key(&conn) {
            warn!("🔌️ Ignoring subscribe from unknown connection #{conn}");
            return;
        }
        inner.rooms.entry(*room).or_default().insert(conn);
        debug!("🔌️ Connection #{conn} subscribed to {room}");
    }

    /// Removes the connection from the room. Idempotent.
    pub fn unsubscribe(&self, conn: ConnId, room: &Room) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(members) = inner.rooms.get_mut(room) {
            members.remove(&conn);
            if members.is_empty() {
                inner.rooms.remove(room);
            }
        }
        debug!("🔌️ Connection #{conn} unsubscribed from {room}");
    }

    /// Drops the connection and every membership it holds. Called when the session ends for any reason.
    pub fn disconnect(&self, conn: ConnId) {
        let mut inner = self.inner.lock().unwrap();
        inner.connections.remove(&conn);
        inner.rooms.retain(|_, members| {
            members.remove(&conn);
            !members.is_empty()
        });
        debug!("🔌️ Connection #{conn} dropped");
    }

    /// Delivers `payload` to every connection currently in `room`, wrapped in a `{"event", "data"}` envelope.
    /// Fire-and-forget: connections whose channel has closed are pruned, nothing is retried.
    pub fn emit<T: Serialize>(&self, room: &Room, event: &str, payload: &T) {
        let message = match serde_json::to_string(&Envelope { event, data: payload }) {
            Ok(m) => m,
            Err(e) => {
                error!("📬️ Could not serialize {event} payload: {e}");
                return;
            },
        };
        let mut inner = self.inner.lock().unwrap();
        let members = match inner.rooms.get(room) {
            Some(members) => members.clone(),
            None => {
                trace!("📬️ No subscribers in {room} for {event}");
                return;
            },
        };
        let mut dead = Vec::new();
        let mut delivered = 0usize;
        for conn in members {
            match inner.connections.get(&conn) {
                Some(tx) if tx.send(message.clone()).is_ok() => delivered += 1,
                _ => dead.push(conn),
            }
        }
        for conn in dead {
            inner.connections.remove(&conn);
            inner.rooms.retain(|_, members| {
                members.remove(&conn);
                !members.is_empty()
            });
        }
        debug!("📬️ Emitted {event} to {delivered} member(s) of {room}");
    }

    /// Current member count of a room.
    pub fn member_count(&self, room: &Room) -> usize {
        self.inner.lock().unwrap().rooms.get(room).map(HashSet::len).unwrap_or(0)
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn subscribe_is_idempotent_and_delivers_once() {
        let broker = NotificationBroker::new();
        let (conn, mut rx) = broker.connect();
        let room = Room::Customer(9);
        broker.subscribe(conn, &room);
        broker.subscribe(conn, &room);
        assert_eq!(broker.member_count(&room), 1);

        broker.emit(&room, "order-status-update", &json!({"orderId": 1, "status": "confirmed"}));
        let msg = rx.recv().await.unwrap();
        assert_eq!(
            msg,
            r#"{"event":"order-status-update","data":{"orderId":1,"status":"confirmed"}}"#
        );
        assert!(rx.try_recv().is_err(), "double subscribe must not mean double delivery");
    }

    #[tokio::test]
    async fn emit_reaches_every_member_and_only_members() {
        let broker = NotificationBroker::new();
        let (a, mut rx_a) = broker.connect();
        let (b, mut rx_b) = broker.connect();
        let (c, mut rx_c) = broker.connect();
        broker.subscribe(a, &Room::Customers);
        broker.subscribe(b, &Room::Customers);
        broker.subscribe(c, &Room::Vendor(7));

        broker.emit(&Room::Customers, "shop-added", &json!({"id": 3}));
        assert!(rx_a.recv().await.unwrap().contains("shop-added"));
        assert!(rx_b.recv().await.unwrap().contains("shop-added"));
        assert!(rx_c.try_recv().is_err());
    }

    #[tokio::test]
    async fn unsubscribe_and_disconnect_stop_delivery() {
        let broker = NotificationBroker::new();
        let (a, mut rx_a) = broker.connect();
        let room = Room::Shop(3);
        broker.subscribe(a, &room);
        broker.unsubscribe(a, &room);
        broker.unsubscribe(a, &room);
        broker.emit(&room, "product-added", &json!({"id": 1}));
        assert!(rx_a.try_recv().is_err());

        broker.subscribe(a, &room);
        broker.disconnect(a);
        assert_eq!(broker.member_count(&room), 0);
    }

    #[tokio::test]
    async fn dead_connections_are_pruned_on_emit() {
        let broker = NotificationBroker::new();
        let (a, rx_a) = broker.connect();
        broker.subscribe(a, &Room::Customers);
        drop(rx_a);
        broker.emit(&Room::Customers, "shop-updated", &json!({"id": 1}));
        assert_eq!(broker.member_count(&Room::Customers), 0);
    }

    #[test]
    fn room_names_round_trip() {
        for room in [Room::Customers, Room::Customer(9), Room::Vendor(7), Room::Admin(1), Room::Shop(3)] {
            assert_eq!(room.to_string().parse::<Room>().unwrap(), room);
        }
        assert!("lobby".parse::<Room>().is_err());
        assert!("shop-abc".parse::<Room>().is_err());
    }

    #[test]
    fn only_shop_rooms_are_client_subscribable() {
        assert!(Room::Shop(3).is_client_subscribable());
        assert!(!Room::Customers.is_client_subscribable());
        assert!(!Room::Customer(9).is_client_subscribable());
        assert!(!Room::Vendor(7).is_client_subscribable());
    }
}
