use crate::room::{Member, Room};
use confer_core::{ConnectionId, MemberIdentity, RoomId, UserId};
use std::collections::HashMap;
use tracing::{debug, info};

/// Result of [`RoomRegistry::join`].
#[derive(Debug)]
pub struct JoinOutcome {
    pub is_host: bool,
    /// Connections already in the room, excluding the joiner.
    pub others: Vec<ConnectionId>,
    /// Set when the connection was moved out of a different room first.
    pub left: Option<Departure>,
}

/// A member that left a room, and who is still there to be told about it.
#[derive(Debug)]
pub struct Departure {
    pub room_id: RoomId,
    pub member: MemberIdentity,
    pub remaining: Vec<ConnectionId>,
}

/// In-memory room store. Owned by the relay actor; nothing else mutates it.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
    memberships: HashMap<ConnectionId, RoomId>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `identity` in `room_id`. The joiner is host iff the room had
    /// no members at call time.
    pub fn join(&mut self, room_id: RoomId, identity: MemberIdentity) -> JoinOutcome {
        let connection_id = identity.connection_id;

        let left = match self.memberships.get(&connection_id) {
            Some(current) if current != &room_id => self.leave(&connection_id),
            _ => None,
        };

        let room = self
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| {
                info!("Creating room '{}'", room_id);
                Room::default()
            });

        let is_host = match room.member_mut(&connection_id) {
            Some(existing) => {
                debug!("Connection {} re-joined room '{}'", connection_id, room_id);
                existing.identity = identity;
                existing.is_host
            }
            None => {
                let is_host = room.is_empty();
                room.push(Member { identity, is_host });
                is_host
            }
        };

        let others = room
            .connections()
            .filter(|c| c != &connection_id)
            .collect();

        self.memberships.insert(connection_id, room_id);

        JoinOutcome {
            is_host,
            others,
            left,
        }
    }

    /// Removes the connection from its room. Empty rooms are dropped.
    pub fn leave(&mut self, connection_id: &ConnectionId) -> Option<Departure> {
        let room_id = self.memberships.remove(connection_id)?;
        let room = self.rooms.get_mut(&room_id)?;
        let member = room.remove(connection_id)?;
        let remaining = room.connections().collect();

        self.drop_if_empty(&room_id);

        Some(Departure {
            room_id,
            member: member.identity,
            remaining,
        })
    }

    /// Destroys the room, returning everyone who was in it.
    pub fn end(&mut self, room_id: &RoomId) -> Vec<MemberIdentity> {
        let Some(room) = self.rooms.remove(room_id) else {
            return Vec::new();
        };
        info!("Room '{}' ended with {} member(s)", room_id, room.len());

        room.members()
            .iter()
            .map(|m| {
                self.memberships.remove(&m.identity.connection_id);
                m.identity
            })
            .collect()
    }

    /// Removes every connection of `user_id` from the room.
    pub fn evict_user(&mut self, room_id: &RoomId, user_id: &UserId) -> Vec<MemberIdentity> {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return Vec::new();
        };
        let evicted: Vec<MemberIdentity> = room
            .remove_user(user_id)
            .into_iter()
            .map(|m| m.identity)
            .collect();

        for identity in &evicted {
            self.memberships.remove(&identity.connection_id);
        }
        self.drop_if_empty(room_id);
        evicted
    }

    pub fn room(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn room_of(&self, connection_id: &ConnectionId) -> Option<&RoomId> {
        self.memberships.get(connection_id)
    }

    pub fn connections(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        self.rooms
            .get(room_id)
            .map(|r| r.connections().collect())
            .unwrap_or_default()
    }

    pub fn host_of(&self, room_id: &RoomId) -> Option<MemberIdentity> {
        self.rooms
            .get(room_id)
            .and_then(|r| r.host())
            .map(|m| m.identity)
    }

    pub fn is_host_of(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool {
        self.host_of(room_id)
            .is_some_and(|h| &h.connection_id == connection_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn drop_if_empty(&mut self, room_id: &RoomId) {
        if self.rooms.get(room_id).is_some_and(Room::is_empty) {
            self.rooms.remove(room_id);
            info!("Room '{}' is empty, dropping it", room_id);
        }
    }
}
