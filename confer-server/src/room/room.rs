use confer_core::{ConnectionId, MemberIdentity, UserId};

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub identity: MemberIdentity,
    /// Set once at join time, never re-assigned.
    pub is_host: bool,
}

/// One conference room. Members are kept in arrival order.
#[derive(Debug, Default)]
pub struct Room {
    members: Vec<Member>,
}

impl Room {
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn host(&self) -> Option<&Member> {
        self.members.iter().find(|m| m.is_host)
    }

    pub fn connections(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.members.iter().map(|m| m.identity.connection_id)
    }

    pub(crate) fn member_mut(&mut self, connection_id: &ConnectionId) -> Option<&mut Member> {
        self.members
            .iter_mut()
            .find(|m| &m.identity.connection_id == connection_id)
    }

    pub(crate) fn push(&mut self, member: Member) {
        self.members.push(member);
    }

    pub(crate) fn remove(&mut self, connection_id: &ConnectionId) -> Option<Member> {
        let idx = self
            .members
            .iter()
            .position(|m| &m.identity.connection_id == connection_id)?;
        Some(self.members.remove(idx))
    }

    pub(crate) fn remove_user(&mut self, user_id: &UserId) -> Vec<Member> {
        let (removed, kept) = self
            .members
            .drain(..)
            .partition(|m| &m.identity.user_id == user_id);
        self.members = kept;
        removed
    }
}
