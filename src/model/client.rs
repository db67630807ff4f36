//! The chat client contract and an in-memory implementation.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use super::{Channel, Member, Message, Permissions, Snowflake, User};

/// Read access to the live chat platform.
///
/// Lookups that fail for any reason (unknown id, network trouble) return
/// `None`; resolvers turn that into a user-facing error.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Id of the bot account itself.
    fn user_id(&self) -> Snowflake;

    /// Fetch a user by id.
    async fn fetch_user(&self, id: Snowflake) -> Option<User>;

    /// Fetch a guild member by user id.
    async fn fetch_member(&self, guild_id: Snowflake, user_id: Snowflake) -> Option<Member>;

    /// Search guild members whose name or nickname matches `query`.
    async fn search_members(&self, guild_id: Snowflake, query: &str, limit: usize) -> Vec<Member>;

    /// Look up a channel by id.
    async fn channel(&self, id: Snowflake) -> Option<Channel>;

    /// Fetch a message from a channel.
    async fn fetch_message(&self, channel_id: Snowflake, id: Snowflake) -> Option<Message>;

    /// Effective permissions of `user_id` in `channel`.
    async fn permissions_in(&self, channel: &Channel, user_id: Snowflake) -> Permissions;
}

#[derive(Default)]
struct ClientState {
    users: HashMap<Snowflake, User>,
    members: HashMap<(Snowflake, Snowflake), Member>,
    channels: HashMap<Snowflake, Channel>,
    messages: HashMap<(Snowflake, Snowflake), Message>,
}

/// [`ChatClient`] backed by plain maps.
///
/// Useful for tests and for embedding the dispatcher where entities are
/// already known.
pub struct InMemoryClient {
    user_id: Snowflake,
    state: RwLock<ClientState>,
}

impl InMemoryClient {
    /// Create an empty client for the bot account `user_id`.
    pub fn new(user_id: Snowflake) -> Self {
        Self {
            user_id,
            state: RwLock::new(ClientState::default()),
        }
    }

    /// Add or replace a user.
    pub fn insert_user(&self, user: User) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.users.insert(user.id, user);
    }

    /// Add or replace a member (and its user).
    pub fn insert_member(&self, member: Member) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.users.insert(member.user.id, member.user.clone());
        state.members.insert((member.guild_id, member.user.id), member);
    }

    /// Add or replace a channel.
    pub fn insert_channel(&self, channel: Channel) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.channels.insert(channel.id, channel);
    }

    /// Add or replace a message.
    pub fn insert_message(&self, message: Message) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.messages.insert((message.channel.id, message.id), message);
    }

    fn read<T>(&self, f: impl FnOnce(&ClientState) -> T) -> T {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }
}

#[async_trait]
impl ChatClient for InMemoryClient {
    fn user_id(&self) -> Snowflake {
        self.user_id
    }

    async fn fetch_user(&self, id: Snowflake) -> Option<User> {
        self.read(|state| state.users.get(&id).cloned())
    }

    async fn fetch_member(&self, guild_id: Snowflake, user_id: Snowflake) -> Option<Member> {
        self.read(|state| state.members.get(&(guild_id, user_id)).cloned())
    }

    async fn search_members(&self, guild_id: Snowflake, query: &str, limit: usize) -> Vec<Member> {
        let query = query.to_lowercase();
        self.read(|state| {
            let mut found: Vec<Member> = state
                .members
                .values()
                .filter(|member| member.guild_id == guild_id)
                .filter(|member| {
                    member.user.name.to_lowercase().contains(&query)
                        || member
                            .nickname
                            .as_ref()
                            .is_some_and(|nickname| nickname.to_lowercase().contains(&query))
                })
                .cloned()
                .collect();
            found.sort_by_key(|member| member.user.id);
            found.truncate(limit);
            found
        })
    }

    async fn channel(&self, id: Snowflake) -> Option<Channel> {
        self.read(|state| state.channels.get(&id).cloned())
    }

    async fn fetch_message(&self, channel_id: Snowflake, id: Snowflake) -> Option<Message> {
        self.read(|state| state.messages.get(&(channel_id, id)).cloned())
    }

    async fn permissions_in(&self, channel: &Channel, user_id: Snowflake) -> Permissions {
        let Some(guild_id) = channel.guild_id else {
            return Permissions::DM_DEFAULT;
        };
        self.read(|state| {
            state
                .members
                .get(&(guild_id, user_id))
                .map(|member| member.permissions)
                .unwrap_or(Permissions::NONE)
        })
    }
}
