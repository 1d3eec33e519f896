// Emotebank Engine — reference resolution, shard allocation, emote lifecycle,
// reply reconciliation and the decay sweep, over the collaborator traits in
// atoms/.

pub mod allocator;
pub mod audit;
pub mod config;
pub mod content;
pub mod decay;
pub mod emotes;
pub mod lexer;
pub mod replies;
pub mod resolver;
pub mod store;
pub mod telemetry;
pub mod timeouts;
