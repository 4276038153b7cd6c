//! Record types held by the store.

#![allow(missing_docs)]

pub mod community;
pub mod discussion;
pub mod group;
pub mod poll;
pub mod poll_event;
pub mod poll_option;
pub mod stance;
pub mod stance_choice;
pub mod user;

pub use community::{Community, CommunityKind, PollCommunity};
pub use discussion::{Discussion, DiscussionReader, Volume};
pub use group::{Group, GroupMembership};
pub use poll::Poll;
pub use poll_event::{PollEvent, PollEventKind};
pub use poll_option::PollOption;
pub use stance::Stance;
pub use stance_choice::StanceChoice;
pub use user::User;
