//! Repositories over the record store.

pub mod community;
pub mod discussion;
pub mod group;
pub mod poll;
pub mod poll_event;
pub mod stance;
pub mod user;

pub use community::CommunityRepository;
pub use discussion::DiscussionRepository;
pub use group::GroupRepository;
pub use poll::{PollOptionRepository, PollRepository};
pub use poll_event::PollEventRepository;
pub use stance::{StanceChoiceRepository, StanceRepository};
pub use user::UserRepository;
