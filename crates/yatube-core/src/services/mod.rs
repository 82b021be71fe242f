//! Application rules that sit on top of the ports.

pub mod follow;

pub use follow::{FollowOutcome, is_following, profile_follow, profile_unfollow};
