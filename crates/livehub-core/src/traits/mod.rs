//! Collaborator traits defined in `livehub-core` and implemented by other crates.

pub mod clock;
pub mod meeting_provider;

pub use clock::{Clock, FixedClock, SystemClock};
pub use meeting_provider::{CreateMeetingRequest, MeetingProvider, RemoteMeeting};
