//! Services layer for Hearth
//!
//! Each service owns the domain rules of one resource family and talks to
//! storage only through typed [`Collection`](crate::db::Collection)s.
//!
//! ## Services
//!
//! - **Events**: calendar events and visibility filtering
//! - **Check-ins**: check-in log and per-user social points
//! - **Progress**: achievements, goals and favorites
//! - **Friendship**: trust/bond friends and scored friendships
//! - **Groups**: membership, mirrored into user progress
//! - **Notifications**: per-user inbox
//! - **Challenges**: shared goals

pub mod challenges;
pub mod checkins;
pub mod events;
pub mod friendship;
pub mod groups;
pub mod notifications;
pub mod progress;

pub use challenges::ChallengeService;
pub use checkins::CheckInService;
pub use events::EventService;
pub use friendship::FriendshipService;
pub use groups::GroupService;
pub use notifications::NotificationService;
pub use progress::ProgressService;

use std::sync::Arc;

use crate::db::DocumentStore;

/// Every service, wired to one store
#[derive(Clone)]
pub struct Services {
    pub events: EventService,
    pub check_ins: CheckInService,
    pub progress: ProgressService,
    pub friendship: FriendshipService,
    pub groups: GroupService,
    pub notifications: NotificationService,
    pub challenges: ChallengeService,
}

impl Services {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let progress = ProgressService::new(Arc::clone(&store));
        Self {
            events: EventService::new(Arc::clone(&store)),
            check_ins: CheckInService::new(Arc::clone(&store)),
            groups: GroupService::new(Arc::clone(&store), progress.clone()),
            progress,
            friendship: FriendshipService::new(Arc::clone(&store)),
            notifications: NotificationService::new(Arc::clone(&store)),
            challenges: ChallengeService::new(store),
        }
    }
}

