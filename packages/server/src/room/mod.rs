pub mod authorization;
pub mod broadcast;
pub mod registry;

pub use authorization::AuthorizationResolver;
pub use broadcast::BroadcastRouter;
pub use registry::RoomRegistry;
