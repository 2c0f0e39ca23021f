pub mod broadcast_manager;

pub use broadcast_manager::BroadcastChannelManager;
