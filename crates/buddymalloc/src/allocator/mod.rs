pub mod buddy;

pub use buddy::BuddyAllocator;
