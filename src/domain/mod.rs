pub mod gateway;

// Re-export gateway module for easier access
pub use gateway::*;
