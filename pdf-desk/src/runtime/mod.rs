mod action_queue;
mod desk;

pub use desk::Desk;
