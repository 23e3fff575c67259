// src/models/mod.rs
pub mod user_state;

pub use user_state::{SaveUserStateRequest, SaveUserStateResponse, UserState, UserStateRow};
