//! TaskFlow member API client
//!
//! Typed calls over the authenticated transport. Bearer attachment and the
//! retry-once renewal protocol happen below this layer.

pub mod client;

pub use client::{TaskflowApiClient, FETCH_MY_INFO_PATH, PROFILE_PATH};
