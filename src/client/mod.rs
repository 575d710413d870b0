//! Client-side guest mode: drafts kept in profile-local storage until the
//! visitor signs in, then merged into the account through the API.

pub mod autosave;
pub mod guest_store;
pub mod local_storage;
pub mod sync;
