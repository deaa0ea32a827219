pub mod requester;
pub mod snapshot;
