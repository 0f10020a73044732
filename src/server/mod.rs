//! Line-protocol TCP server exposing a [`UserService`](crate::service::UserService)
//! to other processes.

pub mod router;

pub use router::Router;
