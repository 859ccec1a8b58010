//! Request and response bodies of the HTTP surface.

pub mod requests;
pub mod responses;
