pub mod archive;
pub mod gateway;
pub mod registry;
pub mod sql;
pub mod token;
