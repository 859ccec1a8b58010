pub mod data;
pub mod databases;
pub mod tables;
pub mod users;
