pub mod actor;
pub mod connection;
pub mod dictionary;
pub mod framer;
pub mod logger;
pub mod protocol;
pub mod registry;
pub mod turn;
