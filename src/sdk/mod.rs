pub mod config;
pub mod map;
pub mod response;
pub mod search;
pub mod util;
