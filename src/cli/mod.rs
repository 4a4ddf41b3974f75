pub mod context;
pub mod search;
pub mod serve;
pub mod status;
