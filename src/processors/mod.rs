//! Output processors for translated records

pub mod export;
pub mod table;
