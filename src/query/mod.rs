//! Query construction for the search backend

pub mod count;

pub use count::CountQuery;
