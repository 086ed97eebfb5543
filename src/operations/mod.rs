pub mod creation;
pub mod grouping;
pub mod path;
pub mod query;
pub mod region;
pub mod surgery;
