pub mod crud;
pub mod fixtures;
pub mod model;
