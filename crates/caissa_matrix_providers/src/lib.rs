pub mod acquisition;
pub mod cache;
pub mod distance_api;
pub mod plan;
pub mod travel_info;
