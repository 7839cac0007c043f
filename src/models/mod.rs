pub mod applications;
pub mod opportunities;
pub mod users;
