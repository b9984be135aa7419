pub mod comment;
pub mod image;
pub mod user;
pub mod vote;

pub use comment::*;
pub use image::*;
pub use user::*;
pub use vote::*;
