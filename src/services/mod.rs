pub mod auth_service;
pub mod comment_service;
pub mod image_service;
pub mod upload_service;
pub mod vote_service;
