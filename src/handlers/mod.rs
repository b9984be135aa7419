pub mod auth;
pub mod comments;
pub mod images;

pub async fn root() -> &'static str {
    "hello"
}
