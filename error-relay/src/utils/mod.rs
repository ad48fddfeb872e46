pub mod duration;
pub mod http_client;
pub mod text;
