pub mod api;
pub mod session;

mod tests;

pub use api::YouTubeApiClient;
pub use session::{split_tags, YouTubeSession};
