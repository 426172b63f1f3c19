pub mod api;
pub mod auth;
pub mod media;
pub mod permalink;
pub mod session;


pub use api::RedditApiClient;
pub use auth::RedditToken;
pub use media::MediaFile;
pub use permalink::extract_post_id;
pub use session::{PostContent, RedditSession};
