pub mod file_mirror;
pub mod odds_http;
pub mod postgres;

pub use file_mirror::FileMirror;
pub use odds_http::HttpTransport;
pub use postgres::PostgresStore;
