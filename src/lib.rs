#[cfg(feature = "ssr")]
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod preview;
pub mod resolver;
pub mod seed;
pub mod db {
    pub mod models;
    pub mod repository;
    #[cfg(test)]
    pub mod testing;
}
pub mod schema {
    pub mod collection;
    pub mod hooks;
    pub mod pages;
}
pub mod rendering {
    pub mod markdown;
    pub mod meta;
    pub mod page;
}
#[cfg(feature = "ssr")]
pub mod api {
    pub mod errors;
    pub mod pages;
    pub mod preview;
}
