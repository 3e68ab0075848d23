#[macro_use]
extern crate rocket;

mod config;
mod models;
mod routes;
mod services;
mod store;
mod utils;

use crate::config::AppConfig;
use crate::services::feed::FeedEngine;
use crate::store::account_store::AccountStore;
use crate::store::comic_store::ComicStore;
use crate::utils::cors::CORS;

/// Assemble the rocket with freshly constructed stores. The stores are built
/// here, once, and handed to the routes through managed state; nothing holds
/// a process-global handle.
pub fn build_rocket(config: AppConfig) -> rocket::Rocket<rocket::Build> {
    let comics = ComicStore::new(config.store_timeout);
    let accounts = AccountStore::new(config.store_timeout);
    let feed = FeedEngine::new(comics.clone());

    rocket::build()
        .attach(CORS)
        .manage(comics)
        .manage(accounts)
        .manage(feed)
        .mount("/", routes![
            routes::auth::nonce,
            routes::auth::verify,
            routes::auth::session,
            routes::auth::logout,
            routes::auth::nonce_options,
            routes::auth::verify_options,
            routes::auth::session_options,
            routes::auth::logout_options,
            routes::comics::list_comics,
            routes::comics::top_comics,
            routes::comics::get_comic,
            routes::comics::create_comic,
            routes::comics::delete_comic,
            routes::comics::vote_comic,
            routes::comics::comics_options,
            routes::comics::top_options,
            routes::comics::comic_options,
            routes::comics::vote_options,
        ])
}

#[launch]
fn rocket() -> rocket::Rocket<rocket::Build> {
    build_rocket(AppConfig::from_env())
}
