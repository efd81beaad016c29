use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod api;
mod auth;
mod config;
mod db;
mod entities;
mod error;
mod models;
mod pagination;
mod services;
mod validators;
mod views;

use config::Config;
use db::{create_mysql_pool, ensure_admin_user};
use services::ingredient_import::import_ingredients_csv;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().expect("Failed to load configuration");

    log::info!(
        "Starting server on {}:{}",
        config.server.host,
        config.server.port
    );
    let mysql_pool = create_mysql_pool(&config)
        .await
        .expect("Failed to create MySQL pool");
    log::info!("Database connection established");

    ensure_admin_user(&mysql_pool, &config)
        .await
        .expect("Failed to seed the staff account");
    if let Some(path) = config.seed.ingredients_csv.clone() {
        import_ingredients_csv(&mysql_pool, std::path::Path::new(&path))
            .await
            .expect("Failed to import the ingredient CSV");
    }

    let openapi = api::ApiDoc::openapi();

    let server_host = config.server.host.clone();
    let server_port = config.server.port;
    // With the `mock` feature enabled (by tests), DatabaseConnection is not
    // Clone, so share one pool across workers through the web::Data Arc.
    let mysql_pool = web::Data::new(mysql_pool);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(web::Data::new(config.clone()))
            .app_data(mysql_pool.clone())
            .route(
                "/api/docs",
                web::get().to(|| async {
                    actix_web::HttpResponse::PermanentRedirect()
                        .append_header(("Location", "/api/docs/"))
                        .finish()
                }),
            )
            .service(
                SwaggerUi::new("/api/docs/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/auth")
                            .route("/signup", web::post().to(api::auth::signup))
                            .route("/login", web::post().to(api::auth::login)),
                    )
                    .service(
                        // Literal segments go before `{user_id}` so
                        // /users/me and /users/subscriptions match first.
                        web::scope("/users")
                            .route("", web::get().to(api::users::get_users))
                            .route("/me", web::get().to(api::users::me))
                            .route(
                                "/subscriptions",
                                web::get().to(api::users::my_subscriptions),
                            )
                            .route(
                                "/{user_id}/subscribe",
                                web::post().to(api::users::subscribe),
                            )
                            .route(
                                "/{user_id}/subscribe",
                                web::delete().to(api::users::unsubscribe),
                            )
                            .route("/{user_id}", web::get().to(api::users::get_user)),
                    )
                    .service(
                        web::scope("/recipes")
                            .route("", web::get().to(api::recipes::get_recipes))
                            .route("", web::post().to(api::recipes::create_recipe))
                            .route(
                                "/download_shopping_cart",
                                web::get().to(api::recipes::download_shopping_cart),
                            )
                            .route(
                                "/{recipe_id}/favorite",
                                web::post().to(api::recipes::favorite_recipe),
                            )
                            .route(
                                "/{recipe_id}/favorite",
                                web::delete().to(api::recipes::unfavorite_recipe),
                            )
                            .route(
                                "/{recipe_id}/shopping_cart",
                                web::post().to(api::recipes::add_to_shopping_cart),
                            )
                            .route(
                                "/{recipe_id}/shopping_cart",
                                web::delete().to(api::recipes::remove_from_shopping_cart),
                            )
                            .route("/{recipe_id}", web::get().to(api::recipes::get_recipe))
                            .route("/{recipe_id}", web::put().to(api::recipes::update_recipe))
                            .route("/{recipe_id}", web::patch().to(api::recipes::update_recipe))
                            .route(
                                "/{recipe_id}",
                                web::delete().to(api::recipes::delete_recipe),
                            ),
                    )
                    .service(
                        web::scope("/tags")
                            .route("", web::get().to(api::tags::get_tags))
                            .route("", web::post().to(api::tags::create_tag))
                            .route("/{tag_id}", web::get().to(api::tags::get_tag))
                            .route("/{tag_id}", web::delete().to(api::tags::delete_tag)),
                    )
                    .service(
                        web::scope("/ingredients")
                            .route("", web::get().to(api::ingredients::get_ingredients))
                            .route("", web::post().to(api::ingredients::create_ingredient))
                            .route(
                                "/{ingredient_id}",
                                web::get().to(api::ingredients::get_ingredient),
                            ),
                    ),
            )
    })
    .bind(format!("{}:{}", server_host, server_port))?
    .run()
    .await
}
