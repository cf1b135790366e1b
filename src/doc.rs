//! OpenAPI document served at `/v3/api-docs`.

use crate::model::{Anime, Principal, Role};
use crate::response::ErrorBody;
use crate::security::Credentials;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            "basicAuth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(title = "Anime service", description = "Role-protected CRUD API for anime records."),
    paths(
        crate::handlers::anime::list_all,
        crate::handlers::anime::find_by_id,
        crate::handlers::anime::save,
        crate::handlers::anime::save_batch,
        crate::handlers::anime::update,
        crate::handlers::anime::delete,
        crate::handlers::auth::login,
    ),
    components(schemas(Anime, Principal, Role, Credentials, ErrorBody)),
    tags(
        (name = "anime", description = "Anime records"),
        (name = "auth", description = "Credential checks")
    )
)]
pub struct ApiDoc;
