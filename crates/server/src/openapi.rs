use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct RegisterRequest { pub email: String, pub name: String, pub password: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

/// Service form as submitted by the admin UI.
#[derive(ToSchema)]
#[allow(non_snake_case)]
pub struct ServiceFormDoc {
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: Option<String>,
    pub isBookable: bool,
    pub depositPercentage: String,
}

#[derive(ToSchema)]
pub struct FieldErrorDoc { pub field: String, pub message: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::services::list_services,
        crate::routes::services::create_service,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            ServiceFormDoc,
            FieldErrorDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "services")
    )
)]
pub struct ApiDoc;
