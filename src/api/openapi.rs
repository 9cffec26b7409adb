//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{activity_logs, auth, equipment, health, loans, returns, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lendable API",
        version = "1.0.0",
        description = "Equipment lending and return reconciliation REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Users
        users::list_users,
        users::create_user,
        users::delete_user,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        // Loans
        loans::request_loan,
        loans::list_loans,
        loans::get_loan,
        loans::approve_loan,
        loans::reject_loan,
        loans::hand_over_loan,
        // Returns
        returns::submit_return,
        returns::confirm_return,
        returns::list_returns,
        returns::get_return,
        // Activity
        activity_logs::list_activity_logs,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            // Users
            crate::models::user::User,
            crate::models::user::CreateUser,
            crate::models::user::PageQuery,
            crate::models::Role,
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            crate::models::EquipmentStatus,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanDetails,
            crate::models::loan::CreateLoan,
            crate::models::loan::RejectLoan,
            crate::models::loan::LoanQuery,
            crate::models::LoanStatus,
            // Returns
            returns::SubmitReturnRequest,
            returns::ConfirmReturnRequest,
            returns::SubmittedReturn,
            crate::models::return_record::ReturnRecord,
            crate::models::return_record::ReturnDetails,
            crate::models::return_record::ReturnQuery,
            crate::models::Condition,
            crate::models::ReturnStatus,
            crate::reconciliation::FineBreakdown,
            // Activity
            crate::models::ActivityLog,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User management"),
        (name = "equipment", description = "Equipment catalogue"),
        (name = "loans", description = "Loan workflow"),
        (name = "returns", description = "Return reconciliation and fines"),
        (name = "activity", description = "Activity log")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_return_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/returns"));
        assert!(doc.paths.paths.contains_key("/returns/{id}"));
        assert!(doc.components.unwrap().security_schemes.contains_key("bearer_auth"));
    }
}
