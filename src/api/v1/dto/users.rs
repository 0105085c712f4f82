/*
 * Responsibility
 * - response DTO for /users/me
 */
use serde::Serialize;

use crate::services::auth::{Authority, Role, SecurityContext};

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
    pub authorities: Vec<Authority>,
}

impl From<SecurityContext> for MeResponse {
    fn from(ctx: SecurityContext) -> Self {
        let p = ctx.principal;
        Self {
            id: p.id,
            name: p.name,
            email: p.identifier,
            role: p.role,
            authorities: ctx.authorities,
        }
    }
}
