use serde::Deserialize;
use validator::Validate;

use crate::models::OfficerRole;
use crate::utils::validation::validate_tax_id_format;

// La contraseña llega en claro y solo se guarda su hash bcrypt
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOfficerRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(custom = "validate_tax_id_format")]
    pub tax_id: Option<String>,
    #[validate(email, length(max = 100))]
    pub email: String,
    #[validate(length(min = 6, max = 100))]
    pub password: String,
    pub role: OfficerRole,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateOfficerRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(custom = "validate_tax_id_format")]
    pub tax_id: Option<String>,
    #[validate(email, length(max = 100))]
    pub email: Option<String>,
    #[validate(length(min = 6, max = 100))]
    pub password: Option<String>,
    pub role: Option<OfficerRole>,
}
