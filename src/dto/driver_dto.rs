use serde::Deserialize;
use validator::Validate;

use crate::models::Driver;
use crate::utils::validation::validate_tax_id_format;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDriverRequest {
    #[validate(custom = "validate_tax_id_format")]
    pub tax_id: String,
    pub license_number: Option<String>,
    pub license_category: Option<String>,
    pub region: Option<String>,
    pub full_name: String,
}

impl From<CreateDriverRequest> for Driver {
    fn from(request: CreateDriverRequest) -> Self {
        Driver {
            id: 0,
            tax_id: request.tax_id,
            license_number: request.license_number,
            license_category: request.license_category,
            region: request.region,
            full_name: request.full_name,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateDriverRequest {
    #[validate(custom = "validate_tax_id_format")]
    pub tax_id: Option<String>,
    pub license_number: Option<String>,
    pub license_category: Option<String>,
    pub region: Option<String>,
    pub full_name: Option<String>,
}

impl UpdateDriverRequest {
    pub fn apply(self, current: Driver) -> Driver {
        Driver {
            id: current.id,
            tax_id: self.tax_id.unwrap_or(current.tax_id),
            license_number: self.license_number.or(current.license_number),
            license_category: self.license_category.or(current.license_category),
            region: self.region.or(current.region),
            full_name: self.full_name.unwrap_or(current.full_name),
        }
    }
}
