use serde::Deserialize;
use validator::Validate;

use crate::models::Vehicle;
use crate::utils::validation::validate_plate_format;

// Request para crear un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(custom = "validate_plate_format")]
    pub plate: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub category: Option<String>,
    pub owner_name: Option<String>,
}

impl From<CreateVehicleRequest> for Vehicle {
    fn from(request: CreateVehicleRequest) -> Self {
        Vehicle {
            id: 0,
            plate: request.plate,
            brand: request.brand,
            model: request.model,
            category: request.category,
            owner_name: request.owner_name,
        }
    }
}

// Request para actualizar un vehículo (campo ausente = sin cambios, "" = borrar)
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(custom = "validate_plate_format")]
    pub plate: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub category: Option<String>,
    pub owner_name: Option<String>,
}

impl UpdateVehicleRequest {
    pub fn apply(self, current: Vehicle) -> Vehicle {
        Vehicle {
            id: current.id,
            plate: self.plate.unwrap_or(current.plate),
            brand: self.brand.or(current.brand),
            model: self.model.or(current.model),
            category: self.category.or(current.category),
            owner_name: self.owner_name.or(current.owner_name),
        }
    }
}

// Query de búsqueda parcial por placa
#[derive(Debug, Deserialize)]
pub struct PlateSearchQuery {
    pub plate: String,
}
