use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::models::{InfractionType, Severity};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInfractionTypeRequest {
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub severity: Severity,
    #[validate(range(min = 0, max = 7))]
    pub penalty_points: i32,
}

impl From<CreateInfractionTypeRequest> for InfractionType {
    fn from(request: CreateInfractionTypeRequest) -> Self {
        InfractionType {
            id: 0,
            code: request.code,
            description: request.description,
            amount: request.amount,
            severity: request.severity,
            penalty_points: request.penalty_points,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateInfractionTypeRequest {
    #[validate(length(min = 1, max = 20))]
    pub code: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub severity: Option<Severity>,
    #[validate(range(min = 0, max = 7))]
    pub penalty_points: Option<i32>,
}

impl UpdateInfractionTypeRequest {
    pub fn apply(self, current: InfractionType) -> InfractionType {
        InfractionType {
            id: current.id,
            code: self.code.unwrap_or(current.code),
            description: self.description.or(current.description),
            amount: self.amount.unwrap_or(current.amount),
            severity: self.severity.unwrap_or(current.severity),
            penalty_points: self.penalty_points.unwrap_or(current.penalty_points),
        }
    }
}
