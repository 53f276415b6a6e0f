//! Promo codes service errors.

use athfal::{products::ProductError, promotions::PromotionError};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromoCodesServiceError {
    #[error("promo code not found")]
    NotFound,

    #[error("promo code usage limit reached")]
    UsageExhausted,

    #[error("invalid data")]
    InvalidData,

    #[error("stored promo code is invalid")]
    InvalidPromotion(#[from] PromotionError),

    #[error("stored promo code scope is invalid")]
    InvalidScope(#[from] ProductError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for PromoCodesServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
