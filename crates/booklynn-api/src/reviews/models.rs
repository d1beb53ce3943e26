//! Review models and wire types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Review record
///
/// Maps to the `reviews` table. Either reference may be null after the
/// account or book it pointed at was deleted.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Review {
    pub uid: Uuid,
    pub rating: i32,
    pub review_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_uid: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_uid: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Review creation request
///
/// The rating bound is checked here, before anything touches storage.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,

    #[validate(length(min = 1, max = 100))]
    pub review_text: String,
}
