use crate::api::{path_id, require_id, ApiClient, ApiError};
use crate::features::payments::types::{CheckoutRequest, CheckoutSession, PaymentStatus};
use tracing::instrument;

pub async fn payment_status(api: &ApiClient, payment_id: &str) -> Result<PaymentStatus, ApiError> {
    let payment_id = path_id(payment_id, "Payment")?;
    api.get_json(&format!("/api/payments/{payment_id}")).await
}

pub async fn my_payments(api: &ApiClient) -> Result<Vec<PaymentStatus>, ApiError> {
    api.get_json("/api/payments/me").await
}

/// Starts a checkout for `course_id`.
#[instrument(skip(api))]
pub async fn checkout(api: &ApiClient, course_id: &str) -> Result<CheckoutSession, ApiError> {
    let course_id = require_id(course_id, "Course")?;
    api.post_json_response("/api/payments/checkout", &CheckoutRequest { course_id })
        .await
}
