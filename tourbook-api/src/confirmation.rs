use axum::{
    extract::{rejection::FormRejection, State},
    response::Html,
    routing::post,
    Form, Router,
};
use std::collections::BTreeMap;
use tourbook_catalog::SubmittedRider;
use tourbook_order::{CheckoutRequest, Warning, WarningKind};
use tourbook_shared::Masked;
use crate::error::AppError;
use crate::state::AppState;
use crate::view::FALLBACK_BODY;

pub fn routes() -> Router<AppState> {
    Router::new().route("/reservations/confirmation", post(confirm_reservation))
}

async fn confirm_reservation(
    State(state): State<AppState>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<Html<String>, AppError> {
    let Form(fields) = form.map_err(|e| {
        tracing::warn!("Checkout rejected: {}", e.body_text());
        AppError::BadRequest("Error parsing form".to_string())
    })?;
    let request = decode_checkout(&fields)?;
    let mut result = state.orchestrator.confirm(request).await?;

    // Payment has gone through, so a broken view must not turn into an error.
    let body = match state.views.render(&result) {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!("Order {} confirmation view failed: {}", result.order_id, e);
            result
                .warnings
                .insert(Warning::with_detail(WarningKind::ViewRenderFailed, e.to_string()));
            FALLBACK_BODY.to_string()
        }
    };

    if result.warn() {
        tracing::warn!("Confirmed {} warnings: {}", result.summary(), result.warnings);
    } else {
        tracing::info!("Confirmed {}", result.summary());
    }

    Ok(Html(body))
}

/// Maps the checkout form onto a request. Only the tour ID and rider count are
/// checked here; everything else is left to the orchestrator.
pub fn decode_checkout(fields: &[(String, String)]) -> Result<CheckoutRequest, AppError> {
    let mut request = CheckoutRequest::default();
    let mut tour_id = None;
    let mut rider_count = None;
    let mut riders: BTreeMap<usize, SubmittedRider> = BTreeMap::new();

    for (key, value) in fields {
        match key.as_str() {
            "TourID" => tour_id = Some(value.trim()),
            "NumRiders" => rider_count = Some(value.trim()),
            "QuotedTotal" => request.quoted_total = value.clone(),
            "StripeToken" => request.payment_token = Masked::new(value.trim().to_string()),
            "Name" => request.name = value.clone(),
            "Email" => request.email = value.clone(),
            "Mobile" => request.mobile = value.clone(),
            "Hotel" => request.hotel = value.clone(),
            "Misc" => request.misc = value.clone(),
            _ => {
                if let Some((index, attr)) = rider_field(key) {
                    let rider = riders.entry(index).or_default();
                    match attr {
                        "Gender" => rider.gender = value.trim().to_string(),
                        "Height" => rider.height = value.trim().parse().ok(),
                        _ => {}
                    }
                }
            }
        }
    }

    request.tour_id = tour_id
        .and_then(|v| v.parse().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::BadRequest("Invalid tour ID".to_string()))?;
    request.rider_count = rider_count
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| AppError::BadRequest("Invalid number of riders".to_string()))?;
    request.riders = riders.into_values().collect();

    Ok(request)
}

/// `Riders.3.Height` -> `(3, "Height")`
fn rider_field(key: &str) -> Option<(usize, &str)> {
    let rest = key.strip_prefix("Riders.")?;
    let (index, attr) = rest.split_once('.')?;
    Some((index.parse().ok()?, attr))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_decode_full_form() {
        let fields = form(&[
            ("TourID", "563"),
            ("NumRiders", " 2 "),
            ("QuotedTotal", "$98.00"),
            ("StripeToken", "tok_visa"),
            ("Name", "  Pat Rider "),
            ("Email", "pat@example.com"),
            ("Riders.1.Gender", "M"),
            ("Riders.1.Height", "70"),
            ("Riders.0.Gender", "F"),
            ("Riders.0.Height", "tall"),
        ]);

        let request = decode_checkout(&fields).unwrap();
        assert_eq!(request.tour_id, 563);
        assert_eq!(request.rider_count, 2);
        assert_eq!(request.quoted_total, "$98.00");
        assert_eq!(request.payment_token.expose(), "tok_visa");
        assert_eq!(request.name, "  Pat Rider ");
        assert_eq!(request.riders.len(), 2);
        assert_eq!(request.riders[0].gender, "F");
        assert_eq!(request.riders[0].height, None);
        assert_eq!(request.riders[1].height, Some(70));
    }

    #[test]
    fn test_decode_rejects_bad_tour_id() {
        for id in ["", "abc", "0", "-4"] {
            let fields = form(&[("TourID", id), ("NumRiders", "1")]);
            assert!(matches!(decode_checkout(&fields), Err(AppError::BadRequest(_))));
        }
        let fields = form(&[("NumRiders", "1")]);
        assert!(matches!(decode_checkout(&fields), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_decode_rejects_bad_rider_count() {
        let fields = form(&[("TourID", "562"), ("NumRiders", "two")]);
        assert!(matches!(decode_checkout(&fields), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_rider_field_parsing() {
        assert_eq!(rider_field("Riders.12.Gender"), Some((12, "Gender")));
        assert_eq!(rider_field("Riders.x.Gender"), None);
        assert_eq!(rider_field("Riders"), None);
    }
}
