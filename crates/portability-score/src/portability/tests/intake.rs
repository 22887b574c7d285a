use super::common::*;
use crate::portability::domain::FieldAdjustment;
use crate::portability::intake::{
    parse_quick_estimate_input, parse_scoring_input, AnalyzeRequest, IntakeError, RawValue,
};
use serde_json::json;

#[test]
fn well_formed_payload_parses_without_adjustments() {
    let registry = registry();

    let parsed = parse_scoring_input(&analyze_request(), &registry).expect("valid payload");

    assert_eq!(parsed.input, baseline_input());
    assert!(parsed.adjustments.is_empty());
}

#[test]
fn numeric_strings_from_form_fields_are_accepted() {
    let registry = registry();
    let request: AnalyzeRequest = serde_json::from_value(json!({
        "marketId": "uae_dubai",
        "bookingCentres": ["Dubai (DIFC)", "Geneva"],
        "aumMix": "3",
        "crossBorderLicenses": " 1 ",
        "productScope": 2,
        "clientConcentration": "3",
        "kycPortability": "1"
    }))
    .expect("payload deserializes");

    let parsed = parse_scoring_input(&request, &registry).expect("valid payload");

    assert_eq!(parsed.input, baseline_input());
}

#[test]
fn out_of_range_values_are_clamped_and_reported() {
    let registry = registry();
    let mut request = analyze_request();
    request.aum_mix = Some(RawValue::Number(9.0));
    request.cross_border_licenses = Some(RawValue::Number(-2.0));

    let parsed = parse_scoring_input(&request, &registry).expect("clamped payload");

    assert_eq!(parsed.input.aum_mix(), 5);
    assert_eq!(parsed.input.cross_border_licenses(), 0);
    assert_eq!(
        parsed.adjustments,
        vec![
            FieldAdjustment {
                field: "aumMix".to_string(),
                received: 9.0,
                applied: 5,
            },
            FieldAdjustment {
                field: "crossBorderLicenses".to_string(),
                received: -2.0,
                applied: 0,
            },
        ]
    );
}

#[test]
fn fractional_values_are_rounded() {
    let registry = registry();
    let mut request = analyze_request();
    request.product_scope = Some(RawValue::from("2.6"));

    let parsed = parse_scoring_input(&request, &registry).expect("rounded payload");

    assert_eq!(parsed.input.product_scope(), 3);
    assert_eq!(parsed.adjustments.len(), 1);
    assert_eq!(parsed.adjustments[0].field, "productScope");
}

#[test]
fn missing_factor_is_rejected_with_its_field_name() {
    let registry = registry();
    let mut request = analyze_request();
    request.kyc_portability = None;

    let err = parse_scoring_input(&request, &registry).expect_err("missing field");

    assert_eq!(
        err,
        IntakeError::MissingField {
            field: "kycPortability"
        }
    );
    assert_eq!(err.field(), Some("kycPortability"));
}

#[test]
fn blank_form_field_counts_as_missing() {
    let registry = registry();
    let mut request = analyze_request();
    request.aum_mix = Some(RawValue::from("  "));

    let err = parse_scoring_input(&request, &registry).expect_err("blank field");

    assert_eq!(err, IntakeError::MissingField { field: "aumMix" });
}

#[test]
fn non_numeric_value_is_rejected() {
    let registry = registry();
    let mut request = analyze_request();
    request.client_concentration = Some(RawValue::from("high"));

    let err = parse_scoring_input(&request, &registry).expect_err("non numeric");

    assert_eq!(
        err,
        IntakeError::InvalidValue {
            field: "clientConcentration",
            value: "high".to_string(),
        }
    );
}

#[test]
fn empty_centre_selection_takes_precedence_over_missing_grades() {
    let registry = registry();
    let request = AnalyzeRequest {
        market_id: Some("uae_dubai".to_string()),
        booking_centres: Some(vec!["   ".to_string()]),
        ..AnalyzeRequest::default()
    };

    let err = parse_scoring_input(&request, &registry).expect_err("no centres");

    assert_eq!(err, IntakeError::EmptyBookingCentres);
    assert_eq!(err.to_string(), "Select at least one booking centre.");
    assert_eq!(err.field(), Some("bookingCentres"));
}

#[test]
fn unknown_and_missing_markets_are_distinguished() {
    let registry = registry();
    let mut request = analyze_request();

    request.market_id = Some("atlantis".to_string());
    let err = parse_scoring_input(&request, &registry).expect_err("unknown market");
    assert_eq!(err.to_string(), "Unknown market 'atlantis'.");

    request.market_id = None;
    let err = parse_scoring_input(&request, &registry).expect_err("missing market");
    assert_eq!(err, IntakeError::MissingField { field: "marketId" });
}

#[test]
fn duplicate_centres_are_collapsed_case_insensitively() {
    let registry = registry();
    let mut request = analyze_request();
    request.booking_centres = Some(vec![
        "Geneva".to_string(),
        " geneva ".to_string(),
        "Zurich".to_string(),
        String::new(),
    ]);

    let parsed = parse_scoring_input(&request, &registry).expect("valid payload");

    assert_eq!(parsed.input.booking_centres(), ["Geneva", "Zurich"]);
}

#[test]
fn non_ascii_case_variants_count_as_one_centre() {
    let registry = registry();
    let mut request = analyze_request();
    request.booking_centres = Some(vec!["Zürich".to_string(), "ZÜRICH".to_string()]);

    let parsed = parse_scoring_input(&request, &registry).expect("valid payload");

    assert_eq!(parsed.input.booking_centres(), ["Zürich"]);
}

#[test]
fn null_centre_list_reads_as_no_selection() {
    let registry = registry();
    let mut request = analyze_request();
    request.booking_centres = None;

    let err = parse_scoring_input(&request, &registry).expect_err("no centres");

    assert_eq!(err, IntakeError::EmptyBookingCentres);
}

#[test]
fn non_scalar_factor_is_rejected_by_field() {
    let registry = registry();
    let mut request = analyze_request();
    request.aum_mix = Some(RawValue::Other(json!(true)));

    let err = parse_scoring_input(&request, &registry).expect_err("boolean factor");

    assert_eq!(
        err,
        IntakeError::InvalidValue {
            field: "aumMix",
            value: "true".to_string(),
        }
    );
    assert_eq!(err.field(), Some("aumMix"));
}

#[test]
fn quick_estimate_payload_needs_no_centres() {
    let registry = registry();

    let parsed =
        parse_quick_estimate_input(&quick_estimate_request(), &registry).expect("valid payload");

    assert_eq!(parsed.input.market_id(), "uae_dubai");
    assert_eq!(parsed.input.grades(), &grades(3, 3, 4, 1, 3));
}
