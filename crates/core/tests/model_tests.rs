use std::collections::HashMap;

use merchant_dashboard_core::errors::CoreError;
use merchant_dashboard_core::logging::{init_logging, LoggingConfig};
use merchant_dashboard_core::models::chart::ChartGeometry;
use merchant_dashboard_core::models::organization::{
    NewOrganization, Organization, OrganizationUpdate,
};
use merchant_dashboard_core::models::period::{Granularity, PeriodSelection};
use merchant_dashboard_core::models::settings::{Settings, MAX_ANCHOR_HISTORY};
use merchant_dashboard_core::models::statistics::{
    StatisticsRequest, StatisticsResponse, Totals,
};
use merchant_dashboard_core::models::user::Role;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

// ═══════════════════════════════════════════════════════════════════
//  Granularity serde
// ═══════════════════════════════════════════════════════════════════

mod granularity {
    use super::*;

    #[test]
    fn serializes_lowercase_plural() {
        assert_eq!(
            serde_json::to_string(&Granularity::Quarters).unwrap(),
            "\"quarters\""
        );
        let g: Granularity = serde_json::from_str("\"weeks\"").unwrap();
        assert_eq!(g, Granularity::Weeks);
    }

    #[test]
    fn rejects_singular_on_the_wire() {
        assert!(serde_json::from_str::<Granularity>("\"week\"").is_err());
    }

    #[test]
    fn unknown_name_is_validation_error() {
        let err = "decade".parse::<Granularity>().unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Statistics wire types
// ═══════════════════════════════════════════════════════════════════

mod statistics_wire {
    use super::*;

    #[test]
    fn request_is_camel_case() {
        let request = StatisticsRequest::from_selection(
            &PeriodSelection::new(Granularity::Quarters, "Q1 2025"),
            true,
        );
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"period":"quarters","value":"Q1 2025","comparePrevious":true}"#
        );
    }

    #[test]
    fn empty_response_uses_defaults() {
        let response: StatisticsResponse = serde_json::from_str("{}").unwrap();
        assert!(response.data_points.is_empty());
        assert_eq!(response.totals, Totals::default());
        assert!(response.previous_period.is_none());
    }

    #[test]
    fn full_response() {
        let json = r#"{
            "dataPoints": [
                {"label": "1", "revenue": 1500.5, "date": "2025-11-01"},
                {"label": "2", "date": "2025-11-02"}
            ],
            "totals": {"revenue": 1500.5, "transactions": 3},
            "previousPeriod": {"dataPoints": []}
        }"#;
        let response: StatisticsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.data_points.len(), 2);
        assert_eq!(response.data_points[0].revenue, 1500.5);
        assert_eq!(response.data_points[1].revenue, 0.0);
        assert_eq!(response.totals.transactions, 3);
        assert_eq!(response.totals.refunds, 0.0);
        assert!(response.previous_period.is_some());
    }

    #[test]
    fn malformed_response_maps_to_deserialization_error() {
        let err: CoreError = serde_json::from_str::<StatisticsResponse>("{\"dataPoints\": 5}")
            .unwrap_err()
            .into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Organizations & users
// ═══════════════════════════════════════════════════════════════════

mod organization {
    use super::*;

    #[test]
    fn optional_fields_default() {
        let org: Organization =
            serde_json::from_str(r#"{"id": "org-1", "name": "Boutique Akwa"}"#).unwrap();
        assert_eq!(org.name, "Boutique Akwa");
        assert!(org.description.is_none());
        assert!(org.operators.is_empty());
    }

    #[test]
    fn new_organization_skips_missing_fields() {
        let json = serde_json::to_string(&NewOrganization::new("Akwa")).unwrap();
        assert_eq!(json, r#"{"name":"Akwa","operators":[]}"#);
    }

    #[test]
    fn update_serializes_only_set_fields() {
        let update = OrganizationUpdate {
            website: Some("https://akwa.cm".into()),
            ..OrganizationUpdate::default()
        };
        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            r#"{"website":"https://akwa.cm"}"#
        );
    }

    #[test]
    fn role_serde_and_display() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(Role::Merchant.to_string(), "merchant");
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.api_base_url, "http://localhost:8000/api");
        assert_eq!(s.currency, "XAF");
        assert_eq!(s.request_timeout_secs, 30);
        assert_eq!(s.anchor_history, 12);
        assert_eq!(s.chart, ChartGeometry::default());
        assert!(s.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s: Settings = serde_json::from_str(r#"{"currency": "EUR"}"#).unwrap();
        assert_eq!(s.currency, "EUR");
        assert_eq!(s.request_timeout_secs, 30);
    }

    #[test]
    fn from_lookup_reads_variables() {
        let s = Settings::from_lookup(lookup(&[
            ("MERCHANT_API_URL", "https://api.momo.cm/v1/"),
            ("MERCHANT_API_TOKEN", "tok"),
            ("MERCHANT_CURRENCY", "xof"),
            ("MERCHANT_TIMEOUT_SECS", " 10 "),
            ("MERCHANT_ANCHOR_HISTORY", "6"),
        ]))
        .unwrap();
        assert_eq!(s.api_base_url, "https://api.momo.cm/v1");
        assert_eq!(s.api_token.as_deref(), Some("tok"));
        assert_eq!(s.currency, "XOF");
        assert_eq!(s.request_timeout_secs, 10);
        assert_eq!(s.anchor_history, 6);
    }

    #[test]
    fn from_lookup_without_variables_is_default() {
        assert_eq!(Settings::from_lookup(|_| None).unwrap(), Settings::default());
    }

    #[test]
    fn blank_token_is_none() {
        let s = Settings::from_lookup(lookup(&[("MERCHANT_API_TOKEN", "  ")])).unwrap();
        assert!(s.api_token.is_none());
    }

    #[test]
    fn bad_number_is_config_error() {
        let err = Settings::from_lookup(lookup(&[("MERCHANT_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn huge_anchor_history_is_config_error() {
        let err = Settings::from_lookup(lookup(&[(
            "MERCHANT_ANCHOR_HISTORY",
            "1000000000000",
        )]))
        .unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn anchor_history_cap_is_inclusive() {
        let settings = Settings {
            anchor_history: MAX_ANCHOR_HISTORY,
            ..Settings::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn validation_failures() {
        let bad = [
            Settings {
                api_base_url: "localhost:8000".into(),
                ..Settings::default()
            },
            Settings {
                currency: "EURO".into(),
                ..Settings::default()
            },
            Settings {
                request_timeout_secs: 0,
                ..Settings::default()
            },
            Settings {
                anchor_history: 0,
                ..Settings::default()
            },
            Settings {
                anchor_history: MAX_ANCHOR_HISTORY + 1,
                ..Settings::default()
            },
        ];
        for settings in bad {
            assert!(matches!(settings.validate(), Err(CoreError::Config(_))));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Logging
// ═══════════════════════════════════════════════════════════════════

mod logging {
    use super::*;

    #[test]
    fn invalid_filter_is_rejected() {
        let config = LoggingConfig {
            log_level: "merchant_dashboard_core=loud".into(),
            ..LoggingConfig::default()
        };
        assert!(matches!(init_logging(&config), Err(CoreError::Config(_))));
    }

    #[test]
    fn second_init_is_an_error_not_a_panic() {
        let config = LoggingConfig::default();
        let first = init_logging(&config);
        let second = init_logging(&config);
        assert!(first.is_ok());
        assert!(matches!(second, Err(CoreError::Config(_))));
    }
}
