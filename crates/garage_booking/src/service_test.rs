#[cfg(test)]
mod tests {
    use crate::models::BookingPayload;
    use crate::service::{
        parse_occupancy, parse_unavailable_dates, remote_booking_id, BookingBackend,
        WebhookBookingService,
    };
    use crate::BookingError;
    use chrono::NaiveDate;
    use garage_config::EndpointsConfig;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn endpoints(server: &MockServer) -> EndpointsConfig {
        EndpointsConfig {
            availability_url: format!("{}/availability", server.uri()),
            unavailable_dates_url: format!("{}/unavailable", server.uri()),
            booking_url: format!("{}/booking", server.uri()),
            cancel_url: format!("{}/cancel", server.uri()),
            request_timeout_secs: Some(5),
        }
    }

    fn payload() -> BookingPayload {
        BookingPayload {
            name: "Aoife Byrne".to_string(),
            email: "aoife@example.ie".to_string(),
            phone: "0871234567".to_string(),
            reg: "191D4242".to_string(),
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
            start_date: Some("2025-06-10T08:00:00.000Z".to_string()),
            end_date: Some("2025-06-10T09:00:00.000Z".to_string()),
            booking_date: "2025-06-10".to_string(),
            created_at: "2025-06-01 11:00:00".to_string(),
            service: "Full service".to_string(),
            notes: String::new(),
            status: None,
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_occupancy_flattens_and_skips_bad_dates() {
        let wire = serde_json::from_value(json!([
            { "2025-06-10": { "09": 1, "10": 2 } },
            { "not-a-date": { "09": 2 } },
            { "2025-06-11": { "14": 2 }, "2025-06-12": {} },
            { "2025-06-10": { "11": 1 } }
        ]))
        .unwrap();
        let occupancy = parse_occupancy(wire);
        assert_eq!(occupancy.len(), 3);
        // the later entry for 10 June replaced the first
        assert_eq!(occupancy.count(d(2025, 6, 10), "09:00"), 0);
        assert_eq!(occupancy.count(d(2025, 6, 10), "11:00"), 1);
        assert_eq!(occupancy.count(d(2025, 6, 11), "14:00"), 2);
        assert!(occupancy.has_date(d(2025, 6, 12)));
    }

    #[test]
    fn test_parse_occupancy_sums_keys_for_the_same_hour() {
        let wire = serde_json::from_value(json!([
            { "2025-06-10": { "09": 2, "9": 0, "10": 1, "10:00": 1 } }
        ]))
        .unwrap();
        let occupancy = parse_occupancy(wire);
        assert_eq!(occupancy.count(d(2025, 6, 10), "09:00"), 2);
        assert_eq!(occupancy.count(d(2025, 6, 10), "10:00"), 2);
    }

    #[test]
    fn test_parse_occupancy_null_day_is_open() {
        let wire = serde_json::from_str(
            r#"[{"2025-06-10": null}, {"2025-06-11": {"09": 2}}]"#,
        )
        .unwrap();
        let occupancy = parse_occupancy(wire);
        assert!(!occupancy.has_date(d(2025, 6, 10)));
        assert_eq!(occupancy.count(d(2025, 6, 10), "09:00"), 0);
        assert_eq!(occupancy.count(d(2025, 6, 11), "09:00"), 2);
    }

    #[test]
    fn test_parse_unavailable_dates_takes_calendar_day() {
        let raw = vec![
            "2025-06-10".to_string(),
            "2025-06-11T00:00:00.000Z".to_string(),
            "soon".to_string(),
        ];
        let dates = parse_unavailable_dates(&raw);
        assert_eq!(dates.len(), 2);
        assert!(dates.contains(d(2025, 6, 11)));
    }

    #[test]
    fn test_remote_booking_id_shapes() {
        assert_eq!(remote_booking_id(&json!({ "id": "rec1" })).as_deref(), Some("rec1"));
        assert_eq!(remote_booking_id(&json!({ "bookingId": 7 })).as_deref(), Some("7"));
        assert_eq!(
            remote_booking_id(&json!([{ "booking_id": "x" }])).as_deref(),
            Some("x")
        );
        assert_eq!(remote_booking_id(&json!({ "id": "" })), None);
        assert_eq!(remote_booking_id(&json!([])), None);
        assert_eq!(remote_booking_id(&serde_json::Value::Null), None);
    }

    #[tokio::test]
    async fn test_fetch_slot_occupancy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/availability"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{ "2025-06-10": { "09": 2 } }])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let service = WebhookBookingService::new(endpoints(&server)).unwrap();
        let occupancy = service.fetch_slot_occupancy().await.unwrap();
        assert_eq!(occupancy.count(d(2025, 6, 10), "09:00"), 2);
    }

    #[tokio::test]
    async fn test_fetch_slot_occupancy_tolerates_null_days() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/availability"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "2025-06-10": null },
                { "2025-06-11": { "09": 1 } }
            ])))
            .mount(&server)
            .await;

        let service = WebhookBookingService::new(endpoints(&server)).unwrap();
        let occupancy = service.fetch_slot_occupancy().await.unwrap();
        assert_eq!(occupancy.len(), 1);
        assert_eq!(occupancy.count(d(2025, 6, 11), "09:00"), 1);
    }

    #[tokio::test]
    async fn test_fetch_unavailable_dates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/unavailable"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "dates": ["2025-07-01"] })),
            )
            .mount(&server)
            .await;

        let service = WebhookBookingService::new(endpoints(&server)).unwrap();
        let dates = service.fetch_unavailable_dates().await.unwrap();
        assert!(dates.contains(d(2025, 7, 1)));
    }

    #[tokio::test]
    async fn test_non_success_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/availability"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let service = WebhookBookingService::new(endpoints(&server)).unwrap();
        let err = service.fetch_slot_occupancy().await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::Rejected {
                endpoint: "availability",
                status: 503
            }
        ));
        assert!(!err.is_local());
    }

    #[tokio::test]
    async fn test_malformed_availability_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/availability"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let service = WebhookBookingService::new(endpoints(&server)).unwrap();
        assert!(service.fetch_slot_occupancy().await.is_err());
    }

    #[tokio::test]
    async fn test_submit_booking_posts_payload() {
        let server = MockServer::start().await;
        let expected = serde_json::to_value(payload()).unwrap();
        Mock::given(method("POST"))
            .and(path("/booking"))
            .and(body_json(&expected))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "rec9" }])))
            .expect(1)
            .mount(&server)
            .await;

        let service = WebhookBookingService::new(endpoints(&server)).unwrap();
        let receipt = service.submit_booking(&payload()).await.unwrap();
        assert_eq!(receipt.remote_id.as_deref(), Some("rec9"));
    }

    #[tokio::test]
    async fn test_submit_with_empty_body_still_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/booking"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let service = WebhookBookingService::new(endpoints(&server)).unwrap();
        let receipt = service.submit_booking(&payload()).await.unwrap();
        assert_eq!(receipt.remote_id, None);
        assert_eq!(receipt.body, serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_cancel_booking_posts_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cancel"))
            .and(body_json(json!({ "bookingId": "2025-06-10T09:00:00+00:00" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "bookingId": "2025-06-10T09:00:00+00:00" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let service = WebhookBookingService::new(endpoints(&server)).unwrap();
        let receipt = service
            .cancel_booking("2025-06-10T09:00:00+00:00")
            .await
            .unwrap();
        assert_eq!(
            receipt.echoed_booking_id.as_deref(),
            Some("2025-06-10T09:00:00+00:00")
        );
    }
}
