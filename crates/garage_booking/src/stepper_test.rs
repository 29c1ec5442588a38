#[cfg(test)]
mod tests {
    use crate::availability::SLOTS_LOAD_FAILED;
    use crate::clock::FixedClock;
    use crate::models::{BookingReceipt, BookingSubmissionResult, DraftField, OccupancyMap};
    use crate::rules::StepperRules;
    use crate::service::MockBookingBackend;
    use crate::stepper::{Step, StepperFlow};
    use crate::submission::{SLOT_NO_LONGER_AVAILABLE, SUBMIT_FAILED};
    use crate::BookingError;
    use chrono::{NaiveDate, TimeZone, Utc};
    use chrono_tz::Tz;
    use std::sync::Arc;

    const DUBLIN: Tz = Tz::Europe__Dublin;

    fn booking_date() -> NaiveDate {
        // Tuesday, inside the window
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    fn flow(backend: MockBookingBackend) -> StepperFlow {
        // Wednesday 28 May 2025, 10:00 in Dublin
        let now = Utc.with_ymd_and_hms(2025, 5, 28, 9, 0, 0).unwrap();
        StepperFlow::new(
            Arc::new(backend),
            Arc::new(FixedClock::new(now, DUBLIN)),
            StepperRules::default(),
            DUBLIN,
        )
    }

    fn fill_personal_info(flow: &mut StepperFlow) {
        flow.edit(DraftField::Name, "Aoife Byrne");
        flow.edit(DraftField::Email, "aoife@example.ie");
        flow.edit(DraftField::Phone, "0871234567");
        flow.edit(DraftField::RegistrationPart1, "191");
        flow.edit(DraftField::RegistrationPart2, "D");
        flow.edit(DraftField::RegistrationPart3, "4242");
        flow.edit(DraftField::Make, "Toyota");
        flow.edit(DraftField::Model, "Corolla");
    }

    async fn flow_at_service_details(flow: &mut StepperFlow, time: &str) {
        fill_personal_info(flow);
        flow.next().await.unwrap();
        flow.select_date(booking_date()).unwrap();
        flow.select_time(time).unwrap();
        flow.next().await.unwrap();
        flow.edit(DraftField::Service, "Full service");
    }

    fn occupancy(entries: &[(&str, u32)]) -> OccupancyMap {
        let mut occupancy = OccupancyMap::new();
        for (slot, count) in entries {
            occupancy.set(booking_date(), slot, *count);
        }
        occupancy
    }

    #[tokio::test]
    async fn test_personal_info_gates_first_step() {
        let mut backend = MockBookingBackend::new();
        backend.expect_fetch_slot_occupancy().times(0);
        let mut flow = flow(backend);

        flow.edit(DraftField::Name, "Aoife Byrne");
        let err = flow.next().await.unwrap_err();
        match err {
            BookingError::MissingFields(fields) => {
                assert!(fields.contains(&"email"));
                assert!(fields.contains(&"registration (part 1)"));
                assert!(!fields.contains(&"name"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(flow.step(), Step::PersonalInfo);
    }

    #[tokio::test]
    async fn test_entering_date_step_fetches_every_time() {
        let mut backend = MockBookingBackend::new();
        backend
            .expect_fetch_slot_occupancy()
            .times(2)
            .returning(|| Ok(OccupancyMap::new()));
        let mut flow = flow(backend);
        fill_personal_info(&mut flow);

        assert_eq!(flow.next().await.unwrap(), Step::DateTime);
        assert!(flow.availability().is_ready());
        assert_eq!(flow.back().await.unwrap(), Step::PersonalInfo);
        assert_eq!(flow.next().await.unwrap(), Step::DateTime);
    }

    #[tokio::test]
    async fn test_fetch_failure_blocks_date_selection() {
        let mut backend = MockBookingBackend::new();
        backend.expect_fetch_slot_occupancy().times(1).returning(|| {
            Err(BookingError::Rejected {
                endpoint: "availability",
                status: 502,
            })
        });
        let mut flow = flow(backend);
        fill_personal_info(&mut flow);
        flow.next().await.unwrap();

        assert_eq!(flow.availability().error_message(), Some(SLOTS_LOAD_FAILED));
        assert!(matches!(
            flow.select_date(booking_date()),
            Err(BookingError::AvailabilityNotLoaded)
        ));
        assert!(flow.selectable_dates().is_empty());
        assert!(!flow.can_advance());
        assert!(flow.missing_for_step().contains(&"availability"));
    }

    #[tokio::test]
    async fn test_new_date_clears_time() {
        let mut backend = MockBookingBackend::new();
        backend
            .expect_fetch_slot_occupancy()
            .returning(|| Ok(OccupancyMap::new()));
        let mut flow = flow(backend);
        fill_personal_info(&mut flow);
        flow.next().await.unwrap();

        flow.select_date(booking_date()).unwrap();
        flow.select_time("11:00").unwrap();
        assert_eq!(flow.draft().time.as_deref(), Some("11:00"));

        flow.select_date(NaiveDate::from_ymd_opt(2025, 6, 11).unwrap())
            .unwrap();
        assert_eq!(flow.draft().time, None);
    }

    #[tokio::test]
    async fn test_ineligible_picks_are_refused() {
        let mut backend = MockBookingBackend::new();
        backend
            .expect_fetch_slot_occupancy()
            .returning(|| Ok(occupancy(&[("09:00", 2), ("10:00", 1)])));
        let mut flow = flow(backend);
        fill_personal_info(&mut flow);
        flow.next().await.unwrap();

        // the Saturday
        assert!(flow
            .select_date(NaiveDate::from_ymd_opt(2025, 5, 31).unwrap())
            .is_err());
        flow.select_date(booking_date()).unwrap();
        assert!(matches!(
            flow.select_time("09:00"),
            Err(BookingError::SlotUnavailable { .. })
        ));
        assert!(flow.select_time("10:00").is_ok());

        let slots = flow.time_slots();
        assert_eq!(slots.len(), 8);
        assert!(!slots[0].bookable);
        assert!(slots[1].bookable && !slots[1].busy);
    }

    #[tokio::test]
    async fn test_server_rejection_preserves_draft() {
        let mut backend = MockBookingBackend::new();
        backend
            .expect_fetch_slot_occupancy()
            .times(1)
            .returning(|| Ok(occupancy(&[("12:00", 1)])));
        backend.expect_submit_booking().times(1).returning(|_| {
            Err(BookingError::Rejected {
                endpoint: "booking",
                status: 500,
            })
        });
        let mut flow = flow(backend);
        flow_at_service_details(&mut flow, "12:00").await;
        let draft_before = flow.draft().clone();

        let result = flow.submit().await;
        assert_eq!(
            result,
            BookingSubmissionResult::Failed {
                message: SUBMIT_FAILED.to_string()
            }
        );
        assert_eq!(flow.submission_error(), Some(SUBMIT_FAILED));
        assert_eq!(flow.step(), Step::ServiceDetails);
        assert_eq!(flow.draft(), &draft_before);
        assert!(!flow.is_submitting());
        let occupancy = flow.availability().data().unwrap();
        assert_eq!(occupancy.count(booking_date(), "12:00"), 1);
        assert!(flow.session_bookings().is_empty());
    }

    #[tokio::test]
    async fn test_success_increments_occupancy_without_refetch() {
        let mut backend = MockBookingBackend::new();
        backend
            .expect_fetch_slot_occupancy()
            .times(1)
            .returning(|| Ok(occupancy(&[("12:00", 1)])));
        backend
            .expect_submit_booking()
            .times(1)
            .withf(|payload| {
                payload.reg == "191D4242"
                    && payload.start_date.as_deref() == Some("2025-06-10T11:00:00.000Z")
                    && payload.service == "Full service"
            })
            .returning(|_| {
                Ok(BookingReceipt {
                    remote_id: Some("rec123".to_string()),
                    body: serde_json::json!({ "id": "rec123" }),
                })
            });
        let mut flow = flow(backend);
        flow_at_service_details(&mut flow, "12:00").await;

        let result = flow.submit().await;
        match &result {
            BookingSubmissionResult::Accepted { remote_id, .. } => {
                assert_eq!(remote_id.as_deref(), Some("rec123"))
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(flow.step(), Step::Confirmation);
        let occupancy = flow.availability().data().unwrap();
        assert_eq!(occupancy.count(booking_date(), "12:00"), 2);
        assert!(!flow.rules().is_slot_bookable(booking_date(), "12:00", occupancy));

        assert_eq!(flow.session_bookings().len(), 1);
        assert_eq!(flow.draft().name, "");
        assert_eq!(
            flow.confirmation_message().unwrap(),
            "Thank you for your booking. A confirmation email has been sent to aoife@example.ie."
        );
    }

    #[tokio::test]
    async fn test_slot_filled_elsewhere_is_rejected_locally() {
        let mut backend = MockBookingBackend::new();
        let mut calls = 0;
        backend
            .expect_fetch_slot_occupancy()
            .times(2)
            .returning(move || {
                calls += 1;
                if calls == 1 {
                    Ok(OccupancyMap::new())
                } else {
                    Ok(occupancy(&[("10:00", 2)]))
                }
            });
        backend.expect_submit_booking().times(0);
        let mut flow = flow(backend);
        flow_at_service_details(&mut flow, "10:00").await;

        // going back refetches and sees the slot full
        flow.back().await.unwrap();
        assert_eq!(flow.draft().time.as_deref(), Some("10:00"));
        flow.next().await.unwrap();
        let result = flow.submit().await;
        assert_eq!(
            result,
            BookingSubmissionResult::Failed {
                message: SLOT_NO_LONGER_AVAILABLE.to_string()
            }
        );
        assert_eq!(flow.step(), Step::ServiceDetails);
    }

    #[tokio::test]
    async fn test_submit_requires_service() {
        let mut backend = MockBookingBackend::new();
        backend
            .expect_fetch_slot_occupancy()
            .returning(|| Ok(OccupancyMap::new()));
        backend.expect_submit_booking().times(0);
        let mut flow = flow(backend);
        flow_at_service_details(&mut flow, "09:00").await;
        flow.edit(DraftField::Service, "  ");

        let result = flow.submit().await;
        assert!(!result.is_accepted());
        assert!(matches!(flow.next().await, Err(BookingError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_start_new_resets_everything_but_session() {
        let mut backend = MockBookingBackend::new();
        backend
            .expect_fetch_slot_occupancy()
            .returning(|| Ok(OccupancyMap::new()));
        backend.expect_submit_booking().returning(|_| {
            Ok(BookingReceipt {
                remote_id: None,
                body: serde_json::Value::Null,
            })
        });
        let mut flow = flow(backend);
        flow_at_service_details(&mut flow, "15:00").await;
        assert!(flow.submit().await.is_accepted());

        flow.start_new();
        assert_eq!(flow.step(), Step::PersonalInfo);
        assert_eq!(flow.draft(), &crate::models::BookingDraft::default());
        assert_eq!(flow.session_bookings().len(), 1);
        assert_eq!(flow.confirmation_message(), None);
    }
}
