#[cfg(test)]
mod tests {
    use crate::models::{OccupancyMap, UnavailableDates};
    use crate::rules::{CalendarRules, StepperRules};
    use chrono::{Datelike, Days, NaiveDate, Weekday};
    use proptest::prelude::*;

    fn base_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    // Any day between 2024 and roughly 2030
    fn date_strategy() -> impl Strategy<Value = NaiveDate> {
        (0u64..2500).prop_map(|offset| base_date().checked_add_days(Days::new(offset)).unwrap())
    }

    proptest! {
        #[test]
        fn test_past_dates_never_selectable(today in date_strategy(), back in 1u64..400) {
            let date = today.checked_sub_days(Days::new(back)).unwrap();
            let stepper = StepperRules::default();
            let calendar = CalendarRules::default();
            prop_assert!(!stepper.is_date_selectable(date, today, &OccupancyMap::new()));
            prop_assert!(!calendar.is_date_selectable(date, today, &UnavailableDates::default()));
        }

        #[test]
        fn test_weekends_never_selectable(today in date_strategy(), ahead in 0u64..120) {
            let date = today.checked_add_days(Days::new(ahead)).unwrap();
            prop_assume!(matches!(date.weekday(), Weekday::Sat | Weekday::Sun));
            let stepper = StepperRules::default();
            let calendar = CalendarRules::default();
            prop_assert!(!stepper.is_date_selectable(date, today, &OccupancyMap::new()));
            prop_assert!(!calendar.is_date_selectable(date, today, &UnavailableDates::default()));
        }

        #[test]
        fn test_stepper_dates_stay_in_window(today in date_strategy()) {
            let rules = StepperRules::default();
            let last = rules.last_bookable_date(today);
            for date in rules.selectable_dates(today, &OccupancyMap::new()) {
                prop_assert!(date > today);
                prop_assert!(date <= last);
            }
        }

        #[test]
        fn test_calendar_never_inside_blackout(today in date_strategy(), ahead in 0u64..40) {
            let rules = CalendarRules::default();
            let date = today.checked_add_days(Days::new(ahead)).unwrap();
            if date <= rules.blackout_end(today) {
                prop_assert!(!rules.is_date_selectable(date, today, &UnavailableDates::default()));
            }
        }

        #[test]
        fn test_increment_only_closes_slots(count in 0u32..5) {
            let rules = StepperRules::default();
            let date = base_date();
            let mut occupancy = OccupancyMap::new();
            occupancy.set(date, "10:00", count);
            let before = rules.is_slot_bookable(date, "10:00", &occupancy);
            occupancy.increment(date, "10:00");
            let after = rules.is_slot_bookable(date, "10:00", &occupancy);
            prop_assert!(before || !after);
            prop_assert_eq!(occupancy.count(date, "10"), count + 1);
        }
    }
}
