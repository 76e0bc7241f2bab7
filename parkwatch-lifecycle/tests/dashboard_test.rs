use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use parkwatch_core::mock::MockGateway;
use parkwatch_core::{AuthUser, BookingClassifier, CoreError, LifecycleStage, ManualClock};
use parkwatch_lifecycle::DashboardLoader;
use parkwatch_shared::{Booking, BookingWithSpot, ParkingSpot, Profile, SensorReading, Transaction};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn booking(
    user_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    sensor: Option<&str>,
) -> BookingWithSpot {
    let spot_id = Uuid::new_v4();
    BookingWithSpot {
        booking: Booking {
            id: Uuid::new_v4(),
            user_id,
            spot_id,
            vehicle_number: "DL3CAB0001".to_string(),
            start_time: start,
            end_time: Some(end),
            total_cost: 25.0,
            is_completed: false,
        },
        spot: ParkingSpot {
            id: spot_id,
            spot_number: "D-1".to_string(),
            location: "Roof".to_string(),
            camera_feed_url: None,
            sensor_id: sensor.map(str::to_string),
        },
    }
}

fn signed_in(gateway: &MockGateway) -> Uuid {
    let user_id = Uuid::new_v4();
    gateway.sign_in(AuthUser {
        id: user_id,
        email: None,
    });
    gateway.set_profile(Profile {
        id: user_id,
        username: "asha".to_string(),
        credit_balance: 250.0,
    });
    user_id
}

fn loader(gateway: &Arc<MockGateway>) -> DashboardLoader {
    DashboardLoader::new(
        gateway.clone(),
        BookingClassifier::default(),
        Arc::new(ManualClock::new(now())),
    )
}

#[tokio::test]
async fn test_load_requires_session() {
    let gateway = Arc::new(MockGateway::new());

    let err = loader(&gateway).load().await.unwrap_err();

    assert!(matches!(err, CoreError::AuthenticationError(_)));
    assert_eq!(gateway.calls("profiles"), 0);
}

#[tokio::test]
async fn test_profile_failure_aborts_load() {
    let gateway = Arc::new(MockGateway::new());
    signed_in(&gateway);
    gateway.fail_reads_of("profiles");

    assert!(loader(&gateway).load().await.is_err());
    assert_eq!(gateway.calls("bookings"), 0);
}

#[tokio::test]
async fn test_bookings_are_split_and_annotated() {
    let gateway = Arc::new(MockGateway::new());
    let user_id = signed_in(&gateway);
    let t = now();

    let active = booking(user_id, t - Duration::minutes(30), t + Duration::minutes(30), Some("S-1"));
    let late = booking(user_id, t - Duration::hours(2), t - Duration::minutes(5), None);
    let later = booking(user_id, t + Duration::hours(1), t + Duration::hours(2), Some("S-9"));
    gateway.set_bookings(vec![later.clone(), active.clone(), late.clone()]);
    gateway.set_sensor_readings(vec![SensorReading {
        sensor_id: "S-1".to_string(),
        is_occupied: true,
        recorded_at: t,
    }]);

    let snapshot = loader(&gateway).load().await.unwrap();

    assert_eq!(snapshot.profile.username, "asha");
    assert_eq!(snapshot.taken_at, t);
    assert_eq!(snapshot.ongoing.len(), 2);
    assert_eq!(snapshot.upcoming.len(), 1);

    // Ordered by start time
    assert_eq!(snapshot.ongoing[0].booking.booking.id, late.booking.id);
    assert_eq!(snapshot.ongoing[0].status.stage, LifecycleStage::Overstaying);
    assert_eq!(snapshot.ongoing[0].status.overstay_minutes, 5);
    assert!(snapshot.ongoing[0].status.penalty.is_some());

    assert_eq!(snapshot.ongoing[1].status.stage, LifecycleStage::Ongoing);
    assert!(snapshot.ongoing[1].sensor.as_ref().unwrap().is_occupied);

    assert_eq!(snapshot.upcoming[0].booking.booking.id, later.booking.id);
    assert!(!snapshot.upcoming[0].status.can_extend);
    assert!(snapshot.upcoming[0].sensor.is_none());

    assert_eq!(snapshot.overstaying().count(), 1);
}

#[tokio::test]
async fn test_secondary_failures_degrade_to_empty() {
    let gateway = Arc::new(MockGateway::new());
    let user_id = signed_in(&gateway);
    gateway.set_transactions(vec![Transaction {
        id: Uuid::new_v4(),
        user_id,
        amount: 100.0,
        description: "Coupon SAVE10".to_string(),
        created_at: now(),
    }]);
    gateway.set_bookings(vec![booking(
        user_id,
        now() - Duration::minutes(10),
        now() + Duration::minutes(50),
        Some("S-3"),
    )]);
    gateway.fail_reads_of("transaction_history");
    gateway.fail_reads_of("sensor_data");
    gateway.fail_reads_of("security_alerts");

    let snapshot = loader(&gateway).load().await.unwrap();

    assert!(snapshot.transactions.is_empty());
    assert!(snapshot.alerts.is_empty());
    assert_eq!(snapshot.ongoing.len(), 1);
    assert!(snapshot.ongoing[0].sensor.is_none());
}

#[tokio::test]
async fn test_sensor_read_skipped_without_sensors() {
    let gateway = Arc::new(MockGateway::new());
    let user_id = signed_in(&gateway);
    gateway.set_bookings(vec![booking(
        user_id,
        now() + Duration::hours(3),
        now() + Duration::hours(4),
        None,
    )]);

    let snapshot = loader(&gateway).load().await.unwrap();

    assert_eq!(snapshot.upcoming.len(), 1);
    assert_eq!(gateway.calls("sensor_data"), 0);
}
