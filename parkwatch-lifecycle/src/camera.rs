use chrono::{DateTime, Utc};
use tracing::warn;
use url::Url;

use parkwatch_shared::{BookingWithSpot, ParkingSpot};

/// Embed parameters for a silent, chrome-less live stream
const EMBED_PARAMS: [(&str, &str); 6] = [
    ("autoplay", "1"),
    ("mute", "1"),
    ("controls", "0"),
    ("modestbranding", "1"),
    ("rel", "0"),
    ("showinfo", "0"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraFeed {
    Live(Url),
    /// No URL configured for the spot yet
    Unavailable,
}

impl CameraFeed {
    pub fn for_spot(spot: &ParkingSpot) -> Self {
        let Some(raw) = spot.camera_feed() else {
            return CameraFeed::Unavailable;
        };

        match Url::parse(raw) {
            Ok(mut url) => {
                url.query_pairs_mut().extend_pairs(EMBED_PARAMS);
                CameraFeed::Live(url)
            }
            Err(e) => {
                warn!("Spot {} has an unusable camera URL: {}", spot.spot_number, e);
                CameraFeed::Unavailable
            }
        }
    }

    pub fn url(&self) -> Option<&Url> {
        match self {
            CameraFeed::Live(url) => Some(url),
            CameraFeed::Unavailable => None,
        }
    }
}

/// What the camera modal shows for one booking
#[derive(Debug, Clone, PartialEq)]
pub struct CameraView {
    pub booking_id: uuid::Uuid,
    pub spot_number: String,
    pub location: String,
    pub vehicle_number: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub feed: CameraFeed,
}

impl CameraView {
    pub fn for_booking(booking: &BookingWithSpot) -> Self {
        Self {
            booking_id: booking.booking.id,
            spot_number: booking.spot.spot_number.clone(),
            location: booking.spot.location.clone(),
            vehicle_number: booking.booking.vehicle_number.clone(),
            start_time: booking.booking.start_time,
            end_time: booking.booking.end_time,
            feed: CameraFeed::for_spot(&booking.spot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn spot(url: Option<&str>) -> ParkingSpot {
        ParkingSpot {
            id: Uuid::new_v4(),
            spot_number: "B-4".to_string(),
            location: "Basement".to_string(),
            camera_feed_url: url.map(str::to_string),
            sensor_id: None,
        }
    }

    #[test]
    fn test_feed_url_gets_embed_params() {
        let feed = CameraFeed::for_spot(&spot(Some("https://www.youtube.com/embed/abc123")));
        assert_eq!(
            feed.url().unwrap().as_str(),
            "https://www.youtube.com/embed/abc123?autoplay=1&mute=1&controls=0&modestbranding=1&rel=0&showinfo=0"
        );
    }

    #[test]
    fn test_existing_query_is_kept() {
        let feed = CameraFeed::for_spot(&spot(Some("https://cams.example.com/live?id=7")));
        let url = feed.url().unwrap();
        assert_eq!(url.query_pairs().next().unwrap().1, "7");
        assert!(url.as_str().starts_with("https://cams.example.com/live?id=7&autoplay=1"));
    }

    #[test]
    fn test_missing_feed_variants() {
        assert_eq!(CameraFeed::for_spot(&spot(None)), CameraFeed::Unavailable);
        assert_eq!(CameraFeed::for_spot(&spot(Some(""))), CameraFeed::Unavailable);
        assert_eq!(CameraFeed::for_spot(&spot(Some("null"))), CameraFeed::Unavailable);
        assert_eq!(CameraFeed::for_spot(&spot(Some("not a url"))), CameraFeed::Unavailable);
    }
}
