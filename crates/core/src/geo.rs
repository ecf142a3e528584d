use crate::error::LookupError;
use crate::models::{ArticleSummary, LatLng};
use crate::traits::WikiLookup;

const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Great-circle distance in kilometres.
pub fn haversine_km(a: LatLng, b: LatLng) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (delta_lng / 2.0).sin().powi(2);
    // clamp: rounding can push h a hair above 1 for antipodal points
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// `f64::INFINITY` when either side is missing.
pub fn distance_km(a: Option<LatLng>, b: Option<LatLng>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => haversine_km(a, b),
        _ => f64::INFINITY,
    }
}

/// Distance from `origin` to the article, using the summary's own coordinates
/// first and a remote coordinate lookup by title otherwise.
pub async fn resolve_distance<L>(
    lookup: &L,
    summary: &ArticleSummary,
    origin: Option<LatLng>,
) -> Result<f64, LookupError>
where
    L: WikiLookup + ?Sized,
{
    let Some(origin) = origin else {
        return Ok(f64::INFINITY);
    };

    let at = match summary.coordinate() {
        Some(at) => Some(at),
        None => lookup.fetch_coordinates(&summary.title).await?,
    };

    Ok(distance_km(Some(origin), at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeWiki;
    use proptest::prelude::*;

    const GREER: LatLng = LatLng {
        lat: 34.9387,
        lng: -82.2273,
    };
    const GREENVILLE: LatLng = LatLng {
        lat: 34.8526,
        lng: -82.3940,
    };

    #[test]
    fn known_distance_is_close() {
        let km = haversine_km(GREER, GREENVILLE);
        assert!((km - 18.3).abs() < 1.0, "got {km}");
    }

    #[test]
    fn missing_point_is_infinitely_far() {
        assert_eq!(distance_km(None, Some(GREER)), f64::INFINITY);
        assert_eq!(distance_km(Some(GREER), None), f64::INFINITY);
        assert_eq!(distance_km(None, None), f64::INFINITY);
    }

    #[tokio::test]
    async fn embedded_coordinates_skip_the_remote_lookup() {
        let wiki = FakeWiki::default();
        let summary = ArticleSummary::new("Greenville, South Carolina", "City").with_coordinate(GREENVILLE);

        let km = resolve_distance(&wiki, &summary, Some(GREER))
            .await
            .expect("distance should resolve");

        assert!(km.is_finite());
        assert!(wiki.calls().is_empty());
    }

    #[tokio::test]
    async fn coordinates_are_looked_up_by_title_when_absent() {
        let wiki = FakeWiki::default().with_coordinates("Poinsett Bridge", GREENVILLE);
        let summary = ArticleSummary::new("Poinsett Bridge", "bridge");

        let km = resolve_distance(&wiki, &summary, Some(GREER))
            .await
            .expect("distance should resolve");

        assert!((km - haversine_km(GREER, GREENVILLE)).abs() < 1e-9);
        assert_eq!(wiki.calls(), vec!["coords:Poinsett Bridge".to_string()]);
    }

    #[tokio::test]
    async fn unknown_coordinates_or_origin_give_infinity() {
        let wiki = FakeWiki::default();
        let summary = ArticleSummary::new("Nowhere", "");

        let no_coordinate = resolve_distance(&wiki, &summary, Some(GREER))
            .await
            .expect("distance should resolve");
        let no_origin = resolve_distance(&wiki, &summary, None)
            .await
            .expect("distance should resolve");

        assert_eq!(no_coordinate, f64::INFINITY);
        assert_eq!(no_origin, f64::INFINITY);
    }

    fn point() -> impl Strategy<Value = LatLng> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lng)| LatLng::new(lat, lng))
    }

    proptest! {
        #[test]
        fn distance_to_self_is_zero(a in point()) {
            prop_assert!(haversine_km(a, a).abs() < 1e-9);
        }

        #[test]
        fn distance_is_symmetric(a in point(), b in point()) {
            prop_assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-6);
        }

        #[test]
        fn distance_obeys_triangle_inequality(a in point(), b in point(), c in point()) {
            prop_assert!(haversine_km(a, c) <= haversine_km(a, b) + haversine_km(b, c) + 1e-6);
        }
    }
}
