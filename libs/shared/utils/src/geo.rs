/// Earth radius in miles, matching the display units used by the client.
const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Great-circle distance in miles between two (latitude, longitude) pairs
/// given in degrees, via the Haversine formula. Identical coordinates yield
/// exactly zero.
pub fn distance_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if lat1 == lat2 && lon1 == lon2 {
        return 0.0;
    }

    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // atan2 keeps the result stable for near-antipodal points where a ~ 1.
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Round to one decimal place for display.
pub fn round1(miles: f64) -> f64 {
    (miles * 10.0).round() / 10.0
}
