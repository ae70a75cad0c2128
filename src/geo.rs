// =============================================================================
// geo.rs — THE PHOTO LOCATION EXTRACTOR
// =============================================================================
//
// The geo collaborator: read the EXIF block of a local photo, convert the
// GPS degrees/minutes/seconds rationals into signed decimal coordinates,
// and ask Nominatim what's there. Cameras have been quietly notarizing
// the location of every photo since before most people knew to care, and
// this module is forty lines of "yes, including yours".
//
// "No GPS data" is a first-class outcome, not a failure — most photos on
// the internet have been stripped. The operator gets a clear message and
// the process exits cleanly either way.
// =============================================================================

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use colored::Colorize;
use exif::{In, Tag, Value};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::CollaboratorEndpoints;

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("could not open file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not read Exif data: {0}")]
    Exif(#[from] exif::Error),

    /// The photo has EXIF data but no usable GPS tags. The most common
    /// outcome by far, and deliberately not a generic error.
    #[error("no GPS data found in this photo")]
    NoGpsData,

    #[error("could not retrieve address information: {0}")]
    Geocode(#[from] reqwest::Error),

    #[error("geocoder response had no address")]
    AddressMissing,
}

/// Convert degrees/minutes/seconds plus a hemisphere reference into
/// signed decimal degrees. South and West are negative; the reference
/// letter is matched case-insensitively because EXIF writers disagree on
/// everything, including capitalization.
pub fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64, reference: char) -> f64 {
    let decimal = degrees + minutes / 60.0 + seconds / 3600.0;
    match reference.to_ascii_uppercase() {
        'S' | 'W' => -decimal,
        _ => decimal,
    }
}

fn coordinate(exif: &exif::Exif, value_tag: Tag, ref_tag: Tag) -> Option<f64> {
    let field = exif.get_field(value_tag, In::PRIMARY)?;
    let dms = match &field.value {
        Value::Rational(parts) if parts.len() >= 3 => parts,
        _ => return None,
    };

    let reference = exif
        .get_field(ref_tag, In::PRIMARY)
        .and_then(|f| match &f.value {
            Value::Ascii(chunks) => chunks.first().and_then(|c| c.first()).map(|b| *b as char),
            _ => None,
        })
        .unwrap_or('N');

    Some(dms_to_decimal(
        dms[0].to_f64(),
        dms[1].to_f64(),
        dms[2].to_f64(),
        reference,
    ))
}

/// Read the GPS coordinates out of a photo's EXIF block.
pub fn read_gps(path: &Path) -> Result<(f64, f64), GeoError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut reader)?;

    let lat = coordinate(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef);
    let lon = coordinate(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef);

    match (lat, lon) {
        (Some(lat), Some(lon)) => {
            debug!(lat, lon, "GPS coordinates extracted");
            Ok((lat, lon))
        }
        _ => Err(GeoError::NoGpsData),
    }
}

/// What we care about from a Nominatim reverse-geocode response.
#[derive(Debug, Deserialize)]
struct ReverseGeocodeResponse {
    display_name: Option<String>,
}

/// Ask Nominatim for a human-readable address at the given coordinates.
pub async fn reverse_geocode(
    client: &reqwest::Client,
    endpoint: &str,
    lat: f64,
    lon: f64,
) -> Result<String, GeoError> {
    let response = client
        .get(endpoint)
        .query(&[
            ("format", "jsonv2".to_string()),
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
        ])
        .send()
        .await?
        .error_for_status()?;

    let body: ReverseGeocodeResponse = response.json().await?;
    body.display_name.ok_or(GeoError::AddressMissing)
}

/// The geo mode: EXIF → coordinates → address. Degraded outcomes print a
/// message and exit cleanly; the operator learns exactly how far we got.
pub async fn run(image_path: &Path) -> anyhow::Result<()> {
    let (lat, lon) = match read_gps(image_path) {
        Ok(coords) => coords,
        Err(e @ (GeoError::NoGpsData | GeoError::Exif(_))) => {
            println!("{}", format!("{e}.").yellow());
            return Ok(());
        }
        Err(e) => return Err(e).context("could not read the photo"),
    };

    println!(
        "{} Latitude: {lat:.6}, Longitude: {lon:.6}",
        "Coordinates Found ->".green().bold()
    );

    let endpoints = CollaboratorEndpoints::from_env();
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .user_agent("handle-hunter/1.0 (geolocation)")
        .build()
        .context("failed to build HTTP client")?;

    match reverse_geocode(&client, &endpoints.nominatim_reverse_url, lat, lon).await {
        Ok(address) => {
            println!("{} {address}", "Estimated Location:".green().bold());
        }
        Err(e) => {
            println!("{}", format!("Could not retrieve address information: {e}.").red());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_dms_to_decimal_northern_hemisphere() {
        // 52° 31' 12" N = 52.52
        let lat = dms_to_decimal(52.0, 31.0, 12.0, 'N');
        assert!((lat - 52.52).abs() < 1e-9);
    }

    #[test]
    fn test_dms_to_decimal_south_and_west_are_negative() {
        assert!(dms_to_decimal(33.0, 51.0, 0.0, 'S') < 0.0);
        assert!(dms_to_decimal(70.0, 40.0, 0.0, 'W') < 0.0);
    }

    #[test]
    fn test_dms_to_decimal_reference_is_case_insensitive() {
        assert_eq!(
            dms_to_decimal(10.0, 30.0, 0.0, 's'),
            dms_to_decimal(10.0, 30.0, 0.0, 'S'),
        );
    }

    #[test]
    fn test_read_gps_on_a_non_image_is_an_exif_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"this is a text file wearing a trench coat").unwrap();

        let result = read_gps(file.path());
        assert!(matches!(result, Err(GeoError::Exif(_))));
    }

    #[test]
    fn test_read_gps_missing_file_is_an_io_error() {
        let result = read_gps(Path::new("/no/such/photo.jpg"));
        assert!(matches!(result, Err(GeoError::Io(_))));
    }

    #[tokio::test]
    async fn test_reverse_geocode_returns_display_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("format", "jsonv2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "display_name": "Unter den Linden, Berlin, Germany"
            })))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let address =
            reverse_geocode(&client, &format!("{}/reverse", server.uri()), 52.52, 13.4)
                .await
                .unwrap();
        assert_eq!(address, "Unter den Linden, Berlin, Germany");
    }

    #[tokio::test]
    async fn test_reverse_geocode_without_address_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let result =
            reverse_geocode(&client, &format!("{}/reverse", server.uri()), 0.0, 0.0).await;
        assert!(matches!(result, Err(GeoError::AddressMissing)));
    }
}
