use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::travel_info::TravelInfo;

pub const DISTANCE_MATRIX_API_URL: &str =
    "https://maps.googleapis.com/maps/api/distancematrix/json";

/// Success sentinel used by both the top-level response status and every
/// per-element status.
pub const STATUS_OK: &str = "OK";

#[derive(Debug, Error)]
pub enum DistanceApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("response status invalid: {0}")]
    Status(String),

    #[error("element status invalid for ({origin}, {destination}): {status}")]
    ElementStatus {
        origin: String,
        destination: String,
        status: String,
    },

    #[error("response shape mismatch: expected {expected} entries, got {got}")]
    Shape { expected: usize, got: usize },
}

/// Seam between the batch executor and the remote service, so acquisition
/// can run against a scripted transport in tests.
pub trait MatrixTransport {
    /// Fetches travel information for all origin x destination
    /// combinations, returned in origin-major order.
    fn fetch_batch(
        &self,
        origins: &[String],
        destinations: &[String],
    ) -> impl Future<Output = Result<Vec<TravelInfo>, DistanceApiError>>;
}

#[derive(Deserialize)]
struct ValueField {
    value: u64,
}

#[derive(Deserialize)]
struct Element {
    #[serde(default)]
    distance: Option<ValueField>,
    #[serde(default)]
    duration: Option<ValueField>,
    status: String,
}

#[derive(Deserialize)]
struct Row {
    elements: Vec<Element>,
}

#[derive(Deserialize)]
struct MatrixResponse {
    status: String,
    rows: Vec<Row>,
}

pub struct DistanceApiParams {
    pub api_key: String,
    pub pause: Duration,
}

pub struct DistanceApiClient {
    params: DistanceApiParams,
    client: reqwest::Client,
}

impl DistanceApiClient {
    /// Interval honored before every request, modeling the service's
    /// query rate limit.
    pub const DEFAULT_PAUSE: Duration = Duration::from_millis(1500);

    pub fn new(params: DistanceApiParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }
}

impl MatrixTransport for DistanceApiClient {
    async fn fetch_batch(
        &self,
        origins: &[String],
        destinations: &[String],
    ) -> Result<Vec<TravelInfo>, DistanceApiError> {
        tokio::time::sleep(self.params.pause).await;

        debug!(
            origins = origins.len(),
            destinations = destinations.len(),
            "requesting distance matrix batch"
        );

        let response = self
            .client
            .get(DISTANCE_MATRIX_API_URL)
            .query(&[
                ("origins", origins.join("|")),
                ("destinations", destinations.join("|")),
                ("key", self.params.api_key.clone()),
            ])
            .send()
            .await?;

        let decoded: MatrixResponse = response.json().await?;

        if decoded.status != STATUS_OK {
            return Err(DistanceApiError::Status(decoded.status));
        }

        if decoded.rows.len() != origins.len() {
            return Err(DistanceApiError::Shape {
                expected: origins.len(),
                got: decoded.rows.len(),
            });
        }

        let mut entries = Vec::with_capacity(origins.len() * destinations.len());

        for (origin, row) in origins.iter().zip(&decoded.rows) {
            if row.elements.len() != destinations.len() {
                return Err(DistanceApiError::Shape {
                    expected: destinations.len(),
                    got: row.elements.len(),
                });
            }

            for (destination, element) in destinations.iter().zip(&row.elements) {
                if element.status != STATUS_OK {
                    return Err(DistanceApiError::ElementStatus {
                        origin: origin.clone(),
                        destination: destination.clone(),
                        status: element.status.clone(),
                    });
                }

                let (Some(distance), Some(duration)) = (&element.distance, &element.duration)
                else {
                    return Err(DistanceApiError::ElementStatus {
                        origin: origin.clone(),
                        destination: destination.clone(),
                        status: String::from("missing distance or duration value"),
                    });
                };

                entries.push(TravelInfo {
                    city_pair: [origin.clone(), destination.clone()],
                    distance_meters: distance.value,
                    duration_seconds: duration.value,
                });
            }
        }

        Ok(entries)
    }
}
