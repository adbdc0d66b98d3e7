use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use seatline_core::{Booking, ResetError, SeatGateway, SeatNumber, StoreError, VehicleId};

#[derive(Serialize)]
struct BookSeatBody {
    vehicle_id: u8,
    seat_number: u8,
}

#[derive(Serialize)]
struct CodeBody<'a> {
    code: &'a str,
}

#[derive(Deserialize)]
struct ResetBody {
    cleared: u64,
}

/// [`SeatGateway`] backed by the seatline HTTP API.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn request_failed(e: reqwest::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

async fn unexpected(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    format!("HTTP {}: {}", status.as_u16(), body)
}

#[async_trait]
impl SeatGateway for HttpGateway {
    async fn list_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        let response = self
            .client
            .get(self.url("/v1/bookings"))
            .send()
            .await
            .map_err(request_failed)?;

        if !response.status().is_success() {
            return Err(StoreError::Backend(unexpected(response).await));
        }
        response.json().await.map_err(request_failed)
    }

    async fn create_booking(
        &self,
        vehicle_id: VehicleId,
        seat_number: SeatNumber,
    ) -> Result<Booking, StoreError> {
        let response = self
            .client
            .post(self.url("/v1/bookings"))
            .json(&BookSeatBody {
                vehicle_id: vehicle_id.get(),
                seat_number: seat_number.get(),
            })
            .send()
            .await
            .map_err(request_failed)?;

        match response.status() {
            StatusCode::CREATED | StatusCode::OK => response.json().await.map_err(request_failed),
            StatusCode::CONFLICT => Err(StoreError::Conflict {
                vehicle_id,
                seat_number,
            }),
            _ => Err(StoreError::Backend(unexpected(response).await)),
        }
    }

    async fn reset_all(&self, code: &str) -> Result<u64, ResetError> {
        let response = self
            .client
            .post(self.url("/v1/admin/reset"))
            .json(&CodeBody { code })
            .send()
            .await
            .map_err(|e| ResetError::ClearFailed(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let body: ResetBody = response
                    .json()
                    .await
                    .map_err(|e| ResetError::ClearFailed(e.to_string()))?;
                debug!("Remote reset cleared {} bookings", body.cleared);
                Ok(body.cleared)
            }
            StatusCode::FORBIDDEN => Err(ResetError::InvalidCode),
            _ => Err(ResetError::ClearFailed(unexpected(response).await)),
        }
    }
}
