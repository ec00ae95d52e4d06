use serde::{de::DeserializeOwned, Serialize};

use super::{Resource, ResourceService};
use crate::api::{ApiClient, ApiError};

const SETTINGS_PATH: &str = "shipping/settings/";
const SET_SAME_GOVERNORATE_PATH: &str = "shipping/set-same-governorate/";
const UPDATE_SAME_GOVERNORATE_PATH: &str = "shipping/update-same-governorate/";
const REMOVE_SAME_GOVERNORATE_PATH: &str = "shipping/remove-same-governorate/";

#[derive(Serialize)]
struct SameGovernorate<'a> {
    governorate_id: &'a str,
    price: f64,
}

#[derive(Serialize)]
struct PriceUpdate {
    price: f64,
}

pub struct ShippingService<'a> {
    client: &'a ApiClient,
}

impl<'a> ShippingService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn zones(&self) -> ResourceService<'a> {
        ResourceService::new(self.client, Resource::ShippingZones)
    }

    pub async fn settings<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        self.client.get(SETTINGS_PATH).await
    }

    pub async fn set_same_governorate<T: DeserializeOwned>(
        &self,
        governorate_id: &str,
        price: f64,
    ) -> Result<T, ApiError> {
        self.client
            .post(
                SET_SAME_GOVERNORATE_PATH,
                &SameGovernorate {
                    governorate_id,
                    price,
                },
            )
            .await
    }

    pub async fn update_same_governorate<T: DeserializeOwned>(
        &self,
        price: f64,
    ) -> Result<T, ApiError> {
        self.client
            .patch(UPDATE_SAME_GOVERNORATE_PATH, &PriceUpdate { price })
            .await
    }

    pub async fn remove_same_governorate(&self) -> Result<(), ApiError> {
        self.client.delete(REMOVE_SAME_GOVERNORATE_PATH).await
    }
}

impl ApiClient {
    pub fn shipping(&self) -> ShippingService<'_> {
        ShippingService::new(self)
    }
}

#[cfg(all(test, not(coverage)))]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use httpmock::prelude::*;
    use httpmock::Method::PATCH;
    use serde_json::{json, Value};

    fn api_client(server: &MockServer) -> ApiClient {
        ApiClient::builder(ClientConfig::new(server.url("/api/v1")))
            .build()
            .expect("client")
    }

    #[tokio::test]
    async fn same_governorate_lifecycle() {
        let server = MockServer::start_async().await;
        let set = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v1/shipping/set-same-governorate/")
                    .json_body(json!({"governorate_id": "cairo", "price": 45.5}));
                then.status(201).json_body(json!({"id": 3, "price": "45.50"}));
            })
            .await;
        let update = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/api/v1/shipping/update-same-governorate/")
                    .json_body(json!({"price": 60.0}));
                then.status(200).json_body(json!({"id": 3, "price": "60.00"}));
            })
            .await;
        let remove = server
            .mock_async(|when, then| {
                when.method(DELETE)
                    .path("/api/v1/shipping/remove-same-governorate/");
                then.status(204);
            })
            .await;

        let client = api_client(&server);
        let shipping = client.shipping();
        let created: Value = shipping
            .set_same_governorate("cairo", 45.5)
            .await
            .expect("set");
        let updated: Value = shipping.update_same_governorate(60.0).await.expect("update");
        shipping.remove_same_governorate().await.expect("remove");

        set.assert_async().await;
        update.assert_async().await;
        remove.assert_async().await;
        assert_eq!(created["price"], "45.50");
        assert_eq!(updated["price"], "60.00");
    }

    #[tokio::test]
    async fn settings_and_zones() {
        let server = MockServer::start_async().await;
        let settings = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/shipping/settings/");
                then.status(200).json_body(json!({
                    "same_governorate": null,
                    "nearby_governorates": [],
                    "other_governorates": []
                }));
            })
            .await;
        let zone = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/shipping/zones/8/");
                then.status(200).json_body(json!({"id": 8}));
            })
            .await;

        let client = api_client(&server);
        let fetched: Value = client.shipping().settings().await.expect("settings");
        let fetched_zone: Value = client.shipping().zones().get(8).await.expect("zone");

        settings.assert_async().await;
        zone.assert_async().await;
        assert!(fetched["same_governorate"].is_null());
        assert_eq!(fetched_zone["id"], 8);
    }
}
