use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::{Resource, ResourceService};
use crate::api::{ApiClient, ApiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Packed,
    Shipped,
    Delivered,
    Cancelled,
    Returned,
}

#[derive(Serialize)]
struct StatusUpdate {
    status: OrderStatus,
}

pub struct OrdersService<'a> {
    orders: ResourceService<'a>,
}

impl<'a> OrdersService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            orders: ResourceService::new(client, Resource::Orders),
        }
    }

    /// Listing, retrieval and deletion go through the generic resource calls.
    pub fn resource(&self) -> ResourceService<'a> {
        self.orders
    }

    pub async fn update_status<T: DeserializeOwned>(
        &self,
        id: u64,
        status: OrderStatus,
    ) -> Result<T, ApiError> {
        self.orders.update(id, &StatusUpdate { status }).await
    }
}

impl ApiClient {
    pub fn orders(&self) -> OrdersService<'_> {
        OrdersService::new(self)
    }
}
