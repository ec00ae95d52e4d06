use reqwest::multipart::Form;
use serde::{de::DeserializeOwned, Serialize};

use super::Resource;
use crate::api::{ApiClient, ApiError, Listing, QueryParams, RequestOptions};

/// CRUD over one admin collection.
#[derive(Clone, Copy)]
pub struct ResourceService<'a> {
    client: &'a ApiClient,
    resource: Resource,
}

impl<'a> ResourceService<'a> {
    pub fn new(client: &'a ApiClient, resource: Resource) -> Self {
        Self { client, resource }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Listing, paginated or not depending on the collection. Absent or empty
    /// filters are left out of the query.
    pub async fn list<T: DeserializeOwned>(
        &self,
        filters: QueryParams,
    ) -> Result<Listing<T>, ApiError> {
        self.client
            .get_with(
                &self.resource.collection(),
                RequestOptions::new().with_query(filters),
            )
            .await
    }

    pub async fn get<T: DeserializeOwned>(&self, id: u64) -> Result<T, ApiError> {
        self.client.get(&self.resource.item(id)).await
    }

    pub async fn create<T, B>(&self, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.client.post(&self.resource.collection(), body).await
    }

    /// Partial update.
    pub async fn update<T, B>(&self, id: u64, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.client.patch(&self.resource.item(id), body).await
    }

    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        self.client.delete(&self.resource.item(id)).await
    }

    pub async fn create_multipart<T: DeserializeOwned>(&self, form: Form) -> Result<T, ApiError> {
        self.client.upload(&self.resource.collection(), form).await
    }

    /// Multipart update on the item path, sent with the method the
    /// collection expects.
    pub async fn update_multipart<T: DeserializeOwned>(
        &self,
        id: u64,
        form: Form,
    ) -> Result<T, ApiError> {
        self.client
            .upload_with(
                self.resource.multipart_update_method(),
                &self.resource.item(id),
                form,
                RequestOptions::default(),
            )
            .await
    }
}

impl ApiClient {
    pub fn resource(&self, resource: Resource) -> ResourceService<'_> {
        ResourceService::new(self, resource)
    }
}
