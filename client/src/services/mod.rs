//! Typed wrappers over [`ApiClient`](crate::api::ApiClient) for the admin
//! resources the dashboard manages.

pub mod auth;
pub mod orders;
pub mod resource;
pub mod shipping;

pub use auth::*;
pub use orders::*;
pub use resource::*;
pub use shipping::*;

use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Collection endpoints under the API base. Every path is relative and has no
/// trailing slash; item paths are `<path>/<id>/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Products,
    Brands,
    Categories,
    NavigationCategories,
    Celebrities,
    Orders,
    Customers,
    ShippingZones,
}

impl Resource {
    pub const ALL: [Resource; 8] = [
        Resource::Products,
        Resource::Brands,
        Resource::Categories,
        Resource::NavigationCategories,
        Resource::Celebrities,
        Resource::Orders,
        Resource::Customers,
        Resource::ShippingZones,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Resource::Products => "products",
            Resource::Brands => "products/brands",
            Resource::Categories => "products/categories",
            Resource::NavigationCategories => "categories/admin/categories",
            Resource::Celebrities => "celebrities",
            Resource::Orders => "orders/admin/orders",
            Resource::Customers => "users/admin/customers",
            Resource::ShippingZones => "shipping/zones",
        }
    }

    /// Brands and categories take multipart edits as `PATCH`; the other
    /// collections expect `POST` on the item path.
    pub fn multipart_update_method(self) -> Method {
        match self {
            Resource::Brands | Resource::Categories => Method::PATCH,
            _ => Method::POST,
        }
    }

    pub(crate) fn collection(self) -> String {
        format!("{}/", self.path())
    }

    pub(crate) fn item(self, id: u64) -> String {
        format!("{}/{}/", self.path(), id)
    }
}
