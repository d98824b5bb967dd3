// Raw object endpoints
//
// Untyped CRUD over any admin API collection. Kind-specific routing and
// payload shaping belong to the adapters in `appgate-core`; this module only
// knows paths and JSON.

use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::models::{ListResponse, LoginProvider};
use crate::session::Session;

impl Session {
    /// `GET {collection}` with an optional `query` filter.
    pub async fn list_objects(
        &self,
        collection: &str,
        query: Option<&str>,
    ) -> Result<Vec<Value>, Error> {
        debug!(collection, ?query, "listing objects");
        let params: Vec<(&str, &str)> = query.map(|q| ("query", q)).into_iter().collect();
        let list: ListResponse<Value> = self.get(collection, &params).await?;
        Ok(list.data)
    }

    /// `GET {path}` for a single object or singleton.
    pub async fn get_object(&self, path: &str) -> Result<Value, Error> {
        self.get(path, &[]).await
    }

    /// `POST {collection}`, returning the stored object.
    pub async fn create_object(&self, collection: &str, body: &Value) -> Result<Value, Error> {
        debug!(collection, "creating object");
        self.post(collection, body).await
    }

    /// `PUT {path}` with the full object, returning the stored object.
    pub async fn replace_object(&self, path: &str, body: &Value) -> Result<Value, Error> {
        debug!(path, "replacing object");
        self.put(path, body).await
    }

    /// `DELETE {path}`.
    pub async fn delete_object(&self, path: &str) -> Result<(), Error> {
        debug!(path, "deleting object");
        self.delete(path).await
    }

    /// Identity providers offered on the login screen.
    ///
    /// Works on unauthenticated sessions.
    pub async fn login_providers(&self) -> Result<Vec<LoginProvider>, Error> {
        let list: ListResponse<LoginProvider> =
            self.get_public("identity-providers/names").await?;
        Ok(list.data)
    }
}
