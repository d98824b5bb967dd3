// Condition endpoints
//
// Typed access to `/conditions`, used by the reference adapter.

use tracing::debug;

use crate::error::Error;
use crate::models::{Condition, ListResponse};
use crate::session::Session;

const CONDITIONS: &str = "conditions";

fn condition_path(id: &str) -> String {
    format!("{CONDITIONS}/{id}")
}

impl Session {
    /// `GET /conditions`, optionally filtered by `query`.
    pub async fn list_conditions(&self, query: Option<&str>) -> Result<Vec<Condition>, Error> {
        let params: Vec<(&str, &str)> = query.map(|q| ("query", q)).into_iter().collect();
        let list: ListResponse<Condition> = self.get(CONDITIONS, &params).await?;
        Ok(list.data)
    }

    /// `GET /conditions/{id}`
    pub async fn get_condition(&self, id: &str) -> Result<Condition, Error> {
        self.get(&condition_path(id), &[]).await
    }

    /// `POST /conditions`. The controller assigns the id.
    pub async fn create_condition(&self, condition: &Condition) -> Result<Condition, Error> {
        debug!(name = %condition.name, "creating condition");
        self.post(CONDITIONS, condition).await
    }

    /// `PUT /conditions/{id}` with the whole object.
    pub async fn update_condition(
        &self,
        id: &str,
        condition: &Condition,
    ) -> Result<Condition, Error> {
        debug!(id, "updating condition");
        self.put(&condition_path(id), condition).await
    }

    /// `DELETE /conditions/{id}`
    pub async fn delete_condition(&self, id: &str) -> Result<(), Error> {
        debug!(id, "deleting condition");
        self.delete(&condition_path(id)).await
    }
}
