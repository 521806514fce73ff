//! Locations service

use validator::Validate;

use crate::{
    error::AppResult,
    models::{claims::UserClaims, location::{Location, LocationPayload}},
    repository::Repository,
};

use super::trim;

#[derive(Clone)]
pub struct LocationsService {
    repository: Repository,
}

impl LocationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Location>> {
        self.repository.locations.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Location> {
        self.repository.locations.get_by_id(id).await
    }

    pub async fn create(&self, actor: &UserClaims, mut data: LocationPayload) -> AppResult<Location> {
        trim(&mut data.name);
        data.validate()?;
        let location = self.repository.locations.create(actor, &data.name).await?;
        tracing::info!(location_id = location.id, name = %location.name, "Location created");
        Ok(location)
    }

    pub async fn rename(&self, actor: &UserClaims, id: i32, mut data: LocationPayload) -> AppResult<Location> {
        trim(&mut data.name);
        data.validate()?;
        self.repository.locations.rename(actor, id, &data.name).await
    }

    pub async fn delete(&self, actor: &UserClaims, id: i32) -> AppResult<()> {
        self.repository.locations.delete(actor, id).await?;
        tracing::info!(location_id = id, "Location deleted");
        Ok(())
    }
}
