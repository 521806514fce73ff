//! Persons service

use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        claims::UserClaims,
        person::{CreatePerson, Person, PersonQuery, PersonShort, UpdatePerson},
    },
    repository::Repository,
};

use super::{trim, trim_opt};

#[derive(Clone)]
pub struct PersonsService {
    repository: Repository,
}

impl PersonsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &PersonQuery) -> AppResult<(Vec<PersonShort>, i64)> {
        self.repository.persons.list(query).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Person> {
        self.repository.persons.get_by_id(id).await
    }

    pub async fn create(&self, actor: &UserClaims, mut data: CreatePerson) -> AppResult<Person> {
        trim(&mut data.username);
        trim(&mut data.first_name);
        trim(&mut data.last_name);
        trim_opt(&mut data.email);
        data.email = data.email.filter(|e| !e.is_empty());
        data.validate()?;

        let person = self.repository.persons.create(actor, &data).await?;
        tracing::info!(person_id = person.id, username = %person.account.username, "Person created");
        Ok(person)
    }

    pub async fn update(&self, actor: &UserClaims, id: i32, mut data: UpdatePerson) -> AppResult<Person> {
        trim_opt(&mut data.username);
        trim_opt(&mut data.first_name);
        trim_opt(&mut data.last_name);
        trim_opt(&mut data.email);
        data.validate()?;
        self.repository.persons.update(actor, id, &data).await
    }

    pub async fn delete(&self, actor: &UserClaims, id: i32) -> AppResult<()> {
        self.repository.persons.delete(actor, id).await?;
        tracing::info!(person_id = id, "Person deleted");
        Ok(())
    }
}
