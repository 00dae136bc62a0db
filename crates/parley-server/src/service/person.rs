//! [`PersonService`] — CRUD, search, and credential rules for accounts.
//!
//! Every list and search operation treats an empty result set as
//! [`Error::NoPeopleFound`] rather than a valid empty page; the HTTP layer
//! maps that to 404 on every list endpoint.

use std::sync::Arc;

use chrono::Utc;

use parley_core::{
  Error, Result,
  person::{NewPerson, Person, PersonPatch, PersonView, RegistrationInput, UserRole},
  store::{Page, PersonStore},
};

use crate::service::password;

pub struct PersonService<S> {
  store: Arc<S>,
}

impl<S> Clone for PersonService<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: PersonStore> PersonService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Register a new account. Validation failures are aggregated into one
  /// error; the role is forced to BASE and the registration date to today.
  pub async fn register(&self, input: RegistrationInput) -> Result<PersonView> {
    let errors = input.validate();
    if !errors.is_empty() {
      return Err(Error::Validation(errors));
    }
    let RegistrationInput {
      name: Some(name),
      age: Some(age),
      email: Some(email),
      password: Some(raw_password),
    } = input
    else {
      return Err(Error::Validation(vec!["all fields must be filled".to_owned()]));
    };

    let person = self
      .store
      .add_person(NewPerson {
        name,
        age,
        email,
        password_hash: password::hash(&raw_password)?,
        role: UserRole::Base,
        registration_date: Utc::now().date_naive(),
      })
      .await?;

    tracing::info!(id = person.id, name = %person.name, "registered person");
    Ok(person.into())
  }

  /// Credential check for login. Unknown name and wrong password both fail
  /// with [`Error::IncorrectCredentials`] to avoid user enumeration.
  pub async fn login(&self, name: &str, raw_password: &str) -> Result<Person> {
    let person = self
      .store
      .person_by_name(name.to_owned())
      .await?
      .ok_or(Error::IncorrectCredentials)?;
    if !password::verify(raw_password, &person.password_hash) {
      return Err(Error::IncorrectCredentials);
    }
    Ok(person)
  }

  /// Principal resolution for the authentication middleware.
  pub async fn entity_by_name(&self, name: &str) -> Result<Person> {
    self.person_by_name(name).await
  }

  pub async fn get_by_id(&self, id: i64) -> Result<PersonView> {
    Ok(self.person_by_id(id).await?.into())
  }

  pub async fn get_by_name(&self, name: &str) -> Result<PersonView> {
    Ok(self.person_by_name(name).await?.into())
  }

  /// One page of people. With a non-blank `pattern`: case-insensitive
  /// substring match on name, sorted ascending by name.
  pub async fn list(
    &self,
    pattern: Option<String>,
    page: Page,
  ) -> Result<Vec<PersonView>> {
    let pattern = pattern.filter(|p| !p.trim().is_empty());
    let people = match pattern {
      Some(pattern) => self.store.search_people(pattern, page).await?,
      None => self.store.list_people(page).await?,
    };
    if people.is_empty() {
      return Err(Error::NoPeopleFound);
    }
    Ok(people.into_iter().map(PersonView::from).collect())
  }

  pub async fn update_by_id(
    &self,
    patch: PersonPatch,
    id: i64,
  ) -> Result<PersonView> {
    self
      .apply_patch(patch, id)
      .await?
      .ok_or(Error::PersonNotFoundById(id))
  }

  pub async fn update_by_name(
    &self,
    patch: PersonPatch,
    name: &str,
  ) -> Result<PersonView> {
    let person = self.person_by_name(name).await?;
    self
      .apply_patch(patch, person.id)
      .await?
      .ok_or_else(|| Error::PersonNotFoundByName(name.to_owned()))
  }

  /// Remove an account; returns the deleted view.
  pub async fn delete_by_id(&self, id: i64) -> Result<PersonView> {
    let person = self.person_by_id(id).await?;
    self.store.delete_person(person.id).await?;
    tracing::info!(id = person.id, "deleted person");
    Ok(person.into())
  }

  pub async fn delete_by_name(&self, name: &str) -> Result<PersonView> {
    let person = self.person_by_name(name).await?;
    self.store.delete_person(person.id).await?;
    tracing::info!(id = person.id, "deleted person");
    Ok(person.into())
  }

  /// Self-service promotion to ADMIN: the caller proves knowledge of the
  /// account's own password. On mismatch the role is left untouched. The
  /// password check runs against the row read inside the same transaction
  /// that writes the role back.
  pub async fn upgrade_role(
    &self,
    raw_password: &str,
    id: i64,
  ) -> Result<PersonView> {
    let raw_password = raw_password.to_owned();
    let person = self
      .store
      .modify_person(
        id,
        Box::new(move |mut person| {
          if !password::verify(&raw_password, &person.password_hash) {
            return Err(Error::WrongPassword);
          }
          person.role = UserRole::Admin;
          Ok(person)
        }),
      )
      .await?
      .ok_or(Error::PersonNotFoundById(id))?;
    tracing::info!(id = person.id, "upgraded role to admin");
    Ok(person.into())
  }

  /// Patch the stored row atomically; a concurrent patch cannot be lost
  /// between the read and the write. The replacement password is hashed up
  /// front since argon2 is deliberately slow.
  async fn apply_patch(
    &self,
    patch: PersonPatch,
    id: i64,
  ) -> Result<Option<PersonView>> {
    let new_hash = match patch.new_password() {
      Some(raw_password) => Some(password::hash(raw_password)?),
      None => None,
    };
    let updated = self
      .store
      .modify_person(
        id,
        Box::new(move |mut person| {
          patch.apply_to(&mut person);
          if let Some(hash) = new_hash {
            person.password_hash = hash;
          }
          Ok(person)
        }),
      )
      .await?;
    Ok(updated.map(PersonView::from))
  }

  async fn person_by_id(&self, id: i64) -> Result<Person> {
    self
      .store
      .person_by_id(id)
      .await?
      .ok_or(Error::PersonNotFoundById(id))
  }

  async fn person_by_name(&self, name: &str) -> Result<Person> {
    self
      .store
      .person_by_name(name.to_owned())
      .await?
      .ok_or_else(|| Error::PersonNotFoundByName(name.to_owned()))
  }
}
