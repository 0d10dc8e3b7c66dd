//! Portfolio page read model.
//!
//! Gathers a user and every subrecord they own, in page navigation order.

use crate::model::record::Record;
use crate::service::registry::ServiceRegistry;
use crate::service::{ServiceError, ServiceResult};
use serde::Serialize;

/// Everything shown on one user's portfolio page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Portfolio {
    pub user: Record,
    pub educations: Vec<Record>,
    pub awards: Vec<Record>,
    pub projects: Vec<Record>,
    pub certificates: Vec<Record>,
    pub careers: Vec<Record>,
    pub tech_stacks: Vec<Record>,
}

impl Portfolio {
    /// Total number of subrecords across all sections.
    pub fn entry_count(&self) -> usize {
        self.educations.len()
            + self.awards.len()
            + self.projects.len()
            + self.certificates.len()
            + self.careers.len()
            + self.tech_stacks.len()
    }
}

/// Read-only portfolio assembly over a [`ServiceRegistry`].
pub struct PortfolioService<'r, 'conn> {
    registry: &'r ServiceRegistry<'conn>,
}

impl<'r, 'conn> PortfolioService<'r, 'conn> {
    pub fn new(registry: &'r ServiceRegistry<'conn>) -> Self {
        Self { registry }
    }

    /// Loads the portfolio of `user_id`.
    ///
    /// # Errors
    /// - `NotFound` when the user does not exist.
    pub fn load(&self, user_id: &str) -> ServiceResult<Portfolio> {
        let registry = self.registry;
        let user = registry
            .users
            .get(user_id)?
            .ok_or_else(|| ServiceError::NotFound {
                kind: registry.users.kind().name,
                id: user_id.to_string(),
            })?;

        Ok(Portfolio {
            user,
            educations: registry.educations.list_by_owner(user_id)?,
            awards: registry.awards.list_by_owner(user_id)?,
            projects: registry.projects.list_by_owner(user_id)?,
            certificates: registry.certificates.list_by_owner(user_id)?,
            careers: registry.careers.list_by_owner(user_id)?,
            tech_stacks: registry.tech_stacks.list_by_owner(user_id)?,
        })
    }
}
