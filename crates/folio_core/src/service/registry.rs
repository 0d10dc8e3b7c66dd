//! Process-wide registry of entity services.
//!
//! # Responsibility
//! - Bind one [`RecordService`] per entity kind to a migrated connection.
//! - Hand services out by reference to request handlers.
//!
//! # Invariants
//! - Built once after `db::open_db`; dropped before `db::close_db`.
//! - Every kind in [`ALL_KINDS`] has exactly one service.

use crate::model::base::Model;
use crate::model::kind::{
    RecordKind, ALL_KINDS, AWARD, CAREER, CERTIFICATE, EDUCATION, PROJECT, TECH_STACK, USER,
};
use crate::service::record_service::RecordService;
use crate::service::ServiceResult;
use crate::store::SqliteCollection;
use log::info;
use rusqlite::Connection;

/// SQLite-backed record service.
pub type SqliteRecordService<'conn> = RecordService<SqliteCollection<'conn>>;

/// All entity services sharing one connection.
pub struct ServiceRegistry<'conn> {
    pub users: SqliteRecordService<'conn>,
    pub educations: SqliteRecordService<'conn>,
    pub awards: SqliteRecordService<'conn>,
    pub projects: SqliteRecordService<'conn>,
    pub certificates: SqliteRecordService<'conn>,
    pub careers: SqliteRecordService<'conn>,
    pub tech_stacks: SqliteRecordService<'conn>,
}

impl<'conn> ServiceRegistry<'conn> {
    /// Binds every entity service to `conn`.
    ///
    /// # Errors
    /// - `Store(UninitializedConnection)` when migrations were not applied.
    pub fn new(conn: &'conn Connection) -> ServiceResult<Self> {
        let registry = Self {
            users: bind(conn, &USER)?,
            educations: bind(conn, &EDUCATION)?,
            awards: bind(conn, &AWARD)?,
            projects: bind(conn, &PROJECT)?,
            certificates: bind(conn, &CERTIFICATE)?,
            careers: bind(conn, &CAREER)?,
            tech_stacks: bind(conn, &TECH_STACK)?,
        };
        info!(
            "event=registry_init module=service status=ok kinds={}",
            ALL_KINDS.len()
        );
        Ok(registry)
    }

    /// Looks a service up by kind name (`award`, `tech_stack`, ...).
    pub fn service(&self, kind_name: &str) -> Option<&SqliteRecordService<'conn>> {
        self.services()
            .find(|service| service.kind().name == kind_name)
    }

    /// Iterates services in [`ALL_KINDS`] order.
    pub fn services(&self) -> impl Iterator<Item = &SqliteRecordService<'conn>> {
        [
            &self.users,
            &self.educations,
            &self.awards,
            &self.projects,
            &self.certificates,
            &self.careers,
            &self.tech_stacks,
        ]
        .into_iter()
    }
}

/// Binds the service for `kind`, including its owner's model.
pub fn bind<'conn>(
    conn: &'conn Connection,
    kind: &'static RecordKind,
) -> ServiceResult<SqliteRecordService<'conn>> {
    let model = Model::new(SqliteCollection::try_new(conn, kind.collection)?);
    let parent = kind
        .owner
        .map(|owner| SqliteCollection::try_new(conn, owner.parent.collection).map(Model::new))
        .transpose()?;
    RecordService::new(kind, model, parent)
}
