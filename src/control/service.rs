//! Command queue between greenhouse owners and their devices.
//!
//! Each command moves `pending → executed` exactly once in effect; there is
//! no retry, cancellation, expiry or per-device leasing. Every device polling
//! a greenhouse sees the same pending set.

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::{is_owner, SessionUser},
    db::models::{ControlCommand, Greenhouse},
    store::Store,
};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("greenhouse not found")]
    GreenhouseNotFound,
    #[error("command not found")]
    CommandNotFound,
    #[error("only the greenhouse owner may do this")]
    Forbidden,
    #[error("device and action are required")]
    MissingField,
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct CommandQueue {
    store: Store,
}

impl CommandQueue {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    async fn owned_greenhouse(
        &self,
        greenhouse_id: Uuid,
        requester: &SessionUser,
    ) -> Result<Greenhouse, CommandError> {
        let greenhouse = self
            .store
            .find_greenhouse(greenhouse_id)
            .await?
            .ok_or(CommandError::GreenhouseNotFound)?;
        if !is_owner(&greenhouse, requester) {
            return Err(CommandError::Forbidden);
        }
        Ok(greenhouse)
    }

    /// Queues `(device, action)` for the greenhouse if `requester` owns it.
    pub async fn enqueue(
        &self,
        greenhouse_id: Uuid,
        device: &str,
        action: &str,
        requester: &SessionUser,
    ) -> Result<ControlCommand, CommandError> {
        let (device, action) = (device.trim(), action.trim());
        if device.is_empty() || action.is_empty() {
            return Err(CommandError::MissingField);
        }

        self.owned_greenhouse(greenhouse_id, requester).await?;
        let command = self.store.insert_command(greenhouse_id, device, action).await?;

        info!(
            greenhouse_id = %greenhouse_id,
            command_id = %command.id,
            device = %command.device,
            action = %command.action,
            user_id = %requester.user_id,
            "Command enqueued"
        );
        Ok(command)
    }

    /// Unexecuted commands, oldest first.
    pub async fn list_pending(&self, greenhouse_id: Uuid) -> Result<Vec<ControlCommand>, CommandError> {
        Ok(self.store.pending_commands(greenhouse_id).await?)
    }

    /// [`Self::list_pending`] for a web session; only the owner may look.
    pub async fn list_pending_for(
        &self,
        greenhouse_id: Uuid,
        requester: &SessionUser,
    ) -> Result<Vec<ControlCommand>, CommandError> {
        self.owned_greenhouse(greenhouse_id, requester).await?;
        self.list_pending(greenhouse_id).await
    }

    /// Marks the command executed. Acknowledging twice is not an error.
    pub async fn acknowledge(
        &self,
        greenhouse_id: Uuid,
        command_id: Uuid,
    ) -> Result<ControlCommand, CommandError> {
        let command = self
            .store
            .mark_command_executed(greenhouse_id, command_id)
            .await?
            .ok_or(CommandError::CommandNotFound)?;

        info!(greenhouse_id = %greenhouse_id, command_id = %command_id, "Command acknowledged");
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::*;
    use crate::{auth::AuthService, db::models::Role};

    struct Fixture {
        queue: CommandQueue,
        store: Store,
        owner: SessionUser,
        other: SessionUser,
        technician: SessionUser,
        greenhouse: Greenhouse,
    }

    async fn fixture(pool: PgPool) -> Fixture {
        let store = Store::new(pool);
        let auth = AuthService::new(store.clone());
        let owner = auth.register("owner", "pw", Role::Farmer).await.unwrap();
        let other = auth.register("other", "pw", Role::Farmer).await.unwrap();
        let tech = auth.register("tech", "pw", Role::Technician).await.unwrap();
        let greenhouse = store
            .insert_greenhouse("GH1", None, owner.id, None)
            .await
            .unwrap();
        Fixture {
            queue: CommandQueue::new(store.clone()),
            store,
            owner: SessionUser::from(&owner),
            other: SessionUser::from(&other),
            technician: SessionUser::from(&tech),
            greenhouse,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn pump_on_lifecycle(pool: PgPool) {
        let f = fixture(pool).await;
        let gh = f.greenhouse.id;

        let cmd = f.queue.enqueue(gh, "pump", "on", &f.owner).await.unwrap();
        assert!(!cmd.executed);

        let pending = f.queue.list_pending(gh).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, cmd.id);
        assert_eq!(pending[0].device, "pump");
        assert_eq!(pending[0].action, "on");

        let acked = f.queue.acknowledge(gh, cmd.id).await.unwrap();
        assert!(acked.executed);
        assert!(f.queue.list_pending(gh).await.unwrap().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn non_owner_cannot_enqueue(pool: PgPool) {
        let f = fixture(pool).await;
        let gh = f.greenhouse.id;

        let err = f.queue.enqueue(gh, "pump", "on", &f.other).await.unwrap_err();
        assert!(matches!(err, CommandError::Forbidden));
        let err = f.queue.enqueue(gh, "pump", "on", &f.technician).await.unwrap_err();
        assert!(matches!(err, CommandError::Forbidden));

        assert_eq!(f.store.count_commands(gh).await.unwrap(), 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn non_owner_cannot_view_pending(pool: PgPool) {
        let f = fixture(pool).await;
        let gh = f.greenhouse.id;
        f.queue.enqueue(gh, "fan", "off", &f.owner).await.unwrap();

        assert_eq!(f.queue.list_pending_for(gh, &f.owner).await.unwrap().len(), 1);
        assert!(matches!(
            f.queue.list_pending_for(gh, &f.other).await.unwrap_err(),
            CommandError::Forbidden
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn pending_is_fifo(pool: PgPool) {
        let f = fixture(pool).await;
        let gh = f.greenhouse.id;
        for action in ["1", "2", "3", "4"] {
            f.queue.enqueue(gh, "valve", action, &f.owner).await.unwrap();
        }

        let pending = f.queue.list_pending(gh).await.unwrap();
        let actions: Vec<_> = pending.iter().map(|c| c.action.as_str()).collect();
        assert_eq!(actions, ["1", "2", "3", "4"]);
        assert!(pending.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn acknowledge_is_idempotent(pool: PgPool) {
        let f = fixture(pool).await;
        let gh = f.greenhouse.id;
        let cmd = f.queue.enqueue(gh, "pump", "on", &f.owner).await.unwrap();

        assert!(f.queue.acknowledge(gh, cmd.id).await.unwrap().executed);
        assert!(f.queue.acknowledge(gh, cmd.id).await.unwrap().executed);
        assert!(f.queue.list_pending(gh).await.unwrap().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn acknowledge_only_touches_the_named_command(pool: PgPool) {
        let f = fixture(pool).await;
        let gh = f.greenhouse.id;
        let first = f.queue.enqueue(gh, "pump", "on", &f.owner).await.unwrap();
        let second = f.queue.enqueue(gh, "pump", "off", &f.owner).await.unwrap();

        f.queue.acknowledge(gh, first.id).await.unwrap();
        let pending = f.queue.list_pending(gh).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, second.id);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn acknowledge_unknown_or_foreign_command_is_not_found(pool: PgPool) {
        let f = fixture(pool).await;
        let gh = f.greenhouse.id;
        let cmd = f.queue.enqueue(gh, "pump", "on", &f.owner).await.unwrap();
        let elsewhere = f
            .store
            .insert_greenhouse("GH2", None, f.owner.user_id, None)
            .await
            .unwrap();

        assert!(matches!(
            f.queue.acknowledge(gh, Uuid::new_v4()).await.unwrap_err(),
            CommandError::CommandNotFound
        ));
        assert!(matches!(
            f.queue.acknowledge(elsewhere.id, cmd.id).await.unwrap_err(),
            CommandError::CommandNotFound
        ));
        assert_eq!(f.queue.list_pending(gh).await.unwrap().len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn unknown_greenhouse_and_blank_fields(pool: PgPool) {
        let f = fixture(pool).await;
        assert!(matches!(
            f.queue.enqueue(Uuid::new_v4(), "pump", "on", &f.owner).await.unwrap_err(),
            CommandError::GreenhouseNotFound
        ));
        assert!(matches!(
            f.queue.enqueue(f.greenhouse.id, " ", "on", &f.owner).await.unwrap_err(),
            CommandError::MissingField
        ));
    }
}
