//! In-memory store doubles for service and handler tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::auth::repo::UserStore;
use crate::auth::repo_types::User;
use crate::balance::repo::CaloricBalanceStore;
use crate::logs::repo::CalorieLogStore;
use crate::logs::repo_types::{CalorieDelta, CalorieLog, LogStatus};
use crate::profile::repo::ProfileStore;
use crate::profile::repo_types::{BodyDetails, WeightGoal};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    body: HashMap<Uuid, BodyDetails>,
    goals: HashMap<Uuid, WeightGoal>,
    logs: HashMap<Uuid, CalorieLog>,
    /// Keyed by calorie log id.
    balances: HashMap<Uuid, f64>,
}

impl Tables {
    fn log_mut(&mut self, user_id: Uuid, log_date: Date) -> Option<&mut CalorieLog> {
        self.logs
            .values_mut()
            .find(|l| l.user_id == user_id && l.log_date == log_date)
    }

    fn set_status(&mut self, log_id: Uuid, status: LogStatus) -> CalorieLog {
        let log = self.logs.get_mut(&log_id).expect("log present");
        log.status = status;
        log.updated_at = OffsetDateTime::now_utc();
        log.clone()
    }
}

/// Mirrors the Postgres stores' semantics, including the guarded delta update
/// and the all-or-nothing status and delete transactions.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    balance_writes_fail: AtomicBool,
}

impl MemoryStore {
    /// Make every balance-row write fail, rolling back its transaction.
    pub fn fail_balance_writes(&self, fail: bool) {
        self.balance_writes_fail.store(fail, Ordering::SeqCst);
    }

    fn balance_write(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.balance_writes_fail.load(Ordering::SeqCst),
            "caloric balance write failed"
        );
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.tables.lock().unwrap().users.get(&id).cloned())
    }

    async fn create(
        &self,
        name: &str,
        username: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>> {
        let mut t = self.tables.lock().unwrap();
        if t.users.values().any(|u| u.username == username) {
            return Ok(None);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: name.into(),
            username: username.into(),
            password_hash: password_hash.into(),
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.insert(user.id, user.clone());
        Ok(Some(user))
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn body_details(&self, user_id: Uuid) -> anyhow::Result<Option<BodyDetails>> {
        Ok(self.tables.lock().unwrap().body.get(&user_id).cloned())
    }

    async fn save_body_details(&self, details: &BodyDetails) -> anyhow::Result<()> {
        self.tables
            .lock()
            .unwrap()
            .body
            .insert(details.user_id, details.clone());
        Ok(())
    }

    async fn weight_goal(&self, user_id: Uuid) -> anyhow::Result<Option<WeightGoal>> {
        Ok(self.tables.lock().unwrap().goals.get(&user_id).copied())
    }

    async fn save_weight_goal(&self, user_id: Uuid, goal: WeightGoal) -> anyhow::Result<()> {
        self.tables.lock().unwrap().goals.insert(user_id, goal);
        Ok(())
    }
}

#[async_trait]
impl CalorieLogStore for MemoryStore {
    async fn find(&self, user_id: Uuid, log_date: Date) -> anyhow::Result<Option<CalorieLog>> {
        let mut t = self.tables.lock().unwrap();
        Ok(t.log_mut(user_id, log_date).map(|l| l.clone()))
    }

    async fn list(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<CalorieLog>> {
        let t = self.tables.lock().unwrap();
        let mut logs: Vec<CalorieLog> = t
            .logs
            .values()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.log_date.cmp(&a.log_date));
        Ok(logs
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn insert(
        &self,
        user_id: Uuid,
        log_date: Date,
        tdee: f64,
    ) -> anyhow::Result<Option<CalorieLog>> {
        let mut t = self.tables.lock().unwrap();
        if t.log_mut(user_id, log_date).is_some() {
            return Ok(None);
        }
        let log = CalorieLog {
            id: Uuid::new_v4(),
            user_id,
            log_date,
            tdee,
            calories_consumed: 0.0,
            calories_burnt: 0.0,
            status: LogStatus::Pending,
            updated_at: OffsetDateTime::now_utc(),
        };
        t.logs.insert(log.id, log.clone());
        Ok(Some(log))
    }

    async fn apply_delta(
        &self,
        user_id: Uuid,
        log_date: Date,
        delta: CalorieDelta,
    ) -> anyhow::Result<Option<CalorieLog>> {
        let mut t = self.tables.lock().unwrap();
        let Some(log) = t.log_mut(user_id, log_date) else {
            return Ok(None);
        };
        if log.status != LogStatus::Pending
            || log.calories_consumed + delta.consumed < 0.0
            || log.calories_burnt + delta.burnt < 0.0
        {
            return Ok(None);
        }
        log.calories_consumed += delta.consumed;
        log.calories_burnt += delta.burnt;
        log.tdee += delta.burnt;
        log.updated_at = OffsetDateTime::now_utc();
        Ok(Some(log.clone()))
    }

    async fn complete(
        &self,
        user_id: Uuid,
        log_date: Date,
    ) -> anyhow::Result<Option<CalorieLog>> {
        let mut t = self.tables.lock().unwrap();
        let Some(id) = t.log_mut(user_id, log_date).map(|l| l.id) else {
            return Ok(None);
        };
        self.balance_write()?;
        let log = t.set_status(id, LogStatus::Done);
        t.balances.insert(id, log.caloric_balance());
        Ok(Some(log))
    }

    async fn reopen(&self, user_id: Uuid, log_date: Date) -> anyhow::Result<Option<CalorieLog>> {
        let mut t = self.tables.lock().unwrap();
        let Some(id) = t.log_mut(user_id, log_date).map(|l| l.id) else {
            return Ok(None);
        };
        self.balance_write()?;
        let log = t.set_status(id, LogStatus::Pending);
        if let Some(b) = t.balances.get_mut(&id) {
            *b = 0.0;
        }
        Ok(Some(log))
    }

    async fn delete_with_balance(&self, log_id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.lock().unwrap();
        self.balance_write()?;
        t.balances.remove(&log_id);
        Ok(t.logs.remove(&log_id).is_some())
    }
}

#[async_trait]
impl CaloricBalanceStore for MemoryStore {
    async fn find(&self, log_id: Uuid) -> anyhow::Result<Option<f64>> {
        Ok(self.tables.lock().unwrap().balances.get(&log_id).copied())
    }

    async fn net_sum(&self, user_id: Uuid) -> anyhow::Result<f64> {
        let t = self.tables.lock().unwrap();
        Ok(t.balances
            .iter()
            .filter(|(log_id, _)| t.logs.get(log_id).is_some_and(|l| l.user_id == user_id))
            .map(|(_, b)| b)
            .sum())
    }
}

/// Every call fails, as if the database were unreachable.
pub struct FailingStore;

fn unavailable<T>() -> anyhow::Result<T> {
    Err(anyhow::anyhow!("connection refused"))
}

#[async_trait]
impl UserStore for FailingStore {
    async fn find_by_username(&self, _: &str) -> anyhow::Result<Option<User>> {
        unavailable()
    }
    async fn find_by_id(&self, _: Uuid) -> anyhow::Result<Option<User>> {
        unavailable()
    }
    async fn create(&self, _: &str, _: &str, _: &str) -> anyhow::Result<Option<User>> {
        unavailable()
    }
}

#[async_trait]
impl ProfileStore for FailingStore {
    async fn body_details(&self, _: Uuid) -> anyhow::Result<Option<BodyDetails>> {
        unavailable()
    }
    async fn save_body_details(&self, _: &BodyDetails) -> anyhow::Result<()> {
        unavailable()
    }
    async fn weight_goal(&self, _: Uuid) -> anyhow::Result<Option<WeightGoal>> {
        unavailable()
    }
    async fn save_weight_goal(&self, _: Uuid, _: WeightGoal) -> anyhow::Result<()> {
        unavailable()
    }
}

#[async_trait]
impl CalorieLogStore for FailingStore {
    async fn find(&self, _: Uuid, _: Date) -> anyhow::Result<Option<CalorieLog>> {
        unavailable()
    }
    async fn list(&self, _: Uuid, _: i64, _: i64) -> anyhow::Result<Vec<CalorieLog>> {
        unavailable()
    }
    async fn insert(&self, _: Uuid, _: Date, _: f64) -> anyhow::Result<Option<CalorieLog>> {
        unavailable()
    }
    async fn apply_delta(
        &self,
        _: Uuid,
        _: Date,
        _: CalorieDelta,
    ) -> anyhow::Result<Option<CalorieLog>> {
        unavailable()
    }
    async fn complete(&self, _: Uuid, _: Date) -> anyhow::Result<Option<CalorieLog>> {
        unavailable()
    }
    async fn reopen(&self, _: Uuid, _: Date) -> anyhow::Result<Option<CalorieLog>> {
        unavailable()
    }
    async fn delete_with_balance(&self, _: Uuid) -> anyhow::Result<bool> {
        unavailable()
    }
}

#[async_trait]
impl CaloricBalanceStore for FailingStore {
    async fn find(&self, _: Uuid) -> anyhow::Result<Option<f64>> {
        unavailable()
    }
    async fn net_sum(&self, _: Uuid) -> anyhow::Result<f64> {
        unavailable()
    }
}
