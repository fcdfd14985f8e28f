//! SQLite persistence for archon identity, bindings, polls, votes, and the
//! store-and-forward outbox.
//!
//! One logical writer per process: the pool holds a single connection, WAL
//! journal, foreign keys on, 30 s busy timeout. Uniqueness invariants
//! (identity singleton, binding `(type, subject)`, vote `(poll_id, voter_id)`)
//! are enforced in-schema; multi-table deletes run inside one transaction.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use archon_schemas::{
    BindingRow, BindingType, GovernanceTier, IdentityRow, IdentitySource, OutboxOperation,
    OutboxRow, OutboxStatus, PollRow, PollStatus, VoteRow, VoterHistoryRow,
};

const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct ArchonStore {
    pool: SqlitePool,
}

impl ArchonStore {
    /// Open (creating if missing) the database file at `db_path`.
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create_dir_all {:?}", parent))?;
        }

        let opts = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .with_context(|| format!("open sqlite db {:?}", db_path))?;

        Ok(Self { pool })
    }

    /// In-memory database for tests. The single pooled connection is kept
    /// alive for the pool's lifetime so the database is not dropped between
    /// calls.
    pub async fn open_in_memory() -> Result<Self> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("parse in-memory sqlite url")?
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await
            .context("open in-memory sqlite db")?;

        Ok(Self { pool })
    }

    /// Create tables and indexes if they do not exist. Idempotent.
    pub async fn init_schema(&self) -> Result<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS archon_identity (
                singleton_id INTEGER PRIMARY KEY CHECK(singleton_id = 1),
                did TEXT NOT NULL,
                governance_tier TEXT NOT NULL DEFAULT 'basic',
                status TEXT NOT NULL DEFAULT 'active',
                source TEXT NOT NULL DEFAULT 'local-fallback',
                gateway_url TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS archon_bindings (
                binding_id TEXT PRIMARY KEY,
                did TEXT NOT NULL,
                binding_type TEXT NOT NULL,
                subject TEXT NOT NULL,
                attestation_json TEXT NOT NULL,
                signature TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                UNIQUE(binding_type, subject)
            )
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_archon_bindings_did
            ON archon_bindings(did, binding_type)
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS archon_polls (
                poll_id TEXT PRIMARY KEY,
                remote_poll_id TEXT,
                poll_type TEXT NOT NULL,
                title TEXT NOT NULL,
                options_json TEXT NOT NULL,
                metadata_json TEXT NOT NULL DEFAULT '{}',
                created_by TEXT NOT NULL,
                deadline INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'active',
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_archon_polls_status_deadline
            ON archon_polls(status, deadline)
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS archon_votes (
                vote_id TEXT PRIMARY KEY,
                poll_id TEXT NOT NULL,
                voter_id TEXT NOT NULL,
                choice TEXT NOT NULL,
                reason TEXT NOT NULL DEFAULT '',
                voted_at INTEGER NOT NULL,
                signature TEXT NOT NULL,
                FOREIGN KEY(poll_id) REFERENCES archon_polls(poll_id),
                UNIQUE(poll_id, voter_id)
            )
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_archon_votes_voter
            ON archon_votes(voter_id, voted_at DESC)
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS archon_outbox (
                entry_id TEXT PRIMARY KEY,
                operation TEXT NOT NULL,
                payload_json TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                retry_count INTEGER NOT NULL DEFAULT 0,
                max_retries INTEGER NOT NULL DEFAULT 5,
                next_retry_at INTEGER NOT NULL,
                last_error TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_archon_outbox_status_retry
            ON archon_outbox(status, next_retry_at)
            "#,
        ];

        for stmt in statements {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .context("init schema statement failed")?;
        }
        Ok(())
    }

    // -----------------------------
    // Identity
    // -----------------------------

    pub async fn get_identity(&self) -> Result<Option<IdentityRow>> {
        let row = sqlx::query(
            r#"
            SELECT did, governance_tier, status, source, gateway_url, created_at, updated_at
            FROM archon_identity
            WHERE singleton_id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .context("get_identity failed")?;

        let Some(row) = row else { return Ok(None) };
        Ok(Some(identity_from_row(&row)?))
    }

    /// Insert or replace the identity singleton, preserving the original
    /// `created_at` across re-provisioning.
    pub async fn upsert_identity(
        &self,
        did: &str,
        governance_tier: GovernanceTier,
        status: &str,
        source: IdentitySource,
        gateway_url: Option<&str>,
        now_ts: i64,
    ) -> Result<()> {
        let existing = self.get_identity().await?;
        let created_at = existing.map(|i| i.created_at).unwrap_or(now_ts);

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO archon_identity (
                singleton_id, did, governance_tier, status,
                source, gateway_url, created_at, updated_at
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(did)
        .bind(governance_tier.as_str())
        .bind(status)
        .bind(source.as_str())
        .bind(gateway_url)
        .bind(created_at)
        .bind(now_ts)
        .execute(&self.pool)
        .await
        .context("upsert_identity failed")?;
        Ok(())
    }

    pub async fn update_governance_tier(
        &self,
        governance_tier: GovernanceTier,
        now_ts: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE archon_identity
            SET governance_tier = ?1, updated_at = ?2
            WHERE singleton_id = 1
            "#,
        )
        .bind(governance_tier.as_str())
        .bind(now_ts)
        .execute(&self.pool)
        .await
        .context("update_governance_tier failed")?;
        Ok(())
    }

    // -----------------------------
    // Bindings
    // -----------------------------

    /// Upsert on the `(binding_type, subject)` uniqueness: re-binding the same
    /// subject overwrites the attestation and signature and bumps
    /// `updated_at`, keeping the original `created_at`.
    #[allow(clippy::too_many_arguments)]
    pub async fn upsert_binding(
        &self,
        binding_id: &str,
        did: &str,
        binding_type: BindingType,
        subject: &str,
        attestation_json: &str,
        signature: &str,
        now_ts: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO archon_bindings (
                binding_id, did, binding_type, subject,
                attestation_json, signature, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(binding_type, subject) DO UPDATE SET
                binding_id = excluded.binding_id,
                did = excluded.did,
                attestation_json = excluded.attestation_json,
                signature = excluded.signature,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(binding_id)
        .bind(did)
        .bind(binding_type.as_str())
        .bind(subject)
        .bind(attestation_json)
        .bind(signature)
        .bind(now_ts)
        .bind(now_ts)
        .execute(&self.pool)
        .await
        .context("upsert_binding failed")?;
        Ok(())
    }

    /// Purge bindings left behind by a replaced DID. Returns the number of
    /// rows removed.
    pub async fn delete_bindings_for_did(&self, did: &str) -> Result<u64> {
        let res = sqlx::query("DELETE FROM archon_bindings WHERE did = ?1")
            .bind(did)
            .execute(&self.pool)
            .await
            .context("delete_bindings_for_did failed")?;
        Ok(res.rows_affected())
    }

    pub async fn list_bindings(&self) -> Result<Vec<BindingRow>> {
        let rows = sqlx::query(
            r#"
            SELECT binding_id, did, binding_type, subject,
                   attestation_json, signature, created_at, updated_at
            FROM archon_bindings
            ORDER BY updated_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("list_bindings failed")?;

        rows.iter().map(binding_from_row).collect()
    }

    // -----------------------------
    // Polls
    // -----------------------------

    #[allow(clippy::too_many_arguments)]
    pub async fn create_poll(
        &self,
        poll_id: &str,
        remote_poll_id: Option<&str>,
        poll_type: &str,
        title: &str,
        options_json: &str,
        metadata_json: &str,
        created_by: &str,
        deadline: i64,
        now_ts: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO archon_polls (
                poll_id, remote_poll_id, poll_type, title, options_json,
                metadata_json, created_by, deadline, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'active', ?9, ?10)
            "#,
        )
        .bind(poll_id)
        .bind(remote_poll_id)
        .bind(poll_type)
        .bind(title)
        .bind(options_json)
        .bind(metadata_json)
        .bind(created_by)
        .bind(deadline)
        .bind(now_ts)
        .bind(now_ts)
        .execute(&self.pool)
        .await
        .context("create_poll failed")?;
        Ok(())
    }

    pub async fn get_poll(&self, poll_id: &str) -> Result<Option<PollRow>> {
        let row = sqlx::query(
            r#"
            SELECT poll_id, remote_poll_id, poll_type, title, options_json,
                   metadata_json, created_by, deadline, status, created_at, updated_at
            FROM archon_polls
            WHERE poll_id = ?1
            "#,
        )
        .bind(poll_id)
        .fetch_optional(&self.pool)
        .await
        .context("get_poll failed")?;

        let Some(row) = row else { return Ok(None) };
        Ok(Some(poll_from_row(&row)?))
    }

    pub async fn set_poll_status(
        &self,
        poll_id: &str,
        status: PollStatus,
        now_ts: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE archon_polls SET status = ?1, updated_at = ?2 WHERE poll_id = ?3
            "#,
        )
        .bind(status.as_str())
        .bind(now_ts)
        .bind(poll_id)
        .execute(&self.pool)
        .await
        .context("set_poll_status failed")?;
        Ok(())
    }

    /// Backfill the remote id after a queued `create_poll` drain succeeds.
    pub async fn set_remote_poll_id(
        &self,
        poll_id: &str,
        remote_poll_id: &str,
        now_ts: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE archon_polls SET remote_poll_id = ?1, updated_at = ?2 WHERE poll_id = ?3
            "#,
        )
        .bind(remote_poll_id)
        .bind(now_ts)
        .bind(poll_id)
        .execute(&self.pool)
        .await
        .context("set_remote_poll_id failed")?;
        Ok(())
    }

    /// Transition every `active` poll whose deadline has passed. Returns the
    /// number of polls completed.
    pub async fn complete_expired_polls(&self, now_ts: i64) -> Result<u64> {
        let res = sqlx::query(
            r#"
            UPDATE archon_polls
            SET status = 'completed', updated_at = ?1
            WHERE status = 'active' AND deadline <= ?1
            "#,
        )
        .bind(now_ts)
        .execute(&self.pool)
        .await
        .context("complete_expired_polls failed")?;
        Ok(res.rows_affected())
    }

    pub async fn count_polls_by_status(&self, status: PollStatus) -> Result<i64> {
        let (n,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM archon_polls WHERE status = ?1")
                .bind(status.as_str())
                .fetch_one(&self.pool)
                .await
                .context("count_polls_by_status failed")?;
        Ok(n)
    }

    pub async fn count_polls(&self) -> Result<i64> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM archon_polls")
            .fetch_one(&self.pool)
            .await
            .context("count_polls failed")?;
        Ok(n)
    }

    /// Delete completed polls with `deadline < before_ts` and their votes.
    /// Votes go first (foreign key), both deletes in one transaction. Returns
    /// the number of polls removed.
    pub async fn prune_completed_polls(&self, before_ts: i64) -> Result<u64> {
        let mut tx = self.pool.begin().await.context("prune begin failed")?;

        sqlx::query(
            r#"
            DELETE FROM archon_votes
            WHERE poll_id IN (
                SELECT poll_id FROM archon_polls
                WHERE status = 'completed' AND deadline < ?1
            )
            "#,
        )
        .bind(before_ts)
        .execute(&mut *tx)
        .await
        .context("prune votes failed")?;

        let res = sqlx::query(
            r#"
            DELETE FROM archon_polls
            WHERE status = 'completed' AND deadline < ?1
            "#,
        )
        .bind(before_ts)
        .execute(&mut *tx)
        .await
        .context("prune polls failed")?;

        tx.commit().await.context("prune commit failed")?;
        Ok(res.rows_affected())
    }

    // -----------------------------
    // Votes
    // -----------------------------

    /// Insert a ballot. Returns false (without raising) when a ballot for
    /// `(poll_id, voter_id)` already exists.
    #[allow(clippy::too_many_arguments)]
    pub async fn add_vote(
        &self,
        vote_id: &str,
        poll_id: &str,
        voter_id: &str,
        choice: &str,
        reason: &str,
        voted_at: i64,
        signature: &str,
    ) -> Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT OR IGNORE INTO archon_votes (
                vote_id, poll_id, voter_id, choice, reason, voted_at, signature
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(vote_id)
        .bind(poll_id)
        .bind(voter_id)
        .bind(choice)
        .bind(reason)
        .bind(voted_at)
        .bind(signature)
        .execute(&self.pool)
        .await
        .context("add_vote failed")?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn list_votes_for_poll(&self, poll_id: &str) -> Result<Vec<VoteRow>> {
        let rows = sqlx::query(
            r#"
            SELECT vote_id, poll_id, voter_id, choice, reason, voted_at, signature
            FROM archon_votes
            WHERE poll_id = ?1
            ORDER BY voted_at ASC
            "#,
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await
        .context("list_votes_for_poll failed")?;

        rows.iter().map(vote_from_row).collect()
    }

    /// The voter's own ballots joined with poll headers, newest first.
    pub async fn list_votes_for_voter(
        &self,
        voter_id: &str,
        limit: i64,
    ) -> Result<Vec<VoterHistoryRow>> {
        let rows = sqlx::query(
            r#"
            SELECT v.vote_id, v.poll_id, v.choice, v.reason, v.voted_at,
                   p.title, p.poll_type, p.status AS poll_status, p.deadline
            FROM archon_votes v
            JOIN archon_polls p ON p.poll_id = v.poll_id
            WHERE v.voter_id = ?1
            ORDER BY v.voted_at DESC
            LIMIT ?2
            "#,
        )
        .bind(voter_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("list_votes_for_voter failed")?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(VoterHistoryRow {
                vote_id: row.try_get("vote_id")?,
                poll_id: row.try_get("poll_id")?,
                choice: row.try_get("choice")?,
                reason: row.try_get("reason")?,
                voted_at: row.try_get("voted_at")?,
                title: row.try_get("title")?,
                poll_type: row.try_get("poll_type")?,
                poll_status: PollStatus::parse(&row.try_get::<String, _>("poll_status")?)?,
                deadline: row.try_get("deadline")?,
            });
        }
        Ok(out)
    }

    pub async fn count_votes(&self) -> Result<i64> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM archon_votes")
            .fetch_one(&self.pool)
            .await
            .context("count_votes failed")?;
        Ok(n)
    }

    // -----------------------------
    // Outbox
    // -----------------------------

    /// Queue a failed remote operation for retry. Idempotent on `entry_id`:
    /// re-queueing the same payload in the same second is a no-op.
    pub async fn outbox_add(
        &self,
        entry_id: &str,
        operation: OutboxOperation,
        payload_json: &str,
        now_ts: i64,
        max_retries: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO archon_outbox (
                entry_id, operation, payload_json, status, retry_count,
                max_retries, next_retry_at, created_at, updated_at
            ) VALUES (?1, ?2, ?3, 'pending', 0, ?4, ?5, ?5, ?5)
            "#,
        )
        .bind(entry_id)
        .bind(operation.as_str())
        .bind(payload_json)
        .bind(max_retries)
        .bind(now_ts)
        .execute(&self.pool)
        .await
        .context("outbox_add failed")?;
        Ok(())
    }

    /// Pending entries that are due, oldest first.
    pub async fn outbox_list_pending(&self, now_ts: i64, limit: i64) -> Result<Vec<OutboxRow>> {
        let rows = sqlx::query(
            r#"
            SELECT entry_id, operation, payload_json, status, retry_count,
                   max_retries, next_retry_at, last_error, created_at, updated_at
            FROM archon_outbox
            WHERE status = 'pending' AND next_retry_at <= ?1
            ORDER BY created_at ASC
            LIMIT ?2
            "#,
        )
        .bind(now_ts)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("outbox_list_pending failed")?;

        rows.iter().map(outbox_from_row).collect()
    }

    pub async fn outbox_mark_success(&self, entry_id: &str, now_ts: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE archon_outbox
            SET status = 'succeeded', updated_at = ?1
            WHERE entry_id = ?2
            "#,
        )
        .bind(now_ts)
        .bind(entry_id)
        .execute(&self.pool)
        .await
        .context("outbox_mark_success failed")?;
        Ok(())
    }

    /// Record a failed attempt: bump `retry_count`, store the (already
    /// truncated) error and the next due time; the entry flips to `exhausted`
    /// once the retry budget is spent.
    pub async fn outbox_mark_failed(
        &self,
        entry_id: &str,
        error: &str,
        next_retry_at: i64,
        now_ts: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE archon_outbox
            SET retry_count = retry_count + 1,
                last_error = ?1,
                next_retry_at = ?2,
                status = CASE
                    WHEN retry_count + 1 >= max_retries THEN 'exhausted'
                    ELSE 'pending'
                END,
                updated_at = ?3
            WHERE entry_id = ?4
            "#,
        )
        .bind(error)
        .bind(next_retry_at)
        .bind(now_ts)
        .bind(entry_id)
        .execute(&self.pool)
        .await
        .context("outbox_mark_failed failed")?;
        Ok(())
    }

    /// Remove terminal (`succeeded` / `exhausted`) entries older than the
    /// cutoff. Returns the number removed.
    pub async fn outbox_prune(&self, before_ts: i64) -> Result<u64> {
        let res = sqlx::query(
            r#"
            DELETE FROM archon_outbox
            WHERE status != 'pending' AND updated_at < ?1
            "#,
        )
        .bind(before_ts)
        .execute(&self.pool)
        .await
        .context("outbox_prune failed")?;
        Ok(res.rows_affected())
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn identity_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<IdentityRow> {
    Ok(IdentityRow {
        did: row.try_get("did")?,
        governance_tier: GovernanceTier::parse(&row.try_get::<String, _>("governance_tier")?)?,
        status: row.try_get("status")?,
        source: IdentitySource::parse(&row.try_get::<String, _>("source")?)?,
        gateway_url: row.try_get("gateway_url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn binding_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<BindingRow> {
    Ok(BindingRow {
        binding_id: row.try_get("binding_id")?,
        did: row.try_get("did")?,
        binding_type: BindingType::parse(&row.try_get::<String, _>("binding_type")?)?,
        subject: row.try_get("subject")?,
        attestation_json: row.try_get("attestation_json")?,
        signature: row.try_get("signature")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn poll_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<PollRow> {
    Ok(PollRow {
        poll_id: row.try_get("poll_id")?,
        remote_poll_id: row.try_get("remote_poll_id")?,
        poll_type: row.try_get("poll_type")?,
        title: row.try_get("title")?,
        options_json: row.try_get("options_json")?,
        metadata_json: row.try_get("metadata_json")?,
        created_by: row.try_get("created_by")?,
        deadline: row.try_get("deadline")?,
        status: PollStatus::parse(&row.try_get::<String, _>("status")?)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn vote_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<VoteRow> {
    Ok(VoteRow {
        vote_id: row.try_get("vote_id")?,
        poll_id: row.try_get("poll_id")?,
        voter_id: row.try_get("voter_id")?,
        choice: row.try_get("choice")?,
        reason: row.try_get("reason")?,
        voted_at: row.try_get("voted_at")?,
        signature: row.try_get("signature")?,
    })
}

fn outbox_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<OutboxRow> {
    Ok(OutboxRow {
        entry_id: row.try_get("entry_id")?,
        operation: OutboxOperation::parse(&row.try_get::<String, _>("operation")?)?,
        payload_json: row.try_get("payload_json")?,
        status: OutboxStatus::parse(&row.try_get::<String, _>("status")?)?,
        retry_count: row.try_get("retry_count")?,
        max_retries: row.try_get("max_retries")?,
        next_retry_at: row.try_get("next_retry_at")?,
        last_error: row.try_get("last_error")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
