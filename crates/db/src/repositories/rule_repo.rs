//! Repository for the `rules` table.

use sqlx::PgPool;

use intake_core::types::DbId;

use crate::models::rule::{NewRule, RuleRow};

/// Column list for `rules` queries.
const RULE_COLUMNS: &str = "\
    id, rule_name, rule_type, description, conditions, actions, \
    priority, is_active, created_at";

/// Provides CRUD operations for readiness rules.
pub struct RuleRepo;

impl RuleRepo {
    /// Insert a new rule, returning the stored row with its generated
    /// id and creation timestamp.
    pub async fn create(pool: &PgPool, input: &NewRule) -> Result<RuleRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO rules \
                 (rule_name, rule_type, description, conditions, actions, priority, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {RULE_COLUMNS}"
        );
        sqlx::query_as::<_, RuleRow>(&query)
            .bind(&input.rule_name)
            .bind(&input.rule_type)
            .bind(&input.description)
            .bind(&input.conditions)
            .bind(&input.actions)
            .bind(input.priority)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// List rules ordered by priority ascending, id as the stable
    /// tie-break, optionally filtered by rule type.
    pub async fn list(pool: &PgPool, rule_type: Option<&str>) -> Result<Vec<RuleRow>, sqlx::Error> {
        Self::query_rules(pool, rule_type, false).await
    }

    /// List only active rules, in evaluation order.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<RuleRow>, sqlx::Error> {
        Self::query_rules(pool, None, true).await
    }

    /// Shared query for loading rules with optional filters.
    async fn query_rules(
        pool: &PgPool,
        rule_type: Option<&str>,
        active_only: bool,
    ) -> Result<Vec<RuleRow>, sqlx::Error> {
        let active_clause = if active_only {
            "AND is_active = true "
        } else {
            ""
        };
        let sql = format!(
            "SELECT {RULE_COLUMNS} FROM rules \
             WHERE ($1::text IS NULL OR rule_type = $1) \
               {active_clause}\
             ORDER BY priority, id"
        );
        sqlx::query_as::<_, RuleRow>(&sql)
            .bind(rule_type)
            .fetch_all(pool)
            .await
    }

    /// Find a rule by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<RuleRow>, sqlx::Error> {
        let query = format!("SELECT {RULE_COLUMNS} FROM rules WHERE id = $1");
        sqlx::query_as::<_, RuleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Replace a rule's definition. `created_at` is never touched.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &NewRule,
    ) -> Result<Option<RuleRow>, sqlx::Error> {
        let query = format!(
            "UPDATE rules SET \
                 rule_name = $2, \
                 rule_type = $3, \
                 description = $4, \
                 conditions = $5, \
                 actions = $6, \
                 priority = $7, \
                 is_active = $8 \
             WHERE id = $1 \
             RETURNING {RULE_COLUMNS}"
        );
        sqlx::query_as::<_, RuleRow>(&query)
            .bind(id)
            .bind(&input.rule_name)
            .bind(&input.rule_type)
            .bind(&input.description)
            .bind(&input.conditions)
            .bind(&input.actions)
            .bind(input.priority)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Toggle a rule's active flag without touching its definition.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn set_active(
        pool: &PgPool,
        id: DbId,
        active: bool,
    ) -> Result<Option<RuleRow>, sqlx::Error> {
        let query = format!(
            "UPDATE rules SET is_active = $2 WHERE id = $1 RETURNING {RULE_COLUMNS}"
        );
        sqlx::query_as::<_, RuleRow>(&query)
            .bind(id)
            .bind(active)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a rule by id. Returns whether a row was removed; a
    /// repeat delete of the same id returns `false`.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
