use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{format_datetime, parse_datetime},
    models::ExcludedDomain,
};

fn row_to_excluded_domain(row: &Row) -> Result<ExcludedDomain> {
    let created_at: String = row.get("created_at")?;

    Ok(ExcludedDomain {
        domain: row.get("domain")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    pub async fn list_excluded_domains(&self, user_id: &str) -> Result<Vec<ExcludedDomain>> {
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT domain, created_at
                 FROM excluded_domains
                 WHERE user_id = ?1
                 ORDER BY domain ASC",
            )?;

            let mut rows = stmt.query(params![user_id])?;
            let mut domains = Vec::new();
            while let Some(row) = rows.next()? {
                domains.push(row_to_excluded_domain(row)?);
            }
            Ok(domains)
        })
        .await
    }

    /// Idempotent: excluding an already excluded domain keeps the original row.
    pub async fn add_excluded_domain(
        &self,
        user_id: &str,
        domain: &str,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        let user_id = user_id.to_string();
        let domain = domain.to_string();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO excluded_domains (user_id, domain, created_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (user_id, domain) DO NOTHING",
                params![user_id, domain, format_datetime(created_at)],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn remove_excluded_domain(&self, user_id: &str, domain: &str) -> Result<()> {
        let user_id = user_id.to_string();
        let domain = domain.to_string();
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "DELETE FROM excluded_domains WHERE user_id = ?1 AND domain = ?2",
                params![user_id, domain],
            )?;

            if rows_affected == 0 {
                bail!("Domain {domain} is not excluded");
            }
            Ok(())
        })
        .await
    }
}
