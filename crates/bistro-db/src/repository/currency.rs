//! # Currency Repository
//!
//! Stores the currency settings list. Rates are kept as TEXT decimals and
//! validated on the way out, so a hand-edited zero rate surfaces as an
//! error instead of a page of zero prices.

use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::DbResult;
use bistro_core::validation::validate_currency_code;
use bistro_core::{CoreError, Currency, CurrencySettings, ExchangeRate};

#[derive(Debug, sqlx::FromRow)]
struct CurrencyRow {
    code: String,
    symbol: String,
    rate: String,
    is_default: bool,
}

impl CurrencyRow {
    fn into_currency(self) -> DbResult<Currency> {
        let rate = ExchangeRate::parse(&self.code, &self.rate)?;
        Ok(Currency::new(self.code, self.symbol, rate, self.is_default))
    }
}

/// Repository for currency settings.
#[derive(Debug, Clone)]
pub struct CurrencyRepository {
    pool: SqlitePool,
}

impl CurrencyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CurrencyRepository { pool }
    }

    /// All currencies in display order.
    pub async fn list(&self) -> DbResult<Vec<Currency>> {
        let rows = sqlx::query_as::<_, CurrencyRow>(
            "SELECT code, symbol, rate, is_default FROM currencies ORDER BY sort_order, code",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CurrencyRow::into_currency).collect()
    }

    /// The validated settings list (exactly one default, positive rates).
    pub async fn settings(&self) -> DbResult<CurrencySettings> {
        let currencies = self.list().await?;
        let settings = CurrencySettings::new(currencies).inspect_err(|e| {
            warn!(error = %e, "Stored currency settings are invalid");
        })?;
        Ok(settings)
    }

    pub async fn default_currency(&self) -> DbResult<Option<Currency>> {
        let row = sqlx::query_as::<_, CurrencyRow>(
            "SELECT code, symbol, rate, is_default FROM currencies WHERE is_default = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(CurrencyRow::into_currency).transpose()
    }

    /// Inserts or replaces a currency by code.
    ///
    /// Marking a currency as default clears the flag on every other row in
    /// the same transaction.
    pub async fn upsert(&self, currency: &Currency, sort_order: i64) -> DbResult<()> {
        validate_currency_code(&currency.code).map_err(CoreError::from)?;
        let code = currency.code.to_ascii_uppercase();

        debug!(code = %code, rate = %currency.rate, is_default = currency.is_default, "Upserting currency");

        let mut tx = self.pool.begin().await?;

        if currency.is_default {
            sqlx::query("UPDATE currencies SET is_default = 0 WHERE code != ?1")
                .bind(&code)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO currencies (code, symbol, rate, is_default, sort_order)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (code) DO UPDATE SET
                symbol = excluded.symbol,
                rate = excluded.rate,
                is_default = excluded.is_default,
                sort_order = excluded.sort_order
            "#,
        )
        .bind(&code)
        .bind(&currency.symbol)
        .bind(currency.rate.to_string())
        .bind(currency.is_default)
        .bind(sort_order)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig, DbError};
    use bistro_core::CurrencyError;
    use rust_decimal_macros::dec;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn usd() -> Currency {
        Currency::new("USD", "$", ExchangeRate::IDENTITY, true)
    }

    fn eur() -> Currency {
        Currency::new("EUR", "€", ExchangeRate::new(dec!(0.92)).unwrap(), false)
    }

    #[tokio::test]
    async fn test_upsert_and_list_in_order() {
        let db = db().await;
        let repo = db.currencies();
        repo.upsert(&eur(), 2).await.unwrap();
        repo.upsert(&usd(), 1).await.unwrap();

        let list = repo.list().await.unwrap();
        let codes: Vec<&str> = list.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["USD", "EUR"]);
        assert_eq!(list[1].rate.value(), dec!(0.92));

        let settings = repo.settings().await.unwrap();
        assert_eq!(settings.default_currency().code, "USD");
    }

    #[tokio::test]
    async fn test_new_default_replaces_old() {
        let db = db().await;
        let repo = db.currencies();
        repo.upsert(&usd(), 1).await.unwrap();

        let mut euro_default = eur();
        euro_default.is_default = true;
        repo.upsert(&euro_default, 2).await.unwrap();

        assert_eq!(repo.default_currency().await.unwrap().unwrap().code, "EUR");
        assert!(repo.settings().await.is_ok());
    }

    #[tokio::test]
    async fn test_settings_without_default_is_error() {
        let db = db().await;
        db.currencies().upsert(&eur(), 1).await.unwrap();

        let err = db.currencies().settings().await.unwrap_err();
        assert!(matches!(err, DbError::InvalidCurrency(CurrencyError::NoDefault)));
    }

    #[tokio::test]
    async fn test_corrupt_stored_rate_is_rejected() {
        let db = db().await;
        db.currencies().upsert(&usd(), 1).await.unwrap();
        sqlx::query("INSERT INTO currencies (code, symbol, rate, is_default) VALUES ('GBP', '£', '0', 0)")
            .execute(db.pool())
            .await
            .unwrap();

        let err = db.currencies().list().await.unwrap_err();
        assert!(matches!(err, DbError::InvalidCurrency(CurrencyError::InvalidRate { .. })));
    }
}
