use sqlx::{QueryBuilder, Row, Sqlite};

use reach_core::audience::{AudiencePredicate, Constraint, RangeConstraint, Scalar};
use reach_core::domain::customer::{Customer, CustomerId, Gender};
use reach_core::domain::owner::OwnerId;

use super::{decode_error, format_timestamp, parse_timestamp, CustomerRepository, RepositoryError};
use crate::DbPool;

const CUSTOMER_COLUMNS: &str = "id, uid, name, email, age, gender, last_visit, total_visits,
                                latest_purchase, total_purchase, created_at, updated_at";

pub struct SqlCustomerRepository {
    pool: DbPool,
}

impl SqlCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_customer(row: &sqlx::sqlite::SqliteRow) -> Result<Customer, RepositoryError> {
    let id: String = row.try_get("id").map_err(decode_error)?;
    let uid: String = row.try_get("uid").map_err(decode_error)?;
    let name: String = row.try_get("name").map_err(decode_error)?;
    let email: String = row.try_get("email").map_err(decode_error)?;
    let age: i64 = row.try_get("age").map_err(decode_error)?;
    let gender: String = row.try_get("gender").map_err(decode_error)?;
    let last_visit: String = row.try_get("last_visit").map_err(decode_error)?;
    let total_visits: i64 = row.try_get("total_visits").map_err(decode_error)?;
    let latest_purchase: i64 = row.try_get("latest_purchase").map_err(decode_error)?;
    let total_purchase: i64 = row.try_get("total_purchase").map_err(decode_error)?;
    let created_at: String = row.try_get("created_at").map_err(decode_error)?;
    let updated_at: String = row.try_get("updated_at").map_err(decode_error)?;

    Ok(Customer {
        id: CustomerId(uuid::Uuid::parse_str(&id).map_err(decode_error)?),
        owner: OwnerId::parse(&uid).map_err(decode_error)?,
        name,
        email,
        age: u32::try_from(age).map_err(decode_error)?,
        gender: gender.parse::<Gender>().map_err(decode_error)?,
        last_visit: parse_timestamp("last_visit", &last_visit)?,
        total_visits: u32::try_from(total_visits).map_err(decode_error)?,
        latest_purchase: u64::try_from(latest_purchase).map_err(decode_error)?,
        total_purchase: u64::try_from(total_purchase).map_err(decode_error)?,
        created_at: parse_timestamp("created_at", &created_at)?,
        updated_at: parse_timestamp("updated_at", &updated_at)?,
    })
}

fn to_i64(value: u64, column: &str) -> Result<i64, RepositoryError> {
    i64::try_from(value)
        .map_err(|_| RepositoryError::Decode(format!("{column} value {value} is out of range")))
}

/// Appends ` AND <predicate>` terms for every constraint. Every value is bound,
/// never interpolated; column names come from a closed enum.
fn push_constraints(query: &mut QueryBuilder<'_, Sqlite>, predicate: &AudiencePredicate) {
    for constraint in &predicate.constraints {
        match constraint {
            Constraint::Gender(gender) => {
                query.push(" AND gender = ");
                query.push_bind(gender.as_str());
            }
            Constraint::Range(range) => push_range(query, range),
        }
    }
}

fn push_range(query: &mut QueryBuilder<'_, Sqlite>, range: &RangeConstraint) {
    let column = range.field.column();

    if let Some(lower) = &range.lower {
        match lower {
            Scalar::Integer(value) => match i64::try_from(*value) {
                Ok(value) => {
                    query.push(format!(" AND {column} >= "));
                    query.push_bind(value);
                }
                // No stored value can reach a lower bound past i64::MAX.
                Err(_) => {
                    query.push(" AND 0");
                }
            },
            Scalar::Timestamp(at) => {
                query.push(format!(" AND {column} >= "));
                query.push_bind(format_timestamp(at));
            }
        }
    }

    if let Some(upper) = &range.upper {
        match upper {
            Scalar::Integer(value) => {
                if let Ok(value) = i64::try_from(*value) {
                    query.push(format!(" AND {column} <= "));
                    query.push_bind(value);
                }
            }
            Scalar::Timestamp(at) => {
                query.push(format!(" AND {column} <= "));
                query.push_bind(format_timestamp(at));
            }
        }
    }
}

#[async_trait::async_trait]
impl CustomerRepository for SqlCustomerRepository {
    async fn insert(&self, customer: Customer) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO customer (id, uid, name, email, age, gender, last_visit, total_visits,
                                   latest_purchase, total_purchase, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(customer.id.0.to_string())
        .bind(customer.owner.as_str())
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(i64::from(customer.age))
        .bind(customer.gender.as_str())
        .bind(format_timestamp(&customer.last_visit))
        .bind(i64::from(customer.total_visits))
        .bind(to_i64(customer.latest_purchase, "latest_purchase")?)
        .bind(to_i64(customer.total_purchase, "total_purchase")?)
        .bind(format_timestamp(&customer.created_at))
        .bind(format_timestamp(&customer.updated_at))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(RepositoryError::Conflict(format!(
                    "customer `{}` already exists for owner `{}`",
                    customer.email, customer.owner
                )))
            }
            Err(error) => Err(RepositoryError::Database(error)),
        }
    }

    async fn find_by_owner_and_email(
        &self,
        owner: &OwnerId,
        email: &str,
    ) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customer WHERE uid = ? AND email = ?"
        ))
        .bind(owner.as_str())
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_customer(r)?)),
            None => Ok(None),
        }
    }

    async fn find_matching(
        &self,
        predicate: &AudiencePredicate,
    ) -> Result<Vec<Customer>, RepositoryError> {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customer WHERE uid = "
        ));
        query.push_bind(predicate.owner.as_str());
        push_constraints(&mut query, predicate);

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_customer).collect::<Result<Vec<_>, _>>()
    }

    async fn list_for_owner(&self, owner: &OwnerId) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customer
             WHERE uid = ?
             ORDER BY created_at ASC, rowid ASC"
        ))
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_customer).collect::<Result<Vec<_>, _>>()
    }

    async fn list_recent_visitors(
        &self,
        owner: &OwnerId,
        limit: u32,
    ) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customer
             WHERE uid = ?
             ORDER BY last_visit DESC, rowid DESC
             LIMIT ?"
        ))
        .bind(owner.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_customer).collect::<Result<Vec<_>, _>>()
    }
}
