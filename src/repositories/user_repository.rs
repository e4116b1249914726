use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{info, instrument, Instrument};

use crate::models::{NewUser, RepositoryError, RepositoryResult, User};
use crate::observability::{DatabaseTracingMiddleware, Metrics};

/// Trait defining the interface for user account storage
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with `ConstraintViolation` if the email is taken.
    async fn create(&self, user: NewUser) -> RepositoryResult<User>;

    /// Find the user whose email and password both match exactly
    async fn find_by_credentials(&self, email: &str, password: &str)
        -> RepositoryResult<Option<User>>;
}

/// SQLite implementation of the UserRepository trait
pub struct SqliteUserRepository {
    pool: SqlitePool,
    table_name: String,
    tracer: DatabaseTracingMiddleware,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool, metrics: Arc<Metrics>) -> Self {
        Self {
            pool,
            table_name: "users".to_string(),
            tracer: DatabaseTracingMiddleware::new(metrics),
        }
    }

    fn create_db_span(&self, operation: &str) -> tracing::Span {
        tracing::info_span!(
            "SQLite",
            "otel.kind" = "client",
            "otel.name" = format!("SQLite.{}", operation),
            "db.system" = "sqlite",
            "db.operation" = operation,
            "db.sql.table" = %self.table_name,
        )
    }

    fn map_insert_error(error: sqlx::Error) -> RepositoryError {
        if let sqlx::Error::Database(ref db_err) = error {
            if db_err.is_unique_violation() {
                return RepositoryError::ConstraintViolation {
                    message: "email already exists".to_string(),
                };
            }
        }
        RepositoryError::from(error)
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    #[instrument(skip(self, user), fields(table = %self.table_name, email = %user.email))]
    async fn create(&self, user: NewUser) -> RepositoryResult<User> {
        let sql = format!(
            "INSERT INTO {} (name, email, phone, password) VALUES (?, ?, ?, ?)",
            self.table_name
        );

        let result = self
            .tracer
            .trace_operation("insert", &self.table_name, async {
                sqlx::query(&sql)
                    .bind(&user.name)
                    .bind(&user.email)
                    .bind(&user.phone)
                    .bind(&user.password)
                    .execute(&self.pool)
                    .await
                    .map_err(Self::map_insert_error)
            })
            .instrument(self.create_db_span("INSERT"))
            .await?;

        info!("User created");
        Ok(User {
            id: result.last_insert_rowid(),
            name: user.name,
            email: user.email,
            phone: user.phone,
            password: user.password,
        })
    }

    #[instrument(skip(self, password), fields(table = %self.table_name))]
    async fn find_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> RepositoryResult<Option<User>> {
        let sql = format!(
            "SELECT id, name, email, phone, password FROM {} WHERE email = ? AND password = ?",
            self.table_name
        );

        self.tracer
            .trace_operation("select", &self.table_name, async {
                sqlx::query_as::<_, User>(&sql)
                    .bind(email)
                    .bind(password)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(RepositoryError::from)
            })
            .instrument(self.create_db_span("SELECT"))
            .await
    }
}
