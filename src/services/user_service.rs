use std::sync::Arc;
use tracing::instrument;

use crate::models::{
    LoginRequest, NewUser, RepositoryError, ServiceError, ServiceResult, User, Validate,
};
use crate::observability::{BusinessTracingMiddleware, Metrics};
use crate::repositories::UserRepository;

/// Registration and login
pub struct UserService {
    users: Arc<dyn UserRepository>,
    tracer: BusinessTracingMiddleware,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, metrics: Arc<Metrics>) -> Self {
        Self {
            users,
            tracer: BusinessTracingMiddleware::new(metrics),
        }
    }

    /// Validate and store a new account
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn register(&self, user: NewUser) -> ServiceResult<User> {
        self.tracer
            .trace_auth_operation("register", async {
                user.validate()?;
                let email = user.email.trim().to_string();
                let user = NewUser {
                    name: user.name.trim().to_string(),
                    email: email.clone(),
                    phone: user.phone.trim().to_string(),
                    password: user.password,
                };

                match self.users.create(user).await {
                    Ok(created) => Ok(created),
                    Err(RepositoryError::ConstraintViolation { .. }) => {
                        Err(ServiceError::EmailAlreadyRegistered { email })
                    }
                    Err(error) => Err(ServiceError::from(error)),
                }
            })
            .await
    }

    /// Exact email and password match. `None` means the credentials are wrong.
    ///
    /// The email is trimmed first, the same way `register` stores it, so
    /// surrounding whitespace from the form never causes a miss. The password
    /// is compared untouched.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn authenticate(&self, request: &LoginRequest) -> ServiceResult<Option<User>> {
        self.tracer
            .trace_auth_operation("login", async {
                let user = self
                    .users
                    .find_by_credentials(request.email.trim(), &request.password)
                    .await?;
                Ok::<_, ServiceError>(user)
            })
            .await
    }
}
