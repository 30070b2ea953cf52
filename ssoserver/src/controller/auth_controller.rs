//! Auth gRPC controller.
//!
//! Thin adapter between the generated proto surface and `AuthService`:
//! converts requests, delegates, and maps domain errors to Status.

use tonic::{Request, Response, Status};

use crate::service::{AppProvider, AuthService, UserProvider, UserSaver};
use crate::sso::auth_server::Auth;
use crate::sso::{
    IsAdminRequest, IsAdminResponse, LoginRequest, LoginResponse, RegisterResponse,
    RegisterUserRequest,
};

pub struct AuthController<S, P, A> {
    svc: AuthService<S, P, A>,
}

impl<S, P, A> AuthController<S, P, A>
where
    S: UserSaver + 'static,
    P: UserProvider + 'static,
    A: AppProvider + 'static,
{
    pub fn new(svc: AuthService<S, P, A>) -> Self {
        Self { svc }
    }
}

#[tonic::async_trait]
impl<S, P, A> Auth for AuthController<S, P, A>
where
    S: UserSaver + 'static,
    P: UserProvider + 'static,
    A: AppProvider + 'static,
{
    async fn register_user(
        &self,
        request: Request<RegisterUserRequest>,
    ) -> Result<Response<RegisterResponse>, Status> {
        let req = request.into_inner();

        let id = self
            .svc
            .register(&req.email, &req.password)
            .await
            .map_err(|e| e.to_status("sso.RegisterUser"))?;

        Ok(Response::new(RegisterResponse { id }))
    }

    async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> Result<Response<LoginResponse>, Status> {
        let req = request.into_inner();

        let token = self
            .svc
            .login(&req.email, &req.password, req.app_id)
            .await
            .map_err(|e| e.to_status("sso.Login"))?;

        Ok(Response::new(LoginResponse { token }))
    }

    async fn is_admin(
        &self,
        request: Request<IsAdminRequest>,
    ) -> Result<Response<IsAdminResponse>, Status> {
        let req = request.into_inner();

        let is_admin = self
            .svc
            .is_admin(req.user_id)
            .await
            .map_err(|e| e.to_status("sso.IsAdmin"))?;

        Ok(Response::new(IsAdminResponse { is_admin }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;
    use chrono::Duration;
    use shared::{FixedKey, TokenCodec};
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::sync::Arc;
    use tonic::Code;

    const SECRET: &[u8] = b"test-secret";

    async fn controller() -> AuthController<SqliteStorage, SqliteStorage, SqliteStorage> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(SqliteConnectOptions::new().foreign_keys(true))
            .await
            .expect("failed to open in-memory database");

        let storage = Arc::new(
            SqliteStorage::from_pool(pool.clone())
                .await
                .expect("schema"),
        );

        sqlx::query("INSERT INTO apps (id, name, secret) VALUES (?, ?, ?)")
            .bind(1i64)
            .bind("shop")
            .bind(SECRET)
            .execute(&pool)
            .await
            .expect("insert app");

        let codec = TokenCodec::new(Arc::new(FixedKey::new(SECRET)));
        AuthController::new(AuthService::new(
            storage.clone(),
            storage.clone(),
            storage,
            codec,
            Duration::hours(1),
        ))
    }

    #[tokio::test]
    async fn test_register_and_login_over_rpc() {
        let ctrl = controller().await;

        let reg = ctrl
            .register_user(Request::new(RegisterUserRequest {
                email: "a@x.com".into(),
                password: "pw1".into(),
            }))
            .await
            .expect("register")
            .into_inner();
        assert!(reg.id > 0);

        let login = ctrl
            .login(Request::new(LoginRequest {
                email: "a@x.com".into(),
                password: "pw1".into(),
                app_id: 1,
            }))
            .await
            .expect("login")
            .into_inner();
        assert!(!login.token.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_register_maps_to_invalid_argument() {
        let ctrl = controller().await;

        let req = || {
            Request::new(RegisterUserRequest {
                email: "a@x.com".into(),
                password: "pw1".into(),
            })
        };
        ctrl.register_user(req()).await.expect("first register");

        let status = ctrl.register_user(req()).await.expect_err("duplicate");
        assert_eq!(status.code(), Code::InvalidArgument);
        assert!(status.message().contains("exists"));
    }

    #[tokio::test]
    async fn test_bad_credentials_map_to_invalid_argument() {
        let ctrl = controller().await;

        let status = ctrl
            .login(Request::new(LoginRequest {
                email: "ghost@x.com".into(),
                password: "pw1".into(),
                app_id: 1,
            }))
            .await
            .expect_err("login should fail");
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_unknown_user_admin_check_maps_to_not_found() {
        let ctrl = controller().await;

        let status = ctrl
            .is_admin(Request::new(IsAdminRequest { user_id: 12345 }))
            .await
            .expect_err("is_admin should fail");
        assert_eq!(status.code(), Code::NotFound);
    }
}
