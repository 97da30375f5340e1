use regex::Regex;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{AdminError, CreateUserRequest, Profile, ALLOWED_ROLES};

/// Privileged user provisioning. The hosted auth service and the `profiles`
/// table have no shared transaction, so creation is two sequential calls with
/// a manual rollback: if the profile insert fails, the freshly created auth
/// user is deleted again.
pub struct UserProvisioningService {
    supabase: SupabaseClient,
    email_re: Regex,
}

impl UserProvisioningService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            email_re: Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
                .expect("email pattern is valid"),
        }
    }

    fn validate(&self, request: &CreateUserRequest) -> Result<(), AdminError> {
        if !self.email_re.is_match(&request.email) {
            return Err(AdminError::InvalidEmail);
        }
        if request.password.len() < 8 {
            return Err(AdminError::WeakPassword);
        }
        if !ALLOWED_ROLES.contains(&request.role.as_str()) {
            return Err(AdminError::InvalidRole(request.role.clone()));
        }
        Ok(())
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<Profile, AdminError> {
        self.validate(&request)?;
        debug!("Provisioning user account for: {}", request.email);

        let existing_path = format!(
            "/rest/v1/profiles?email=eq.{}",
            urlencoding::encode(&request.email)
        );
        let existing: Vec<Value> = self
            .supabase
            .admin_request(Method::GET, &existing_path, None)
            .await
            .map_err(|e| AdminError::DatabaseError(e.to_string()))?;

        if !existing.is_empty() {
            return Err(AdminError::EmailAlreadyExists {
                email: request.email,
            });
        }

        // Step 1: auth user.
        let auth_body = json!({
            "email": request.email,
            "password": request.password,
            "email_confirm": true,
            "user_metadata": {
                "first_name": request.first_name,
                "last_name": request.last_name,
                "role": request.role,
            }
        });

        let auth_user: Value = self
            .supabase
            .admin_request(Method::POST, "/auth/v1/admin/users", Some(auth_body))
            .await
            .map_err(|e| AdminError::AuthCreateFailed(e.to_string()))?;

        let user_id = auth_user
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AdminError::AuthCreateFailed("Auth service returned no user id".to_string())
            })?
            .to_string();

        // Step 2: profile row. No transaction spans both services, so undo
        // step 1 by hand if this fails.
        let profile_body = json!({
            "id": user_id,
            "email": request.email,
            "first_name": request.first_name,
            "last_name": request.last_name,
            "role": request.role,
        });

        let insert_result: Result<Value, _> = self
            .supabase
            .admin_request(Method::POST, "/rest/v1/profiles", Some(profile_body))
            .await;

        if let Err(insert_err) = insert_result {
            warn!(
                "Profile insert failed for {}, rolling back auth user {}",
                request.email, user_id
            );
            let rollback_path = format!("/auth/v1/admin/users/{}", user_id);
            let rollback: Result<Value, _> = self
                .supabase
                .admin_request(Method::DELETE, &rollback_path, None)
                .await;

            return Err(match rollback {
                Ok(_) => AdminError::ProfileCreateFailed(insert_err.to_string()),
                Err(rollback_err) => {
                    error!(
                        "Rollback of auth user {} failed: {}",
                        user_id, rollback_err
                    );
                    AdminError::RollbackFailed {
                        user_id,
                        message: insert_err.to_string(),
                    }
                }
            });
        }

        info!("User account provisioned: {} ({})", request.email, user_id);

        let id = Uuid::parse_str(&user_id)
            .map_err(|e| AdminError::DatabaseError(e.to_string()))?;
        Ok(Profile {
            id,
            email: request.email,
            first_name: request.first_name,
            last_name: request.last_name,
            role: request.role,
        })
    }

    pub async fn list_users(&self, auth_token: &str) -> Result<Vec<Profile>, AdminError> {
        let path = "/rest/v1/profiles?order=last_name.asc,first_name.asc";
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, path, Some(auth_token), None)
            .await
            .map_err(|e| AdminError::DatabaseError(e.to_string()))?;

        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AdminError::DatabaseError(e.to_string()))
    }
}
