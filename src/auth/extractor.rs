use crate::auth::{verify_token, Claims};
use crate::config::Config;
use crate::error::ApiError;
use actix_web::{web, FromRequest, HttpRequest};
use mongodb::bson::oid::ObjectId;
use std::future::{ready, Ready};

/// The caller identity resolved from the `Authorization: Bearer` header.
pub struct AuthenticatedUser {
    pub user_id: ObjectId,
    #[allow(dead_code)]
    pub email: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let auth_header = req.headers().get("Authorization");

        if let Some(header_value) = auth_header {
            if let Ok(header_str) = header_value.to_str() {
                if let Some(token) = header_str.strip_prefix("Bearer ") {
                    let config = req.app_data::<web::Data<Config>>();
                    if let Some(config) = config {
                        match verify_token::<Claims>(token, &config.jwt.access_secret) {
                            Ok(claims) => {
                                if let Ok(user_id) = ObjectId::parse_str(&claims.sub) {
                                    return ready(Ok(AuthenticatedUser {
                                        user_id,
                                        email: claims.email,
                                    }));
                                }
                            }
                            Err(_) => {
                                return ready(Err(ApiError::Unauthorized(
                                    "Invalid or expired access token".to_string(),
                                )));
                            }
                        }
                    }
                }
            }
        }

        ready(Err(ApiError::Unauthorized(
            "Missing or invalid authorization header".to_string(),
        )))
    }
}
