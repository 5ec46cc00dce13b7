use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub mongodb: MongodbConfig,
    pub assets: AssetsConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_expiration_hours: i64,
    pub refresh_expiration_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongodbConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetsConfig {
    pub storage_dir: String,
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origin: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .unwrap_or(8080),
            },
            jwt: JwtConfig {
                access_secret: env::var("ACCESS_TOKEN_SECRET")
                    .unwrap_or_else(|_| "access-secret-change-this".to_string()),
                refresh_secret: env::var("REFRESH_TOKEN_SECRET")
                    .unwrap_or_else(|_| "refresh-secret-change-this".to_string()),
                access_expiration_hours: env::var("ACCESS_TOKEN_EXPIRATION_HOURS")
                    .unwrap_or_else(|_| "24".to_string())
                    .parse()
                    .unwrap_or(24),
                refresh_expiration_days: env::var("REFRESH_TOKEN_EXPIRATION_DAYS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
            },
            mongodb: MongodbConfig {
                uri: env::var("MONGODB_URI")
                    .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
                database: env::var("MONGODB_DATABASE").unwrap_or_else(|_| "cliptube".to_string()),
            },
            assets: AssetsConfig {
                storage_dir: env::var("ASSET_STORAGE_DIR")
                    .unwrap_or_else(|_| "public/assets".to_string()),
                public_base_url: env::var("ASSET_PUBLIC_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:8080/assets".to_string()),
            },
            cors: CorsConfig {
                allowed_origin: env::var("CORS_ORIGIN")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            },
        })
    }
}
