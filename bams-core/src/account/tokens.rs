//! Token 签发：JWT access token、不透明刷新/重置令牌、临时密码

use super::models::{TokenClaims, UserAccount};
use crate::error::{AuthError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::{Rng, RngCore};

/// 签发与校验 access token 的组件
///
/// access token 是自包含的：持有校验密钥的一方无需访问存储即可确认
/// 真实性和有效期。密钥缺失属于启动配置问题，不在这里处理。
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    /// HMAC 签名密钥
    secret: String,
    issuer: String,
    audience: String,
    /// Access token 有效期（秒）
    access_ttl: i64,
}

impl TokenIssuer {
    pub fn new(secret: String, issuer: String, audience: String, access_ttl: i64) -> Self {
        Self {
            secret,
            issuer,
            audience,
            access_ttl,
        }
    }

    /// 配置 JWT iss/aud
    pub fn with_claims_context(
        mut self,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        self.issuer = issuer.into();
        self.audience = audience.into();
        self
    }

    /// 配置 access token 有效期
    pub fn with_access_ttl(mut self, secs: i64) -> Self {
        self.access_ttl = secs;
        self
    }

    /// 签发 access token，claims 携带身份与角色
    pub fn issue_access_token(&self, user: &UserAccount) -> Result<String> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            exp: (now + Duration::seconds(self.access_ttl)).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::Other(format!("jwt encode failed: {}", e)))
    }

    /// 校验 access token（签名、有效期、iss/aud）
    pub fn verify(&self, token: &str) -> Result<TokenClaims> {
        let mut validation = Validation::default();
        validation.set_audience(&[self.audience.clone()]);
        validation.set_issuer(&[self.issuer.clone()]);
        let token_data = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AuthError::Unauthorized(format!("invalid token: {}", e)))?;
        Ok(token_data.claims)
    }
}

/// 生成不透明随机令牌：32 字节 CSPRNG 输出的 base64
///
/// 刷新令牌和密码重置令牌共用同一个生成器；令牌本身不携带任何信息，
/// 必须回查存储才能关联到账户。
pub fn new_opaque_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

/// 生成临时密码：在 62 个字母数字字符上均匀采样
pub fn temp_password(len: usize) -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
