use std::num::NonZeroU32;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::StatusCode;
use tracing::{debug, warn};

use super::types::MojangProfile;
use crate::error::AppError;
use crate::tierlist::{AccountType, PlayerProfile};

const MOJANG_API_URL: &str = "https://api.mojang.com";
const AVATAR_URL: &str = "https://mc-heads.net/avatar";
pub const STEVE_AVATAR_URL: &str = "https://mc-heads.net/avatar/MHF_Steve/128";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Looks up premium Minecraft accounts to pick the avatar shown on result embeds.
pub struct MojangClient {
    client: reqwest::Client,
    limiter: DefaultDirectRateLimiter,
    base_url: String,
}

impl std::fmt::Debug for MojangClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MojangClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl MojangClient {
    pub fn new(requests_per_minute: NonZeroU32) -> Self {
        Self::with_base_url(MOJANG_API_URL, requests_per_minute)
    }

    pub fn with_base_url(base_url: &str, requests_per_minute: NonZeroU32) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            limiter: RateLimiter::direct(Quota::per_minute(requests_per_minute)),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `None` when no premium account uses this name.
    pub async fn get_profile(&self, ign: &str) -> Result<Option<MojangProfile>, AppError> {
        self.limiter.until_ready().await;

        let url = format!(
            "{}/users/profiles/minecraft/{}",
            self.base_url,
            urlencoding::encode(ign)
        );
        let res = self.client.get(url).send().await?;

        match res.status() {
            StatusCode::OK => Ok(Some(res.json().await?)),
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(None),
            status => Err(AppError::MojangApi {
                status: status.as_u16(),
            }),
        }
    }

    /// Steve for cracked accounts, without a lookup.
    pub async fn avatar_for(&self, profile: &PlayerProfile) -> String {
        match profile.account_type {
            AccountType::Premium => self.avatar_url(&profile.ign).await,
            AccountType::Cracked => STEVE_AVATAR_URL.to_string(),
        }
    }

    /// Avatar for premium accounts, Steve for unknown names and on any failure.
    pub async fn avatar_url(&self, ign: &str) -> String {
        match self.get_profile(ign).await {
            Ok(Some(profile)) => {
                debug!(ign, uuid = %profile.id, "🧱 Premium account found");
                format!("{AVATAR_URL}/{}/128", urlencoding::encode(&profile.name))
            }
            Ok(None) => STEVE_AVATAR_URL.to_string(),
            Err(e) => {
                warn!(error = %e, ign, "🧱 ⚠️ Mojang lookup failed, using default avatar");
                STEVE_AVATAR_URL.to_string()
            }
        }
    }
}
