//! Signed view-report URLs — a capability-link pattern, not a session
//! system. A link embeds an expiry timestamp and an HMAC-SHA256 signature
//! over `report_id:expiry`; anyone holding an unexpired, untampered link
//! can read that one report.

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub struct UrlSigner {
    secret: String,
    base_url: String,
    ttl_hours: i64,
}

/// A minted share link.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedLink {
    pub url: String,
    /// Unix milliseconds after which the link is rejected.
    pub expires: i64,
    pub signature: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignedUrlStatus {
    Valid,
    Expired,
    Invalid,
}

impl UrlSigner {
    pub fn new(secret: String, base_url: String, ttl_hours: i64) -> Self {
        Self {
            secret,
            base_url,
            ttl_hours,
        }
    }

    /// Mint a signed view-report URL expiring `ttl_hours` from now.
    pub fn sign(&self, report_id: &str) -> SignedLink {
        let expires = Utc::now().timestamp_millis() + self.ttl_hours * 60 * 60 * 1000;
        let signature = self.signature_for(report_id, expires);
        SignedLink {
            url: format!(
                "{}/view-report/{report_id}?expires={expires}&signature={signature}",
                self.base_url
            ),
            expires,
            signature,
        }
    }

    /// Verify a presented link. Expiry is checked before the signature, so
    /// a stale link reports Expired even when tampered with.
    pub fn verify(&self, report_id: &str, expires: i64, signature: &str) -> SignedUrlStatus {
        if expires < Utc::now().timestamp_millis() {
            return SignedUrlStatus::Expired;
        }

        let Ok(presented) = hex::decode(signature) else {
            return SignedUrlStatus::Invalid;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(self.secret.as_bytes()) else {
            return SignedUrlStatus::Invalid;
        };
        mac.update(payload(report_id, expires).as_bytes());
        match mac.verify_slice(&presented) {
            Ok(()) => SignedUrlStatus::Valid,
            Err(_) => SignedUrlStatus::Invalid,
        }
    }

    fn signature_for(&self, report_id: &str, expires: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(payload(report_id, expires).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

fn payload(report_id: &str, expires: i64) -> String {
    format!("{report_id}:{expires}")
}
