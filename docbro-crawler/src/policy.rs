//! ABOUTME: robots.txt policy (fetched once per host, cached) plus per-host token-bucket rate limiting (spec §4.F)

use std::collections::HashMap;
use std::sync::Arc;

use docbro_utils::prelude::HostRateLimiter;
use parking_lot::Mutex;
use reqwest::Client;

#[derive(Debug, Clone, Default)]
struct RobotsRules {
    disallow: Vec<String>,
    allow: Vec<String>,
}

impl RobotsRules {
    /// Longest-match-wins, `Allow` breaking ties over `Disallow` of equal length.
    fn permits(&self, path: &str) -> bool {
        let best_disallow = self.disallow.iter().filter(|p| path.starts_with(p.as_str())).map(String::len).max();
        let best_allow = self.allow.iter().filter(|p| path.starts_with(p.as_str())).map(String::len).max();
        match (best_disallow, best_allow) {
            (Some(d), Some(a)) => a >= d,
            (Some(_), None) => false,
            _ => true,
        }
    }
}

fn parse_robots_txt(body: &str) -> RobotsRules {
    let mut rules = RobotsRules::default();
    let mut applies = false;
    for line in body.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else { continue };
        let key = key.trim().to_lowercase();
        let value = value.trim();
        match key.as_str() {
            "user-agent" => applies = value == "*",
            "disallow" if applies && !value.is_empty() => rules.disallow.push(value.to_string()),
            "allow" if applies && !value.is_empty() => rules.allow.push(value.to_string()),
            _ => {}
        }
    }
    rules
}

/// Caches one `robots.txt` parse per host for the lifetime of the crawl
/// session, and exposes the shared per-host rate limiter.
pub struct CrawlPolicy {
    client: Client,
    robots_cache: Mutex<HashMap<String, RobotsRules>>,
    rate_limiter: Arc<HostRateLimiter>,
    follow_external: bool,
    seed_domain: Option<String>,
}

impl CrawlPolicy {
    #[must_use]
    pub fn new(client: Client, follow_external: bool, seed_domain: Option<String>) -> Self {
        Self {
            client,
            robots_cache: Mutex::new(HashMap::new()),
            rate_limiter: Arc::new(HostRateLimiter::new()),
            follow_external,
            seed_domain,
        }
    }

    #[must_use]
    pub fn rate_limiter(&self) -> Arc<HostRateLimiter> {
        self.rate_limiter.clone()
    }

    pub fn allows_domain(&self, domain: &str) -> bool {
        if self.follow_external {
            return true;
        }
        self.seed_domain.as_deref().is_none_or_eq(domain)
    }

    /// Fetches and caches `robots.txt` for `host` on first use; subsequent
    /// calls for the same host reuse the cached rules.
    pub async fn is_allowed(&self, host: &str, path: &str) -> bool {
        if let Some(rules) = self.robots_cache.lock().get(host) {
            return rules.permits(path);
        }

        let url = format!("https://{host}/robots.txt");
        let rules = match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                response.text().await.map(|body| parse_robots_txt(&body)).unwrap_or_default()
            }
            _ => RobotsRules::default(),
        };
        let permitted = rules.permits(path);
        self.robots_cache.lock().insert(host.to_string(), rules);
        permitted
    }
}

trait OptStrEq {
    fn is_none_or_eq(&self, other: &str) -> bool;
}

impl OptStrEq for Option<&str> {
    fn is_none_or_eq(&self, other: &str) -> bool {
        match self {
            None => true,
            Some(s) => *s == other,
        }
    }
}
