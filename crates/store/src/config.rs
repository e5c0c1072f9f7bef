/// Connection settings for the hosted backend.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Project base URL, e.g. `https://abc.supabase.co`.
    pub url: String,
    /// Public (anon) API key, used for reads.
    pub anon_key: String,
    /// Privileged key for admin writes. Reads never use it.
    pub service_role_key: Option<String>,
    /// Whether to run the realtime bridge.
    pub realtime_enabled: bool,
}

impl StoreConfig {
    /// Load store configuration from environment variables.
    ///
    /// | Env Var                     | Required | Default |
    /// |-----------------------------|----------|---------|
    /// | `SUPABASE_URL`              | **yes**  | --      |
    /// | `SUPABASE_ANON_KEY`         | **yes**  | --      |
    /// | `SUPABASE_SERVICE_ROLE_KEY` | no       | --      |
    /// | `REALTIME_ENABLED`          | no       | `true`  |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing or empty.
    pub fn from_env() -> Self {
        let url = std::env::var("SUPABASE_URL").expect("SUPABASE_URL must be set");
        assert!(!url.trim().is_empty(), "SUPABASE_URL must not be empty");

        let anon_key = std::env::var("SUPABASE_ANON_KEY").expect("SUPABASE_ANON_KEY must be set");
        assert!(!anon_key.is_empty(), "SUPABASE_ANON_KEY must not be empty");

        let service_role_key = std::env::var("SUPABASE_SERVICE_ROLE_KEY")
            .ok()
            .filter(|k| !k.is_empty());

        let realtime_enabled = std::env::var("REALTIME_ENABLED")
            .map(|v| parse_flag(&v))
            .unwrap_or(true);

        Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key,
            service_role_key,
            realtime_enabled,
        }
    }

    /// Key used for writes: the service role key when configured.
    pub fn write_key(&self) -> &str {
        self.service_role_key.as_deref().unwrap_or(&self.anon_key)
    }

    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url)
    }

    /// Realtime websocket endpoint, with the scheme switched to `ws(s)`.
    pub fn realtime_url(&self) -> String {
        let ws_base = if let Some(rest) = self.url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.url.clone()
        };
        format!(
            "{ws_base}/realtime/v1/websocket?apikey={}&vsn=1.0.0",
            self.anon_key
        )
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
