use serde::Deserialize;
use std::{
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
    time::Duration,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address the HTTP API binds to
    pub ip: IpAddr,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Nothing survives a restart.
    Memory,
    /// One JSON file per collection under `StoreSettings::dir`.
    #[default]
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    /// Relative paths resolve against the site directory.
    pub dir: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Json,
            dir: PathBuf::from("./data/"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub idle_minutes: u64,
    pub absolute_hours: u64,
    /// How often expired sessions are swept.
    pub sweep_seconds: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_minutes: 30,
            absolute_hours: 12,
            sweep_seconds: 60,
        }
    }
}

impl SessionSettings {
    pub fn idle(&self) -> Duration {
        Duration::from_secs(self.idle_minutes.saturating_mul(60))
    }

    pub fn absolute(&self) -> Duration {
        Duration::from_secs(self.absolute_hours.saturating_mul(3600))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_seconds.max(1))
    }
}

/// Admin that exists outside the admins collection.
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultAdminSettings {
    #[serde(default = "default_admin_name")]
    pub name: String,
    pub email: String,
    /// Produce with `pledgebook hash-password`.
    pub password_hash: String,
}

fn default_admin_name() -> String {
    "Administrator".to_owned()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    /// Currency code shown in report headers
    pub currency: String,
    /// Group invite handed to guests after they pledge
    pub whatsapp_link: Option<String>,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            currency: "TZS".to_owned(),
            whatsapp_link: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub session: SessionSettings,
    pub default_admin: Option<DefaultAdminSettings>,
    pub event: EventSettings,
}
