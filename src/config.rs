// config.rs
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub seed_catalog: bool,
    // Irys / Arweave document storage
    pub irys_node_url: String,
    pub irys_gateway_url: String,
    pub irys_token: String,
    pub irys_wallet_address: Option<String>,
    pub irys_upload_relay_url: Option<String>,
    // Contract deployment output
    pub deployment_manifest: String,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        let database_max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .map(|v| v.parse::<u32>().expect("DATABASE_MAX_CONNECTIONS must be a number"))
            .unwrap_or(10);
        let port = std::env::var("PORT")
            .map(|v| v.parse::<u16>().expect("PORT must be a valid port number"))
            .unwrap_or(3001);

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:8000,http://localhost:5173".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let seed_catalog = std::env::var("SEED_CATALOG")
            .map(|v| !matches!(v.to_lowercase().as_str(), "0" | "false" | "no"))
            .unwrap_or(true);

        let irys_node_url = std::env::var("IRYS_NODE_URL")
            .unwrap_or_else(|_| "https://devnet.irys.xyz".to_string());
        let irys_gateway_url = std::env::var("IRYS_GATEWAY_URL")
            .unwrap_or_else(|_| "https://gateway.irys.xyz".to_string());
        let irys_token = std::env::var("IRYS_TOKEN")
            .unwrap_or_else(|_| "ethereum".to_string());
        let irys_wallet_address = std::env::var("IRYS_WALLET_ADDRESS").ok();
        let irys_upload_relay_url = std::env::var("IRYS_UPLOAD_RELAY_URL").ok();

        let deployment_manifest = std::env::var("DEPLOYMENT_MANIFEST")
            .unwrap_or_else(|_| "deployments/latest.json".to_string());

        Config {
            database_url,
            database_max_connections,
            port,
            allowed_origins,
            seed_catalog,
            irys_node_url,
            irys_gateway_url,
            irys_token,
            irys_wallet_address,
            irys_upload_relay_url,
            deployment_manifest,
        }
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Config {
        Config {
            database_url: None,
            database_max_connections: 1,
            port: 0,
            allowed_origins: vec!["http://localhost:8000".to_string()],
            seed_catalog: true,
            irys_node_url: "https://devnet.irys.xyz".to_string(),
            irys_gateway_url: "https://gateway.irys.xyz".to_string(),
            irys_token: "ethereum".to_string(),
            irys_wallet_address: None,
            irys_upload_relay_url: None,
            deployment_manifest: "deployments/does-not-exist.json".to_string(),
        }
    }
}
