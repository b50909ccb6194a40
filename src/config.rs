use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub voucher: VoucherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherConfig {
    /// 批量生成时每页处理的客户数
    #[serde(default = "default_voucher_limit")]
    pub limit: i64,
    #[serde(default = "default_bloom_capacity")]
    pub bloom_capacity: usize,
    #[serde(default = "default_bloom_fp_rate")]
    pub bloom_fp_rate: f64,
}

fn default_voucher_limit() -> i64 {
    100
}

fn default_bloom_capacity() -> usize {
    1_000_000
}

fn default_bloom_fp_rate() -> f64 {
    0.01
}

impl Default for VoucherConfig {
    fn default() -> Self {
        Self {
            limit: default_voucher_limit(),
            bloom_capacity: default_bloom_capacity(),
            bloom_fp_rate: default_bloom_fp_rate(),
        }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                // 有配置文件：先解析再用环境变量覆盖
                toml::from_str(&config_str).map_err(|e| format!("解析配置文件失败: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // 无配置文件：使用环境变量与默认值构建
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL")
                    .ok_or("缺少 DATABASE_URL 环境变量，且未找到配置文件 config.toml")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    voucher: VoucherConfig {
                        limit: get_env_parse("CUSTOMER_VOUCHER_LIMIT", default_voucher_limit()),
                        bloom_capacity: get_env_parse("BLOOM_CAPACITY", default_bloom_capacity()),
                        bloom_fp_rate: get_env_parse("BLOOM_FP_RATE", default_bloom_fp_rate()),
                    },
                }
            }
            Err(e) => {
                return Err(format!("无法读取配置文件 {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("CUSTOMER_VOUCHER_LIMIT")
            && let Ok(n) = v.parse()
        {
            config.voucher.limit = n;
        }
        if let Ok(v) = env::var("BLOOM_CAPACITY")
            && let Ok(n) = v.parse()
        {
            config.voucher.bloom_capacity = n;
        }
        if let Ok(v) = env::var("BLOOM_FP_RATE")
            && let Ok(r) = v.parse()
        {
            config.voucher.bloom_fp_rate = r;
        }

        Ok(config)
    }
}
