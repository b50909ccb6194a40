use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use voucher_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    middlewares::create_cors,
    services::{
        BloomFilterService, CustomerService, PgJobGate, SpecialOfferService, VoucherService,
    },
    swagger::swagger_config,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // 预热布隆过滤器, 失败则拒绝启动
    let bloom_filter = BloomFilterService::new(
        config.voucher.bloom_capacity,
        config.voucher.bloom_fp_rate,
    );
    bloom_filter
        .initialize(&pool)
        .await
        .expect("Failed to warm the bloom filter from persisted voucher codes");

    // 创建服务
    let customer_service = CustomerService::new(pool.clone());
    let special_offer_service = SpecialOfferService::new(pool.clone());
    let voucher_service = VoucherService::new(
        pool.clone(),
        bloom_filter.clone(),
        PgJobGate::new(pool.clone()),
        config.voucher.limit,
    );

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(web::Data::new(customer_service.clone()))
            .app_data(web::Data::new(special_offer_service.clone()))
            .app_data(web::Data::new(voucher_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::customer_config)
                    .configure(handlers::special_offer_config)
                    .configure(handlers::voucher_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
