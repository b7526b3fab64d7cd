// region:    --- Imports
use axum::extract::DefaultBodyLimit;
use bidding_service::auth::gate::AuthorizationGate;
use bidding_service::auth::{AuthProvider, JwtAuthProvider};
use bidding_service::config::Config;
use bidding_service::database::DatabaseManager;
use bidding_service::handlers;
use bidding_service::store::{DataStore, PgDataStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // 설정 로드
    let config = Config::from_env()?;

    // DatabaseManager 생성
    let db_manager = Arc::new(DatabaseManager::new(&config).await?);

    // 스키마 적용
    if config.init_schema {
        if let Err(e) = db_manager.initialize_database().await {
            error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
            return Err(e.into());
        }
        info!("{:<12} --> 데이터베이스 초기화 성공", "Main");
    }

    // 저장소 / 토큰 검증 / 권한 게이트 구성
    let store: Arc<dyn DataStore> = Arc::new(PgDataStore::new(
        Arc::clone(&db_manager),
        config.lock_timeout,
    ));
    let provider: Arc<dyn AuthProvider> = Arc::new(JwtAuthProvider::new(&config.jwt_secret));
    let gate = Arc::new(AuthorizationGate::new(provider, Arc::clone(&store)));

    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 라우터 설정
    let routes_all = handlers::router((store, gate))
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024));

    // 리스너 생성
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행 (Ctrl+C 시 진행 중인 요청을 마치고 종료)
    if let Err(err) = axum::serve(listener, routes_all.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("{:<12} --> Server error: {}", "Main", err);
    }

    db_manager.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("{:<12} --> 종료 시그널 대기 실패: {}", "Main", e);
    }
    info!("{:<12} --> 종료 시그널 수신", "Main");
}
// endregion: --- Main
