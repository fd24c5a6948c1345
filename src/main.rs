use actix_cors::Cors;
use actix_web::{get, post, web, App, HttpResponse, HttpServer, Responder};
use log::info;
use serde_json::json;

use rust_job_scraper::app_state::AppState;
use rust_job_scraper::config::Config;
use rust_job_scraper::crawler::session;
use rust_job_scraper::export;
use rust_job_scraper::job_state::{JobHandle, ProgressSink};
use rust_job_scraper::models::{CrawlConfig, CrawlResult, ScrapeRequest};

/// Synchronous crawl: blocks until completion and returns the result
/// directly, bypassing the single-flight job state. Progress still goes
/// to the console log through a throwaway handle.
#[post("/scrape")]
async fn scrape(data: web::Data<AppState>, req: web::Json<ScrapeRequest>) -> impl Responder {
    let cfg = CrawlConfig::from(req.into_inner());
    let app_cfg = data.config.clone();

    let outcome =
        web::block(move || session::run_with_browser(&cfg, &app_cfg, &JobHandle::new())).await;
    match outcome {
        Ok(Ok(result)) => HttpResponse::Ok().json(result),
        Ok(Err(e)) => HttpResponse::InternalServerError().json(CrawlResult::error(e.to_string())),
        Err(e) => HttpResponse::InternalServerError().json(CrawlResult::error(e.to_string())),
    }
}

/// Start a background crawl. Rejected with 409 while one is running.
#[post("/scrape_start")]
async fn scrape_start(data: web::Data<AppState>, req: web::Json<ScrapeRequest>) -> impl Responder {
    let cfg = CrawlConfig::from(req.into_inner());

    if data.job.try_begin().is_err() {
        return HttpResponse::Conflict().json(json!({"detail": "A scrape is already running"}));
    }
    data.job.log("Starting scrape...");

    let handle = data.job.clone();
    let app_cfg = data.config.clone();
    actix_web::rt::task::spawn_blocking(move || session::run_background(handle, cfg, app_cfg));

    HttpResponse::Ok().json(json!({"status": "started"}))
}

/// Live snapshot of the current (or last) run.
#[get("/scrape_status")]
async fn scrape_status(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.job.status())
}

/// Download a previously reported artifact by name.
#[get("/download/{filename}")]
async fn download(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let name = match export::sanitize_artifact_name(&path) {
        Some(name) => name,
        None => return HttpResponse::NotFound().json(json!({"detail": "File not found"})),
    };
    let file_path = std::path::Path::new(&data.config.output_dir).join(&name);
    match std::fs::read(&file_path) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", name),
            ))
            .body(bytes),
        Err(_) => HttpResponse::NotFound().json(json!({"detail": "File not found"})),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    log4rs::init_file("log4rs.yml", Default::default()).unwrap();

    let cfg = Config::load();
    std::fs::create_dir_all(&cfg.output_dir)?;

    info!("Job scraper starting:");
    info!("  Output dir: {}", cfg.output_dir);
    info!("  Cookie file: {}", cfg.cookie_file);
    info!("  Browser headless: {}", cfg.browser.headless);

    let data = web::Data::new(AppState {
        job: JobHandle::new(),
        config: cfg,
    });

    // Try to bind to an available port starting at 8080
    let mut last_err: Option<std::io::Error> = None;
    for port in 8080..=8090 {
        let data_clone = data.clone();
        let addr = format!("127.0.0.1:{}", port);
        match HttpServer::new(move || {
            App::new()
                .wrap(Cors::permissive())
                .app_data(data_clone.clone())
                .service(scrape)
                .service(scrape_start)
                .service(scrape_status)
                .service(download)
        })
        .bind(&addr)
        {
            Ok(server) => {
                info!("Listening on {}", addr);
                return server.run().await;
            }
            Err(e) => {
                last_err = Some(e);
                continue;
            }
        }
    }
    Err(last_err.unwrap_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::AddrInUse,
            "No available ports 8080-8090",
        )
    }))
}
