use actix_web::web;

mod get_dispatch_logs;
mod guard;
mod run_tick;
mod send_manual;

use get_dispatch_logs::get_dispatch_logs_controller;
pub use run_tick::RunTickUseCase;
use run_tick::run_tick_controller;
use send_manual::send_manual_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/cron", web::get().to(run_tick_controller));
    cfg.route(
        "/dispatch-logs",
        web::get().to(get_dispatch_logs_controller),
    );
    cfg.route("/dispatch/manual", web::post().to(send_manual_controller));
}
