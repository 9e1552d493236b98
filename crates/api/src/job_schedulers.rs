use crate::dispatch::RunTickUseCase;
use crate::shared::usecase::execute;
use actix_web::rt::time::{interval, sleep_until, Instant};
use stay_notifier_infra::NotifierContext;
use std::time::Duration;
use tracing::info;

pub fn get_start_delay(now_ts: usize, secs_before_min: usize) -> usize {
    let secs_to_next_minute = 60 - (now_ts / 1000) % 60;
    if secs_to_next_minute > secs_before_min {
        secs_to_next_minute - secs_before_min
    } else {
        secs_to_next_minute + (60 - secs_before_min)
    }
}

/// Runs a tick at the start of every minute. Ticks are spawned and never
/// awaited by the scheduler, so a slow tick may overlap the next one.
pub fn start_tick_job_scheduler(ctx: NotifierContext) {
    actix_web::rt::spawn(async move {
        let now = ctx.sys.get_timestamp_millis();
        let secs_to_next_run = get_start_delay(now as usize, 0);
        let start = Instant::now() + Duration::from_secs(secs_to_next_run as u64);
        info!("First scheduled tick in {} seconds", secs_to_next_run);

        sleep_until(start).await;
        let mut minutely_interval = interval(Duration::from_secs(60));
        loop {
            minutely_interval.tick().await;
            let context = ctx.clone();
            actix_web::rt::spawn(run_tick(context));
        }
    });
}

async fn run_tick(context: NotifierContext) {
    // Errors are logged by the usecase executor
    let _ = execute(RunTickUseCase::default(), &context).await;
}
