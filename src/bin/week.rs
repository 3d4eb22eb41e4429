use std::error::Error;
use std::sync::Arc;

use chrono::Utc;

use daybook::client::Client;
use daybook::config::StoreConfig;
use daybook::schedule::{week_bounds, ScheduleService};
use daybook::tasks::TaskService;
use daybook::timetable::Timetable;
use daybook::utils::{print_schedule, print_task};


#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = StoreConfig::from_env()?;
    let client = Arc::new(Client::from_config(&config)?);

    let schedule = ScheduleService::new(client.clone(), Timetable::new(config.utc_offset));
    let tasks = TaskService::new(client);

    let today = Utc::now().with_timezone(&config.utc_offset).naive_local().date();
    let (start, end) = week_bounds(today, &config.utc_offset)
        .ok_or_else(|| format!("Unable to compute the week of {}", today))?;

    println!("Week of {}:", today);
    print_schedule(&schedule.get_schedule(start, end).await);

    println!("Tasks:");
    for task in tasks.get_tasks().await {
        print_task(&task);
    }
    Ok(())
}
