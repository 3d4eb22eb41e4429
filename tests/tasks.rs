//! Task scenarios, with a local cache mocking the hosted store

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use serde_json::json;

use daybook::board::{Folder, TaskBoard, TaskFilters};
use daybook::cache::Cache;
use daybook::config::TASKS;
use daybook::mock_behaviour::{MockBehaviour, Plan, StoreOperation};
use daybook::task::{NewTask, Priority, TaskChanges};
use daybook::tasks::TaskService;
use daybook::traits::RemoteStore;
use daybook::utils::to_row;
use daybook::{Outcome, ValidationError};

fn service_with_mock() -> (TaskService<Arc<Cache>>, Arc<Cache>, Arc<Mutex<MockBehaviour>>) {
    let mock = Arc::new(Mutex::new(MockBehaviour::new()));
    let mut cache = Cache::new();
    cache.set_mock_behaviour(Some(mock.clone()));
    let cache = Arc::new(cache);
    (TaskService::new(cache.clone()), cache, mock)
}


#[tokio::test]
async fn test_create_and_list() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (service, cache, _) = service_with_mock();

    let mut new_task = NewTask::new("Buy milk");
    new_task.add_tag("shopping");
    new_task.due_date = NaiveDate::from_ymd_opt(2021, 3, 4);
    let first = service.create_task(&new_task).await.unwrap().done().unwrap();
    assert_eq!(first.title(), "Buy milk");
    assert_eq!(first.priority(), Priority::Medium);
    assert_eq!(first.completed(), false);
    assert_eq!(first.tags().to_vec(), vec!["shopping".to_string()]);
    assert_eq!(first.created_at(), first.updated_at());

    let second = service.create_task(&NewTask::new("Call mum")).await.unwrap().done().unwrap();
    let third = service.create_task(&NewTask::new("Write report")).await.unwrap().done().unwrap();
    assert_eq!(cache.len(TASKS), 3);

    // Newest first
    let tasks = service.get_tasks().await;
    let ids: Vec<&str> = tasks.iter().map(|t| t.id()).collect();
    assert_eq!(ids, vec![third.id(), second.id(), first.id()]);
    assert_eq!(tasks[2], first);
}

#[tokio::test]
async fn test_empty_title_is_rejected() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (service, cache, mock) = service_with_mock();

    // The store is never reached
    *mock.lock().unwrap() = MockBehaviour::fail_now(1);
    assert_eq!(service.create_task(&NewTask::new("  ")).await, Err(ValidationError::EmptyTitle));
    assert_eq!(cache.len(TASKS), 0);
    assert_eq!(mock.lock().unwrap().plan(StoreOperation::Insert), Plan { successes: 0, failures: 1 });
    mock.lock().unwrap().suspend();

    let task = service.create_task(&NewTask::new("Buy milk")).await.unwrap().done().unwrap();
    assert_eq!(
        service.update_task(task.id(), &TaskChanges::new().title("")).await,
        Err(ValidationError::EmptyTitle)
    );
    assert_eq!(service.get_tasks().await[0].title(), "Buy milk");
}

#[tokio::test]
async fn test_toggle_round_trip() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (service, _, _) = service_with_mock();

    let task = service.create_task(&NewTask::new("Buy milk")).await.unwrap().done().unwrap();

    assert_eq!(service.toggle_task_completion(task.id(), true).await, Outcome::Done(()));
    let listed = service.get_tasks().await;
    assert!(listed[0].completed());
    assert!(listed[0].updated_at() > task.updated_at());

    assert_eq!(service.toggle_task_completion(task.id(), false).await, Outcome::Done(()));
    let listed = service.get_tasks().await;
    assert_eq!(listed[0].completed(), false);
    assert_eq!(listed[0].title(), task.title());
    assert_eq!(listed[0].created_at(), task.created_at());
}

#[tokio::test]
async fn test_partial_update() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (service, _, _) = service_with_mock();

    let mut new_task = NewTask::new("Buy milk");
    new_task.description = "Semi-skimmed".to_string();
    new_task.due_date = NaiveDate::from_ymd_opt(2021, 3, 4);
    let task = service.create_task(&new_task).await.unwrap().done().unwrap();

    let changes = TaskChanges::new()
        .priority(Priority::High)
        .tags(vec!["shopping", "shopping", "home"]);
    let updated = service.update_task(task.id(), &changes).await.unwrap().done().unwrap();
    assert_eq!(updated.priority(), Priority::High);
    assert_eq!(updated.tags().to_vec(), vec!["shopping".to_string(), "home".to_string()]);
    assert_eq!(updated.description(), "Semi-skimmed");
    assert_eq!(updated.due_date(), task.due_date());

    let cleared = service.update_task(task.id(), &TaskChanges::new().due_date(None)).await.unwrap().done().unwrap();
    assert_eq!(cleared.due_date(), None);
    assert_eq!(cleared.priority(), Priority::High);
}

#[tokio::test]
async fn test_failures() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (service, cache, mock) = service_with_mock();

    let task = service.create_task(&NewTask::new("Buy milk")).await.unwrap().done().unwrap();

    *mock.lock().unwrap() = MockBehaviour::fail_now(1);
    assert_eq!(service.create_task(&NewTask::new("Call mum")).await, Ok(Outcome::Failed));
    assert!(service.get_tasks().await.is_empty());
    assert_eq!(service.update_task(task.id(), &TaskChanges::new().title("Buy bread")).await, Ok(Outcome::Failed));
    assert_eq!(service.delete_task(task.id()).await, Outcome::Failed);
    assert_eq!(cache.len(TASKS), 1);

    // Toggling a task that does not exist
    assert_eq!(service.toggle_task_completion("unknown", true).await, Outcome::Failed);

    assert_eq!(service.delete_task(task.id()).await, Outcome::Done(()));
    assert!(service.get_tasks().await.is_empty());
}

#[tokio::test]
async fn test_board() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (service, _, mock) = service_with_mock();

    for title in &["Buy milk", "Call mum", "Write report"] {
        service.create_task(&NewTask::new(*title)).await.unwrap().done().unwrap();
    }

    let mut board = TaskBoard::new();
    board.refresh(&service).await;
    assert_eq!(board.counts(), (3, 0));

    let report = board.tasks()[0].id().to_string();
    let milk = board.tasks()[2].id().to_string();

    assert!(board.set_completion(&service, &report, true).await.unwrap().is_done());
    assert_eq!(board.counts(), (2, 1));
    board.set_folder(Folder::Completed);
    assert_eq!(board.visible_tasks()[0].id(), report);
    board.set_folder(Folder::Active);

    // Reordering is local only
    assert!(board.reorder(&milk, 0));
    let titles: Vec<&str> = board.visible_tasks().iter().map(|t| t.title()).collect();
    assert_eq!(titles, vec!["Buy milk", "Call mum"]);

    let changes = TaskChanges::new().tags(vec!["family"]);
    let call = board.tasks().iter().find(|t| t.title() == "Call mum").unwrap().id().to_string();
    board.select(Some(&call));
    assert!(board.update_task(&service, &call, &changes).await.unwrap().is_done());
    assert!(board.selected_task().is_none());
    assert_eq!(board.available_tags(), vec!["family".to_string()]);

    board.set_filters(TaskFilters { priority: None, tag: Some("family".to_string()) });
    assert_eq!(board.visible_tasks().len(), 1);

    // The store refuses the change: the board is rolled back
    mock.lock().unwrap().fail_next(StoreOperation::Update, 1);
    assert!(board.set_completion(&service, &call, true).await.unwrap().is_failed());
    assert_eq!(board.task(&call).unwrap().completed(), false);

    board.refresh(&service).await;
    assert_eq!(board.counts(), (2, 1));
    assert!(board.create_task(&service, "Water plants").await.unwrap().is_done());
    assert_eq!(board.tasks()[0].title(), "Water plants");
}

#[tokio::test]
async fn test_rows_written_by_other_clients() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (service, cache, _) = service_with_mock();

    for title in &["Buy milk", "Call mum", "Write report"] {
        service.create_task(&NewTask::new(*title)).await.unwrap().done().unwrap();
    }

    // Timestamp due date, and null columns
    let foreign = to_row(&json!({
        "title": "Book flights",
        "description": null,
        "priority": null,
        "completed": null,
        "due_date": "2021-03-05T00:00:00+00:00",
        "tags": null,
    })).unwrap();
    cache.insert(TASKS, foreign).await.unwrap();

    // Nothing can be made of this one
    let broken = to_row(&json!({ "title": "Broken", "due_date": "someday" })).unwrap();
    cache.insert(TASKS, broken).await.unwrap();
    assert_eq!(cache.len(TASKS), 5);

    let tasks = service.get_tasks().await;
    let titles: Vec<&str> = tasks.iter().map(|t| t.title()).collect();
    assert_eq!(titles, vec!["Book flights", "Write report", "Call mum", "Buy milk"]);

    let flights = &tasks[0];
    assert_eq!(flights.priority(), Priority::Medium);
    assert_eq!(flights.completed(), false);
    assert_eq!(flights.due_date(), NaiveDate::from_ymd_opt(2021, 3, 5));
    assert!(flights.tags().is_empty());
}

#[tokio::test]
async fn test_duplicate_tags_are_not_stored() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (service, _, _) = service_with_mock();

    let mut new_task = NewTask::new("Buy milk");
    new_task.tags = vec!["shopping".to_string(), " shopping".to_string(), "home".to_string(), "".to_string()];
    let task = service.create_task(&new_task).await.unwrap().done().unwrap();
    assert_eq!(task.tags().to_vec(), vec!["shopping".to_string(), "home".to_string()]);

    let listed = service.get_tasks().await;
    assert_eq!(listed[0].tags(), task.tags());
}
