use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use swu_card_list::{
    CardListController, CardListError, CardListState, CardSearch, MachineConfig, SearchError,
    SearchPayload, SortKey,
};
use tokio::sync::oneshot;
use tokio::time::timeout;

type Reply = Result<SearchPayload, SearchError>;

/// Answers every search at once from a fixed function of the filter.
struct ImmediateSearch<F> {
    answer: F,
    calls: Mutex<Vec<String>>,
}

impl<F> ImmediateSearch<F>
where
    F: Fn(&str) -> Reply + Send + Sync,
{
    fn new(answer: F) -> Arc<Self> {
        Arc::new(ImmediateSearch {
            answer,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl<F> CardSearch for ImmediateSearch<F>
where
    F: Fn(&str) -> Reply + Send + Sync,
{
    async fn search_cards(&self, filter: &str) -> Reply {
        self.calls.lock().unwrap().push(filter.to_string());
        (self.answer)(filter)
    }
}

/// Holds each search open until the test sends its reply.
#[derive(Default)]
struct ScriptedSearch {
    pending: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
}

impl ScriptedSearch {
    fn expect(&self, filter: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(filter.to_string(), rx);
        tx
    }
}

#[async_trait]
impl CardSearch for ScriptedSearch {
    async fn search_cards(&self, filter: &str) -> Reply {
        let reply = self.pending.lock().unwrap().remove(filter);
        match reply {
            Some(rx) => rx.await.unwrap_or_else(|_| Err(SearchError::new(""))),
            None => Err(SearchError::new(&format!("unexpected search for '{filter}'"))),
        }
    }
}

fn vader_and_luke() -> Value {
    json!([
        { "Set": "SOR", "Number": "001", "Name": "Vader", "Cost": "5" },
        { "Set": "SOR", "Number": "002", "Name": "Luke", "Cost": "3" }
    ])
}

fn config(filter: &str) -> MachineConfig {
    MachineConfig {
        initial_filter: filter.to_string(),
        ..MachineConfig::default()
    }
}

fn names(state: &CardListState) -> Vec<String> {
    state
        .cards()
        .expect("ready state")
        .iter()
        .map(|c| c.name.clone().unwrap_or_default())
        .collect()
}

#[tokio::test]
async fn vader_search_sorts_by_name_then_cost() {
    let search = ImmediateSearch::new(|_| Ok(SearchPayload::new(vader_and_luke())));
    let mut handle = CardListController::spawn(search.clone(), config("Vader"));

    let state = handle.settled().await.expect("initial load");
    assert_eq!(names(&state), ["Luke", "Vader"]);

    handle.request_sort(SortKey::Cost).expect("send");
    let state = handle.settled().await.expect("resorted load");
    let costs: Vec<Option<i64>> = state.cards().unwrap().iter().map(|c| c.cost).collect();
    assert_eq!(costs, [Some(3), Some(5)]);

    // The sort change re-ran the search with the same filter.
    assert_eq!(search.calls(), ["Vader", "Vader"]);
}

#[tokio::test]
async fn rejection_publishes_error_message() {
    let search = ImmediateSearch::new(|_| Err(SearchError::new("timeout")));
    let mut handle = CardListController::spawn(search, config("Vader"));

    let state = handle.settled().await.expect("settled");

    assert_eq!(
        state,
        CardListState::Error {
            message: "timeout".into()
        }
    );
}

#[tokio::test]
async fn malformed_data_is_an_empty_list() {
    let search = ImmediateSearch::new(|filter| {
        Ok(SearchPayload::new(match filter {
            "null" => Value::Null,
            _ => json!("x"),
        }))
    });
    let mut handle = CardListController::spawn(search, config("null"));

    let state = handle.settled().await.expect("settled");
    assert_eq!(state.cards().map(<[_]>::len), Some(0));

    handle.set_filter("x").expect("send");
    let state = handle.settled().await.expect("settled");
    assert_eq!(state.cards().map(<[_]>::len), Some(0));
}

#[tokio::test]
async fn error_then_new_filter_recovers() {
    let search = ImmediateSearch::new(|filter| match filter {
        "down" => Err(SearchError::new("")),
        _ => Ok(SearchPayload::new(vader_and_luke())),
    });
    let mut handle = CardListController::spawn(search, config("down"));

    let state = handle.settled().await.expect("settled");
    assert_eq!(
        state,
        CardListState::Error {
            message: "Failed to load cards".into()
        }
    );

    handle.set_filter("Vader").expect("send");
    let state = handle.settled().await.expect("settled");
    assert_eq!(names(&state), ["Luke", "Vader"]);
}

#[tokio::test]
async fn unchanged_inputs_do_not_search_again() {
    let search = ImmediateSearch::new(|_| Ok(SearchPayload::new(vader_and_luke())));
    let mut handle = CardListController::spawn(search.clone(), config("Vader"));
    handle.settled().await.expect("initial load");

    handle.set_filter("Vader").expect("send");
    handle.settled().await.expect("ack");
    handle.request_sort(SortKey::Name).expect("send");
    let state = handle.settled().await.expect("ack");

    assert_eq!(names(&state), ["Luke", "Vader"]);
    assert_eq!(search.calls(), ["Vader"]);
}

#[tokio::test]
async fn stale_response_does_not_overwrite_newer_one() {
    let search = Arc::new(ScriptedSearch::default());
    let first = search.expect("Vader");
    let second = search.expect("Luke");
    let mut handle = CardListController::spawn(search.clone(), config("Vader"));

    handle.set_filter("Luke").expect("send");
    second
        .send(Ok(SearchPayload::new(json!([{ "Name": "Luke" }]))))
        .expect("reply");
    let state = handle.settled().await.expect("settled");
    assert_eq!(names(&state), ["Luke"]);

    let mut watcher = handle.subscribe();
    watcher.borrow_and_update();
    first
        .send(Ok(SearchPayload::new(vader_and_luke())))
        .expect("reply");

    let republished = timeout(Duration::from_millis(100), watcher.changed()).await;
    assert!(republished.is_err(), "stale response was published");
    assert_eq!(names(&handle.current()), ["Luke"]);
}

// The initial search can land between sending a command and the controller
// reading it; settling must still wait for the command's own search.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn settled_waits_for_the_command_it_follows() {
    for _ in 0..20 {
        let search = Arc::new(ScriptedSearch::default());
        let first = search.expect("Vader");
        let second = search.expect("Luke");
        let mut handle = CardListController::spawn(search.clone(), config("Vader"));

        handle.set_filter("Luke").expect("send");
        first
            .send(Ok(SearchPayload::new(vader_and_luke())))
            .expect("reply");
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let _ = second.send(Ok(SearchPayload::new(json!([{ "Name": "Luke" }]))));
        });

        let state = timeout(Duration::from_secs(1), handle.settled())
            .await
            .expect("settled in time")
            .expect("settled");
        assert_eq!(names(&state), ["Luke"]);
    }
}

#[tokio::test]
async fn cloned_handles_each_wait_for_their_own_command() {
    let search = ImmediateSearch::new(|filter| {
        Ok(SearchPayload::new(json!([{ "Name": filter }])))
    });
    let mut first = CardListController::spawn(search, config("Vader"));
    first.settled().await.expect("initial load");
    let mut second = first.clone();

    first.set_filter("Luke").expect("send");
    second.set_filter("Leia").expect("send");

    let state = second.settled().await.expect("settled");
    assert_eq!(names(&state), ["Leia"]);
    let state = first.settled().await.expect("settled");
    assert_eq!(names(&state), ["Leia"]);
}

// Reproduces the unversioned behavior: whichever search finishes last wins.
#[tokio::test]
async fn without_discard_last_response_wins() {
    let search = Arc::new(ScriptedSearch::default());
    let first = search.expect("Vader");
    let second = search.expect("Luke");
    let mut handle = CardListController::spawn(
        search.clone(),
        MachineConfig {
            discard_stale_responses: false,
            ..config("Vader")
        },
    );

    handle.set_filter("Luke").expect("send");
    second
        .send(Ok(SearchPayload::new(json!([{ "Name": "Luke" }]))))
        .expect("reply");
    handle.settled().await.expect("settled");

    let mut watcher = handle.subscribe();
    watcher.borrow_and_update();
    first
        .send(Ok(SearchPayload::new(vader_and_luke())))
        .expect("reply");
    timeout(Duration::from_secs(1), watcher.changed())
        .await
        .expect("late response published")
        .expect("controller running");

    assert_eq!(names(&handle.current()), ["Luke", "Vader"]);
}

#[tokio::test]
async fn controller_stops_when_handles_drop() {
    let search = Arc::new(ScriptedSearch::default());
    let _never_answered = search.expect("Vader");
    let (controller, handle) = CardListController::new(search, config("Vader"));
    let task = tokio::spawn(controller.run());

    let mut watcher = handle.subscribe();
    drop(handle);

    timeout(Duration::from_secs(1), task)
        .await
        .expect("controller stopped")
        .expect("controller task");
    assert_eq!(*watcher.borrow_and_update(), CardListState::Loading);
    assert!(watcher.changed().await.is_err());
}

#[tokio::test]
async fn commands_fail_once_controller_is_gone() {
    let search = Arc::new(ScriptedSearch::default());
    let (controller, mut handle) = CardListController::new(search, config(""));
    drop(controller);

    assert!(matches!(
        handle.set_filter("Vader"),
        Err(CardListError::ControllerStopped)
    ));
    assert!(matches!(
        handle.settled().await,
        Err(CardListError::ControllerStopped)
    ));
}
