//! In-memory mock of the Trello REST surface used by integration tests.
//!
//! Every parameter arrives as a query-string pair regardless of verb — the
//! same wire convention the client uses against the real API. Handlers
//! require `key` and `token` params and answer 401 without them. State lives
//! in an `Arc<RwLock<Store>>`; tests that need to pre-seed resources (there
//! is no comment-creation endpoint, for instance) build the router with
//! [`app_with_db`] and keep a handle on the store.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

type QueryMap = HashMap<String, String>;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoardRecord {
    pub id: String,
    pub name: String,
    pub closed: bool,
    pub desc: String,
    pub url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRecord {
    pub id: String,
    pub id_board: String,
    pub name: String,
    pub pos: f64,
    pub closed: bool,
    pub subscribed: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub id: String,
    pub id_board: String,
    pub id_list: String,
    pub name: String,
    pub desc: String,
    pub closed: bool,
    pub pos: f64,
    pub short_link: String,
    pub subscribed: bool,
    pub id_labels: Vec<String>,
    pub labels: Vec<LabelRecord>,
    pub id_members: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelRecord {
    pub id: String,
    pub id_board: String,
    pub name: String,
    pub color: String,
}

#[derive(Clone, Debug)]
pub struct CommentRecord {
    pub id: String,
    pub id_member_creator: String,
    pub date: String,
    pub id_board: String,
    pub id_card: String,
    pub id_list: String,
    pub text: String,
}

impl CommentRecord {
    /// Render in the nested action shape the API uses for comments.
    pub fn to_action_json(&self) -> Value {
        json!({
            "id": self.id,
            "idMemberCreator": self.id_member_creator,
            "date": self.date,
            "type": "commentCard",
            "data": {
                "text": self.text,
                "board": { "id": self.id_board },
                "card": { "id": self.id_card },
                "list": { "id": self.id_list },
            },
        })
    }
}

#[derive(Debug, Default)]
pub struct Store {
    pub boards: HashMap<String, BoardRecord>,
    pub lists: HashMap<String, ListRecord>,
    pub cards: HashMap<String, CardRecord>,
    pub labels: HashMap<String, LabelRecord>,
    pub comments: HashMap<String, CommentRecord>,
    seq: u32,
}

impl Store {
    fn next_date(&mut self) -> String {
        self.seq += 1;
        timestamp(self.seq)
    }
}

pub type Db = Arc<RwLock<Store>>;

/// 24-hex-character resource id, the shape the live API hands out.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()[..24].to_string()
}

/// Deterministic ISO-8601 date for a store sequence number.
pub fn timestamp(seq: u32) -> String {
    format!("2024-01-01T00:{:02}:{:02}.000Z", (seq / 60) % 60, seq % 60)
}

pub fn app() -> Router {
    app_with_db(Db::default())
}

pub fn app_with_db(db: Db) -> Router {
    Router::new()
        .route("/1/members/me/boards", get(my_boards))
        .route("/1/boards", post(create_board))
        .route(
            "/1/boards/{id}",
            get(get_board).put(update_board).delete(delete_board),
        )
        .route("/1/boards/{id}/cards", get(board_cards))
        .route("/1/board/{id}/lists", get(board_lists))
        .route("/1/lists", post(create_list))
        .route("/1/lists/{id}", get(get_list).put(update_list))
        .route("/1/lists/{id}/cards", get(list_cards))
        .route("/1/cards", post(create_card))
        .route("/1/cards/{id}", get(get_card).put(update_card))
        .route("/1/cards/{id}/actions", get(card_actions))
        .route("/1/actions/{id}", get(get_action).put(update_action))
        .route("/1/labels/{id}", put(update_label))
        .route("/1/search", get(search))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_db(listener, Db::default()).await
}

/// Serve on `listener` with a caller-held store, so tests can seed state.
pub async fn run_with_db(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_db(db)).await
}

fn check_auth(params: &QueryMap) -> Result<(), StatusCode> {
    if params.contains_key("key") && params.contains_key("token") {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

fn parse_bool(raw: &str) -> Result<bool, StatusCode> {
    match raw {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(StatusCode::BAD_REQUEST),
    }
}

fn resolve_pos(raw: Option<&str>, positions: &[f64]) -> Result<f64, StatusCode> {
    let bottom = positions.iter().copied().fold(0.0, f64::max) + 1024.0;
    match raw {
        None | Some("bottom") => Ok(bottom),
        Some("top") => {
            if positions.is_empty() {
                Ok(1024.0)
            } else {
                Ok(positions.iter().copied().fold(f64::INFINITY, f64::min) / 2.0)
            }
        }
        Some(number) => number.parse().map_err(|_| StatusCode::BAD_REQUEST),
    }
}

// --- boards ---

async fn my_boards(
    State(db): State<Db>,
    Query(params): Query<QueryMap>,
) -> Result<Json<Vec<BoardRecord>>, StatusCode> {
    check_auth(&params)?;
    let store = db.read().await;
    let mut boards: Vec<BoardRecord> = store.boards.values().cloned().collect();
    boards.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(Json(boards))
}

async fn create_board(
    State(db): State<Db>,
    Query(params): Query<QueryMap>,
) -> Result<Json<BoardRecord>, StatusCode> {
    check_auth(&params)?;
    let name = params.get("name").cloned().ok_or(StatusCode::BAD_REQUEST)?;
    let id = new_id();
    let board = BoardRecord {
        url: format!("https://trello.example/b/{id}"),
        id: id.clone(),
        name,
        closed: false,
        desc: params.get("desc").cloned().unwrap_or_default(),
    };
    db.write().await.boards.insert(id, board.clone());
    Ok(Json(board))
}

async fn get_board(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<QueryMap>,
) -> Result<Json<BoardRecord>, StatusCode> {
    check_auth(&params)?;
    let store = db.read().await;
    store
        .boards
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_board(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<QueryMap>,
) -> Result<Json<BoardRecord>, StatusCode> {
    check_auth(&params)?;
    let mut store = db.write().await;
    let board = store.boards.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = params.get("name") {
        board.name = name.clone();
    }
    if let Some(desc) = params.get("desc") {
        board.desc = desc.clone();
    }
    if let Some(closed) = params.get("closed") {
        board.closed = parse_bool(closed)?;
    }
    Ok(Json(board.clone()))
}

async fn delete_board(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<QueryMap>,
) -> Result<Json<Value>, StatusCode> {
    check_auth(&params)?;
    let mut store = db.write().await;
    store.boards.remove(&id).ok_or(StatusCode::NOT_FOUND)?;
    store.lists.retain(|_, list| list.id_board != id);
    store.cards.retain(|_, card| card.id_board != id);
    Ok(Json(json!({ "_value": null })))
}

async fn board_cards(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<QueryMap>,
) -> Result<Json<Vec<CardRecord>>, StatusCode> {
    check_auth(&params)?;
    let store = db.read().await;
    if !store.boards.contains_key(&id) {
        return Err(StatusCode::NOT_FOUND);
    }
    let mut cards: Vec<CardRecord> = store
        .cards
        .values()
        .filter(|card| card.id_board == id)
        .cloned()
        .collect();
    cards.sort_by(|a, b| a.pos.total_cmp(&b.pos));
    Ok(Json(cards))
}

async fn board_lists(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<QueryMap>,
) -> Result<Json<Vec<ListRecord>>, StatusCode> {
    check_auth(&params)?;
    let store = db.read().await;
    if !store.boards.contains_key(&id) {
        return Err(StatusCode::NOT_FOUND);
    }
    let mut lists: Vec<ListRecord> = store
        .lists
        .values()
        .filter(|list| list.id_board == id)
        .cloned()
        .collect();
    lists.sort_by(|a, b| a.pos.total_cmp(&b.pos));
    Ok(Json(lists))
}

// --- lists ---

async fn create_list(
    State(db): State<Db>,
    Query(params): Query<QueryMap>,
) -> Result<Json<ListRecord>, StatusCode> {
    check_auth(&params)?;
    let name = params.get("name").cloned().ok_or(StatusCode::BAD_REQUEST)?;
    let id_board = params
        .get("idBoard")
        .cloned()
        .ok_or(StatusCode::BAD_REQUEST)?;
    let mut store = db.write().await;
    if !store.boards.contains_key(&id_board) {
        return Err(StatusCode::NOT_FOUND);
    }
    let siblings: Vec<f64> = store
        .lists
        .values()
        .filter(|list| list.id_board == id_board)
        .map(|list| list.pos)
        .collect();
    let pos = resolve_pos(params.get("pos").map(String::as_str), &siblings)?;
    let list = ListRecord {
        id: new_id(),
        id_board,
        name,
        pos,
        closed: false,
        subscribed: false,
    };
    store.lists.insert(list.id.clone(), list.clone());
    Ok(Json(list))
}

async fn get_list(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<QueryMap>,
) -> Result<Json<ListRecord>, StatusCode> {
    check_auth(&params)?;
    let store = db.read().await;
    store
        .lists
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_list(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<QueryMap>,
) -> Result<Json<ListRecord>, StatusCode> {
    check_auth(&params)?;
    let mut store = db.write().await;
    let list = store.lists.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = params.get("name") {
        list.name = name.clone();
    }
    if let Some(closed) = params.get("closed") {
        list.closed = parse_bool(closed)?;
    }
    Ok(Json(list.clone()))
}

async fn list_cards(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<QueryMap>,
) -> Result<Json<Vec<CardRecord>>, StatusCode> {
    check_auth(&params)?;
    let store = db.read().await;
    if !store.lists.contains_key(&id) {
        return Err(StatusCode::NOT_FOUND);
    }
    let mut cards: Vec<CardRecord> = store
        .cards
        .values()
        .filter(|card| card.id_list == id)
        .cloned()
        .collect();
    cards.sort_by(|a, b| a.pos.total_cmp(&b.pos));
    Ok(Json(cards))
}

// --- cards ---

async fn create_card(
    State(db): State<Db>,
    Query(params): Query<QueryMap>,
) -> Result<Json<CardRecord>, StatusCode> {
    check_auth(&params)?;
    let name = params.get("name").cloned().ok_or(StatusCode::BAD_REQUEST)?;
    let id_list = params
        .get("idList")
        .cloned()
        .ok_or(StatusCode::BAD_REQUEST)?;
    let mut store = db.write().await;
    let id_board = store
        .lists
        .get(&id_list)
        .map(|list| list.id_board.clone())
        .ok_or(StatusCode::NOT_FOUND)?;
    let siblings: Vec<f64> = store
        .cards
        .values()
        .filter(|card| card.id_list == id_list)
        .map(|card| card.pos)
        .collect();
    let pos = resolve_pos(params.get("pos").map(String::as_str), &siblings)?;
    let id = new_id();
    let card = CardRecord {
        short_link: id[..8].to_string(),
        id: id.clone(),
        id_board,
        id_list,
        name,
        desc: params.get("desc").cloned().unwrap_or_default(),
        closed: false,
        pos,
        subscribed: false,
        id_labels: Vec::new(),
        labels: Vec::new(),
        id_members: Vec::new(),
    };
    store.cards.insert(id, card.clone());
    Ok(Json(card))
}

async fn get_card(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<QueryMap>,
) -> Result<Json<CardRecord>, StatusCode> {
    check_auth(&params)?;
    let store = db.read().await;
    store
        .cards
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_card(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<QueryMap>,
) -> Result<Json<CardRecord>, StatusCode> {
    check_auth(&params)?;
    let mut store = db.write().await;
    // A list move re-derives the owning board before the card is touched.
    let new_home = match params.get("idList") {
        Some(list_id) => {
            let board = store
                .lists
                .get(list_id)
                .map(|list| list.id_board.clone())
                .ok_or(StatusCode::BAD_REQUEST)?;
            Some((list_id.clone(), board))
        }
        None => None,
    };
    let card = store.cards.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = params.get("name") {
        card.name = name.clone();
    }
    if let Some(desc) = params.get("desc") {
        card.desc = desc.clone();
    }
    if let Some(closed) = params.get("closed") {
        card.closed = parse_bool(closed)?;
    }
    if let Some((id_list, id_board)) = new_home {
        card.id_list = id_list;
        card.id_board = id_board;
    }
    Ok(Json(card.clone()))
}

async fn card_actions(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<QueryMap>,
) -> Result<Json<Vec<Value>>, StatusCode> {
    check_auth(&params)?;
    let store = db.read().await;
    if !store.cards.contains_key(&id) {
        return Err(StatusCode::NOT_FOUND);
    }
    let mut comments: Vec<&CommentRecord> = store
        .comments
        .values()
        .filter(|comment| comment.id_card == id)
        .collect();
    // Newest first, as the live API orders actions.
    comments.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(Json(comments.iter().map(|c| c.to_action_json()).collect()))
}

// --- actions ---

async fn get_action(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<QueryMap>,
) -> Result<Json<Value>, StatusCode> {
    check_auth(&params)?;
    let store = db.read().await;
    store
        .comments
        .get(&id)
        .map(|comment| Json(comment.to_action_json()))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_action(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<QueryMap>,
) -> Result<Json<Value>, StatusCode> {
    check_auth(&params)?;
    let text = params.get("text").cloned().ok_or(StatusCode::BAD_REQUEST)?;
    let mut store = db.write().await;
    let date = store.next_date();
    let comment = store.comments.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    comment.text = text;
    comment.date = date;
    Ok(Json(comment.to_action_json()))
}

// --- labels ---

async fn update_label(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<QueryMap>,
) -> Result<Json<LabelRecord>, StatusCode> {
    check_auth(&params)?;
    let mut store = db.write().await;
    let label = store.labels.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = params.get("name") {
        label.name = name.clone();
    }
    if let Some(color) = params.get("color") {
        label.color = color.clone();
    }
    let updated = label.clone();
    // Cards embed their labels, so keep those copies in step.
    for card in store.cards.values_mut() {
        for embedded in card.labels.iter_mut() {
            if embedded.id == id {
                *embedded = updated.clone();
            }
        }
    }
    Ok(Json(updated))
}

// --- search ---

async fn search(
    State(db): State<Db>,
    Query(params): Query<QueryMap>,
) -> Result<Json<Value>, StatusCode> {
    check_auth(&params)?;
    let query = params.get("query").cloned().ok_or(StatusCode::BAD_REQUEST)?;
    let needle = query.to_lowercase();
    let store = db.read().await;
    let mut boards: Vec<BoardRecord> = store
        .boards
        .values()
        .filter(|board| board.name.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    boards.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(Json(json!({ "boards": boards })))
}
