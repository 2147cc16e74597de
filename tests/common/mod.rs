#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use kanban_core::{
    Board, Card, CardChanges, CardId, Column, ColumnId, KanbanError, NewCard, Result, Storage,
};
use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
};
use tokio::sync::Notify;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Fetch,
    Create,
    Update,
    Delete,
    Move,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Fetch,
    Create(NewCard),
    Update(CardId, CardChanges),
    Delete(CardId),
    Move(CardId, ColumnId, i64),
}

impl Call {
    fn op(&self) -> Op {
        match self {
            Call::Fetch => Op::Fetch,
            Call::Create(_) => Op::Create,
            Call::Update(..) => Op::Update,
            Call::Delete(_) => Op::Delete,
            Call::Move(..) => Op::Move,
        }
    }
}

/// Storage double that records calls, fails chosen operations, and can hold
/// calls open until released.
#[derive(Default)]
pub struct ScriptedStorage {
    board: Mutex<Board>,
    failing: Mutex<HashSet<Op>>,
    calls: Mutex<Vec<Call>>,
    held: AtomicBool,
    gate: Notify,
    next_id: AtomicUsize,
}

impl ScriptedStorage {
    pub fn with_board(board: Board) -> Self {
        Self {
            board: Mutex::new(board),
            ..Self::default()
        }
    }

    pub fn set_board(&self, board: Board) {
        *self.board.lock().unwrap() = board;
    }

    pub fn fail(&self, op: Op) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn succeed(&self, op: Op) {
        self.failing.lock().unwrap().remove(&op);
    }

    /// Makes subsequent calls wait until `release`
    pub fn hold(&self) {
        self.held.store(true, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.held.store(false, Ordering::SeqCst);
        self.gate.notify_waiters();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls().iter().filter(|call| call.op() == op).count()
    }

    async fn enter(&self, call: Call) -> Result<()> {
        let op = call.op();
        self.calls.lock().unwrap().push(call);

        if self.held.load(Ordering::SeqCst) {
            self.gate.notified().await;
        }

        if self.failing.lock().unwrap().contains(&op) {
            return Err(KanbanError::StorageError(format!("simulated {:?} failure", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for ScriptedStorage {
    async fn fetch_columns(&self) -> Result<Vec<Column>> {
        self.enter(Call::Fetch).await?;
        let board = self.board.lock().unwrap();
        Ok(board
            .columns
            .iter()
            .map(|column| Column {
                cards: Vec::new(),
                ..column.clone()
            })
            .collect())
    }

    async fn fetch_cards(&self, column_id: Option<&ColumnId>) -> Result<Vec<Card>> {
        self.enter(Call::Fetch).await?;
        let board = self.board.lock().unwrap();
        Ok(board
            .columns
            .iter()
            .filter(|column| column_id.map_or(true, |id| &column.id == id))
            .flat_map(|column| column.cards.iter().cloned())
            .collect())
    }

    /// Single recorded fetch, so tests can count loads one-to-one
    async fn fetch_board(&self) -> Result<Board> {
        self.enter(Call::Fetch).await?;
        Ok(self.board.lock().unwrap().clone())
    }

    async fn create_card(&self, card: &NewCard) -> Result<Card> {
        self.enter(Call::Create(card.clone())).await?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(Card::from_new(CardId::new(format!("srv-{}", n)), card, Utc::now()))
    }

    async fn update_card(&self, id: &CardId, changes: &CardChanges) -> Result<()> {
        self.enter(Call::Update(id.clone(), changes.clone())).await
    }

    async fn delete_card(&self, id: &CardId) -> Result<()> {
        self.enter(Call::Delete(id.clone())).await
    }

    async fn move_card(&self, id: &CardId, to_column: &ColumnId, position: i64) -> Result<()> {
        self.enter(Call::Move(id.clone(), to_column.clone(), position))
            .await
    }
}

/// Two columns: col1 holds c1 and c2, col2 holds c3
pub fn sample_board() -> Board {
    Board::new(vec![
        Column::new("col1", "To Do", 0).with_cards(vec![
            Card::new("c1", "Old", "col1", 0).with_description("D"),
            Card::new("c2", "Two", "col1", 1),
        ]),
        Column::new("col2", "Done", 1)
            .with_cards(vec![Card::new("c3", "Three", "col2", 0)]),
    ])
}

pub fn card_ids(board: &Board, column: &str) -> Vec<String> {
    board
        .column(&ColumnId::from(column))
        .map(|col| col.cards.iter().map(|c| c.id.to_string()).collect())
        .unwrap_or_default()
}
