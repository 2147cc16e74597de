use crate::domain::{Card, ColumnId};
use std::fmt;

/// State of the create/edit card dialog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardDialog {
    pub show: bool,
    pub is_edit_mode: bool,
    pub card_data: Option<Card>,
    pub target_column_id: Option<ColumnId>,
}

impl CardDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an empty dialog, optionally preselecting a column
    pub fn open_for_create(&mut self, column_id: Option<ColumnId>) {
        self.show = true;
        self.is_edit_mode = false;
        self.card_data = None;
        self.target_column_id = column_id;
    }

    /// Opens the dialog prefilled with a copy of `card`
    pub fn open_for_edit(&mut self, card: &Card, column_id: ColumnId) {
        self.show = true;
        self.is_edit_mode = true;
        self.card_data = Some(card.clone());
        self.target_column_id = Some(column_id);
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }
}

type ConfirmCallback = Box<dyn FnOnce() + Send>;

/// State of a yes/no confirmation dialog and the action to run on confirm
#[derive(Default)]
pub struct ConfirmationDialog {
    pub show: bool,
    pub title: String,
    pub message: String,
    on_confirm: Option<ConfirmCallback>,
}

impl fmt::Debug for ConfirmationDialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfirmationDialog")
            .field("show", &self.show)
            .field("title", &self.title)
            .field("message", &self.message)
            .field("has_callback", &self.on_confirm.is_some())
            .finish()
    }
}

impl ConfirmationDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
        on_confirm: impl FnOnce() + Send + 'static,
    ) {
        self.title = title.into();
        self.message = message.into();
        self.on_confirm = Some(Box::new(on_confirm));
        self.show = true;
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    /// Runs the pending callback, if any, then closes the dialog
    pub fn confirm(&mut self) {
        if let Some(callback) = self.on_confirm.take() {
            callback();
        }
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[test]
    fn test_card_dialog_open_for_create() {
        let mut dialog = CardDialog::new();
        dialog.open_for_create(Some(ColumnId::from("col1")));

        assert!(dialog.show);
        assert!(!dialog.is_edit_mode);
        assert!(dialog.card_data.is_none());
        assert_eq!(dialog.target_column_id, Some(ColumnId::from("col1")));
    }

    #[test]
    fn test_card_dialog_edit_copies_card() {
        let mut card = Card::new("c1", "Title", "col1", 0);
        let mut dialog = CardDialog::new();
        dialog.open_for_edit(&card, ColumnId::from("col1"));

        card.title = "Changed".to_string();
        assert!(dialog.is_edit_mode);
        assert_eq!(dialog.card_data.as_ref().unwrap().title, "Title");
    }

    #[test]
    fn test_card_dialog_close_resets() {
        let mut dialog = CardDialog::new();
        dialog.open_for_edit(&Card::new("c1", "T", "col1", 0), ColumnId::from("col1"));
        dialog.close();

        assert_eq!(dialog, CardDialog::default());
    }

    #[test]
    fn test_confirmation_runs_callback_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut dialog = ConfirmationDialog::new();
        dialog.open("Delete card", "Are you sure?", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(dialog.show);
        assert_eq!(dialog.title, "Delete card");

        dialog.confirm();
        dialog.confirm();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!dialog.show);
        assert!(dialog.message.is_empty());
    }

    #[test]
    fn test_confirmation_close_drops_callback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut dialog = ConfirmationDialog::new();
        dialog.open("Delete card", "Are you sure?", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        dialog.close();
        dialog.confirm();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
