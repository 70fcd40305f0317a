//! Board → class → content-type navigation.
//!
//! `Navigator` is the whole client-side selection state. It is owned by
//! whoever drives the portal and passed to each handler; nothing here is
//! global.

use serde::{Deserialize, Serialize};

use crate::content::ContentType;
use crate::gate::AdminSession;

const BOARDS: &[(&str, &[&str])] = &[
    (
        "CBSE",
        &[
            "Class 6", "Class 7", "Class 8", "Class 9", "Class 10", "Class 11", "Class 12",
        ],
    ),
    ("Bihar Board", &["Class 9", "Class 10", "Class 11", "Class 12"]),
    ("English", &["Beginner", "Intermediate", "Advanced"]),
    ("Competitive Exam", &["NEET", "JEE", "SSC", "UPSC"]),
    ("Courses", &["Web Development", "Data Science", "Mobile App"]),
];

pub fn boards() -> impl Iterator<Item = &'static str> {
    BOARDS.iter().map(|(board, _)| *board)
}

pub fn classes_for(board: &str) -> Option<&'static [&'static str]> {
    BOARDS
        .iter()
        .find(|(name, _)| *name == board)
        .map(|(_, classes)| *classes)
}

/// What the dashboard should load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentScope {
    pub board: String,
    pub class: String,
    pub content_type: ContentType,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Home,
    Selection { board: String },
    Dashboard {
        board: String,
        class: String,
        filter: ContentType,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("unknown board '{0}'")]
    UnknownBoard(String),
    #[error("'{class}' is not a class of {board}")]
    UnknownClass { board: String, class: String },
    #[error("select a board first")]
    NoBoardSelected,
    #[error("select a class first")]
    NoClassSelected,
}

#[derive(Debug, Clone, Default)]
pub struct Navigator {
    view: View,
    admin: Option<AdminSession>,
}

impl Navigator {
    pub fn new(admin: Option<AdminSession>) -> Self {
        Self {
            view: View::Home,
            admin,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn admin(&self) -> Option<&AdminSession> {
        self.admin.as_ref()
    }

    pub fn login(&mut self, session: AdminSession) {
        self.admin = Some(session);
    }

    pub fn logout(&mut self) -> Option<AdminSession> {
        self.admin.take()
    }

    pub fn go_home(&mut self) {
        self.view = View::Home;
    }

    /// Move to the class picker for `board` and return its classes.
    pub fn select_board(&mut self, board: &str) -> Result<&'static [&'static str], ViewError> {
        let classes = classes_for(board)
            .ok_or_else(|| ViewError::UnknownBoard(board.to_string()))?;
        self.view = View::Selection {
            board: board.to_string(),
        };
        Ok(classes)
    }

    /// Open the dashboard for `class`. The type filter resets to quiz.
    pub fn select_class(&mut self, class: &str) -> Result<ContentScope, ViewError> {
        let board = match &self.view {
            View::Selection { board } | View::Dashboard { board, .. } => board.clone(),
            View::Home => return Err(ViewError::NoBoardSelected),
        };
        let known = classes_for(&board).unwrap_or_default();
        if !known.contains(&class) {
            return Err(ViewError::UnknownClass {
                board,
                class: class.to_string(),
            });
        }
        self.view = View::Dashboard {
            board,
            class: class.to_string(),
            filter: ContentType::Quiz,
        };
        self.scope().ok_or(ViewError::NoClassSelected)
    }

    /// Switch the dashboard tab.
    pub fn filter(&mut self, content_type: ContentType) -> Result<ContentScope, ViewError> {
        match &mut self.view {
            View::Dashboard { filter, .. } => *filter = content_type,
            _ => return Err(ViewError::NoClassSelected),
        }
        self.scope().ok_or(ViewError::NoClassSelected)
    }

    pub fn back_to_selection(&mut self) -> Result<&'static [&'static str], ViewError> {
        let board = match &self.view {
            View::Selection { board } | View::Dashboard { board, .. } => board.clone(),
            View::Home => return Err(ViewError::NoBoardSelected),
        };
        self.select_board(&board)
    }

    pub fn scope(&self) -> Option<ContentScope> {
        match &self.view {
            View::Dashboard {
                board,
                class,
                filter,
            } => Some(ContentScope {
                board: board.clone(),
                class: class.clone(),
                content_type: *filter,
            }),
            _ => None,
        }
    }
}
