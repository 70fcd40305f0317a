use clap::Args;

use common::view::{boards, Navigator, ViewError};

#[derive(Args, Debug, Clone)]
pub struct Boards {
    /// Show the classes of this board instead of the board list
    pub board: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum BoardsError {
    #[error(transparent)]
    View(#[from] ViewError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Boards {
    type Error = BoardsError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        match &self.board {
            None => Ok(boards().collect::<Vec<_>>().join("\n")),
            Some(board) => {
                let mut nav = Navigator::default();
                let classes = nav.select_board(board)?;
                Ok(format!("{}:\n  {}", board, classes.join("\n  ")))
            }
        }
    }
}
