//! UCI command formatting.

/// Commands sent from GUI to engine.
#[derive(Debug, Clone, PartialEq)]
pub enum GuiCommand {
    /// Initialize UCI mode.
    Uci,
    /// Check if engine is ready.
    IsReady,
    /// Tell the engine the next search belongs to a different game.
    UciNewGame,
    /// Set an engine option.
    SetOption { name: String, value: Option<String> },
    /// Set up position.
    Position {
        fen: Option<String>,
        moves: Vec<String>,
    },
    /// Search to a fixed depth.
    Go { depth: u32 },
    /// Quit the engine.
    Quit,
}

impl GuiCommand {
    /// `setoption name <name> value <value>`.
    pub fn set_option(name: impl Into<String>, value: impl ToString) -> Self {
        GuiCommand::SetOption {
            name: name.into(),
            value: Some(value.to_string()),
        }
    }

    /// `position fen <fen>` with no trailing moves.
    pub fn position_fen(fen: impl Into<String>) -> Self {
        GuiCommand::Position {
            fen: Some(fen.into()),
            moves: Vec::new(),
        }
    }

    /// Format as a UCI command line (without trailing newline).
    pub fn to_uci(&self) -> String {
        match self {
            GuiCommand::Uci => "uci".to_string(),
            GuiCommand::IsReady => "isready".to_string(),
            GuiCommand::UciNewGame => "ucinewgame".to_string(),
            GuiCommand::SetOption { name, value } => match value {
                Some(value) => format!("setoption name {} value {}", name, value),
                None => format!("setoption name {}", name),
            },
            GuiCommand::Position { fen, moves } => {
                let mut out = match fen {
                    Some(fen) => format!("position fen {}", fen),
                    None => "position startpos".to_string(),
                };
                if !moves.is_empty() {
                    out.push_str(" moves ");
                    out.push_str(&moves.join(" "));
                }
                out
            }
            GuiCommand::Go { depth } => format!("go depth {}", depth),
            GuiCommand::Quit => "quit".to_string(),
        }
    }
}
