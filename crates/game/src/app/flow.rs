use engine::{Board, Core, FlipOutcome, KeyValueStore, MatchSession, MenuError, MenuId};
use tracing::info;

use super::context::GameContext;

/// Start screen, then a board per level, then the next-level prompt.
#[derive(Debug)]
pub(crate) struct GameFlow<S: KeyValueStore> {
    core: Core<GameContext<S>>,
    session: Option<MatchSession>,
}

impl<S: KeyValueStore> GameFlow<S> {
    pub(crate) fn new(context: GameContext<S>) -> Self {
        Self {
            core: Core::new(context),
            session: None,
        }
    }

    pub(crate) fn context(&self) -> &GameContext<S> {
        self.core.managers()
    }

    pub(crate) fn context_mut(&mut self) -> &mut GameContext<S> {
        self.core.managers_mut()
    }

    #[cfg(test)]
    pub(crate) fn core(&self) -> &Core<GameContext<S>> {
        &self.core
    }

    pub(crate) fn session(&self) -> Option<&MatchSession> {
        self.session.as_ref()
    }

    pub(crate) fn start(&mut self) -> Result<(), MenuError> {
        self.core.start();
        let menus = &mut self.context_mut().menus;
        menus.activate(MenuId::Background)?;
        menus.activate(MenuId::Start)?;
        Ok(())
    }

    /// Lays out the board for the current level and shows the play menu.
    /// A pending next-level prompt is dismissed first.
    pub(crate) fn start_level(&mut self) -> Result<(), MenuError> {
        let context = self.core.managers_mut();
        context.menus.deactivate(MenuId::Next);
        let level = context.levels.current_level_data();
        let board = Board::from_level(&level, &context.levels.settings().cards);
        info!(
            level_number = level.level(),
            columns = board.columns(),
            rows = board.rows(),
            cards = board.len(),
            "level_started"
        );
        context.menus.activate(MenuId::Play)?;
        self.session = Some(MatchSession::new(board));
        Ok(())
    }

    pub(crate) fn flip(&mut self, index: usize) -> Result<FlipOutcome, MenuError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(FlipOutcome::Ignored);
        };
        let outcome = session.flip(index);
        let context = self.core.managers_mut();
        context.audio.play_all(outcome.sound_cues());

        if let FlipOutcome::Completed(..) = outcome {
            context.levels.advance_level();
            context.menus.activate(MenuId::Next)?;
        }
        Ok(outcome)
    }

    pub(crate) fn close_mismatched(&mut self) -> bool {
        self.session
            .as_mut()
            .is_some_and(MatchSession::close_mismatched)
    }

    /// Leaves the next-level prompt and lays out the following board. Fails
    /// while no prompt is showing.
    pub(crate) fn continue_to_next_level(&mut self) -> Result<(), MenuError> {
        if !self.context_mut().menus.deactivate(MenuId::Next) {
            return Err(MenuError::NotStacked(MenuId::Next));
        }
        self.start_level()
    }

    pub(crate) fn shutdown(&mut self) {
        self.session = None;
        self.core.dispose();
    }
}
